use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

/// Acknowledgement body of `/upload-cv/` and `/upload-jobs/`. The flow ignores
/// it beyond logging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

/// Body and suggested name of a generated cover letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetter {
    /// Value of the `Content-Disposition` header, if any.
    pub disposition: Option<String>,
    pub bytes: Vec<u8>,
}

pub const DEFAULT_COVER_LETTER_NAME: &str = "cover_letter.docx";

impl CoverLetter {
    /// Name to save the letter under: the header's suggestion when usable,
    /// otherwise `cover_letter.docx`.
    pub fn file_name(&self) -> String {
        self.disposition
            .as_deref()
            .and_then(filename_from_disposition)
            .and_then(|name| crate::core::FsOps::sanitize_file_name(&name))
            .unwrap_or_else(|| DEFAULT_COVER_LETTER_NAME.to_string())
    }
}

/// Pull the file name out of a `Content-Disposition` value. An RFC 5987
/// `filename*=` parameter wins over a plain `filename=`.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in split_params(header).into_iter().skip(1) {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "filename" => plain = Some(unquote(value.trim())),
            "filename*" => extended = decode_ext_value(value.trim()),
            _ => {}
        }
    }

    extended.or(plain).filter(|name| !name.trim().is_empty())
}

/// Split on `;` outside double quotes.
fn split_params(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in header.char_indices() {
        match c {
            '\\' if in_quotes && !escaped => {
                escaped = true;
                continue;
            }
            '"' if !escaped => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(header[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        escaped = false;
    }
    parts.push(header[start..].trim());
    parts
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => {
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else {
                    out.push(c);
                }
            }
            out
        }
        None => value.to_string(),
    }
}

/// `UTF-8''cover%20letter.docx` -> `cover letter.docx`
fn decode_ext_value(value: &str) -> Option<String> {
    let mut pieces = value.splitn(3, '\'');
    let charset = pieces.next()?;
    let _language = pieces.next()?;
    let encoded = pieces.next()?;

    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("iso-8859-1") {
        return None;
    }

    let decoded = percent_decode_str(encoded);
    if charset.eq_ignore_ascii_case("utf-8") {
        decoded.decode_utf8().ok().map(|name| name.into_owned())
    } else {
        Some(decoded.map(char::from).collect())
    }
}
