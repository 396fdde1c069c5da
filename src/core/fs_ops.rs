// src/core/fs_ops.rs
//! File system helpers for the CV picker boundary and downloads

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::ClientError;

const PDF_SIGNATURE: &[u8] = b"%PDF-";

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            app_log!(info, "Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Write `bytes` as `dir/file_name`, creating `dir` when missing.
    pub async fn write_download(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        Self::ensure_dir_exists(dir).await?;

        let path = dir.join(file_name);
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        app_log!(info, "Written file: {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// Get file extension safely
    pub fn get_extension(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Accept exactly one PDF. Anything else is turned away before a request
    /// is built.
    pub async fn read_pdf(path: &Path) -> Result<(String, Vec<u8>), ClientError> {
        if Self::get_extension(path).as_deref() != Some("pdf") {
            return Err(ClientError::UserInput(format!(
                "Unsupported file format: {}. Supported format: PDF",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| ClientError::UserInput(format!("Invalid file name: {}", path.display())))?;

        let bytes = fs::read(path).await.map_err(|e| {
            ClientError::UserInput(format!("Cannot read {}: {}", path.display(), e))
        })?;

        if !bytes.starts_with(PDF_SIGNATURE) {
            return Err(ClientError::UserInput(format!(
                "{} is not a PDF document",
                file_name
            )));
        }

        Ok((file_name, bytes))
    }

    /// Keep only the last path component and drop characters that are not
    /// safe in a file name.
    pub fn sanitize_file_name(name: &str) -> Option<String> {
        let last = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
        let cleaned: String = last
            .chars()
            .filter(|c| !c.is_control() && !matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|'))
            .collect();

        match cleaned.as_str() {
            "" | "." | ".." => None,
            _ => Some(cleaned),
        }
    }
}
