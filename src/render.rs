// src/render.rs
//! Plain-text rendering of the board and the upload status

use std::fmt::Write;

use crate::matches::BoardView;
use crate::types::{JobMatch, SavedJob};
use crate::upload::UploadState;

pub const LOADING_MESSAGE: &str = "Finding your perfect matches...";
pub const EMPTY_TITLE: &str = "No matches found";
pub const EMPTY_HINT: &str = "Try uploading a different CV or check back later";
pub const ERROR_TITLE: &str = "Oops! Something went wrong";

/// Render the whole board. `is_saved` decides the marker on each card.
pub fn board(view: BoardView<'_>, is_saved: impl Fn(&JobMatch) -> bool) -> String {
    match view {
        BoardView::Loading => format!("{}\n", LOADING_MESSAGE),
        BoardView::Error(message) => format!("{}\n{}\n", ERROR_TITLE, message),
        BoardView::Empty => format!("{}\n{}\n", EMPTY_TITLE, EMPTY_HINT),
        BoardView::Jobs(jobs) => jobs
            .iter()
            .map(|job| job_card(job, is_saved(job)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// One listing as a card. The score is printed exactly as received.
pub fn job_card(job: &JobMatch, saved: bool) -> String {
    let mut out = String::new();
    let marker = if saved { "★" } else { "☆" };

    let _ = writeln!(out, "{} {}  [{}%]", marker, job.position_name, job.match_score);
    let _ = writeln!(out, "  {}", job.company);
    if !job.id.is_empty() {
        let _ = writeln!(out, "  id: {}", job.id);
    }

    let extras: Vec<&str> = [&job.location, &job.salary, &job.job_type]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .collect();
    if !extras.is_empty() {
        let _ = writeln!(out, "  {}", extras.join(" · "));
    }

    let _ = writeln!(out, "  Matched Skills: {}", skill_list(&job.matched_skills));
    let _ = writeln!(out, "  Missing Skills: {}", skill_list(&job.missing_skills));

    for paragraph in job.paragraphs() {
        let _ = writeln!(out, "  {}", paragraph);
    }
    if !job.url.is_empty() {
        let _ = writeln!(out, "  {}", job.url);
    }

    out
}

fn skill_list(skills: &[String]) -> String {
    if skills.is_empty() {
        "-".to_string()
    } else {
        skills.join(", ")
    }
}

pub fn saved_list<'a>(saved: impl Iterator<Item = &'a SavedJob>) -> String {
    let lines: Vec<String> = saved
        .map(|record| {
            format!(
                "★ {} at {} [{}%] saved {}",
                record.job.position_name,
                record.job.company,
                record.job.match_score,
                record.saved_at.format("%Y-%m-%d %H:%M")
            )
        })
        .collect();

    if lines.is_empty() {
        "No saved jobs yet\n".to_string()
    } else {
        lines.join("\n") + "\n"
    }
}

pub fn upload_state(state: &UploadState) -> String {
    match state {
        UploadState::Idle => "Drag & Drop your CV here (Supported format: PDF)".to_string(),
        UploadState::Uploading => "Uploading your CV...".to_string(),
        UploadState::Processing => "Processing your CV to find matching jobs...".to_string(),
        UploadState::Uploaded => {
            "CV Uploaded Successfully! Redirecting to matched jobs...".to_string()
        }
        UploadState::Failed(message) => format!("Upload Failed: {} (try again)", message),
    }
}
