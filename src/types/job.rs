// src/types/job.rs
//! Match listing records as served by `/match-jobs/` and as kept in the local store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One job listing scored against the uploaded CV.
///
/// `matched_skills` and `missing_skills` are disjoint by convention of the
/// matcher; nothing here checks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatch {
    #[serde(default)]
    pub id: String,
    pub position_name: String,
    pub company: String,
    /// Percentage in 0..=100, displayed as received.
    pub match_score: u8,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
}

impl JobMatch {
    /// Description split into its newline-separated paragraphs, blanks dropped.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.description
            .split('\n')
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn save_key(&self, scheme: SaveKey) -> &str {
        match scheme {
            SaveKey::Id => &self.id,
            SaveKey::Title => &self.position_name,
        }
    }
}

/// A job the user flagged, with the moment it was flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJob {
    #[serde(flatten)]
    pub job: JobMatch,
    pub saved_at: DateTime<Utc>,
}

impl SavedJob {
    pub fn new(job: JobMatch) -> Self {
        Self {
            job,
            saved_at: Utc::now(),
        }
    }
}

/// Which field identifies a job in the saved set.
///
/// Titles are not unique: under `Title`, two listings with the same position
/// name share one saved flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveKey {
    #[default]
    Id,
    Title,
}

impl FromStr for SaveKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "title" | "position" | "positionname" => Ok(Self::Title),
            other => anyhow::bail!("Unknown save key scheme: {}. Use id or title", other),
        }
    }
}
