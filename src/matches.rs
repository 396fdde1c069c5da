// src/matches.rs
//! Matched-jobs board: cached listing, local saved set, cover-letter downloads

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::store::{MATCHED_JOBS_KEY, SAVED_JOBS_KEY};
use crate::core::{FsOps, JobsApi, KeyValueStore};
use crate::error::ClientError;
use crate::types::{JobMatch, SaveKey, SavedJob};
use crate::ui::{Notification, Notifier};

/// What the board should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardView<'a> {
    Loading,
    Error(&'a str),
    Empty,
    Jobs(&'a [JobMatch]),
}

pub struct MatchBoard {
    api: Arc<dyn JobsApi>,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    save_key: SaveKey,
    download_dir: PathBuf,
    loading: bool,
    error: Option<String>,
    jobs: Vec<JobMatch>,
    /// Mirror of the persisted saved records, in stored order.
    saved: Vec<SavedJob>,
}

impl MatchBoard {
    /// Build the board and read the saved set from the store.
    pub async fn open(
        api: Arc<dyn JobsApi>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        save_key: SaveKey,
        download_dir: PathBuf,
    ) -> Self {
        let saved = Self::read_saved(store.as_ref()).await;
        app_log!(debug, "Loaded {} saved jobs", saved.len());

        Self {
            api,
            store,
            notifier,
            save_key,
            download_dir,
            loading: true,
            error: None,
            jobs: Vec::new(),
            saved,
        }
    }

    /// Records are kept as stored, whatever the key scheme. Two records
    /// sharing a key under the current scheme both stay.
    async fn read_saved(store: &dyn KeyValueStore) -> Vec<SavedJob> {
        let raw = match store.get(SAVED_JOBS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                app_log!(warn, "Failed to read saved jobs: {:#}", e);
                return Vec::new();
            }
        };

        serde_json::from_str::<Vec<SavedJob>>(&raw).unwrap_or_else(|e| {
            app_log!(warn, "Ignoring unreadable saved jobs: {}", e);
            Vec::new()
        })
    }

    /// Return the match list, from the local snapshot when one exists,
    /// otherwise from a single GET whose body is then stored verbatim.
    ///
    /// A failed fetch yields an empty list and leaves the message in
    /// [`error`](Self::error) for the rest of this board's life.
    pub async fn load(&mut self) -> &[JobMatch] {
        if !self.loading {
            return &self.jobs;
        }

        match self.resolve().await {
            Ok(jobs) => self.jobs = jobs,
            Err(err) => {
                app_log!(error, "Failed to load matched jobs: {}", err);
                self.error = Some(err.to_string());
                self.jobs.clear();
            }
        }
        self.loading = false;

        &self.jobs
    }

    async fn resolve(&self) -> Result<Vec<JobMatch>, ClientError> {
        match self.store.get(MATCHED_JOBS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<JobMatch>>(&raw) {
                Ok(jobs) => {
                    app_log!(info, "Using {} cached matched jobs", jobs.len());
                    return Ok(jobs);
                }
                Err(e) => app_log!(warn, "Cached matched jobs unreadable, refetching: {}", e),
            },
            Ok(None) => {}
            Err(e) => app_log!(warn, "Failed to read matched jobs cache: {:#}", e),
        }

        let raw = self.api.fetch_matches().await?;
        let jobs: Vec<JobMatch> = serde_json::from_str(&raw)
            .map_err(|e| ClientError::Parse(format!("Failed to read matched jobs: {}", e)))?;

        if let Err(e) = self.store.set(MATCHED_JOBS_KEY, &raw).await {
            app_log!(warn, "Failed to cache matched jobs: {:#}", e);
        }

        app_log!(info, "Fetched {} matched jobs", jobs.len());
        Ok(jobs)
    }

    pub fn view(&self) -> BoardView<'_> {
        if self.loading {
            BoardView::Loading
        } else if let Some(error) = &self.error {
            BoardView::Error(error)
        } else if self.jobs.is_empty() {
            BoardView::Empty
        } else {
            BoardView::Jobs(&self.jobs)
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn jobs(&self) -> &[JobMatch] {
        &self.jobs
    }

    pub fn save_key(&self) -> SaveKey {
        self.save_key
    }

    pub fn is_saved(&self, identifier: &str) -> bool {
        self.saved
            .iter()
            .any(|record| record.job.save_key(self.save_key) == identifier)
    }

    /// Saved jobs in the order they were saved.
    pub fn saved_jobs(&self) -> impl Iterator<Item = &SavedJob> {
        self.saved.iter()
    }

    /// Flip `identifier` in the saved set and write the whole set back.
    /// Records under other keys are left exactly as they were. Returns
    /// whether `identifier` is saved afterwards. Nothing is sent to the backend.
    pub async fn toggle_save(&mut self, identifier: &str) -> Result<bool, ClientError> {
        if identifier.is_empty() {
            return Err(ClientError::UserInput("Job has no identifier".to_string()));
        }

        let previous = self.saved.clone();
        let now_saved = if self.is_saved(identifier) {
            let save_key = self.save_key;
            self.saved
                .retain(|record| record.job.save_key(save_key) != identifier);
            false
        } else {
            let job = self
                .jobs
                .iter()
                .find(|job| job.save_key(self.save_key) == identifier)
                .cloned()
                .ok_or_else(|| ClientError::UserInput(format!("No matched job {}", identifier)))?;
            self.saved.push(SavedJob::new(job));
            true
        };

        if let Err(err) = self.persist_saved().await {
            // Keep the mirror equal to what is on disk.
            self.saved = previous;
            return Err(err);
        }

        app_log!(
            info,
            "{} {}",
            if now_saved { "Saved" } else { "Unsaved" },
            identifier
        );
        Ok(now_saved)
    }

    /// An empty set removes the key, so the store reads as if nothing was
    /// ever saved.
    async fn persist_saved(&self) -> Result<(), ClientError> {
        if self.saved.is_empty() {
            self.store.remove(SAVED_JOBS_KEY).await?;
            return Ok(());
        }

        let json = serde_json::to_string(&self.saved)?;
        self.store.set(SAVED_JOBS_KEY, &json).await?;
        Ok(())
    }

    /// Ask the backend for a cover letter and write it to the download
    /// directory. Failures become a notice and `None`.
    pub async fn request_cover_letter(&self, job_id: &str) -> Option<PathBuf> {
        match self.download_cover_letter(job_id).await {
            Ok(path) => {
                self.notifier.notify(Notification::success(
                    "Cover letter ready",
                    format!("Saved to {}", path.display()),
                ));
                Some(path)
            }
            Err(err) => {
                app_log!(error, "Cover letter for {} failed: {}", job_id, err);
                self.notifier.notify(Notification::destructive(
                    "Failed to generate cover letter",
                    err.to_string(),
                ));
                None
            }
        }
    }

    async fn download_cover_letter(&self, job_id: &str) -> Result<PathBuf, ClientError> {
        if job_id.is_empty() {
            return Err(ClientError::UserInput("Job has no identifier".to_string()));
        }

        let letter = self.api.generate_cover_letter(job_id).await?;
        let file_name = letter.file_name();
        let path = FsOps::write_download(&self.download_dir, &file_name, &letter.bytes).await?;
        Ok(path)
    }
}
