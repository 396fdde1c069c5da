// src/upload.rs
//! Two-step CV submission: upload the file, then ask the backend to match jobs

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::{FsOps, JobsApi};
use crate::error::ClientError;
use crate::ui::{Navigator, Notification, Notifier, Route};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    /// Step 1 in flight.
    Uploading,
    /// CV accepted, step 2 in flight.
    Processing,
    /// Both steps done; navigation to the matches view has been issued.
    Uploaded,
    /// Either step failed. The user may try again.
    Failed(String),
}

impl UploadState {
    pub fn is_busy(&self) -> bool {
        matches!(self, UploadState::Uploading | UploadState::Processing)
    }
}

/// Resets the busy flag however the upload ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct UploadCoordinator {
    api: Arc<dyn JobsApi>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    busy: AtomicBool,
    state: Mutex<UploadState>,
}

impl UploadCoordinator {
    pub fn new(
        api: Arc<dyn JobsApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            notifier,
            navigator,
            busy: AtomicBool::new(false),
            state: Mutex::new(UploadState::Idle),
        }
    }

    pub fn state(&self) -> UploadState {
        self.lock_state().clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, UploadState> {
        // A poisoned lock still holds a valid state value.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, state: UploadState) {
        app_log!(debug, "Upload state -> {:?}", state);
        *self.lock_state() = state;
    }

    /// Pick a file from disk and submit it.
    ///
    /// `Err` means the file was never accepted: another upload is running
    /// (`Busy`) or the file is not a readable PDF (`UserInput`). Once
    /// accepted, the outcome is reported through the returned state.
    pub async fn submit_file(&self, path: &Path) -> Result<UploadState, ClientError> {
        if self.busy.load(Ordering::Acquire) {
            return Err(ClientError::Busy);
        }
        let (file_name, bytes) = FsOps::read_pdf(path).await?;
        self.upload(&file_name, bytes).await
    }

    /// Run both steps for an already-read PDF.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadState, ClientError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            app_log!(warn, "Ignoring {}: an upload is already in progress", file_name);
            return Err(ClientError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        self.set_state(UploadState::Uploading);

        match self.run_steps(file_name, bytes).await {
            Ok(()) => {
                self.set_state(UploadState::Uploaded);
                self.navigator.navigate(Route::MatchedJobs);
            }
            Err(err) => {
                let message = err.to_string();
                app_log!(error, "Upload of {} failed: {}", file_name, message);
                self.set_state(UploadState::Failed(message.clone()));
                self.notifier
                    .notify(Notification::destructive("Upload failed", message));
            }
        }

        Ok(self.state())
    }

    /// Step 2 is only issued after step 1 returned 2xx. A step 2 failure
    /// leaves the CV on the server; a retry uploads it again.
    async fn run_steps(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), ClientError> {
        self.api.upload_cv(file_name, bytes).await.map_err(|err| match err {
            ClientError::Transport { message, .. } => ClientError::Upload(message),
            other => other,
        })?;

        self.set_state(UploadState::Processing);
        self.notifier.notify(Notification::success(
            "CV uploaded successfully!",
            "Processing your CV to find matching jobs...",
        ));

        self.api.trigger_matching().await.map_err(|err| {
            app_log!(warn, "Job matching trigger failed: {}", err);
            ClientError::MatchTrigger("Failed to process jobs".to_string())
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, FakeApi, RecordingShell};
    use crate::ui::NoticeKind;
    use reqwest::StatusCode;

    fn coordinator(api: Arc<FakeApi>, shell: Arc<RecordingShell>) -> UploadCoordinator {
        UploadCoordinator::new(api, shell.clone(), shell)
    }

    const PDF: &[u8] = b"%PDF-1.4\n%fake";

    #[tokio::test]
    async fn test_successful_upload_navigates_once() {
        let api = Arc::new(FakeApi::default());
        let shell = Arc::new(RecordingShell::default());
        let coordinator = coordinator(api.clone(), shell.clone());

        let state = coordinator.upload("cv.pdf", PDF.to_vec()).await.unwrap();

        assert_eq!(state, UploadState::Uploaded);
        assert_eq!(shell.routes(), vec![Route::MatchedJobs]);
        assert!(shell
            .notices()
            .iter()
            .all(|n| n.kind != NoticeKind::Destructive));
        assert_eq!(
            api.calls(),
            vec![Call::UploadCv("cv.pdf".into(), PDF.len()), Call::TriggerMatching]
        );
    }

    #[tokio::test]
    async fn test_upload_failure_skips_matching_trigger() {
        let api = Arc::new(FakeApi::default());
        api.fail_upload(StatusCode::INTERNAL_SERVER_ERROR, "corrupt file");
        let shell = Arc::new(RecordingShell::default());
        let coordinator = coordinator(api.clone(), shell.clone());

        let state = coordinator.upload("cv.pdf", PDF.to_vec()).await.unwrap();

        assert_eq!(state, UploadState::Failed("corrupt file".into()));
        assert_eq!(api.calls(), vec![Call::UploadCv("cv.pdf".into(), PDF.len())]);
        assert!(shell.routes().is_empty());

        let notices = shell.notices();
        let last = notices.last().unwrap();
        assert_eq!(last.kind, NoticeKind::Destructive);
        assert_eq!(last.description, "corrupt file");
    }

    #[tokio::test]
    async fn test_upload_failure_with_empty_body_uses_default_message() {
        let api = Arc::new(FakeApi::default());
        api.fail_upload(StatusCode::BAD_REQUEST, "");
        let shell = Arc::new(RecordingShell::default());
        let coordinator = coordinator(api, shell);

        let state = coordinator.upload("cv.pdf", PDF.to_vec()).await.unwrap();
        assert_eq!(state, UploadState::Failed("Failed to upload CV".into()));
    }

    #[tokio::test]
    async fn test_trigger_failure_keeps_cv_and_allows_retry() {
        let api = Arc::new(FakeApi::default());
        api.fail_trigger(StatusCode::SERVICE_UNAVAILABLE);
        let shell = Arc::new(RecordingShell::default());
        let coordinator = coordinator(api.clone(), shell.clone());

        let state = coordinator.upload("cv.pdf", PDF.to_vec()).await.unwrap();
        assert_eq!(state, UploadState::Failed("Failed to process jobs".into()));
        assert!(shell.routes().is_empty());
        assert!(!coordinator.busy.load(Ordering::Acquire));

        // Retrying re-uploads the CV; nothing was rolled back.
        api.clear_failures();
        let state = coordinator.upload("cv.pdf", PDF.to_vec()).await.unwrap();
        assert_eq!(state, UploadState::Uploaded);
        assert_eq!(
            api.calls(),
            vec![
                Call::UploadCv("cv.pdf".into(), PDF.len()),
                Call::TriggerMatching,
                Call::UploadCv("cv.pdf".into(), PDF.len()),
                Call::TriggerMatching,
            ]
        );
        assert_eq!(shell.routes(), vec![Route::MatchedJobs]);
    }

    #[tokio::test]
    async fn test_concurrent_upload_is_refused() {
        let api = Arc::new(FakeApi::default());
        let gate = api.hold_upload();
        let shell = Arc::new(RecordingShell::default());
        let coordinator = Arc::new(coordinator(api.clone(), shell));

        let first = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.upload("a.pdf", PDF.to_vec()).await })
        };
        api.wait_for_calls(1).await;
        assert_eq!(coordinator.state(), UploadState::Uploading);

        let second = coordinator.upload("b.pdf", PDF.to_vec()).await;
        assert_eq!(second, Err(ClientError::Busy));

        gate.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), UploadState::Uploaded);
        assert_eq!(
            api.calls(),
            vec![Call::UploadCv("a.pdf".into(), PDF.len()), Call::TriggerMatching]
        );
    }

    #[tokio::test]
    async fn test_submit_file_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.txt");
        tokio::fs::write(&path, "plain text").await.unwrap();

        let api = Arc::new(FakeApi::default());
        let shell = Arc::new(RecordingShell::default());
        let coordinator = coordinator(api.clone(), shell.clone());

        let err = coordinator.submit_file(&path).await.unwrap_err();
        assert!(matches!(err, ClientError::UserInput(_)));
        assert_eq!(coordinator.state(), UploadState::Idle);
        assert!(api.calls().is_empty());
        assert!(shell.notices().is_empty());
    }

    #[tokio::test]
    async fn test_submit_file_uploads_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        tokio::fs::write(&path, PDF).await.unwrap();

        let api = Arc::new(FakeApi::default());
        let shell = Arc::new(RecordingShell::default());
        let coordinator = coordinator(api.clone(), shell.clone());

        let state = coordinator.submit_file(&path).await.unwrap();
        assert_eq!(state, UploadState::Uploaded);
        assert_eq!(api.calls()[0], Call::UploadCv("resume.pdf".into(), PDF.len()));
    }
}
