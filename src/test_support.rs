// src/test_support.rs
//! In-process stand-ins for the backend and the presentation layer

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::core::JobsApi;
use crate::error::{backend_message, ClientError};
use crate::types::CoverLetter;
use crate::ui::{Navigator, Notification, Notifier, Route};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// File name and byte length.
    UploadCv(String, usize),
    TriggerMatching,
    FetchMatches,
    CoverLetter(String),
}

#[derive(Default)]
struct Script {
    upload_failure: Option<(StatusCode, String)>,
    trigger_failure: Option<StatusCode>,
    matches: Option<Result<String, ClientError>>,
    cover_letter: Option<Result<CoverLetter, ClientError>>,
}

#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    script: Mutex<Script>,
    upload_gate: Mutex<Option<Arc<Notify>>>,
    called: Notify,
}

impl FakeApi {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn fail_upload(&self, status: StatusCode, body: &str) {
        self.script.lock().unwrap().upload_failure = Some((status, body.to_string()));
    }

    pub fn fail_trigger(&self, status: StatusCode) {
        self.script.lock().unwrap().trigger_failure = Some(status);
    }

    pub fn clear_failures(&self) {
        let mut script = self.script.lock().unwrap();
        script.upload_failure = None;
        script.trigger_failure = None;
    }

    pub fn serve_matches(&self, body: &str) {
        self.script.lock().unwrap().matches = Some(Ok(body.to_string()));
    }

    pub fn fail_matches(&self, err: ClientError) {
        self.script.lock().unwrap().matches = Some(Err(err));
    }

    pub fn serve_cover_letter(&self, disposition: Option<&str>, bytes: &[u8]) {
        self.script.lock().unwrap().cover_letter = Some(Ok(CoverLetter {
            disposition: disposition.map(str::to_string),
            bytes: bytes.to_vec(),
        }));
    }

    pub fn fail_cover_letter(&self, err: ClientError) {
        self.script.lock().unwrap().cover_letter = Some(Err(err));
    }

    /// Make the next `upload_cv` wait until the returned handle is notified.
    pub fn hold_upload(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.upload_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.called.notified();
            if self.calls.lock().unwrap().len() >= n {
                return;
            }
            notified.await;
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        self.called.notify_waiters();
    }
}

#[async_trait]
impl JobsApi for FakeApi {
    async fn upload_cv(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), ClientError> {
        self.record(Call::UploadCv(file_name.to_string(), bytes.len()));

        let gate = self.upload_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let failure = self.script.lock().unwrap().upload_failure.clone();
        match failure {
            Some((status, body)) => Err(ClientError::transport(
                Some(status),
                backend_message(&body, "Failed to upload CV"),
            )),
            None => Ok(()),
        }
    }

    async fn trigger_matching(&self) -> Result<(), ClientError> {
        self.record(Call::TriggerMatching);
        let failure = self.script.lock().unwrap().trigger_failure;
        match failure {
            Some(status) => Err(ClientError::transport(Some(status), "Failed to process jobs")),
            None => Ok(()),
        }
    }

    async fn fetch_matches(&self) -> Result<String, ClientError> {
        self.record(Call::FetchMatches);
        self.script
            .lock()
            .unwrap()
            .matches
            .clone()
            .unwrap_or_else(|| Ok("[]".to_string()))
    }

    async fn generate_cover_letter(&self, job_id: &str) -> Result<CoverLetter, ClientError> {
        self.record(Call::CoverLetter(job_id.to_string()));
        self.script
            .lock()
            .unwrap()
            .cover_letter
            .clone()
            .unwrap_or_else(|| {
                Err(ClientError::transport(
                    Some(StatusCode::NOT_FOUND),
                    "Failed to generate cover letter",
                ))
            })
    }
}

/// Collects notices and navigation requests.
#[derive(Default)]
pub struct RecordingShell {
    notices: Mutex<Vec<Notification>>,
    routes: Mutex<Vec<Route>>,
}

impl RecordingShell {
    pub fn notices(&self) -> Vec<Notification> {
        self.notices.lock().unwrap().clone()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Notifier for RecordingShell {
    fn notify(&self, notification: Notification) {
        self.notices.lock().unwrap().push(notification);
    }
}

impl Navigator for RecordingShell {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}
