// src/core/service_client.rs
//! HTTP client for the job-matching backend

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use std::time::Duration;

use crate::error::{backend_message, ClientError};
use crate::types::{ApiMessage, CoverLetter};

pub const UPLOAD_CV_ENDPOINT: &str = "/upload-cv/";
pub const UPLOAD_JOBS_ENDPOINT: &str = "/upload-jobs/";
pub const MATCH_JOBS_ENDPOINT: &str = "/match-jobs/";
pub const COVER_LETTER_ENDPOINT: &str = "/generate-cover-letter/";

const UPLOAD_FIELD: &str = "file";
const PDF_MIME: &str = "application/pdf";

/// Calls the front end makes against the backend. Each is a single attempt.
#[async_trait]
pub trait JobsApi: Send + Sync {
    /// POST the CV as multipart field `file`.
    async fn upload_cv(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), ClientError>;

    /// POST with no body; asks the backend to load and match its job set.
    async fn trigger_matching(&self) -> Result<(), ClientError>;

    /// GET the listing and hand back the body untouched.
    async fn fetch_matches(&self) -> Result<String, ClientError>;

    async fn generate_cover_letter(&self, job_id: &str) -> Result<CoverLetter, ClientError>;
}

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    /// `timeout_seconds: None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout_seconds: Option<u64>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Pass 2xx responses through; turn anything else into a transport error
    /// carrying the backend's message, or `fallback` when it sent none.
    async fn check(response: Response, fallback: &str) -> Result<Response, ClientError> {
        let status = response.status();
        app_log!(trace, "Response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        app_log!(error, "Backend error {}: {}", status, error_text);
        Err(ClientError::transport(
            Some(status),
            backend_message(&error_text, fallback),
        ))
    }

    async fn log_ack(response: Response, what: &str) {
        match response.json::<ApiMessage>().await {
            Ok(ack) => {
                if let Some(message) = ack.message {
                    app_log!(info, "{}: {}", what, message);
                }
            }
            Err(e) => app_log!(debug, "{} acknowledged without JSON body: {}", what, e),
        }
    }
}

#[async_trait]
impl JobsApi for ServiceClient {
    async fn upload_cv(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), ClientError> {
        let url = self.url(UPLOAD_CV_ENDPOINT);

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(PDF_MIME)
            .map_err(|e| ClientError::UserInput(format!("Failed to create multipart: {}", e)))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        app_log!(info, "Uploading CV {} to {}", file_name, url);

        let response = self.client.post(&url).multipart(form).send().await?;
        let response = Self::check(response, "Failed to upload CV").await?;
        Self::log_ack(response, "CV upload").await;
        Ok(())
    }

    async fn trigger_matching(&self) -> Result<(), ClientError> {
        let url = self.url(UPLOAD_JOBS_ENDPOINT);
        app_log!(info, "Triggering job matching: {}", url);

        let response = self.client.post(&url).send().await?;
        let response = Self::check(response, "Failed to process jobs").await?;
        Self::log_ack(response, "Job upload").await;
        Ok(())
    }

    async fn fetch_matches(&self) -> Result<String, ClientError> {
        let url = self.url(MATCH_JOBS_ENDPOINT);
        app_log!(info, "Fetching matched jobs: {}", url);

        let response = self.client.get(&url).send().await?;
        let response = Self::check(response, "Failed to fetch matched jobs").await?;
        let body = response.text().await?;
        app_log!(debug, "Matched jobs payload: {} bytes", body.len());
        Ok(body)
    }

    async fn generate_cover_letter(&self, job_id: &str) -> Result<CoverLetter, ClientError> {
        let url = self.url(COVER_LETTER_ENDPOINT);
        app_log!(info, "Requesting cover letter for job {}", job_id);

        let response = self
            .client
            .post(&url)
            .query(&[("job_id", job_id)])
            .send()
            .await?;
        let response = Self::check(response, "Failed to generate cover letter").await?;

        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(CoverLetter { disposition, bytes })
    }
}
