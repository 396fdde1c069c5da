//! Job matching client: CV upload, cached match listing, local save-state and
//! cover-letter downloads over the job-matching backend's REST API.

#[macro_use]
pub mod logging;

pub mod cli;
pub mod core;
pub mod error;
pub mod matches;
pub mod render;
pub mod types;
pub mod ui;
pub mod upload;

pub use error::ClientError;
pub use matches::MatchBoard;
pub use upload::{UploadCoordinator, UploadState};

#[cfg(test)]
pub(crate) mod test_support;
