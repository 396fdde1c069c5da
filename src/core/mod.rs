// src/core/mod.rs
//! Shared services: backend client, durable store, configuration, file helpers

pub mod config_manager;
pub mod fs_ops;
pub mod service_client;
pub mod store;

pub use config_manager::ConfigManager;
pub use fs_ops::FsOps;
pub use service_client::{JobsApi, ServiceClient};
pub use store::{KeyValueStore, SqliteStore};
