//! Workspace key orchestration for InitFlow.
//!
//! Provides:
//! - The workspace key initialization flow (generate, seal, upload, store)
//! - Fetch-and-open recovery of a key this device already owns on the backend
//! - An API client for the InitFlow backend (password login, bearer-token calls)
//! - Seams for the backend and the local key store, with an in-memory store
//!
//! All cryptography lives in `initflow-crypto`; key material is always passed
//! in explicitly.

pub mod api_client;
pub mod backend;
pub mod config;
pub mod error;
pub mod key_store;
pub mod types;
pub mod workspace_keys;

pub use api_client::ApiClient;
pub use backend::WorkspaceBackend;
pub use config::CloudConfig;
pub use error::{CloudError, CloudResult};
pub use key_store::{LocalKeyStore, MemoryKeyStore};
pub use types::*;
pub use workspace_keys::{InitOutcome, InitStage, WorkspaceKeyService};
