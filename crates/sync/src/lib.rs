//! Working artifact storage and sync orchestration
//!
//! A sync run stages the collection document on disk, reads it back in the
//! envelope shape the Postman API expects, and sends it with the requested
//! operation.
//!
//! # Examples
//!
//! ```no_run
//! use postman_sync_client::PostmanClient;
//! use postman_sync_common::ApiKey;
//! use postman_sync_core::{load_document, CollectionStore, Orchestrator, SyncRequest};
//!
//! # async fn run() -> postman_sync_common::Result<()> {
//! let document = load_document("collection.json").await?;
//! let orchestrator = Orchestrator::new(
//!     CollectionStore::new("./docs"),
//!     PostmanClient::with_default_config()?,
//! );
//! let response = orchestrator
//!     .run(&document, &SyncRequest::import(ApiKey::new("PMAK-...")))
//!     .await?;
//! println!("{}", response);
//! # Ok(())
//! # }
//! ```

mod orchestrator;
mod store;

pub use orchestrator::{Orchestrator, RunState, SyncRequest};
pub use store::{CollectionStore, DEFAULT_WORKING_DIR};

use postman_sync_common::{Result, SyncError};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

/// Read and parse a collection JSON file, such as the converter's output
pub async fn load_document<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => SyncError::NotFound {
                path: path.to_path_buf(),
            },
            _ => SyncError::Io(e),
        })?;
    Ok(serde_json::from_str(&content)?)
}
