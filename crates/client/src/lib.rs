//! Postman collections API client
//!
//! Four operations against `https://api.getpostman.com/collections`:
//! import (create), update, fetch and delete. The API key is sent both as the
//! `apikey` query parameter and as an `apikey` header.
//!
//! ```rust,ignore
//! use postman_sync_client::{CollectionApi, PostmanClient};
//! use postman_sync_common::ApiKey;
//!
//! let client = PostmanClient::with_default_config()?;
//! let response = client
//!     .fetch_collection(&ApiKey::new("PMAK-..."), "1234-abcd")
//!     .await?;
//! ```

mod api;
mod client;
mod request;

pub use client::{ClientConfig, PostmanClient, DEFAULT_BASE_URL};
pub use request::{dispatch, CollectionRequest};

#[cfg(any(test, feature = "mock"))]
pub use api::MockCollectionApi;
pub use api::CollectionApi;
