//! Single dispatch path for the four collection operations

use crate::CollectionApi;
use postman_sync_common::{ApiKey, Operation, Result, SyncError};
use serde_json::Value;
use tracing::debug;

/// A remote call with the parameters its operation needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollectionRequest<'a> {
    Import {
        document: &'a Value,
    },
    Update {
        id: Option<&'a str>,
        document: &'a Value,
    },
    Fetch {
        id: Option<&'a str>,
    },
    Delete {
        id: Option<&'a str>,
    },
}

impl<'a> CollectionRequest<'a> {
    pub fn operation(&self) -> Operation {
        match self {
            CollectionRequest::Import { .. } => Operation::Import,
            CollectionRequest::Update { .. } => Operation::Update,
            CollectionRequest::Fetch { .. } => Operation::Fetch,
            CollectionRequest::Delete { .. } => Operation::Delete,
        }
    }

    pub fn id(&self) -> Option<&'a str> {
        match self {
            CollectionRequest::Import { .. } => None,
            CollectionRequest::Update { id, .. }
            | CollectionRequest::Fetch { id }
            | CollectionRequest::Delete { id } => *id,
        }
    }
}

/// Return the identifier, or fail if it is absent or blank
pub(crate) fn require_identifier(operation: Operation, id: Option<&str>) -> Result<&str> {
    id.map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(SyncError::MissingIdentifier { operation })
}

/// Route `request` to the matching [`CollectionApi`] call
///
/// Identifier checks happen here, before anything reaches the network.
pub async fn dispatch<A>(api: &A, api_key: &ApiKey, request: CollectionRequest<'_>) -> Result<Value>
where
    A: CollectionApi + ?Sized,
{
    let operation = request.operation();
    debug!(%operation, "dispatching collection request");

    match request {
        CollectionRequest::Import { document } => api.import_collection(api_key, document).await,
        CollectionRequest::Update { id, document } => {
            let id = require_identifier(operation, id)?;
            api.update_collection(api_key, id, document).await
        }
        CollectionRequest::Fetch { id } => {
            let id = require_identifier(operation, id)?;
            api.fetch_collection(api_key, id).await
        }
        CollectionRequest::Delete { id } => {
            let id = require_identifier(operation, id)?;
            api.delete_collection(api_key, id).await
        }
    }
}
