//! Reset, write, verify, dispatch and call for a single sync run

use crate::CollectionStore;
use postman_sync_client::{dispatch, CollectionApi, CollectionRequest};
use postman_sync_common::{normalize, ApiKey, Operation, Result, SyncError};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Stages of a sync run, in order
///
/// The run is linear: each stage either hands over to the next one or ends
/// the run in [`RunState::Failed`]. Nothing is retried or rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Resetting,
    Writing,
    Verifying,
    Dispatching,
    Calling,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Resetting => "resetting",
            RunState::Writing => "writing",
            RunState::Verifying => "verifying",
            RunState::Dispatching => "dispatching",
            RunState::Calling => "calling",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What to do with the staged document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub operation: Operation,
    pub api_key: ApiKey,
    /// Required for [`Operation::Update`]
    pub collection_id: Option<String>,
}

impl SyncRequest {
    pub fn import(api_key: ApiKey) -> Self {
        Self {
            operation: Operation::Import,
            api_key,
            collection_id: None,
        }
    }

    pub fn update(api_key: ApiKey, collection_id: impl Into<String>) -> Self {
        Self {
            operation: Operation::Update,
            api_key,
            collection_id: Some(collection_id.into()),
        }
    }
}

/// Drives one sync run against a [`CollectionApi`]
///
/// The orchestrator owns the working artifact for the duration of a run.
/// Runs sharing a working directory must not overlap.
pub struct Orchestrator<A> {
    store: CollectionStore,
    api: A,
}

impl<A: CollectionApi> Orchestrator<A> {
    pub fn new(store: CollectionStore, api: A) -> Self {
        Self { store, api }
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Stage `document` and send it with the requested operation
    ///
    /// Returns the remote response unchanged. Only import and update can be
    /// run from a document; other operations fail with
    /// [`SyncError::UnknownOperation`].
    pub async fn run<T>(&self, document: &T, request: &SyncRequest) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        let result = self.execute(document, request).await;
        match &result {
            Ok(_) => enter(RunState::Done),
            Err(e) => warn!(
                state = %RunState::Failed,
                operation = %request.operation,
                error = %e,
                "sync run failed"
            ),
        }
        result
    }

    async fn execute<T>(&self, document: &T, request: &SyncRequest) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        enter(RunState::Resetting);
        self.store.reset().await?;

        enter(RunState::Writing);
        self.store.write(document).await?;

        enter(RunState::Verifying);
        let document = self.verify().await?;

        enter(RunState::Dispatching);
        let call = plan(request, &document)?;

        enter(RunState::Calling);
        dispatch(&self.api, &request.api_key, call).await
    }

    /// Read the staged artifact back and put it in envelope shape
    ///
    /// The normalized document is written back, so after a successful run the
    /// artifact holds exactly what was sent.
    pub async fn verify(&self) -> Result<Value> {
        if !self.store.exists().await? {
            return Err(SyncError::NotFound {
                path: self.store.artifact_path().to_path_buf(),
            });
        }

        let content = self.store.read().await?;
        let parsed: Value = serde_json::from_str(&content)
            .map_err(|e| SyncError::write("Collection artifact is not valid JSON", e))?;

        let document = normalize(parsed);
        self.store.write(&document).await?;
        Ok(document)
    }
}

/// Pick the remote call for `request`
fn plan<'a>(request: &'a SyncRequest, document: &'a Value) -> Result<CollectionRequest<'a>> {
    match request.operation {
        Operation::Import => Ok(CollectionRequest::Import { document }),
        Operation::Update => {
            let id = request
                .collection_id
                .as_deref()
                .filter(|id| !id.trim().is_empty())
                .ok_or(SyncError::MissingIdentifier {
                    operation: Operation::Update,
                })?;
            Ok(CollectionRequest::Update {
                id: Some(id),
                document,
            })
        }
        other => Err(SyncError::UnknownOperation {
            operation: other.to_string(),
        }),
    }
}

fn enter(state: RunState) {
    debug!(state = %state, "sync run state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_import() {
        let request = SyncRequest::import(ApiKey::new("key"));
        let document = json!({"collection": {}});
        assert_eq!(
            plan(&request, &document).unwrap(),
            CollectionRequest::Import {
                document: &document
            }
        );
    }

    #[test]
    fn test_plan_update_requires_id() {
        let mut request = SyncRequest::update(ApiKey::new("key"), "");
        let document = json!({"collection": {}});
        assert!(matches!(
            plan(&request, &document),
            Err(SyncError::MissingIdentifier { .. })
        ));

        request.collection_id = Some("abc".to_string());
        assert_eq!(plan(&request, &document).unwrap().id(), Some("abc"));
    }

    #[test]
    fn test_plan_rejects_documentless_operations() {
        let document = json!({"collection": {}});
        for operation in [Operation::Fetch, Operation::Delete] {
            let request = SyncRequest {
                operation,
                api_key: ApiKey::new("key"),
                collection_id: Some("abc".to_string()),
            };
            assert!(matches!(
                plan(&request, &document),
                Err(SyncError::UnknownOperation { .. })
            ));
        }
    }

    #[test]
    fn test_run_state_display() {
        assert_eq!(RunState::Verifying.to_string(), "verifying");
    }
}
