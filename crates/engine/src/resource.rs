use std::sync::Arc;

use pantry_core::document::Persisted;
use pantry_storage::DocumentStore;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::context::StoreHandle;
use crate::error::EngineError;

#[derive(Debug, Clone)]
pub enum ResourceState<T> {
    Pending,
    Ready(T),
    Failed(Arc<EngineError>),
}

impl<T> ResourceState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, ResourceState::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ResourceState::Ready(_))
    }

    /// `None` while pending.
    pub fn into_result(self) -> Option<Result<T, Arc<EngineError>>> {
        match self {
            ResourceState::Pending => None,
            ResourceState::Ready(value) => Some(Ok(value)),
            ResourceState::Failed(err) => Some(Err(err)),
        }
    }
}

/// A value that is being loaded in the background.
///
/// `read` never blocks: it reports `Pending` until the load finishes and
/// the terminal `Ready`/`Failed` state from then on.
#[derive(Debug, Clone)]
pub struct Resource<T> {
    rx: watch::Receiver<ResourceState<T>>,
}

impl<T: Clone> Resource<T> {
    pub fn ready(value: T) -> Self {
        let (_tx, rx) = watch::channel(ResourceState::Ready(value));
        Self { rx }
    }

    pub fn read(&self) -> ResourceState<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the terminal state.
    pub async fn settled(&self) -> ResourceState<T> {
        let mut rx = self.rx.clone();
        match rx.wait_for(|state| !state.is_pending()).await {
            Ok(state) => state.clone(),
            Err(_) => ResourceState::Failed(Arc::new(EngineError::TaskFailed(
                "resource loader exited without resolving".to_string(),
            ))),
        }
    }
}

/// Load `doc_id` from `store`, writing `default` as a new document when the
/// store has none.
///
/// A missing document causes exactly one write; whatever that write returns
/// is the terminal state. Any other failure is terminal. Must be called from
/// within a tokio runtime.
pub fn load_or_seed<D: Persisted>(store: &StoreHandle, doc_id: &str, default: D) -> Resource<D> {
    let (tx, rx) = watch::channel(ResourceState::Pending);
    let store = store.clone();
    let doc_id = doc_id.to_string();

    tokio::spawn(async move {
        let store_name = store.name().to_string();
        let outcome = store
            .run(move |s| fetch_or_seed(s, &store_name, &doc_id, default))
            .await;
        let state = match outcome {
            Ok(doc) => ResourceState::Ready(doc),
            Err(err) => ResourceState::Failed(Arc::new(err)),
        };
        tx.send_replace(state);
    });

    Resource { rx }
}

fn fetch_or_seed<D: Persisted>(
    store: &mut dyn DocumentStore,
    store_name: &str,
    doc_id: &str,
    default: D,
) -> Result<D, EngineError> {
    match store.get(doc_id) {
        Ok(stored) => {
            info!(store = store_name, doc_id, revision = %stored.revision, "loaded document");
            Ok(D::decode(&stored.body, stored.revision)?)
        }
        Err(err) if err.is_not_found() => {
            warn!(store = store_name, doc_id, "document missing, seeding default");
            let body = default.encode()?;
            match store.put(doc_id, None, &body) {
                Ok(revision) => {
                    info!(store = store_name, doc_id, %revision, "seeded document");
                    Ok(default.with_revision(revision))
                }
                Err(err) => {
                    error!(store = store_name, doc_id, error = %err, "failed to seed document");
                    Err(err.into())
                }
            }
        }
        Err(err) => {
            error!(store = store_name, doc_id, error = %err, "failed to load document");
            Err(err.into())
        }
    }
}
