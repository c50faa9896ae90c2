//! In-process document store with live change notifications.

use super::{ChangeListener, Collection, Document, DocumentId, Fields, Repository, RepositoryError, Subscription};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

type SharedListener = Arc<dyn Fn(&[Document]) + Send + Sync>;

#[derive(Default)]
struct CollectionState {
    /// Insertion order is kept so listings are stable.
    docs: Vec<Document>,
    listeners: Vec<(u64, SharedListener)>,
}

type Collections = Arc<RwLock<HashMap<String, CollectionState>>>;

/// Store keeping every collection in memory, keyed by its namespaced path.
#[derive(Clone)]
pub struct InMemoryRepository {
    namespace: String,
    collections: Collections,
    next_listener: Arc<AtomicU64>,
}

impl InMemoryRepository {
    /// Empty store whose collection paths live under `namespace` (e.g. `artifacts/my-app`).
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            collections: Arc::new(RwLock::new(HashMap::new())),
            next_listener: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn path(&self, collection: Collection) -> String {
        collection.path(&self.namespace)
    }

    /// Run `f` on the collection under the write lock, then notify listeners outside the lock.
    fn write<T>(
        &self,
        collection: Collection,
        f: impl FnOnce(&mut CollectionState) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let path = self.path(collection);
        let (out, docs, listeners) = {
            let mut g = self
                .collections
                .write()
                .map_err(|_| RepositoryError::Unavailable("lock error".into()))?;
            let state = g.entry(path.clone()).or_default();
            let out = f(state)?;
            let listeners: Vec<SharedListener> = state.listeners.iter().map(|(_, l)| l.clone()).collect();
            (out, state.docs.clone(), listeners)
        };
        log::debug!("{} changed ({} documents, {} listeners)", path, docs.len(), listeners.len());
        for listener in listeners {
            listener(&docs);
        }
        Ok(out)
    }
}

impl Repository for InMemoryRepository {
    fn list(&self, collection: Collection) -> Result<Vec<Document>, RepositoryError> {
        let g = self
            .collections
            .read()
            .map_err(|_| RepositoryError::Unavailable("lock error".into()))?;
        Ok(g.get(&self.path(collection))
            .map(|s| s.docs.clone())
            .unwrap_or_default())
    }

    fn subscribe(
        &self,
        collection: Collection,
        on_change: ChangeListener,
    ) -> Result<Subscription, RepositoryError> {
        let path = self.path(collection);
        let listener: SharedListener = Arc::from(on_change);
        let listener_id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        let docs = {
            let mut g = self
                .collections
                .write()
                .map_err(|_| RepositoryError::Unavailable("lock error".into()))?;
            let state = g.entry(path.clone()).or_default();
            state.listeners.push((listener_id, listener.clone()));
            state.docs.clone()
        };
        listener(&docs);

        let collections = self.collections.clone();
        Ok(Subscription::new(move || {
            if let Ok(mut g) = collections.write() {
                if let Some(state) = g.get_mut(&path) {
                    state.listeners.retain(|(id, _)| *id != listener_id);
                }
            }
        }))
    }

    fn insert(&self, collection: Collection, fields: Fields) -> Result<DocumentId, RepositoryError> {
        self.write(collection, |state| {
            let id = Uuid::new_v4().to_string();
            state.docs.push(Document {
                id: id.clone(),
                created_at: Utc::now(),
                fields,
            });
            Ok(id)
        })
    }

    fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), RepositoryError> {
        self.write(collection, |state| {
            let doc = state
                .docs
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| RepositoryError::DocumentNotFound {
                    collection,
                    id: id.to_string(),
                })?;
            doc.fields.extend(fields);
            Ok(())
        })
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<(), RepositoryError> {
        self.write(collection, |state| {
            let idx = state
                .docs
                .iter()
                .position(|d| d.id == id)
                .ok_or_else(|| RepositoryError::DocumentNotFound {
                    collection,
                    id: id.to_string(),
                })?;
            state.docs.remove(idx);
            Ok(())
        })
    }
}
