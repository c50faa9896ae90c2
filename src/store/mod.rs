//! Repository contract over the document store, plus the typed decode/encode boundary.
//!
//! Documents are schemaless field maps; entities cross into engine code only through
//! [`decode`], which rejects malformed documents instead of passing half-filled values on.

mod memory;

pub use memory::InMemoryRepository;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Store-assigned document identifier.
pub type DocumentId = String;

/// Field map of one document (without its id).
pub type Fields = Map<String, Value>;

/// The four collections a tournament keeps.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Collection {
    Players,
    SubstitutePlayers,
    Teams,
    Matches,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Players,
        Collection::SubstitutePlayers,
        Collection::Teams,
        Collection::Matches,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Players => "players",
            Collection::SubstitutePlayers => "substitutePlayers",
            Collection::Teams => "teams",
            Collection::Matches => "matches",
        }
    }

    /// Full collection path under a tenant namespace, e.g. `artifacts/app/public/data/teams`.
    pub fn path(self, namespace: &str) -> String {
        let namespace = namespace.trim_end_matches('/');
        if namespace.is_empty() {
            format!("public/data/{}", self.name())
        } else {
            format!("{}/public/data/{}", namespace, self.name())
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored document with its server-assigned creation timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub created_at: DateTime<Utc>,
    pub fields: Fields,
}

/// Failures from the backing store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RepositoryError {
    /// Store could not be reached or is in a broken state.
    Unavailable(String),
    /// No document with this id in the collection.
    DocumentNotFound { collection: Collection, id: DocumentId },
    /// Document exists but does not have the shape of the collection's entity.
    Malformed {
        collection: Collection,
        id: DocumentId,
        reason: String,
    },
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::Unavailable(reason) => write!(f, "store unavailable: {}", reason),
            RepositoryError::DocumentNotFound { collection, id } => {
                write!(f, "no document {} in {}", id, collection)
            }
            RepositoryError::Malformed {
                collection,
                id,
                reason,
            } => write!(f, "malformed document {} in {}: {}", id, collection, reason),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Callback invoked with the full collection contents after every change.
pub type ChangeListener = Box<dyn Fn(&[Document]) + Send + Sync>;

/// Handle returned by [`Repository::subscribe`]. Notifications stop when it is dropped
/// or [`Subscription::unsubscribe`] is called.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Narrow CRUD + live-subscription contract the orchestrator needs.
///
/// Writes are last-write-wins and not transactional; a listener may observe the same
/// state more than once.
pub trait Repository: Send + Sync {
    fn list(&self, collection: Collection) -> Result<Vec<Document>, RepositoryError>;

    /// Register `on_change`; it is called once with the current contents and after every write.
    fn subscribe(
        &self,
        collection: Collection,
        on_change: ChangeListener,
    ) -> Result<Subscription, RepositoryError>;

    fn insert(&self, collection: Collection, fields: Fields) -> Result<DocumentId, RepositoryError>;

    /// Merge `fields` into an existing document.
    fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), RepositoryError>;

    fn delete(&self, collection: Collection, id: &str) -> Result<(), RepositoryError>;
}

/// Deserialize a document into an entity, injecting the document id as `id`.
pub fn decode<T: DeserializeOwned>(collection: Collection, doc: &Document) -> Result<T, RepositoryError> {
    let mut fields = doc.fields.clone();
    fields.insert("id".to_string(), Value::String(doc.id.clone()));
    serde_json::from_value(Value::Object(fields)).map_err(|e| RepositoryError::Malformed {
        collection,
        id: doc.id.clone(),
        reason: e.to_string(),
    })
}

/// Decode every document of a collection; the first malformed one fails the whole read.
pub fn decode_all<T: DeserializeOwned>(
    collection: Collection,
    docs: &[Document],
) -> Result<Vec<T>, RepositoryError> {
    docs.iter().map(|d| decode(collection, d)).collect()
}

/// Serialize an entity into a field map; the `id` field is left to the store.
pub fn encode<T: Serialize>(collection: Collection, value: &T) -> Result<Fields, RepositoryError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(mut fields)) => {
            fields.remove("id");
            Ok(fields)
        }
        Ok(other) => Err(RepositoryError::Malformed {
            collection,
            id: String::new(),
            reason: format!("expected an object, got {}", other),
        }),
        Err(e) => Err(RepositoryError::Malformed {
            collection,
            id: String::new(),
            reason: e.to_string(),
        }),
    }
}

/// `list` + `decode_all` in one step.
pub fn list_as<T: DeserializeOwned>(
    repo: &dyn Repository,
    collection: Collection,
) -> Result<Vec<T>, RepositoryError> {
    let docs = repo.list(collection)?;
    decode_all(collection, &docs)
}

/// An entity stored in a fixed collection whose id is assigned by the store.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    fn set_id(&mut self, id: DocumentId);
}

impl Record for crate::models::Player {
    const COLLECTION: Collection = Collection::Players;

    fn set_id(&mut self, id: DocumentId) {
        self.id = id;
    }
}

impl Record for crate::models::SubstitutePlayer {
    const COLLECTION: Collection = Collection::SubstitutePlayers;

    fn set_id(&mut self, id: DocumentId) {
        self.id = id;
    }
}

impl Record for crate::models::Team {
    const COLLECTION: Collection = Collection::Teams;

    fn set_id(&mut self, id: DocumentId) {
        self.id = id;
    }
}

impl Record for crate::models::GameMatch {
    const COLLECTION: Collection = Collection::Matches;

    fn set_id(&mut self, id: DocumentId) {
        self.id = id;
    }
}

/// Read and decode every record of `T`'s collection.
pub fn fetch_all<T: Record>(repo: &dyn Repository) -> Result<Vec<T>, RepositoryError> {
    list_as(repo, T::COLLECTION)
}

/// Insert `record` and stamp it with the store-assigned id.
pub fn insert_record<T: Record>(repo: &dyn Repository, mut record: T) -> Result<T, RepositoryError> {
    let id = repo.insert(T::COLLECTION, encode(T::COLLECTION, &record)?)?;
    record.set_id(id);
    Ok(record)
}
