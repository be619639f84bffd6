//! Durable client-side key-value persistence.
//!
//! Stores are plain string maps with no schema versioning. Every access goes
//! through [`Persistence`], which never fails towards the caller: errors are
//! logged and published as [`PersistenceEvent`]s so interested code can react.

pub mod file;
pub mod memory;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::warn;

use crate::errors::StorageError;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the JSON-encoded user settings.
pub const SETTINGS_KEY: &str = "nell-settings";
/// Key holding the identifier of the last selected project.
pub const CURRENT_PROJECT_KEY: &str = "nell_current_project_id";

const EVENT_BUFFER: usize = 64;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceOp {
    Read,
    Write,
    Remove,
    Decode,
}

/// A recovered local failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceEvent {
    pub op: PersistenceOp,
    pub key: String,
    pub reason: String,
}

/// Fire-and-forget handle over a [`KeyValueStore`].
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<PersistenceEvent>,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self { store, events }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PersistenceEvent> {
        self.events.subscribe()
    }

    /// Reads a key. Read failures are reported and treated as absent.
    pub fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                self.report(PersistenceOp::Read, key, &e);
                None
            }
        }
    }

    pub fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            self.report(PersistenceOp::Write, key, &e);
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            self.report(PersistenceOp::Remove, key, &e);
        }
    }

    /// Records a value that was read but could not be decoded.
    pub fn report_corrupt(&self, key: &str, error: &StorageError) {
        self.report(PersistenceOp::Decode, key, error);
    }

    fn report(&self, op: PersistenceOp, key: &str, error: &StorageError) {
        warn!("Persistence {op:?} failed for '{key}': {error}");
        // No subscribers is fine; the warning above is the fallback.
        let _ = self.events.send(PersistenceEvent {
            op,
            key: key.to_string(),
            reason: error.to_string(),
        });
    }
}
