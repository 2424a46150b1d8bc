//! Document store boundary: key → latest document, with push subscriptions.

use super::StoreDocument;
use crate::error::{CourtError, Result};
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

pub trait DocumentStore: Send + Sync {
    /// Replace the document under `key` and notify subscribers
    fn publish(&self, key: &str, document: &StoreDocument) -> Result<()>;

    /// Latest document under `key`
    fn fetch(&self, key: &str) -> Result<Option<StoreDocument>>;

    /// Receive every document published under `key` from now on,
    /// starting with the current one if there is one
    fn subscribe(&self, key: &str) -> Result<Receiver<StoreDocument>>;
}

#[derive(Default)]
struct Slot {
    latest: Option<StoreDocument>,
    subscribers: Vec<Sender<StoreDocument>>,
}

/// In-process document store
#[derive(Default)]
pub struct MemoryDocumentStore {
    slots: Mutex<HashMap<String, Slot>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Slot>>> {
        self.slots.lock().map_err(|_| CourtError::Store("document store lock poisoned".to_string()))
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn publish(&self, key: &str, document: &StoreDocument) -> Result<()> {
        let mut slots = self.lock()?;
        let slot = slots.entry(key.to_string()).or_default();

        slot.subscribers.retain(|tx| tx.send(document.clone()).is_ok());
        slot.latest = Some(document.clone());

        log::debug!(
            "Published '{}' at {} to {} subscriber(s)",
            key,
            document.last_updated,
            slot.subscribers.len()
        );
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Option<StoreDocument>> {
        Ok(self.lock()?.get(key).and_then(|slot| slot.latest.clone()))
    }

    fn subscribe(&self, key: &str) -> Result<Receiver<StoreDocument>> {
        let (tx, rx) = channel();
        let mut slots = self.lock()?;
        let slot = slots.entry(key.to_string()).or_default();

        if let Some(latest) = &slot.latest {
            // a fresh receiver cannot be disconnected yet
            let _ = tx.send(latest.clone());
        }
        slot.subscribers.push(tx);
        Ok(rx)
    }
}
