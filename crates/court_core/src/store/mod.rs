//! Game State Store
//!
//! Owns the canonical [`GameSnapshot`] of one session. All changes go through
//! [`GameStore::update`], which stamps a strictly increasing timestamp and
//! publishes the full document. Documents arriving from the backend are
//! applied by [`GameStore::reconcile`] only when they are newer than the last
//! write this store applied, so a late echo of an old write can never roll
//! back a rotation in progress.

pub mod backend;
pub mod document;
pub mod wall_clock;

pub use backend::{DocumentStore, MemoryDocumentStore};
pub use document::StoreDocument;
pub use wall_clock::{ManualWallClock, SystemWallClock, WallClock};

use crate::error::Result;
use crate::model::{GameSnapshot, SnapshotPatch};
use std::sync::Arc;

/// Session key used when none is given
pub const DEFAULT_SESSION_ID: &str = "default-game";

pub struct GameStore {
    session_id: String,
    snapshot: GameSnapshot,
    /// Timestamp of the newest state applied, local or remote
    last_write: i64,
    wall: Arc<dyn WallClock>,
    backend: Option<Arc<dyn DocumentStore>>,
}

impl GameStore {
    /// A store that keeps its state in memory only
    pub fn detached(
        session_id: impl Into<String>,
        initial: GameSnapshot,
        wall: Arc<dyn WallClock>,
    ) -> Self {
        Self { session_id: session_id.into(), snapshot: initial, last_write: 0, wall, backend: None }
    }

    /// Attach to `backend`, picking up the session's latest document if one exists
    pub fn open(
        session_id: impl Into<String>,
        initial: GameSnapshot,
        wall: Arc<dyn WallClock>,
        backend: Arc<dyn DocumentStore>,
    ) -> Result<Self> {
        let session_id = session_id.into();
        let mut store = Self::detached(session_id.clone(), initial, wall);

        if let Some(document) = backend.fetch(&session_id)? {
            log::info!("Resuming session '{}' from {}", session_id, document.last_updated);
            store.last_write = document.last_updated;
            store.snapshot = document.into_snapshot();
        }

        store.backend = Some(backend);
        Ok(store)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn read(&self) -> &GameSnapshot {
        &self.snapshot
    }

    pub fn last_write(&self) -> i64 {
        self.last_write
    }

    pub fn now_millis(&self) -> i64 {
        self.wall.now_millis()
    }

    /// Apply `patch` and publish the result; returns the write timestamp
    pub fn update(&mut self, patch: SnapshotPatch) -> i64 {
        if patch.is_empty() {
            return self.last_write;
        }

        patch.apply(&mut self.snapshot);
        self.last_write = self.wall.now_millis().max(self.last_write + 1);

        if let Some(backend) = &self.backend {
            let document = StoreDocument::from_snapshot(&self.snapshot, self.last_write);
            if let Err(e) = backend.publish(&self.session_id, &document) {
                log::error!("Failed to publish session '{}': {}", self.session_id, e);
            }
        }

        log::debug!("Session '{}' updated at {}", self.session_id, self.last_write);
        self.last_write
    }

    /// Adopt an externally delivered document if it is newer than our last write
    pub fn reconcile(&mut self, document: StoreDocument) -> bool {
        if document.last_updated <= self.last_write {
            log::debug!(
                "Skipping stale document for '{}' ({} <= {})",
                self.session_id,
                document.last_updated,
                self.last_write
            );
            return false;
        }

        log::debug!("Syncing '{}' from {}", self.session_id, document.last_updated);
        self.last_write = document.last_updated;
        self.snapshot = document.into_snapshot();
        true
    }

    /// Current state in wire form
    pub fn document(&self) -> StoreDocument {
        StoreDocument::from_snapshot(&self.snapshot, self.last_write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChallengerQueue, CourtMatch};

    fn store_at(millis: i64) -> (GameStore, ManualWallClock) {
        let clock = ManualWallClock::new(millis);
        let store =
            GameStore::detached(DEFAULT_SESSION_ID, GameSnapshot::empty(420), Arc::new(clock.clone()));
        (store, clock)
    }

    #[test]
    fn test_update_is_partial() {
        let (mut store, _) = store_at(1_000);
        store.update(SnapshotPatch::new().with_champion(Some("X".into())));
        store.update(SnapshotPatch::new().with_queue(ChallengerQueue::from_names(["A"])));

        assert_eq!(store.read().champion.as_deref(), Some("X"));
        assert_eq!(store.read().queue.len(), 1);
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let (mut store, clock) = store_at(1_000);
        let first = store.update(SnapshotPatch::new().with_defense_streak(1));
        let second = store.update(SnapshotPatch::new().with_defense_streak(0));
        assert_eq!(first, 1_000);
        assert_eq!(second, 1_001);

        clock.set(5_000);
        assert_eq!(store.update(SnapshotPatch::new().with_defense_streak(1)), 5_000);
    }

    #[test]
    fn test_empty_patch_is_not_a_write() {
        let (mut store, _) = store_at(1_000);
        assert_eq!(store.update(SnapshotPatch::new()), 0);
    }

    #[test]
    fn test_stale_document_is_discarded() {
        let (mut store, _) = store_at(2_000);
        store.update(SnapshotPatch::new().with_champion(Some("X".into())));

        let mut stale = GameSnapshot::empty(420);
        stale.champion = Some("OLD".into());
        assert!(!store.reconcile(StoreDocument::from_snapshot(&stale, 1_500)));
        assert!(!store.reconcile(StoreDocument::from_snapshot(&stale, 2_000)));
        assert_eq!(store.read().champion.as_deref(), Some("X"));
    }

    #[test]
    fn test_newer_document_is_adopted() {
        let (mut store, _) = store_at(2_000);
        store.update(SnapshotPatch::new().with_champion(Some("X".into())));

        let mut remote = GameSnapshot::empty(420);
        remote.current_match = CourtMatch::pairing("A", "B", 420);
        assert!(store.reconcile(StoreDocument::from_snapshot(&remote, 3_000)));
        assert_eq!(store.read(), &remote);
        assert_eq!(store.last_write(), 3_000);

        // older than the adopted remote write
        assert!(!store.reconcile(StoreDocument::from_snapshot(&GameSnapshot::empty(420), 2_500)));
    }

    #[test]
    fn test_update_publishes_to_backend() {
        let backend = Arc::new(MemoryDocumentStore::new());
        let clock = ManualWallClock::new(10);
        let mut store = GameStore::open(
            "court-1",
            GameSnapshot::empty(420),
            Arc::new(clock),
            backend.clone(),
        )
        .unwrap();

        store.update(SnapshotPatch::new().with_champion(Some("X".into())));
        let published = backend.fetch("court-1").unwrap().unwrap();
        assert_eq!(published.champion.as_deref(), Some("X"));
        assert_eq!(published.last_updated, 10);
    }

    #[test]
    fn test_open_resumes_existing_session() {
        let backend = Arc::new(MemoryDocumentStore::new());
        let mut earlier = GameSnapshot::empty(420);
        earlier.queue = ChallengerQueue::from_names(["A", "B"]);
        backend.publish("court-1", &StoreDocument::from_snapshot(&earlier, 77)).unwrap();

        let store = GameStore::open(
            "court-1",
            GameSnapshot::empty(420),
            Arc::new(ManualWallClock::new(0)),
            backend,
        )
        .unwrap();
        assert_eq!(store.read().queue.len(), 2);
        assert_eq!(store.last_write(), 77);
    }
}
