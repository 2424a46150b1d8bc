//! # court_core - King-of-the-Court Rotation Engine
//!
//! Keeps one pickup court moving: who is playing, who is waiting, who holds
//! the title, and what happened in every finished game.
//!
//! ## Features
//! - Challenger queue with a no-immediate-rematch rotation
//! - Champion crowning, sitting out, recall and title defense
//! - Phased match resolution with at most one resolution in flight
//! - Last-writer-wins sync through a pluggable document store
//! - History export/import as versioned JSON

pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod resolver;
pub mod rotation;
pub mod session;
pub mod store;

pub use config::{rules_from_env, RulesConfig, DEFENSE_RECLAIM_STREAK, RULES_PATH_ENV};
pub use error::{CourtError, Result};
pub use history::{HistoryExport, HistoryFilter, ImportMode, TeamRecord, EXPORT_VERSION};
pub use model::{ChallengerQueue, CourtMatch, GameRecord, GameSnapshot, RecordKind, Side};
pub use resolver::{OutcomeKind, Resolution};
pub use rotation::RotationBranch;
pub use session::{CourtEvent, CourtSession, ResolutionPhase, ResolveStatus};
pub use store::{
    DocumentStore, GameStore, ManualWallClock, MemoryDocumentStore, StoreDocument,
    SystemWallClock, WallClock, DEFAULT_SESSION_ID,
};
