pub mod court_match;
pub mod queue;
pub mod record;
pub mod snapshot;

pub use court_match::{CourtMatch, Side};
pub use queue::{normalize_entrant, ChallengerQueue, MAX_NAME_LEN};
pub use record::{GameRecord, RecordKind};
pub use snapshot::{GameSnapshot, SnapshotPatch, TeamWins};
