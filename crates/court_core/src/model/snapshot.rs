//! The full court state and partial replacements of it.

use super::{ChallengerQueue, CourtMatch, GameRecord};
use std::collections::{BTreeMap, BTreeSet};

/// Team name → distinct opponents it has beaten
pub type TeamWins = BTreeMap<String, BTreeSet<String>>;

/// Everything the session knows about the court
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameSnapshot {
    pub current_match: CourtMatch,
    pub queue: ChallengerQueue,
    /// Seated champion, sitting out
    pub champion: Option<String>,
    /// Consecutive wins of `former_champion` since being recalled
    pub defense_streak: u32,
    /// Champion who was recalled and is trying to win the title back
    pub former_champion: Option<String>,
    pub team_wins: TeamWins,
    pub history: Vec<GameRecord>,
}

impl GameSnapshot {
    /// An empty court with the clock at `regulation_secs`
    pub fn empty(regulation_secs: u32) -> Self {
        Self { current_match: CourtMatch::empty(regulation_secs), ..Self::default() }
    }

    /// Distinct opponents `team` has beaten
    pub fn defeated_count(&self, team: &str) -> usize {
        self.team_wins.get(team).map_or(0, BTreeSet::len)
    }

    /// Whether `name` is waiting, on court, or seated
    pub fn is_present(&self, name: &str) -> bool {
        self.queue.contains(name)
            || self.current_match.involves(name)
            || self.champion.as_deref() == Some(name)
    }

    /// Broken invariants, empty when the snapshot is consistent
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.champion.is_some() && self.former_champion.is_some() {
            problems.push("champion and former champion are both set".to_string());
        }
        if let Some(champion) = &self.champion {
            if self.current_match.is_active() && self.current_match.involves(champion) {
                problems.push(format!("seated champion '{}' is playing", champion));
            }
        }
        if self.current_match.is_active() && self.current_match.team_a == self.current_match.team_b
        {
            problems.push(format!("'{}' is paired with itself", self.current_match.team_a));
        }
        for name in self.current_match.participants() {
            if self.queue.contains(name) {
                problems.push(format!("'{}' is both on court and queued", name));
            }
        }

        problems
    }
}

/// Partial replacement of a [`GameSnapshot`]; absent fields stay untouched.
///
/// `champion` and `former_champion` are doubly optional so a patch can clear
/// them (`Some(None)`) as well as leave them alone (`None`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotPatch {
    pub current_match: Option<CourtMatch>,
    pub queue: Option<ChallengerQueue>,
    pub champion: Option<Option<String>>,
    pub defense_streak: Option<u32>,
    pub former_champion: Option<Option<String>>,
    pub team_wins: Option<TeamWins>,
    pub history: Option<Vec<GameRecord>>,
}

impl SnapshotPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match(mut self, current_match: CourtMatch) -> Self {
        self.current_match = Some(current_match);
        self
    }

    pub fn with_queue(mut self, queue: ChallengerQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn with_champion(mut self, champion: Option<String>) -> Self {
        self.champion = Some(champion);
        self
    }

    pub fn with_defense_streak(mut self, streak: u32) -> Self {
        self.defense_streak = Some(streak);
        self
    }

    pub fn with_former_champion(mut self, former: Option<String>) -> Self {
        self.former_champion = Some(former);
        self
    }

    pub fn with_team_wins(mut self, team_wins: TeamWins) -> Self {
        self.team_wins = Some(team_wins);
        self
    }

    pub fn with_history(mut self, history: Vec<GameRecord>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, snapshot: &mut GameSnapshot) {
        if let Some(current_match) = self.current_match {
            snapshot.current_match = current_match;
        }
        if let Some(queue) = self.queue {
            snapshot.queue = queue;
        }
        if let Some(champion) = self.champion {
            snapshot.champion = champion;
        }
        if let Some(streak) = self.defense_streak {
            snapshot.defense_streak = streak;
        }
        if let Some(former) = self.former_champion {
            snapshot.former_champion = former;
        }
        if let Some(team_wins) = self.team_wins {
            snapshot.team_wins = team_wins;
        }
        if let Some(history) = self.history {
            snapshot.history = history;
        }
    }
}
