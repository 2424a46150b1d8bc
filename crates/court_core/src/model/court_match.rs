use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which half of the pairing a score or name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// The game currently on the court.
///
/// Field names on the wire follow the shared session document
/// (`teamA`, `teamAScore`, `isPlaying`, ...).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourtMatch {
    #[serde(default)]
    pub team_a: String,
    #[serde(default)]
    pub team_b: String,
    #[serde(rename = "teamAScore", default)]
    pub score_a: u32,
    #[serde(rename = "teamBScore", default)]
    pub score_b: u32,
    #[serde(rename = "isPlaying", default)]
    pub playing: bool,
    pub time_left: u32,
}

impl Default for CourtMatch {
    fn default() -> Self {
        Self::empty(420)
    }
}

impl CourtMatch {
    /// No teams on court, clock at regulation
    pub fn empty(regulation_secs: u32) -> Self {
        Self::pairing("", "", regulation_secs)
    }

    /// A fresh pairing: scores at zero, stopped, full regulation clock
    pub fn pairing(team_a: &str, team_b: &str, regulation_secs: u32) -> Self {
        Self {
            team_a: team_a.to_string(),
            team_b: team_b.to_string(),
            score_a: 0,
            score_b: 0,
            playing: false,
            time_left: regulation_secs,
        }
    }

    /// A single team holding the court until a challenger shows up
    pub fn waiting(team: &str, regulation_secs: u32) -> Self {
        Self::pairing(team, "", regulation_secs)
    }

    /// Both names present
    pub fn is_active(&self) -> bool {
        !self.team_a.is_empty() && !self.team_b.is_empty()
    }

    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::A => &self.team_a,
            Side::B => &self.team_b,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::A => self.score_a,
            Side::B => self.score_b,
        }
    }

    pub fn set_score(&mut self, side: Side, score: u32) {
        match side {
            Side::A => self.score_a = score,
            Side::B => self.score_b = score,
        }
    }

    /// Non-empty team names on court
    pub fn participants(&self) -> impl Iterator<Item = &str> {
        [self.team_a.as_str(), self.team_b.as_str()].into_iter().filter(|t| !t.is_empty())
    }

    pub fn involves(&self, name: &str) -> bool {
        !name.is_empty() && (self.team_a == name || self.team_b == name)
    }

    /// The empty slot of an open match, `None` when both are filled
    pub fn vacant_side(&self) -> Option<Side> {
        if self.team_a.is_empty() {
            Some(Side::A)
        } else if self.team_b.is_empty() {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn set_team(&mut self, side: Side, name: &str) {
        match side {
            Side::A => self.team_a = name.to_string(),
            Side::B => self.team_b = name.to_string(),
        }
    }

    /// Side with the strictly greater score, `None` on a tie
    pub fn leader(&self) -> Option<Side> {
        use std::cmp::Ordering;
        match self.score_a.cmp(&self.score_b) {
            Ordering::Greater => Some(Side::A),
            Ordering::Less => Some(Side::B),
            Ordering::Equal => None,
        }
    }

    /// Final score in the "A-B" form kept in history
    pub fn score_line(&self) -> String {
        format!("{}-{}", self.score_a, self.score_b)
    }
}
