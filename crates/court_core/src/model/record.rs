use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Win,
    Championship,
}

/// One completed game
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct GameRecord {
    pub winner: String,
    pub loser: String,
    /// Final score as "A-B", team A first
    pub score: String,
    /// Seconds played
    pub duration: u32,
    /// Unix milliseconds
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// Defense streak reached by a former champion, if this was a defense game
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
}

impl GameRecord {
    pub fn is_championship(&self) -> bool {
        self.kind == RecordKind::Championship
    }

    /// Parsed "A-B" score
    pub fn parsed_score(&self) -> Option<(u32, u32)> {
        let (a, b) = self.score.split_once('-')?;
        Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
    }

    /// Reason this record could not have come out of a real game, if any
    pub fn validate(&self) -> Result<(), String> {
        if self.winner.trim().is_empty() || self.loser.trim().is_empty() {
            return Err("winner and loser must be named".to_string());
        }
        if self.winner == self.loser {
            return Err(format!("'{}' cannot beat itself", self.winner));
        }
        if self.parsed_score().is_none() {
            return Err(format!("score '{}' is not in A-B form", self.score));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: &str) -> GameRecord {
        GameRecord {
            winner: "X".to_string(),
            loser: "Y".to_string(),
            score: score.to_string(),
            duration: 300,
            timestamp: 1_700_000_000_000,
            kind: RecordKind::Win,
            streak: None,
        }
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(record("15-10")).unwrap();
        assert_eq!(value["type"], "win");
        assert!(value.get("streak").is_none());

        let mut champ = record("15-10");
        champ.kind = RecordKind::Championship;
        champ.streak = Some(2);
        let value = serde_json::to_value(champ).unwrap();
        assert_eq!(value["type"], "championship");
        assert_eq!(value["streak"], 2);
    }

    #[test]
    fn test_parsed_score() {
        assert_eq!(record("15-10").parsed_score(), Some((15, 10)));
        assert_eq!(record("abc").parsed_score(), None);
    }

    #[test]
    fn test_validate() {
        assert!(record("11-8").validate().is_ok());
        assert!(record("eleven").validate().is_err());

        let mut selfplay = record("11-8");
        selfplay.loser = "X".to_string();
        assert!(selfplay.validate().is_err());
    }
}
