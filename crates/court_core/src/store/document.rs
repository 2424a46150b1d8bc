use crate::model::{ChallengerQueue, CourtMatch, GameRecord, GameSnapshot, TeamWins};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The replicated session document.
///
/// Set-valued win tracking travels as arrays; conversion to and from
/// [`GameSnapshot`] happens only here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    #[serde(default)]
    pub current_game: CourtMatch,
    #[serde(default)]
    pub queue: Vec<String>,
    #[serde(default)]
    pub champion: Option<String>,
    #[serde(default)]
    pub champion_defense_streak: u32,
    #[serde(default)]
    pub former_champion_name: Option<String>,
    #[serde(default)]
    pub team_wins: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub game_history: Vec<GameRecord>,
    /// Unix milliseconds of the write that produced this document
    pub last_updated: i64,
}

impl StoreDocument {
    pub fn from_snapshot(snapshot: &GameSnapshot, last_updated: i64) -> Self {
        Self {
            current_game: snapshot.current_match.clone(),
            queue: snapshot.queue.names().to_vec(),
            champion: snapshot.champion.clone(),
            champion_defense_streak: snapshot.defense_streak,
            former_champion_name: snapshot.former_champion.clone(),
            team_wins: snapshot
                .team_wins
                .iter()
                .map(|(team, beaten)| (team.clone(), beaten.iter().cloned().collect()))
                .collect(),
            game_history: snapshot.history.clone(),
            last_updated,
        }
    }

    /// Rebuild the snapshot; blank names count as absent and repeated
    /// queue entries keep their first position
    pub fn into_snapshot(self) -> GameSnapshot {
        let team_wins: TeamWins = self
            .team_wins
            .into_iter()
            .map(|(team, beaten)| (team, beaten.into_iter().collect()))
            .collect();

        GameSnapshot {
            current_match: self.current_game,
            queue: ChallengerQueue::from_names(self.queue),
            champion: self.champion.filter(|name| !name.is_empty()),
            defense_streak: self.champion_defense_streak,
            former_champion: self.former_champion_name.filter(|name| !name.is_empty()),
            team_wins,
            history: self.game_history,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> GameSnapshot {
        let mut snapshot = GameSnapshot::empty(420);
        snapshot.current_match = CourtMatch::pairing("X", "F", 420);
        snapshot.queue = ChallengerQueue::from_names(["E", "G"]);
        snapshot.former_champion = Some("X".into());
        snapshot.defense_streak = 1;
        let beaten = snapshot.team_wins.entry("X".into()).or_default();
        beaten.insert("Y".into());
        beaten.insert("Z".into());
        snapshot
    }

    #[test]
    fn test_snapshot_survives_the_wire() {
        let snapshot = sample_snapshot();
        let json = StoreDocument::from_snapshot(&snapshot, 42).to_json().unwrap();
        let restored = StoreDocument::from_json(&json).unwrap();

        assert_eq!(restored.last_updated, 42);
        assert_eq!(restored.into_snapshot(), snapshot);
    }

    #[test]
    fn test_team_wins_travel_as_arrays() {
        let document = StoreDocument::from_snapshot(&sample_snapshot(), 1);
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["teamWins"]["X"], serde_json::json!(["Y", "Z"]));
        assert_eq!(value["formerChampionName"], "X");
        assert_eq!(value["championDefenseStreak"], 1);
    }

    #[test]
    fn test_sparse_document_uses_defaults() {
        let document = StoreDocument::from_json(r#"{"lastUpdated": 7, "champion": ""}"#).unwrap();
        let snapshot = document.into_snapshot();

        assert_eq!(snapshot.champion, None);
        assert_eq!(snapshot.current_match, CourtMatch::empty(420));
        assert!(snapshot.history.is_empty());
    }

    #[test]
    fn test_duplicate_queue_entries_collapse() {
        let document =
            StoreDocument::from_json(r#"{"lastUpdated": 7, "queue": ["A", "B", "A"]}"#).unwrap();
        assert_eq!(document.into_snapshot().queue.len(), 2);
    }
}
