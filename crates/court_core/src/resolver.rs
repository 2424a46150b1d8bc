//! Match outcome resolution and the champion rules.
//!
//! `resolve` is a pure function of the snapshot: it never touches the store,
//! it only describes the change (a [`SnapshotPatch`]) and the rotation that
//! must follow. Branch order:
//!
//! 1. a former champion wins: defense streak grows, two in a row reclaims
//! 2. a former champion loses: defense is over, fall through to 3
//! 3. normal win: the loser joins the winner's beaten set; enough distinct
//!    opponents crowns a new champion, otherwise a seated champion is recalled
//!    or the winner stays on

use crate::clock;
use crate::config::{RulesConfig, DEFENSE_RECLAIM_STREAK};
use crate::error::{CourtError, Result};
use crate::model::{GameRecord, GameSnapshot, RecordKind, Side, SnapshotPatch};
use crate::rotation::RotationBranch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Ordinary win, no title change
    Win,
    /// Former champion won but still needs more wins to reclaim
    DefenseProgress { streak: u32 },
    /// Winner beat enough distinct opponents to take the title
    NewChampion,
    /// Former champion won enough games in a row to take the title back
    Reclaimed,
}

impl OutcomeKind {
    pub fn crowns_champion(self) -> bool {
        matches!(self, OutcomeKind::NewChampion | OutcomeKind::Reclaimed)
    }
}

/// A decided game and everything that follows from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub winner: String,
    pub loser: String,
    pub kind: OutcomeKind,
    /// Record appended to history by `patch`
    pub record: GameRecord,
    /// A former champion lost, ending their defense
    pub defense_failed: bool,
    /// History, win tracking and champion fields after the game
    pub patch: SnapshotPatch,
    pub rotation: RotationBranch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Tied at the end: play the overtime period, nothing is recorded
    Overtime { patch: SnapshotPatch },
    Decided(Decision),
}

/// Decide the finished match in `snapshot`
pub fn resolve(snapshot: &GameSnapshot, rules: &RulesConfig, now_millis: i64) -> Result<Resolution> {
    let current = &snapshot.current_match;

    if current.playing {
        return Err(CourtError::InvalidResolution("match is still running".to_string()));
    }
    if !current.is_active() {
        return Err(CourtError::InvalidResolution(
            "both teams must be on court to decide a match".to_string(),
        ));
    }

    let Some(winning_side) = current.leader() else {
        let mut overtime = current.clone();
        overtime.time_left = rules.overtime_secs;
        overtime.playing = false;
        log::info!(
            "{} and {} tied at {}, going to {}s overtime",
            current.team_a,
            current.team_b,
            current.score_line(),
            rules.overtime_secs
        );
        return Ok(Resolution::Overtime { patch: SnapshotPatch::new().with_match(overtime) });
    };

    let winner = current.team(winning_side).to_string();
    let loser = current.team(winning_side.opposite()).to_string();
    log::info!("Game ended: {} beats {} ({})", winner, loser, current.score_line());

    let mut record = GameRecord {
        winner: winner.clone(),
        loser: loser.clone(),
        score: current.score_line(),
        duration: clock::elapsed_secs(current.time_left, rules),
        timestamp: now_millis,
        kind: RecordKind::Win,
        streak: None,
    };

    // A champion found on court is no longer sitting out
    let mut patch = SnapshotPatch::new();
    let seated = match &snapshot.champion {
        Some(champion) if current.involves(champion) => {
            log::warn!("Champion {} was playing; treating the title as vacated", champion);
            patch = patch.with_champion(None);
            None
        }
        other => other.clone(),
    };
    let former = snapshot.former_champion.as_deref();

    // 1. former champion defending
    if seated.is_none() && former == Some(winner.as_str()) {
        let streak = snapshot.defense_streak + 1;
        record.streak = Some(streak);

        if streak >= DEFENSE_RECLAIM_STREAK {
            log::info!("{} reclaims the title after {} straight wins", winner, streak);
            record.kind = RecordKind::Championship;
            let patch = patch
                .with_champion(Some(winner.clone()))
                .with_defense_streak(0)
                .with_former_champion(None)
                .with_history(appended(&snapshot.history, &record));
            return Ok(Resolution::Decided(Decision {
                rotation: RotationBranch::ChampionSitsOut {
                    champion: winner.clone(),
                    defeated: loser.clone(),
                },
                winner,
                loser,
                kind: OutcomeKind::Reclaimed,
                record,
                defense_failed: false,
                patch,
            }));
        }

        log::info!("Former champion {} defends ({}/{})", winner, streak, DEFENSE_RECLAIM_STREAK);
        let patch = patch
            .with_defense_streak(streak)
            .with_history(appended(&snapshot.history, &record));
        return Ok(Resolution::Decided(Decision {
            rotation: RotationBranch::WinnerContinues { winner: winner.clone(), loser: loser.clone() },
            winner,
            loser,
            kind: OutcomeKind::DefenseProgress { streak },
            record,
            defense_failed: false,
            patch,
        }));
    }

    // 2. former champion beaten
    let defense_failed = seated.is_none() && former == Some(loser.as_str());
    if defense_failed {
        log::info!("Former champion {} lost, defense attempt over", loser);
        patch = patch.with_former_champion(None).with_defense_streak(0);
    }

    // 3. normal win
    let mut team_wins = snapshot.team_wins.clone();
    let beaten = team_wins.entry(winner.clone()).or_default();
    beaten.insert(loser.clone());
    let distinct = beaten.len();

    if distinct >= rules.champion_qualification {
        log::info!("{} becomes champion ({} distinct wins)", winner, distinct);
        record.kind = RecordKind::Championship;
        let patch = patch
            .with_champion(Some(winner.clone()))
            .with_defense_streak(0)
            .with_former_champion(None)
            .with_team_wins(team_wins)
            .with_history(appended(&snapshot.history, &record));
        return Ok(Resolution::Decided(Decision {
            rotation: RotationBranch::ChampionSitsOut {
                champion: winner.clone(),
                defeated: loser.clone(),
            },
            winner,
            loser,
            kind: OutcomeKind::NewChampion,
            record,
            defense_failed,
            patch,
        }));
    }

    log::info!(
        "{} wins but is not champion yet ({}/{})",
        winner,
        distinct,
        rules.champion_qualification
    );
    let rotation = match seated {
        Some(champion) => {
            RotationBranch::ChampionRecalled { champion, winner: winner.clone(), loser: loser.clone() }
        }
        None => RotationBranch::WinnerContinues { winner: winner.clone(), loser: loser.clone() },
    };
    let patch = patch.with_team_wins(team_wins).with_history(appended(&snapshot.history, &record));

    Ok(Resolution::Decided(Decision {
        winner,
        loser,
        kind: OutcomeKind::Win,
        record,
        defense_failed,
        patch,
        rotation,
    }))
}

fn appended(history: &[GameRecord], record: &GameRecord) -> Vec<GameRecord> {
    let mut next = Vec::with_capacity(history.len() + 1);
    next.extend_from_slice(history);
    next.push(record.clone());
    next
}

/// Side that reached an instant-win score, if any
pub fn instant_winner(snapshot: &GameSnapshot, rules: &RulesConfig) -> Option<Side> {
    let current = &snapshot.current_match;
    [Side::A, Side::B].into_iter().find(|side| rules.is_instant_win(current.score(*side)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChallengerQueue, CourtMatch};

    const NOW: i64 = 1_700_000_000_000;

    fn finished(team_a: &str, team_b: &str, score_a: u32, score_b: u32) -> GameSnapshot {
        let mut snapshot = GameSnapshot::empty(420);
        snapshot.current_match = CourtMatch::pairing(team_a, team_b, 420);
        snapshot.current_match.score_a = score_a;
        snapshot.current_match.score_b = score_b;
        snapshot.current_match.time_left = 100;
        snapshot
    }

    fn decided(snapshot: &GameSnapshot) -> Decision {
        match resolve(snapshot, &RulesConfig::default(), NOW).unwrap() {
            Resolution::Decided(decision) => decision,
            other => panic!("expected a decision, got {other:?}"),
        }
    }

    fn after(snapshot: &GameSnapshot, decision: &Decision) -> GameSnapshot {
        let mut next = snapshot.clone();
        decision.patch.clone().apply(&mut next);
        next
    }

    #[test]
    fn test_rejects_running_match() {
        let mut snapshot = finished("X", "Y", 3, 1);
        snapshot.current_match.playing = true;
        let err = resolve(&snapshot, &RulesConfig::default(), NOW).unwrap_err();
        assert!(matches!(err, CourtError::InvalidResolution(_)));
    }

    #[test]
    fn test_rejects_open_match() {
        let snapshot = finished("X", "", 3, 1);
        assert!(resolve(&snapshot, &RulesConfig::default(), NOW).is_err());
    }

    #[test]
    fn test_tie_goes_to_overtime() {
        let snapshot = finished("X", "Y", 9, 9);
        let resolution = resolve(&snapshot, &RulesConfig::default(), NOW).unwrap();
        let Resolution::Overtime { patch } = resolution else {
            panic!("tie should go to overtime");
        };
        let overtime = patch.current_match.clone().unwrap();
        assert_eq!(overtime.time_left, 60);
        assert!(!overtime.playing);
        assert_eq!((overtime.score_a, overtime.score_b), (9, 9));
        assert!(patch.history.is_none());
    }

    #[test]
    fn test_first_win_records_history() {
        let snapshot = finished("X", "Y", 15, 10);
        let decision = decided(&snapshot);

        assert_eq!(decision.winner, "X");
        assert_eq!(decision.kind, OutcomeKind::Win);
        assert_eq!(decision.record.score, "15-10");
        assert_eq!(decision.record.duration, 320);
        assert_eq!(decision.record.timestamp, NOW);
        assert_eq!(
            decision.rotation,
            RotationBranch::WinnerContinues { winner: "X".into(), loser: "Y".into() }
        );

        let next = after(&snapshot, &decision);
        assert_eq!(next.history.len(), 1);
        assert_eq!(next.defeated_count("X"), 1);
        assert_eq!(next.champion, None);
    }

    #[test]
    fn test_team_b_can_win() {
        let decision = decided(&finished("X", "Y", 4, 12));
        assert_eq!(decision.winner, "Y");
        assert_eq!(decision.loser, "X");
        assert_eq!(decision.record.score, "4-12");
    }

    #[test]
    fn test_second_distinct_win_crowns_champion() {
        let mut snapshot = finished("X", "Y", 15, 10);
        snapshot.team_wins.entry("X".into()).or_default().insert("Z".into());

        let decision = decided(&snapshot);
        assert_eq!(decision.kind, OutcomeKind::NewChampion);
        assert!(decision.record.is_championship());

        let next = after(&snapshot, &decision);
        assert_eq!(next.champion.as_deref(), Some("X"));
        assert_eq!(next.defeated_count("X"), 2);
    }

    #[test]
    fn test_beating_same_opponent_twice_is_not_a_title() {
        let mut snapshot = finished("X", "Y", 15, 10);
        snapshot.team_wins.entry("X".into()).or_default().insert("Y".into());

        let decision = decided(&snapshot);
        assert_eq!(decision.kind, OutcomeKind::Win);
        assert_eq!(after(&snapshot, &decision).defeated_count("X"), 1);
    }

    #[test]
    fn test_seated_champion_is_recalled() {
        let mut snapshot = finished("F", "G", 15, 10);
        snapshot.champion = Some("X".to_string());
        snapshot.queue = ChallengerQueue::from_names(["E"]);

        let decision = decided(&snapshot);
        assert_eq!(
            decision.rotation,
            RotationBranch::ChampionRecalled {
                champion: "X".into(),
                winner: "F".into(),
                loser: "G".into(),
            }
        );
        // the recall itself happens in the rotation step
        assert_eq!(after(&snapshot, &decision).champion.as_deref(), Some("X"));
    }

    #[test]
    fn test_defense_progress_then_reclaim() {
        let mut snapshot = finished("X", "F", 15, 10);
        snapshot.former_champion = Some("X".to_string());

        let first = decided(&snapshot);
        assert_eq!(first.kind, OutcomeKind::DefenseProgress { streak: 1 });
        assert_eq!(first.record.streak, Some(1));
        assert_eq!(first.record.kind, RecordKind::Win);
        let next = after(&snapshot, &first);
        assert_eq!(next.defense_streak, 1);
        assert_eq!(next.former_champion.as_deref(), Some("X"));

        let mut second_game = next.clone();
        second_game.current_match = finished("X", "H", 15, 3).current_match;
        let second = decided(&second_game);
        assert_eq!(second.kind, OutcomeKind::Reclaimed);
        assert_eq!(second.record.kind, RecordKind::Championship);
        assert_eq!(second.record.streak, Some(2));

        let reclaimed = after(&second_game, &second);
        assert_eq!(reclaimed.champion.as_deref(), Some("X"));
        assert_eq!(reclaimed.defense_streak, 0);
        assert_eq!(reclaimed.former_champion, None);
    }

    #[test]
    fn test_former_champion_loss_ends_defense() {
        let mut snapshot = finished("X", "F", 5, 15);
        snapshot.former_champion = Some("X".to_string());
        snapshot.defense_streak = 1;

        let decision = decided(&snapshot);
        assert!(decision.defense_failed);
        assert_eq!(decision.kind, OutcomeKind::Win);

        let next = after(&snapshot, &decision);
        assert_eq!(next.former_champion, None);
        assert_eq!(next.defense_streak, 0);
        assert_eq!(next.defeated_count("F"), 1);
        assert_eq!(next.history.len(), 1);
    }

    #[test]
    fn test_instant_winner() {
        let rules = RulesConfig::default();
        assert_eq!(instant_winner(&finished("X", "Y", 15, 3), &rules), Some(Side::A));
        assert_eq!(instant_winner(&finished("X", "Y", 3, 16), &rules), Some(Side::B));
        assert_eq!(instant_winner(&finished("X", "Y", 14, 3), &rules), None);
        assert_eq!(instant_winner(&finished("X", "Y", 40, 3), &RulesConfig::five_on_five()), None);
    }

    #[cfg(all(test, feature = "proptest"))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a decided game appends exactly one record and never leaves both title fields set
            #[test]
            fn prop_one_record_per_decision(
                score_a in 0u32..30,
                score_b in 0u32..30,
                seated in proptest::option::of(Just("C".to_string())),
                former in proptest::option::of(prop_oneof![Just("X".to_string()), Just("Y".to_string())]),
                streak in 0u32..2,
            ) {
                prop_assume!(score_a != score_b);
                let mut snapshot = finished("X", "Y", score_a, score_b);
                snapshot.champion = seated.clone();
                snapshot.former_champion = if seated.is_some() { None } else { former };
                snapshot.defense_streak = streak;

                let decision = decided(&snapshot);
                let next = after(&snapshot, &decision);
                prop_assert_eq!(next.history.len(), 1);
                prop_assert!(!(next.champion.is_some() && next.former_champion.is_some()));
            }
        }
    }
}
