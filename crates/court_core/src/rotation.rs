//! Queue rotation: who takes the court after a decided game.
//!
//! Every branch first sends the beaten team to the back of the queue and only
//! then draws from the front, so a team never gets an immediate rematch while
//! someone else is waiting. The next match always starts stopped, at 0-0, with
//! the full regulation clock.

use crate::config::RulesConfig;
use crate::model::{CourtMatch, GameSnapshot, SnapshotPatch};

/// Which rotation the resolver picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationBranch {
    /// A champion was just crowned (or reclaimed the title) and sits out
    ChampionSitsOut { champion: String, defeated: String },
    /// The seated champion comes back to face the winner
    ChampionRecalled { champion: String, winner: String, loser: String },
    /// The winner stays on and takes the next challenger
    WinnerContinues { winner: String, loser: String },
}

impl RotationBranch {
    pub fn name(&self) -> &'static str {
        match self {
            RotationBranch::ChampionSitsOut { .. } => "champion-sits-out",
            RotationBranch::ChampionRecalled { .. } => "champion-recalled",
            RotationBranch::WinnerContinues { .. } => "winner-continues",
        }
    }
}

/// Result of a rotation step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    pub next_match: CourtMatch,
    /// Champion pulled off the bench into the next match
    pub recalled: Option<String>,
    pub patch: SnapshotPatch,
}

/// Form the next match from the current snapshot
pub fn rotate(snapshot: &GameSnapshot, branch: &RotationBranch, rules: &RulesConfig) -> Rotation {
    let regulation = rules.regulation_secs;
    let mut queue = snapshot.queue.clone();

    match branch {
        RotationBranch::ChampionSitsOut { champion, defeated } => {
            queue.append(defeated.clone());

            if let [first, second, ..] = queue.names() {
                let (first, second) = (first.clone(), second.clone());
                queue.pop_front();
                queue.pop_front();
                log::info!("Champion {} sits out, next match: {} vs {}", champion, first, second);
                let next_match = CourtMatch::pairing(&first, &second, regulation);
                Rotation {
                    patch: SnapshotPatch::new().with_queue(queue).with_match(next_match.clone()),
                    next_match,
                    recalled: None,
                }
            } else if let Some(lone) = queue.pop_front() {
                log::info!("Only {} is waiting, champion {} plays on", lone, champion);
                let next_match = CourtMatch::pairing(champion, &lone, regulation);
                Rotation {
                    patch: SnapshotPatch::new()
                        .with_queue(queue)
                        .with_champion(None)
                        .with_match(next_match.clone()),
                    next_match,
                    recalled: Some(champion.clone()),
                }
            } else {
                log::info!("Nobody waiting, champion {} holds the court", champion);
                let next_match = CourtMatch::waiting(champion, regulation);
                Rotation {
                    patch: SnapshotPatch::new().with_queue(queue).with_match(next_match.clone()),
                    next_match,
                    recalled: None,
                }
            }
        }

        RotationBranch::ChampionRecalled { champion, winner, loser } => {
            queue.append(loser.clone());
            log::info!(
                "Champion {} returns to challenge {}; two straight wins reclaim the title",
                champion,
                winner
            );
            let next_match = CourtMatch::pairing(champion, winner, regulation);
            Rotation {
                patch: SnapshotPatch::new()
                    .with_queue(queue)
                    .with_champion(None)
                    .with_former_champion(Some(champion.clone()))
                    .with_defense_streak(0)
                    .with_match(next_match.clone()),
                next_match,
                recalled: Some(champion.clone()),
            }
        }

        RotationBranch::WinnerContinues { winner, loser } => {
            queue.append(loser.clone());

            let next_match = match queue.pop_front() {
                Some(opponent) => {
                    log::info!("{} stays on against {}", winner, opponent);
                    CourtMatch::pairing(winner, &opponent, regulation)
                }
                None => {
                    log::info!("Queue empty, {} waits for a challenger", winner);
                    CourtMatch::waiting(winner, regulation)
                }
            };
            Rotation {
                patch: SnapshotPatch::new().with_queue(queue).with_match(next_match.clone()),
                next_match,
                recalled: None,
            }
        }
    }
}
