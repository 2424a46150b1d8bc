use serde::Serialize;

/// Things the court display should react to, in the order they happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CourtEvent {
    /// Clock ran out
    Buzzer,
    /// Tied at the buzzer, overtime clock set
    Overtime { time_left: u32 },
    /// Winner announcement, shown before the next match is formed
    Celebration { winner: String, champion: bool, message: Option<String> },
    ChampionCrowned { champion: String, reclaimed: bool },
    DefenseFailed { former_champion: String },
    /// Seated champion pulled back onto the court
    ChampionRecalled { champion: String },
    /// Next pairing is on court (team_b empty while a team waits alone)
    MatchFormed { team_a: String, team_b: String },
    /// A resolution request arrived while another was running
    ResolutionDropped,
}
