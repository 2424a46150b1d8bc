//! Game clock: one call per second while the match is running.

use crate::config::RulesConfig;
use crate::model::CourtMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clock is stopped, nothing changed
    Idle,
    /// One second elapsed
    Running { time_left: u32 },
    /// The buzzer sounded; the match has been stopped
    Expired,
}

/// Advance the clock by one second
pub fn tick(current: &mut CourtMatch) -> TickOutcome {
    if !current.playing {
        return TickOutcome::Idle;
    }

    current.time_left = current.time_left.saturating_sub(1);
    if current.time_left == 0 {
        current.playing = false;
        return TickOutcome::Expired;
    }

    TickOutcome::Running { time_left: current.time_left }
}

/// Seconds played, as recorded in history: regulation minus what is left.
/// Overtime runs on the same clock, so a game decided in overtime counts
/// `regulation - time_left` too.
pub fn elapsed_secs(time_left: u32, rules: &RulesConfig) -> u32 {
    rules.regulation_secs.saturating_sub(time_left)
}

/// `M:SS`
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_only_while_playing() {
        let mut m = CourtMatch::pairing("X", "Y", 420);
        assert_eq!(tick(&mut m), TickOutcome::Idle);
        assert_eq!(m.time_left, 420);

        m.playing = true;
        assert_eq!(tick(&mut m), TickOutcome::Running { time_left: 419 });
    }

    #[test]
    fn test_tick_expires_and_stops() {
        let mut m = CourtMatch::pairing("X", "Y", 420);
        m.time_left = 1;
        m.playing = true;

        assert_eq!(tick(&mut m), TickOutcome::Expired);
        assert!(!m.playing);
        assert_eq!(m.time_left, 0);
        assert_eq!(tick(&mut m), TickOutcome::Idle);
    }

    #[test]
    fn test_elapsed_secs() {
        let rules = RulesConfig::default();
        assert_eq!(elapsed_secs(420, &rules), 0);
        assert_eq!(elapsed_secs(300, &rules), 120);
        assert_eq!(elapsed_secs(1, &rules), 419);
        assert_eq!(elapsed_secs(0, &rules), 420);
    }

    #[test]
    fn test_elapsed_secs_in_overtime_and_after_shorter_regulation() {
        let rules = RulesConfig::default();
        // overtime clock set to 60, decided with 50 left
        assert_eq!(elapsed_secs(50, &rules), 370);
        // clock longer than the current regulation never goes negative
        assert_eq!(elapsed_secs(600, &rules), 0);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(420), "7:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(0), "0:00");
    }
}
