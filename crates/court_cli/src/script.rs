//! Plain-text session scripts.
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! join Hawks
//! join Owls
//! rotate
//! start
//! score a 15
//! finish
//! ```

use anyhow::{anyhow, bail, Context, Result};
use court_core::{CourtEvent, CourtSession, ImportMode, Side};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Join(String),
    Leave(String),
    Teams(String, String),
    Seat,
    Rotate,
    Start,
    Pause,
    Score(Side, i32),
    Tick(u32),
    Resolve,
    Advance,
    Finish,
    Overtime,
    ResetTimer,
    Regulation(u32),
    Reset,
    Import(String, ImportMode),
}

/// Parse a whole script; the first bad line fails the lot
pub fn parse(script: &str) -> Result<Vec<Step>> {
    script
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.split('#').next().unwrap_or_default().trim();
            (!line.is_empty()).then_some((index + 1, line))
        })
        .map(|(number, line)| parse_line(line).with_context(|| format!("line {number}: '{line}'")))
        .collect()
}

fn parse_line(line: &str) -> Result<Step> {
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let step = match (command, args.as_slice()) {
        ("join", [_, ..]) => Step::Join(rest.to_string()),
        ("leave", [_, ..]) => Step::Leave(rest.to_string()),
        ("teams", [a, b]) => Step::Teams(a.to_string(), b.to_string()),
        ("seat", []) => Step::Seat,
        ("rotate", []) => Step::Rotate,
        ("start", []) => Step::Start,
        ("pause", []) => Step::Pause,
        ("score", [side, delta]) => Step::Score(parse_side(side)?, delta.parse()?),
        ("tick", []) => Step::Tick(1),
        ("tick", [secs]) => Step::Tick(secs.parse()?),
        ("resolve", []) => Step::Resolve,
        ("advance", []) => Step::Advance,
        ("finish", []) => Step::Finish,
        ("overtime", []) => Step::Overtime,
        ("reset-timer", []) => Step::ResetTimer,
        ("regulation", [secs]) => Step::Regulation(secs.parse()?),
        ("reset", []) => Step::Reset,
        ("import", [path]) => Step::Import(path.to_string(), ImportMode::Replace),
        ("import", [path, "append"]) => Step::Import(path.to_string(), ImportMode::Append),
        _ => bail!("unknown command or wrong arguments"),
    };
    Ok(step)
}

fn parse_side(side: &str) -> Result<Side> {
    match side.to_ascii_lowercase().as_str() {
        "a" => Ok(Side::A),
        "b" => Ok(Side::B),
        other => Err(anyhow!("side must be 'a' or 'b', got '{other}'")),
    }
}

/// Run `steps` against `session`, returning the events they produced.
///
/// Import paths are resolved against `base_dir`.
pub fn replay(session: &mut CourtSession, steps: &[Step], base_dir: &Path) -> Result<Vec<CourtEvent>> {
    let mut events = Vec::new();

    for (index, step) in steps.iter().enumerate() {
        run_step(session, step, base_dir).with_context(|| format!("step {}: {:?}", index + 1, step))?;
        events.extend(session.drain_events());
    }

    // a script that stops mid-resolution still leaves a consistent court
    session.run_pending();
    events.extend(session.drain_events());
    Ok(events)
}

fn run_step(session: &mut CourtSession, step: &Step, base_dir: &Path) -> Result<()> {
    match step {
        Step::Join(name) => session.join_queue(name)?,
        Step::Leave(name) => {
            session.leave_queue(name)?;
        }
        Step::Teams(a, b) => session.set_teams(a, b)?,
        Step::Seat => {
            session.seat_challenger()?;
        }
        Step::Rotate => session.start_rotation()?,
        Step::Start => session.start()?,
        Step::Pause => session.pause()?,
        Step::Score(side, delta) => {
            session.add_points(*side, *delta)?;
        }
        Step::Tick(secs) => {
            for _ in 0..*secs {
                if session.tick()?.is_some() {
                    break;
                }
            }
        }
        Step::Resolve => {
            session.request_resolution()?;
        }
        Step::Advance => {
            session.advance();
        }
        Step::Finish => session.run_pending(),
        Step::Overtime => session.extend_overtime()?,
        Step::ResetTimer => session.reset_timer()?,
        Step::Regulation(secs) => session.set_regulation_time(*secs)?,
        Step::Reset => session.reset_all()?,
        Step::Import(path, mode) => {
            let path = base_dir.join(path);
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            session.import_history(&json, *mode)?;
        }
    }
    Ok(())
}
