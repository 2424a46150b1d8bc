//! Court CLI
//!
//! Replay scripted sessions, move game history in and out of session
//! documents, print standings and the history export schema.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use court_core::{history, CourtSession, HistoryExport, HistoryFilter, ImportMode, DEFAULT_SESSION_ID};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "court")]
#[command(about = "King-of-the-court rotation: replay sessions and manage history", long_about = None)]
struct Cli {
    /// Session key inside the document store
    #[arg(long, global = true, default_value = DEFAULT_SESSION_ID)]
    session: String,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Run a session script and print the events it produced
    Play {
        /// Script file, one command per line
        #[arg(long)]
        script: PathBuf,

        /// Rules JSON file (overrides --mode)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Rules preset: casual, 3x3, 5x5
        #[arg(long)]
        mode: Option<String>,

        /// Session document to resume from
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Write the final session document here
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Export the history of a session document
    Export {
        /// Session document
        #[arg(long)]
        snapshot: PathBuf,

        /// Output file (defaults to court-history-<date>.json)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Import a history export into a session document
    Import {
        /// Session document
        #[arg(long)]
        snapshot: PathBuf,

        /// History export file
        #[arg(long)]
        history: PathBuf,

        /// Add to the existing history instead of replacing it
        #[arg(long, default_value = "false")]
        append: bool,

        /// Output document (defaults to overwriting --snapshot)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print per-team standings and recent games
    Standings {
        /// Session document
        #[arg(long)]
        snapshot: PathBuf,

        #[arg(long, value_enum, default_value = "all")]
        filter: Filter,

        /// Recent games to list
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Print the JSON schema of the history export
    Schema,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Filter {
    All,
    Wins,
    Championships,
}

#[cfg(feature = "cli")]
impl From<Filter> for HistoryFilter {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::All => HistoryFilter::All,
            Filter::Wins => HistoryFilter::Wins,
            Filter::Championships => HistoryFilter::Championships,
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play { script, rules, mode, resume, out } => {
            let rules = court_cli::resolve_rules(rules.as_deref(), mode.as_deref())?;
            let document = resume.as_deref().map(court_cli::load_document).transpose()?;
            let mut session = court_cli::open_session(&cli.session, rules, document)?;

            let text = std::fs::read_to_string(&script)
                .with_context(|| format!("failed to read {}", script.display()))?;
            let steps = court_cli::parse(&text)?;
            let base_dir = script.parent().unwrap_or_else(|| Path::new("."));

            println!("Replaying {} step(s) from {}", steps.len(), script.display());
            for event in court_cli::replay(&mut session, &steps, base_dir)? {
                println!("{}", serde_json::to_string(&event)?);
            }
            print_court(&session);

            if let Some(out) = out {
                court_cli::save_document(&out, &session.store().document())?;
                println!("\nSession saved to: {}", out.display());
            }
        }

        Commands::Export { snapshot, out } => {
            let session = load_session(&cli.session, &snapshot)?;
            let export = session.export_history();
            let out = out.unwrap_or_else(|| PathBuf::from(HistoryExport::file_name(chrono::Utc::now())));

            std::fs::write(&out, export.to_json()?)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Exported {} game(s) to {}", export.game_history.len(), out.display());
        }

        Commands::Import { snapshot, history, append, out } => {
            let mut session = load_session(&cli.session, &snapshot)?;
            let json = std::fs::read_to_string(&history)
                .with_context(|| format!("failed to read {}", history.display()))?;
            let mode = if append { ImportMode::Append } else { ImportMode::Replace };

            let count = session.import_history(&json, mode)?;
            let out = out.unwrap_or(snapshot);
            court_cli::save_document(&out, &session.store().document())?;
            println!("Imported {} game(s) into {}", count, out.display());
        }

        Commands::Standings { snapshot, filter, limit } => {
            let session = load_session(&cli.session, &snapshot)?;
            let games = &session.snapshot().history;

            println!("{:<20} {:>4} {:>4} {:>6}", "Team", "W", "L", "Titles");
            for row in history::standings(games) {
                println!("{:<20} {:>4} {:>4} {:>6}", row.team, row.wins, row.losses, row.titles);
            }

            println!("\nRecent games ({} championships total):", history::championship_count(games));
            for record in history::recent(games, filter.into(), limit) {
                println!(
                    "  {} def. {} {} in {}",
                    record.winner,
                    record.loser,
                    record.score,
                    court_core::clock::format_clock(record.duration)
                );
            }
        }

        Commands::Schema => {
            let schema = schemars::schema_for!(HistoryExport);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn load_session(session_id: &str, path: &Path) -> Result<CourtSession> {
    let document = court_cli::load_document(path)?;
    let rules = court_cli::resolve_rules(None, None)?;
    court_cli::open_session(session_id, rules, Some(document))
}

#[cfg(feature = "cli")]
fn print_court(session: &CourtSession) {
    let snapshot = session.snapshot();
    let current = &snapshot.current_match;

    println!("\nOn court: {} vs {} ({})", current.team_a, current.team_b, current.score_line());
    println!("Clock:    {}", court_core::clock::format_clock(current.time_left));
    println!("Waiting:  {}", snapshot.queue.names().join(", "));
    if let Some(champion) = &snapshot.champion {
        println!("Champion: {}", champion);
    }
    if let Some(former) = &snapshot.former_champion {
        println!("Defending: {} ({} in a row)", former, snapshot.defense_streak);
    }
    println!("Games:    {}", snapshot.history.len());
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("court CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
