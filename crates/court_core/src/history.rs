//! Game history: export/import documents, filters and standings.

use crate::error::{CourtError, Result};
use crate::model::{GameRecord, RecordKind};
use chrono::{DateTime, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const EXPORT_VERSION: &str = "1.0";

/// Portable copy of a session's history
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryExport {
    pub game_history: Vec<GameRecord>,
    /// RFC 3339 time of export
    #[serde(default)]
    pub export_date: String,
    pub version: String,
}

impl HistoryExport {
    pub fn new(history: &[GameRecord], exported_at: DateTime<Utc>) -> Self {
        Self {
            game_history: history.to_vec(),
            export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: EXPORT_VERSION.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an export; any malformed record rejects the whole document
    pub fn parse(json: &str) -> Result<Self> {
        let export: HistoryExport = serde_json::from_str(json)
            .map_err(|e| CourtError::Import(format!("not a history export: {e}")))?;

        if !export.version.starts_with("1.") {
            return Err(CourtError::Import(format!(
                "unsupported export version '{}'",
                export.version
            )));
        }

        for (index, record) in export.game_history.iter().enumerate() {
            record
                .validate()
                .map_err(|reason| CourtError::Import(format!("record {index}: {reason}")))?;
        }

        Ok(export)
    }

    /// Conventional file name for an export taken at `exported_at`
    pub fn file_name(exported_at: DateTime<Utc>) -> String {
        format!("court-history-{}.json", exported_at.format("%Y-%m-%d"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Imported records become the history
    #[default]
    Replace,
    /// Imported records are added after the existing ones
    Append,
}

/// History after importing `imported` with `mode`
pub fn merge_import(
    existing: &[GameRecord],
    imported: Vec<GameRecord>,
    mode: ImportMode,
) -> Vec<GameRecord> {
    match mode {
        ImportMode::Replace => imported,
        ImportMode::Append => {
            let mut merged = existing.to_vec();
            merged.extend(imported);
            merged
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Wins,
    Championships,
}

impl HistoryFilter {
    pub fn matches(self, record: &GameRecord) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Wins => record.kind == RecordKind::Win,
            HistoryFilter::Championships => record.kind == RecordKind::Championship,
        }
    }
}

/// Newest first, filtered, at most `limit` records
pub fn recent(history: &[GameRecord], filter: HistoryFilter, limit: usize) -> Vec<&GameRecord> {
    history.iter().rev().filter(|r| filter.matches(r)).take(limit).collect()
}

pub fn championship_count(history: &[GameRecord]) -> usize {
    history.iter().filter(|r| r.is_championship()).count()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamRecord {
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    pub titles: u32,
}

/// Per-team totals, most titles first, then most wins, then fewest losses
pub fn standings(history: &[GameRecord]) -> Vec<TeamRecord> {
    let mut table: BTreeMap<&str, TeamRecord> = BTreeMap::new();
    let blank = |team: &str| TeamRecord { team: team.to_string(), wins: 0, losses: 0, titles: 0 };

    for record in history {
        let winner = table.entry(&record.winner).or_insert_with(|| blank(&record.winner));
        winner.wins += 1;
        if record.is_championship() {
            winner.titles += 1;
        }
        table.entry(&record.loser).or_insert_with(|| blank(&record.loser)).losses += 1;
    }

    let mut rows: Vec<TeamRecord> = table.into_values().collect();
    rows.sort_by(|a, b| {
        b.titles
            .cmp(&a.titles)
            .then(b.wins.cmp(&a.wins))
            .then(a.losses.cmp(&b.losses))
            .then(a.team.cmp(&b.team))
    });
    rows
}
