//! Court CLI Library
//!
//! Session documents on disk, script replay, history files

pub mod script;

use anyhow::{Context, Result};
use court_core::{
    CourtSession, DocumentStore, MemoryDocumentStore, RulesConfig, StoreDocument, SystemWallClock,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub use script::{parse, replay, Step};

/// Read a session document written by `save_document`
pub fn load_document(path: &Path) -> Result<StoreDocument> {
    let json =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    StoreDocument::from_json(&json)
        .with_context(|| format!("{} is not a session document", path.display()))
}

pub fn save_document(path: &Path, document: &StoreDocument) -> Result<()> {
    let json = document.to_json()?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Open a session, resuming `document` when one is given
pub fn open_session(
    session_id: &str,
    rules: RulesConfig,
    document: Option<StoreDocument>,
) -> Result<CourtSession> {
    let backend = Arc::new(MemoryDocumentStore::new());
    if let Some(document) = document {
        log::debug!("Seeding '{}' with document from {}", session_id, document.last_updated);
        backend.publish(session_id, &document)?;
    }
    let session = CourtSession::open(session_id, rules, Arc::new(SystemWallClock), backend)?;
    Ok(session)
}

/// Rules from a JSON file, a named preset, or `COURT_RULES_PATH`, in that order
pub fn resolve_rules(rules_file: Option<&Path>, mode: Option<&str>) -> Result<RulesConfig> {
    if let Some(path) = rules_file {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read rules {}", path.display()))?;
        return Ok(RulesConfig::from_json(&json)?);
    }
    if let Some(mode) = mode {
        return RulesConfig::preset(mode).with_context(|| format!("unknown game mode '{mode}'"));
    }
    Ok(court_core::rules_from_env()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use court_core::{HistoryExport, Side};
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_document_survives_a_save_and_resume() -> Result<()> {
        let mut session = open_session("court", RulesConfig::default(), None)?;
        session.join_queue("A")?;
        session.join_queue("B")?;
        session.start_rotation()?;

        let file = NamedTempFile::new()?;
        save_document(file.path(), &session.store().document())?;

        let resumed = open_session("court", RulesConfig::default(), Some(load_document(file.path())?))?;
        assert_eq!(resumed.snapshot(), session.snapshot());
        Ok(())
    }

    #[test]
    fn test_load_rejects_garbage() -> Result<()> {
        let file = NamedTempFile::new()?;
        fs::write(file.path(), "not json")?;
        assert!(load_document(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_rules_precedence() -> Result<()> {
        let file = NamedTempFile::new()?;
        fs::write(file.path(), r#"{"regulation_secs": 300}"#)?;

        let from_file = resolve_rules(Some(file.path()), Some("5x5"))?;
        assert_eq!(from_file.regulation_secs, 300);
        assert_eq!(resolve_rules(None, Some("3x3"))?, RulesConfig::three_on_three());
        assert!(resolve_rules(None, Some("pickleball")).is_err());
        Ok(())
    }

    #[test]
    fn test_script_import_reads_relative_path() -> Result<()> {
        let dir = tempdir()?;
        let mut source = open_session("court", RulesConfig::default(), None)?;
        source.set_teams("A", "B")?;
        source.add_points(Side::A, 3)?;
        source.request_resolution()?;
        source.run_pending();
        fs::write(dir.path().join("history.json"), source.export_history().to_json()?)?;

        let mut target = open_session("court", RulesConfig::default(), None)?;
        let steps = parse("import history.json\nimport history.json append\n")?;
        replay(&mut target, &steps, dir.path())?;
        assert_eq!(target.snapshot().history.len(), 2);

        let parsed = HistoryExport::parse(&source.export_history().to_json()?)?;
        assert_eq!(parsed.game_history[0].winner, "A");
        Ok(())
    }
}
