use super::RulesConfig;
use crate::error::{CourtError, Result};
use std::{env, fs};

pub const RULES_PATH_ENV: &str = "COURT_RULES_PATH";

/// Rules named by `COURT_RULES_PATH`, or the defaults when it is unset or blank.
pub fn rules_from_env() -> Result<RulesConfig> {
    let Ok(path) = env::var(RULES_PATH_ENV) else {
        return Ok(RulesConfig::default());
    };

    let path = path.trim();
    if path.is_empty() {
        return Ok(RulesConfig::default());
    }

    load_rules_file(path)
}

pub(crate) fn load_rules_file(path: &str) -> Result<RulesConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        CourtError::InvalidConfig(format!(
            "failed to read rules file from {RULES_PATH_ENV}='{path}': {e}"
        ))
    })?;

    let rules = RulesConfig::from_json(&content)?;
    log::info!(
        "Loaded court rules from '{}' ({}s regulation, {}s overtime)",
        path,
        rules.regulation_secs,
        rules.overtime_secs
    );
    Ok(rules)
}
