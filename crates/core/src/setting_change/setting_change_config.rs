use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::setting_change_model::ChangeCatalog;
use crate::errors::{Error, Result};

/// What to do when live trading info cannot be fetched while staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentPolicy {
    /// Fail the stage.
    #[default]
    Strict,
    /// Log and stage with the values supplied by the caller.
    BestEffort,
}

impl FromStr for EnrichmentPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "strict" => Ok(EnrichmentPolicy::Strict),
            "best_effort" => Ok(EnrichmentPolicy::BestEffort),
            other => Err(Error::InvalidConfigValue(format!(
                "unknown enrichment policy '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChangeConfig {
    /// Catalogs holding at most one pending change.
    pub singleton_catalogs: HashSet<ChangeCatalog>,
    pub enrichment_policy: EnrichmentPolicy,
}

impl Default for SettingChangeConfig {
    fn default() -> Self {
        Self {
            singleton_catalogs: ChangeCatalog::ALL
                .into_iter()
                .filter(|c| *c != ChangeCatalog::SettingChangeMain)
                .collect(),
            enrichment_policy: EnrichmentPolicy::default(),
        }
    }
}

impl SettingChangeConfig {
    pub fn is_singleton(&self, catalog: ChangeCatalog) -> bool {
        self.singleton_catalogs.contains(&catalog)
    }

    /// Parses a comma separated catalog list, e.g.
    /// `setting_change_target,setting_change_pwis`. An empty list disables
    /// singleton behaviour.
    pub fn parse_singleton_catalogs(value: &str) -> Result<HashSet<ChangeCatalog>> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<ChangeCatalog>()
                    .map_err(|_| Error::InvalidConfigValue(format!("unknown change catalog '{}'", s)))
            })
            .collect()
    }
}
