use std::{collections::HashSet, net::SocketAddr, time::Duration};

use anyhow::Context;
use reserve_setting_core::setting_change::{
    ChangeCatalog, EnrichmentPolicy, SettingChangeConfig,
};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Exchange names created at startup when missing.
    pub exchanges: Vec<String>,
    pub setting_change: SettingChangeConfig,
}

impl Config {
    /// Reads `RS_*` variables, loading a `.env` file first if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = lookup("RS_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid RS_LISTEN_ADDR")?;
        let db_path = lookup("RS_DB_PATH").unwrap_or_else(|| "./db/reserve.db".into());
        let cors_allow = lookup("RS_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let mut exchanges: Vec<String> = Vec::new();
        for name in lookup("RS_EXCHANGES").unwrap_or_default().split(',') {
            let name = name.trim();
            if !name.is_empty() && !exchanges.iter().any(|known| known == name) {
                exchanges.push(name.to_string());
            }
        }
        let timeout_ms: u64 = lookup("RS_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "30000".into())
            .parse()
            .unwrap_or(30000);

        let defaults = SettingChangeConfig::default();
        let singleton_catalogs: HashSet<ChangeCatalog> = match lookup("RS_SINGLETON_KINDS") {
            Some(value) => SettingChangeConfig::parse_singleton_catalogs(&value)
                .context("Invalid RS_SINGLETON_KINDS")?,
            None => defaults.singleton_catalogs,
        };
        let enrichment_policy = match lookup("RS_ENRICHMENT_POLICY") {
            Some(value) => value
                .parse::<EnrichmentPolicy>()
                .context("Invalid RS_ENRICHMENT_POLICY")?,
            None => defaults.enrichment_policy,
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            exchanges,
            setting_change: SettingChangeConfig {
                singleton_catalogs,
                enrichment_policy,
            },
        })
    }
}
