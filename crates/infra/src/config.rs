//! Configuration loading and representation.

use std::path::Path;

use anyhow::Context;

use crate::store::MissingIdPolicy;

pub const DATABASE_URL_VAR: &str = "CATALOG_DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "CATALOG_MAX_CONNECTIONS";
pub const MISSING_ID_POLICY_VAR: &str = "CATALOG_MISSING_ID_POLICY";

const DEFAULT_DATABASE_URL: &str = "sqlite://database_catalog.sqlite3";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Product store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub missing_id: MissingIdPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            missing_id: MissingIdPolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Default settings pointed at a SQLite file.
    pub fn sqlite_file(path: impl AsRef<Path>) -> Self {
        Self {
            database_url: format!("sqlite://{}", path.as_ref().to_string_lossy()),
            ..Self::default()
        }
    }

    /// Read settings from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_VAR) {
            config.database_url = url;
        }

        if let Some(raw) = lookup(MAX_CONNECTIONS_VAR) {
            let max = raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("{MAX_CONNECTIONS_VAR} must be a positive integer, got {raw:?}"))?;
            anyhow::ensure!(max > 0, "{MAX_CONNECTIONS_VAR} must be at least 1");
            config.max_connections = max;
        }

        if let Some(raw) = lookup(MISSING_ID_POLICY_VAR) {
            config.missing_id = raw
                .parse::<MissingIdPolicy>()
                .with_context(|| format!("invalid {MISSING_ID_POLICY_VAR}"))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.missing_id, MissingIdPolicy::Ignore);
    }

    #[test]
    fn reads_every_setting() {
        let config = StoreConfig::from_lookup(lookup(&[
            (DATABASE_URL_VAR, "sqlite://other.sqlite3"),
            (MAX_CONNECTIONS_VAR, "12"),
            (MISSING_ID_POLICY_VAR, "reject"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "sqlite://other.sqlite3");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.missing_id, MissingIdPolicy::Reject);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(StoreConfig::from_lookup(lookup(&[(MAX_CONNECTIONS_VAR, "lots")])).is_err());
        assert!(StoreConfig::from_lookup(lookup(&[(MAX_CONNECTIONS_VAR, "0")])).is_err());
        assert!(StoreConfig::from_lookup(lookup(&[(MISSING_ID_POLICY_VAR, "maybe")])).is_err());
    }

    #[test]
    fn sqlite_file_builds_a_url() {
        let config = StoreConfig::sqlite_file("/tmp/catalog.sqlite3");
        assert_eq!(config.database_url, "sqlite:///tmp/catalog.sqlite3");
    }
}
