//! Server configuration (environment driven).

use std::net::SocketAddr;

use anyhow::Context;

use catalog_infra::StoreConfig;

pub const BIND_ADDR_VAR: &str = "CATALOG_BIND_ADDR";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8724";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let raw_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("{BIND_ADDR_VAR} must be host:port, got {raw_addr:?}"))?;

        Ok(Self {
            bind_addr,
            store: StoreConfig::from_lookup(lookup)?,
        })
    }
}
