use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;

use crate::domain::FamilySeed;

pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub seed: FamilySeed,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let defaults = FamilySeed::default();

        let database_url = var("FAMILY_REWARDS_DATABASE_URL", "sqlite:family_rewards.db");

        let bind_addr = var("FAMILY_REWARDS_BIND_ADDR", "127.0.0.1:3000");
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .with_context(|| format!("Invalid FAMILY_REWARDS_BIND_ADDR: {}", bind_addr))?;

        let cors_origin = var("FAMILY_REWARDS_CORS_ORIGIN", "http://localhost:8080");
        let cors_origin = HeaderValue::from_str(&cors_origin)
            .with_context(|| format!("Invalid FAMILY_REWARDS_CORS_ORIGIN: {}", cors_origin))?;

        let max_children = match lookup("FAMILY_REWARDS_MAX_CHILDREN") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid FAMILY_REWARDS_MAX_CHILDREN: {}", raw))?,
            None => defaults.max_children,
        };

        let seed = FamilySeed {
            name: lookup("FAMILY_REWARDS_FAMILY_NAME").unwrap_or(defaults.name),
            timezone: lookup("FAMILY_REWARDS_TIMEZONE").unwrap_or(defaults.timezone),
            max_children,
        };

        Ok(Self {
            database_url,
            bind_addr,
            cors_origin,
            seed,
        })
    }
}
