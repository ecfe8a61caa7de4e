use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub public_dir: Option<PathBuf>,
    pub simulation_seed: Option<u64>,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")
                .context("missing required environment variable JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "inhalease".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "inhalease-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 30),
        };

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        let public_dir = std::env::var("PUBLIC_DIR").ok().map(PathBuf::from);
        let simulation_seed = match std::env::var("SIMULATION_SEED") {
            Ok(v) => Some(
                v.parse::<u64>()
                    .with_context(|| format!("SIMULATION_SEED must be an unsigned integer, got {v:?}"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            data_dir,
            public_dir,
            simulation_seed,
            jwt,
        })
    }
}
