use std::sync::Arc;

use anyhow::Context;

use crate::{config::AppConfig, sim::Simulator, store::Store};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<Store>,
    pub simulator: Arc<Simulator>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env()?).await
    }

    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store = Store::open(&config.data_dir)
            .await
            .with_context(|| format!("open data directory {}", config.data_dir.display()))?;
        let simulator = Simulator::new(config.simulation_seed);
        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
            simulator: Arc::new(simulator),
        })
    }

    #[cfg(test)]
    pub async fn fake(data_dir: &std::path::Path) -> Self {
        let config = AppConfig {
            data_dir: data_dir.to_path_buf(),
            public_dir: None,
            simulation_seed: Some(42),
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
        };
        Self::from_config(config).await.expect("fake state")
    }
}
