use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    error::AppError,
    sim::{
        advisory::HealthAdvisory,
        exposure::{EnvironmentInputs, ExposureTrend, WearableReading},
        hash::DEFAULT_CITY,
        outlook::DailyOutlook,
        prediction::FactorOverrides,
        RiskCategory,
    },
    store::AqiRecord,
};

pub const DEFAULT_LATITUDE: f64 = 40.7128;
pub const DEFAULT_LONGITUDE: f64 = -74.0060;
pub const HISTORY_LIMIT: usize = 10;

fn resolve_city(city: Option<String>) -> String {
    city.map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CITY.to_string())
}

// `NaN` and `inf` parse as f64 but serialize as JSON null.
fn finite(name: &str, value: Option<f64>) -> Result<Option<f64>, AppError> {
    match value {
        Some(v) if !v.is_finite() => Err(AppError::Validation(format!(
            "{name} must be a finite number"
        ))),
        other => Ok(other),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

impl CityQuery {
    pub fn city(self) -> String {
        resolve_city(self.city)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LiveQuery {
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LiveQuery {
    pub fn city(&self) -> String {
        resolve_city(self.city.clone())
    }

    /// Requested coordinates, defaulting to New York.
    pub fn coordinates(&self) -> Result<(f64, f64), AppError> {
        let latitude = finite("latitude", self.latitude)?.unwrap_or(DEFAULT_LATITUDE);
        let longitude = finite("longitude", self.longitude)?.unwrap_or(DEFAULT_LONGITUDE);
        Ok((latitude, longitude))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictQuery {
    pub city: Option<String>,
    pub traffic_density: Option<f64>,
    pub urban_topology: Option<f64>,
    pub wind_speed: Option<f64>,
    pub temperature: Option<f64>,
}

impl PredictQuery {
    pub fn into_parts(self) -> Result<(String, FactorOverrides), AppError> {
        let overrides = FactorOverrides {
            traffic_density: finite("trafficDensity", self.traffic_density)?,
            urban_topology: finite("urbanTopology", self.urban_topology)?,
            wind_speed: finite("windSpeed", self.wind_speed)?,
            temperature: finite("temperature", self.temperature)?,
        };
        Ok((resolve_city(self.city), overrides))
    }
}

/// Placeholder reading shown before a user has any history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleReading {
    pub aqi: u32,
    pub pm25: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum History {
    Recorded(Vec<AqiRecord>),
    Sample(Vec<SampleReading>),
}

impl History {
    pub fn sample(now: OffsetDateTime) -> Self {
        History::Sample(vec![
            SampleReading {
                aqi: 45,
                pm25: 12,
                recorded_at: now - time::Duration::hours(24),
            },
            SampleReading {
                aqi: 52,
                pm25: 18,
                recorded_at: now - time::Duration::hours(48),
            },
        ])
    }
}

/// Response of `GET /api/aqi/advanced`.
#[derive(Debug, Serialize)]
pub struct AdvancedMetrics {
    pub wearable: WearableReading,
    pub env: EnvironmentInputs,
    pub score: u32,
    pub category: RiskCategory,
    pub forecast_score: u32,
    pub forecast_trend: ExposureTrend,
    pub recommendation: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryResponse {
    pub city: String,
    pub aqi: u32,
    #[serde(flatten)]
    pub advisory: HealthAdvisory,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlookResponse {
    pub city: String,
    pub current_aqi: u32,
    pub days: Vec<DailyOutlook>,
}
