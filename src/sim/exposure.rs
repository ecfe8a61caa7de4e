//! Personalized exposure risk from simulated wearable and environment data.

use rand::Rng;
use serde::Serialize;

use super::{round2, RiskCategory};

/// One simulated reading from a respiratory wearable.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct WearableReading {
    pub breathing_rate_variability: f64,
    pub cough_frequency: u32,
    pub spo2: u32,
    pub airway_resistance: f64,
}

impl WearableReading {
    pub fn simulate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            breathing_rate_variability: round2(rng.gen_range(0.5..2.5)),
            cough_frequency: rng.gen_range(0..=10),
            spo2: rng.gen_range(92..=99),
            airway_resistance: round2(rng.gen_range(2.0..5.5)),
        }
    }
}

/// Environmental inputs reported next to the score.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct EnvironmentInputs {
    pub hyperlocal_aqi: u32,
    pub satellite_aod: f64,
    pub temperature: u32,
    pub humidity: u32,
    pub traffic_density: f64,
    pub urban_topology_risk: f64,
}

impl EnvironmentInputs {
    pub fn simulate<R: Rng + ?Sized>(hyperlocal_aqi: u32, rng: &mut R) -> Self {
        Self {
            hyperlocal_aqi,
            satellite_aod: round2(rng.gen_range(0.1..1.5)),
            temperature: rng.gen_range(15..=35),
            humidity: rng.gen_range(30..=80),
            traffic_density: round2(rng.gen_range(0.5..2.0)),
            urban_topology_risk: round2(rng.gen_range(0.8..1.5)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ExposureAssessment {
    pub score: u32,
    pub category: RiskCategory,
}

/// Half the score comes from air quality, half from biometrics; each half
/// saturates at 50.
pub fn exposure_score(aqi: f64, wearable: &WearableReading) -> u32 {
    let aqi_component = (aqi / 300.0 * 50.0).min(50.0);

    let spo2_penalty = (98.0 - f64::from(wearable.spo2)).max(0.0) * 2.0;
    let cough_penalty = f64::from(wearable.cough_frequency) * 1.5;
    let resistance_penalty = (wearable.airway_resistance - 2.0).max(0.0) * 5.0;
    let health_component = (spo2_penalty + cough_penalty + resistance_penalty).min(50.0);

    (aqi_component + health_component).clamp(0.0, 100.0).round() as u32
}

pub fn assess(aqi: f64, wearable: &WearableReading) -> ExposureAssessment {
    let score = exposure_score(aqi, wearable);
    ExposureAssessment {
        score,
        category: RiskCategory::from_exposure_score(score),
    }
}

pub fn recommendation(category: RiskCategory) -> &'static str {
    match category {
        RiskCategory::Low => {
            "Air quality is good and biometrics are stable. Safe for outdoor activities."
        }
        RiskCategory::Moderate => {
            "Air quality is moderate. Limit intense outdoor physical activity if you are sensitive."
        }
        RiskCategory::High => {
            "High exposure risk! Wear an N95 mask outdoors. Consider staying indoors."
        }
        RiskCategory::Critical => {
            "EMERGENCY: Respiratory metrics and air quality are at dangerous levels. Stay indoors immediately with purifiers on."
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExposureTrend {
    Increasing,
    Stable,
    Decreasing,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ExposureForecast {
    pub score: u32,
    pub trend: ExposureTrend,
}

/// Short-term drift of an exposure score, kept within `0..=100`.
pub fn forecast_exposure<R: Rng + ?Sized>(score: u32, rng: &mut R) -> ExposureForecast {
    let trend = match rng.gen_range(0..3) {
        0 => ExposureTrend::Increasing,
        1 => ExposureTrend::Stable,
        _ => ExposureTrend::Decreasing,
    };
    let score = score as i64;
    let next = match trend {
        ExposureTrend::Increasing => score + rng.gen_range(5..=15),
        ExposureTrend::Decreasing => score - rng.gen_range(5..=15),
        ExposureTrend::Stable => score + rng.gen_range(-2..=2),
    };
    ExposureForecast {
        score: next.clamp(0, 100) as u32,
        trend,
    }
}
