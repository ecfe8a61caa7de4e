//! Next-day AQI "prediction": the current value nudged by biological and
//! environmental risk terms.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::RiskCategory;

/// Caller-supplied factor values; anything missing is drawn at random.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FactorOverrides {
    pub traffic_density: Option<f64>,
    pub urban_topology: Option<f64>,
    pub wind_speed: Option<f64>,
    pub temperature: Option<f64>,
}

/// Factor values actually used for a prediction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PredictionFactors {
    pub traffic: f64,
    pub urbanization: f64,
    pub wind: f64,
    pub temperature: f64,
}

impl PredictionFactors {
    pub fn resolve<R: Rng + ?Sized>(overrides: FactorOverrides, rng: &mut R) -> Self {
        Self {
            traffic: overrides
                .traffic_density
                .unwrap_or_else(|| rng.gen_range(0.0..1.0)),
            urbanization: overrides
                .urban_topology
                .unwrap_or_else(|| rng.gen_range(0.7..1.0)),
            wind: overrides.wind_speed.unwrap_or_else(|| rng.gen_range(0.0..15.0)),
            temperature: overrides
                .temperature
                .unwrap_or_else(|| rng.gen_range(15.0..30.0)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Stable,
    Falling,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOutcome {
    pub city: String,
    pub predicted_aqi: u32,
    pub classification: RiskCategory,
    pub trend: Trend,
    pub factors: PredictionFactors,
}

/// Traffic, urban density, wind and temperature adjustment.
pub fn environmental_risk(f: &PredictionFactors) -> f64 {
    let mut risk = f.traffic * 10.0 + (f.urbanization - 0.9) * 25.0;

    if f.wind < 2.0 {
        risk += 5.0; // stagnant air
    } else if f.wind > 8.0 {
        risk -= 3.0;
    }

    if f.temperature > 25.0 {
        risk += 5.0;
    } else if f.temperature < 0.0 {
        risk += 3.0;
    }
    risk
}

pub fn predict<R: Rng + ?Sized>(
    city: &str,
    current_aqi: u32,
    overrides: FactorOverrides,
    rng: &mut R,
) -> PredictionOutcome {
    let factors = PredictionFactors::resolve(overrides, rng);

    // pollen, mold spores, pathogens
    let bio_risk: f64 = (0..3).map(|_| rng.gen_range(0.0..10.0)).sum();

    let total = (f64::from(current_aqi) + bio_risk + environmental_risk(&factors)).clamp(0.0, 100.0);
    let classification = RiskCategory::from_prediction_score(total);

    let coin: bool = rng.gen();
    let trend = match (classification.is_elevated(), coin) {
        (true, true) => Trend::Rising,
        (true, false) | (false, true) => Trend::Stable,
        (false, false) => Trend::Falling,
    };

    PredictionOutcome {
        city: city.to_string(),
        predicted_aqi: total.round() as u32,
        classification,
        trend,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn environmental_risk_bands() {
        let stagnant_hot = PredictionFactors {
            traffic: 0.5,
            urbanization: 0.9,
            wind: 1.0,
            temperature: 30.0,
        };
        assert!((environmental_risk(&stagnant_hot) - 15.0).abs() < 1e-9);

        let breezy_freezing = PredictionFactors {
            traffic: 0.0,
            urbanization: 0.7,
            wind: 12.0,
            temperature: -5.0,
        };
        assert!((environmental_risk(&breezy_freezing) - (-5.0)).abs() < 1e-9);

        let mild = PredictionFactors {
            traffic: 0.2,
            urbanization: 1.0,
            wind: 5.0,
            temperature: 20.0,
        };
        assert!((environmental_risk(&mild) - 4.5).abs() < 1e-9);
    }

    #[test]
    fn overrides_are_used_verbatim() {
        let overrides = FactorOverrides {
            traffic_density: Some(0.25),
            urban_topology: Some(0.8),
            wind_speed: Some(9.5),
            temperature: Some(12.0),
        };
        let mut rng = StdRng::seed_from_u64(1);
        let out = predict("Delhi", 30, overrides, &mut rng);
        assert_eq!(
            out.factors,
            PredictionFactors {
                traffic: 0.25,
                urbanization: 0.8,
                wind: 9.5,
                temperature: 12.0,
            }
        );
        assert_eq!(out.city, "Delhi");
    }

    #[test]
    fn score_is_clamped() {
        let mut rng = StdRng::seed_from_u64(9);
        for aqi in [0, 20, 60, 120, 199, 500] {
            for _ in 0..100 {
                let out = predict("x", aqi, FactorOverrides::default(), &mut rng);
                assert!(out.predicted_aqi <= 100);
            }
        }
        let out = predict("x", 199, FactorOverrides::default(), &mut rng);
        assert_eq!(out.predicted_aqi, 100);
        assert_eq!(out.classification, RiskCategory::Critical);
    }

    #[test]
    fn trend_leans_with_classification() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let high = predict("x", 150, FactorOverrides::default(), &mut rng);
            assert!(high.classification.is_elevated());
            assert_ne!(high.trend, Trend::Falling);
        }
        let calm = FactorOverrides {
            traffic_density: Some(0.0),
            urban_topology: Some(0.7),
            wind_speed: Some(10.0),
            temperature: Some(20.0),
        };
        for _ in 0..200 {
            // 0 + at most 30 bio - 8 env stays well under 40
            let low = predict("x", 0, calm, &mut rng);
            assert_eq!(low.classification, RiskCategory::Low);
            assert_ne!(low.trend, Trend::Rising);
        }
    }

    #[test]
    fn same_seed_same_prediction() {
        let a = predict("Paris", 80, FactorOverrides::default(), &mut StdRng::seed_from_u64(5));
        let b = predict("Paris", 80, FactorOverrides::default(), &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
