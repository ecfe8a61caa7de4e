//! Synthetic air-quality and biometric generators.
//!
//! Nothing here touches a real sensor. City AQI comes from a stable string
//! hash; everything else is drawn from the shared [`Simulator`].

pub mod advisory;
pub mod exposure;
pub mod hash;
pub mod outlook;
pub mod prediction;

use std::sync::{Mutex, PoisonError};

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Discrete risk tier shared by exposure scores and predictions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskCategory {
    /// Tiers for the 0-100 personal exposure score.
    pub fn from_exposure_score(score: u32) -> Self {
        match score {
            s if s < 30 => RiskCategory::Low,
            s if s < 60 => RiskCategory::Moderate,
            s if s < 85 => RiskCategory::High,
            _ => RiskCategory::Critical,
        }
    }

    /// Tiers for the unrounded next-day prediction total.
    pub fn from_prediction_score(total: f64) -> Self {
        if total > 85.0 {
            RiskCategory::Critical
        } else if total > 65.0 {
            RiskCategory::High
        } else if total > 40.0 {
            RiskCategory::Moderate
        } else {
            RiskCategory::Low
        }
    }

    pub fn is_elevated(self) -> bool {
        matches!(self, RiskCategory::High | RiskCategory::Critical)
    }
}

/// Source of every random draw the API makes.
///
/// Seeding it makes a sequence of simulated responses reproducible.
pub struct Simulator {
    rng: Mutex<StdRng>,
}

impl Simulator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => {
                info!(seed, "simulation seeded");
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Runs `f` with exclusive access to the generator. Keep `f` synchronous.
    pub fn draw<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn exposure_tiers_have_exact_boundaries() {
        assert_eq!(RiskCategory::from_exposure_score(0), RiskCategory::Low);
        assert_eq!(RiskCategory::from_exposure_score(29), RiskCategory::Low);
        assert_eq!(RiskCategory::from_exposure_score(30), RiskCategory::Moderate);
        assert_eq!(RiskCategory::from_exposure_score(59), RiskCategory::Moderate);
        assert_eq!(RiskCategory::from_exposure_score(60), RiskCategory::High);
        assert_eq!(RiskCategory::from_exposure_score(84), RiskCategory::High);
        assert_eq!(RiskCategory::from_exposure_score(85), RiskCategory::Critical);
        assert_eq!(RiskCategory::from_exposure_score(100), RiskCategory::Critical);
    }

    #[test]
    fn prediction_tiers_are_strictly_above_threshold() {
        assert_eq!(RiskCategory::from_prediction_score(40.0), RiskCategory::Low);
        assert_eq!(RiskCategory::from_prediction_score(40.5), RiskCategory::Moderate);
        assert_eq!(RiskCategory::from_prediction_score(65.0), RiskCategory::Moderate);
        assert_eq!(RiskCategory::from_prediction_score(65.1), RiskCategory::High);
        assert_eq!(RiskCategory::from_prediction_score(85.0), RiskCategory::High);
        assert_eq!(RiskCategory::from_prediction_score(85.1), RiskCategory::Critical);
    }

    #[test]
    fn seeded_simulators_agree() {
        let a = Simulator::new(Some(7));
        let b = Simulator::new(Some(7));
        let xs: Vec<u32> = (0..5).map(|_| a.draw(|rng| rng.gen_range(0..1000))).collect();
        let ys: Vec<u32> = (0..5).map(|_| b.draw(|rng| rng.gen_range(0..1000))).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(2.005 + 0.001), 2.01);
    }
}
