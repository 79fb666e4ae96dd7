//! Provisional evaluation data produced when a new evaluation starts.
//!
//! The spectrometer and scale are simulated: `NewEval` asks the seed for a
//! spectrum and a pair of weights. The alloy and target fineness can be pinned
//! from the control surface so a tester can steer the backend's answer.

use models::Spectrum;
use models::fineness::{GOLD, SILVER, alloy_density, purity_for_millesimal};

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use rand::Rng;

const RANDOM_PURITY_MIN: f64 = 0.375;
const RANDOM_PURITY_MAX: f64 = 0.9999;
const DRY_WEIGHT_GRAMS_MIN: f64 = 1.0;
const DRY_WEIGHT_GRAMS_MAX: f64 = 50.0;

/// Spectrum and weights of one simulated item.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSample {
    pub spectrum: Spectrum,
    pub dry_weight: f64,
    pub wet_weight: f64,
}

#[derive(Debug, Default)]
pub struct EvaluationSeed {
    silver: AtomicBool,
    /// 0 means random purity.
    target_millesimal: AtomicU32,
}

fn floor_hundredths(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}

impl EvaluationSeed {
    /// Flips between gold and silver; returns true when silver is now selected.
    pub fn toggle_silver(&self) -> bool {
        !self.silver.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn alloy(&self) -> &'static str {
        if self.silver.load(Ordering::SeqCst) {
            SILVER
        } else {
            GOLD
        }
    }

    /// Pins the generated purity to a millesimal grade, or 0 for random.
    ///
    /// Returns false and leaves the target unchanged for an unknown grade.
    pub fn set_target_millesimal(&self, millesimal: u32) -> bool {
        if millesimal != 0 && purity_for_millesimal(millesimal).is_none() {
            return false;
        }
        self.target_millesimal.store(millesimal, Ordering::SeqCst);
        true
    }

    pub fn target_millesimal(&self) -> u32 {
        self.target_millesimal.load(Ordering::SeqCst)
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> GeneratedSample {
        let alloy = self.alloy();

        let purity = purity_for_millesimal(self.target_millesimal()).unwrap_or_else(|| {
            let fraction = (RANDOM_PURITY_MIN + rng.r#gen::<f64>() * (1.0 - RANDOM_PURITY_MIN))
                .min(RANDOM_PURITY_MAX);
            (fraction * 10_000.0).floor() / 100.0
        });

        let dry_weight =
            floor_hundredths(rng.gen_range(DRY_WEIGHT_GRAMS_MIN..DRY_WEIGHT_GRAMS_MAX));
        let wet_weight = floor_hundredths(dry_weight - dry_weight / alloy_density(alloy));

        GeneratedSample {
            spectrum: Spectrum::from([(alloy.to_string(), purity)]),
            dry_weight,
            wet_weight,
        }
    }
}
