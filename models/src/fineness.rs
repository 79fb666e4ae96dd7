//! Purity classification shared by every backend connector.
//!
//! The millesimal table and carat rounding must give identical answers no
//! matter which connector produced the purity, so both live here as pure
//! functions.

use serde::{Deserialize, Serialize};

/// Spectrum symbol for gold.
pub const GOLD: &str = "au";

/// Spectrum symbol for silver.
pub const SILVER: &str = "ag";

/// Millesimal value for a purity below every threshold.
pub const UNCLASSIFIED_MILLESIMAL: u32 = 0;

/// Confidence below which a result is flagged as risky.
pub const RISKY_CONFIDENCE_THRESHOLD: f64 = 0.88;

/// Lower purity bound (percent) for each millesimal grade, highest first.
const MILLESIMAL_GRADES: [(f64, u32); 6] = [
    (99.90, 9999),
    (97.00, 999),
    (90.00, 925),
    (70.00, 750),
    (50.00, 585),
    (37.00, 375),
];

/// Representative purity for each grade, used when seeding a target fineness.
const GRADE_PURITY: [(u32, f64); 6] = [
    (9999, 99.99),
    (999, 99.50),
    (925, 92.50),
    (750, 75.00),
    (585, 58.50),
    (375, 37.50),
];

/// Maps a purity percentage onto its millesimal grade.
pub fn millesimal_for_purity(purity: f64) -> u32 {
    MILLESIMAL_GRADES
        .iter()
        .find(|(lower, _)| purity >= *lower)
        .map(|(_, grade)| *grade)
        .unwrap_or(UNCLASSIFIED_MILLESIMAL)
}

/// Carat label: `ceil(purity * 24 / 100)` followed by `K`.
pub fn carat_label(purity: f64) -> String {
    format!("{}K", (purity * 24.0 / 100.0).ceil() as i64)
}

/// Purity that classifies back into `millesimal`, if it is a known grade.
pub fn purity_for_millesimal(millesimal: u32) -> Option<f64> {
    GRADE_PURITY
        .iter()
        .find(|(grade, _)| *grade == millesimal)
        .map(|(_, purity)| *purity)
}

/// Density in g/cm³ of the primary alloy, used to derive the wet weight.
pub fn alloy_density(alloy: &str) -> f64 {
    match alloy {
        SILVER => 10.49,
        _ => 19.3,
    }
}

/// Final decision about an item's alloy and fineness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fineness {
    pub alloy: String,
    pub purity: f64,
    pub millesimal: u32,
    pub carat: String,
    pub confidence: f64,
    pub risky: bool,
}

impl Fineness {
    /// Derives millesimal, carat and the risk flag from a purity reading.
    pub fn classify(alloy: impl Into<String>, purity: f64, confidence: f64) -> Self {
        Self {
            alloy: alloy.into(),
            purity,
            millesimal: millesimal_for_purity(purity),
            carat: carat_label(purity),
            confidence,
            risky: confidence < RISKY_CONFIDENCE_THRESHOLD,
        }
    }
}
