use crate::fineness::Fineness;
use crate::storage::StorageCell;

use std::collections::BTreeMap;

use serde::Serialize;

/// Measured percentage per alloy symbol.
pub type Spectrum = BTreeMap<String, f64>;

/// Logical position of a session in the evaluation workflow.
///
/// Operations move the stage forward when they succeed; nothing rejects an
/// out-of-order call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStage {
    Created,
    SpectrallyEvaluated,
    HydroEvaluated,
    Finalized,
    Stored,
    Returned,
}

/// The single in-flight item evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSession {
    pub eval_id: u64,
    pub cell: StorageCell,
    pub spectrum: Spectrum,
    pub dry_weight: f64,
    pub wet_weight: f64,
    pub stage: EvaluationStage,
    /// Latest decision received from the backend, if any.
    pub fineness: Option<Fineness>,
}
