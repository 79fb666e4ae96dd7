//! JSONRPC request and result payloads.
//!
//! Result types follow a `{success, failure}` shape: exactly one member is
//! present, and the failure member names which check tripped.

use crate::evaluation::session::Spectrum;
use crate::fineness::Fineness;
use crate::storage::StorageCell;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_true() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ===========================================================================
// eval.new
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalNewSuccess {
    pub storage_cell: StorageCell,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalNewFailure {
    #[serde(default, skip_serializing_if = "is_false")]
    pub network_unavailable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hardware_check: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub no_storage_room: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalNewResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<EvalNewSuccess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<EvalNewFailure>,
}

impl EvalNewResult {
    pub fn success(storage_cell: StorageCell) -> Self {
        Self {
            success: Some(EvalNewSuccess { storage_cell }),
            failure: None,
        }
    }

    pub fn failure(failure: EvalNewFailure) -> Self {
        Self {
            success: None,
            failure: Some(failure),
        }
    }
}

// ===========================================================================
// eval.spectrum
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSpectrumSuccess {
    pub alloy: String,
    pub purity: f64,
    pub millesimal: u32,
    pub carat: String,
    pub spectrum: Spectrum,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalFailure {
    #[serde(default, skip_serializing_if = "is_false")]
    pub network_unavailable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub eval_rejected: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unstable_scale: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSpectrumResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<EvalSpectrumSuccess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<EvalFailure>,
}

impl EvalSpectrumResult {
    pub fn success(fineness: &Fineness, spectrum: Spectrum) -> Self {
        Self {
            success: Some(EvalSpectrumSuccess {
                alloy: fineness.alloy.clone(),
                purity: fineness.purity,
                millesimal: fineness.millesimal,
                carat: fineness.carat.clone(),
                spectrum,
            }),
            failure: None,
        }
    }

    pub fn failure(failure: EvalFailure) -> Self {
        Self {
            success: None,
            failure: Some(failure),
        }
    }
}

// ===========================================================================
// eval.hydro
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalHydroSuccess {
    pub alloy: String,
    pub purity: f64,
    pub millesimal: u32,
    pub carat: String,
    /// Dry weight of the item in grams.
    pub weight: f64,
    pub confidence: f64,
    pub risky: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalHydroResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<EvalHydroSuccess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<EvalFailure>,
}

impl EvalHydroResult {
    pub fn success(fineness: &Fineness, weight: f64) -> Self {
        Self {
            success: Some(EvalHydroSuccess {
                alloy: fineness.alloy.clone(),
                purity: fineness.purity,
                millesimal: fineness.millesimal,
                carat: fineness.carat.clone(),
                weight,
                confidence: fineness.confidence,
                risky: fineness.risky,
            }),
            failure: None,
        }
    }

    pub fn failure(failure: EvalFailure) -> Self {
        Self {
            success: None,
            failure: Some(failure),
        }
    }
}

// ===========================================================================
// eval.return / eval.store / storage.extract
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReturnRequest {
    #[serde(default = "default_true")]
    pub customer_choice: bool,
}

impl Default for EvalReturnRequest {
    fn default() -> Self {
        Self {
            customer_choice: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalStoreResult {
    pub storage_cell: StorageCell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageExtractRequest {
    pub cell: StorageCell,
}

// ===========================================================================
// storage.occupy / storage.release
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageOccupyRequest {
    pub cell: StorageCell,
    pub domain: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageReleaseRequest {
    pub cell: StorageCell,
    pub domain: String,
    pub transaction_id: String,
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageCellFailure {
    #[serde(default, skip_serializing_if = "is_false")]
    pub network_unavailable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub forbidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageCellResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<StorageCellFailure>,
}

impl StorageCellResult {
    pub fn granted() -> Self {
        Self {
            success: true,
            failure: None,
        }
    }

    pub fn network_unavailable() -> Self {
        Self {
            success: false,
            failure: Some(StorageCellFailure {
                network_unavailable: true,
                ..StorageCellFailure::default()
            }),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            failure: Some(StorageCellFailure {
                forbidden: true,
                reason: Some(reason.into()),
                ..StorageCellFailure::default()
            }),
        }
    }
}

// ===========================================================================
// call / hardware / status
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    pub method: String,
    #[serde(default)]
    pub body: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    pub http_status: u16,
    #[serde(default)]
    pub body: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareRequest {
    pub module: String,
    pub method: String,
    #[serde(default)]
    pub request: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResult {
    pub operational: bool,
    pub internet: bool,
    pub has_storage: bool,
    pub has_positional_storage: bool,
    /// Health per simulated peripheral.
    pub hardware: BTreeMap<String, bool>,
    /// Incremented each time the API binding is reset.
    pub api_generation: u64,
}
