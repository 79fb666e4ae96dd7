//! Business-decision backend.
//!
//! The controller never decides fineness or storage occupancy itself; it asks
//! a [`BackendConnector`]. Two connectors exist: [`remote::RemoteBackend`]
//! talks to the business backend over mutual TLS, [`mock::MockBackend`]
//! answers from memory for standalone runs and tests.
//!
//! Connectors take no deadline argument. Callers bound each call with
//! `tokio::time::timeout`, which cancels the request by dropping its future.

pub mod mock;
pub mod remote;

use crate::error::backend::BackendError;

use models::{Fineness, OccupiedCells, Spectrum, StorageCell};

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Outcome of an evaluation step the backend may refuse.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict<T> {
    Accepted(T),
    Rejected,
}

/// Outcome of a storage occupancy change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageVerdict {
    Granted,
    Forbidden { reason: String },
}

impl StorageVerdict {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        StorageVerdict::Forbidden {
            reason: reason.into(),
        }
    }
}

/// Opaque reply of an integration UI call.
#[derive(Debug, Clone, PartialEq)]
pub struct UiResponse {
    pub http_status: u16,
    pub body: Map<String, Value>,
}

pub const REASON_ALREADY_OCCUPIED: &str = "already occupied";
pub const REASON_NOT_OCCUPIED: &str = "not occupied";
pub const REASON_WRONG_DOMAIN: &str = "cell is occupied under another domain";
pub const REASON_FORBIDDEN_BY_BACKEND: &str = "forbidden by business backend";
pub const REASON_NOT_IMPLEMENTED: &str = "not implemented";

#[async_trait]
pub trait BackendConnector: Send + Sync {
    /// Occupied cells keyed by domain.
    async fn occupied_cells(&self) -> Result<OccupiedCells, BackendError>;

    /// Starts an evaluation and returns its backend-assigned id.
    async fn new_eval(&self) -> Result<u64, BackendError>;

    async fn evaluate_spectrum(
        &self,
        eval_id: u64,
        spectrum: &Spectrum,
    ) -> Result<Verdict<Fineness>, BackendError>;

    async fn evaluate_hydro(
        &self,
        eval_id: u64,
        dry_weight: f64,
        wet_weight: f64,
    ) -> Result<Verdict<()>, BackendError>;

    async fn finalize_evaluation(&self, eval_id: u64) -> Result<Verdict<Fineness>, BackendError>;

    async fn occupy_storage_cell(
        &self,
        domain: &str,
        cell: &StorageCell,
        transaction_id: &str,
    ) -> Result<StorageVerdict, BackendError>;

    /// With `strict`, a cell held under a different domain is not released.
    async fn release_storage_cell(
        &self,
        domain: &str,
        cell: &StorageCell,
        transaction_id: &str,
        strict: bool,
    ) -> Result<StorageVerdict, BackendError>;

    async fn integration_ui_method(
        &self,
        method: &str,
        body: Map<String, Value>,
    ) -> Result<UiResponse, BackendError>;
}
