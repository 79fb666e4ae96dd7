//! In-memory connector.
//!
//! Classifies whatever single spectrum entry it receives, remembers the result
//! for finalization, and keeps its own cell occupancy map.

use crate::backend::{
    BackendConnector, REASON_ALREADY_OCCUPIED, REASON_NOT_OCCUPIED, REASON_WRONG_DOMAIN,
    StorageVerdict, UiResponse, Verdict,
};
use crate::error::backend::BackendError;

use common::HttpStatusCode;
use models::{Fineness, OccupiedCells, Spectrum, StorageCell};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use log::debug;
use serde_json::{Map, Value};

/// Confidence reported for every mock classification.
pub const MOCK_CONFIDENCE: f64 = 0.98;

#[derive(Debug, Default)]
pub struct MockBackend {
    eval_counter: AtomicU64,
    last_eval: Mutex<Option<Fineness>>,
    /// cell address -> domain
    occupied: Mutex<HashMap<String, String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn occupied(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.occupied.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn last_eval(&self) -> MutexGuard<'_, Option<Fineness>> {
        self.last_eval.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BackendConnector for MockBackend {
    async fn occupied_cells(&self) -> Result<OccupiedCells, BackendError> {
        let mut domains = OccupiedCells::new();
        for (cell, domain) in self.occupied().iter() {
            domains.entry(domain.clone()).or_default().push(cell.clone());
        }
        Ok(domains)
    }

    async fn new_eval(&self) -> Result<u64, BackendError> {
        Ok(self.eval_counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn evaluate_spectrum(
        &self,
        eval_id: u64,
        spectrum: &Spectrum,
    ) -> Result<Verdict<Fineness>, BackendError> {
        let (alloy, purity) = spectrum
            .iter()
            .next_back()
            .map(|(alloy, purity)| (alloy.as_str(), *purity))
            .unwrap_or(("", 0.0));

        let fineness = Fineness::classify(alloy, purity, MOCK_CONFIDENCE);
        debug!("Mock evaluation {eval_id}: {alloy} {purity} -> {}", fineness.millesimal);

        *self.last_eval() = Some(fineness.clone());
        Ok(Verdict::Accepted(fineness))
    }

    async fn evaluate_hydro(
        &self,
        _eval_id: u64,
        _dry_weight: f64,
        _wet_weight: f64,
    ) -> Result<Verdict<()>, BackendError> {
        Ok(Verdict::Accepted(()))
    }

    async fn finalize_evaluation(&self, eval_id: u64) -> Result<Verdict<Fineness>, BackendError> {
        self.last_eval()
            .clone()
            .map(Verdict::Accepted)
            .ok_or_else(|| BackendError::server(format!("evaluation {eval_id} has no spectrum")))
    }

    async fn occupy_storage_cell(
        &self,
        domain: &str,
        cell: &StorageCell,
        _transaction_id: &str,
    ) -> Result<StorageVerdict, BackendError> {
        let mut occupied = self.occupied();
        if occupied.contains_key(cell.as_str()) {
            return Ok(StorageVerdict::forbidden(REASON_ALREADY_OCCUPIED));
        }
        occupied.insert(cell.to_string(), domain.to_string());
        Ok(StorageVerdict::Granted)
    }

    async fn release_storage_cell(
        &self,
        domain: &str,
        cell: &StorageCell,
        _transaction_id: &str,
        strict: bool,
    ) -> Result<StorageVerdict, BackendError> {
        let mut occupied = self.occupied();
        match occupied.get(cell.as_str()) {
            None => Ok(StorageVerdict::forbidden(REASON_NOT_OCCUPIED)),
            Some(holder) if strict && holder != domain => {
                Ok(StorageVerdict::forbidden(REASON_WRONG_DOMAIN))
            }
            Some(_) => {
                occupied.remove(cell.as_str());
                Ok(StorageVerdict::Granted)
            }
        }
    }

    async fn integration_ui_method(
        &self,
        _method: &str,
        body: Map<String, Value>,
    ) -> Result<UiResponse, BackendError> {
        Ok(UiResponse {
            http_status: HttpStatusCode::OK.0,
            body,
        })
    }
}
