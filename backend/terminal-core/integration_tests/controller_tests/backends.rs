//! Connectors wrapping [`MockBackend`] to observe or perturb backend calls.

use terminal_core::backend::mock::MockBackend;
use terminal_core::backend::{BackendConnector, StorageVerdict, UiResponse, Verdict};
use terminal_core::error::backend::BackendError;

use models::{Fineness, OccupiedCells, Spectrum, StorageCell};

use std::future::pending;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Notify;

/// Counts every call, otherwise behaves like the mock.
#[derive(Debug, Default)]
pub struct CountingBackend {
    inner: MockBackend,
    calls: AtomicUsize,
    /// Spectrum, hydro and finalize answer `Rejected` while set.
    pub reject_evaluations: AtomicBool,
}

impl CountingBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn rejecting(&self) -> bool {
        self.reject_evaluations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendConnector for CountingBackend {
    async fn occupied_cells(&self) -> Result<OccupiedCells, BackendError> {
        self.count();
        self.inner.occupied_cells().await
    }

    async fn new_eval(&self) -> Result<u64, BackendError> {
        self.count();
        self.inner.new_eval().await
    }

    async fn evaluate_spectrum(
        &self,
        eval_id: u64,
        spectrum: &Spectrum,
    ) -> Result<Verdict<Fineness>, BackendError> {
        self.count();
        if self.rejecting() {
            return Ok(Verdict::Rejected);
        }
        self.inner.evaluate_spectrum(eval_id, spectrum).await
    }

    async fn evaluate_hydro(
        &self,
        eval_id: u64,
        dry_weight: f64,
        wet_weight: f64,
    ) -> Result<Verdict<()>, BackendError> {
        self.count();
        if self.rejecting() {
            return Ok(Verdict::Rejected);
        }
        self.inner.evaluate_hydro(eval_id, dry_weight, wet_weight).await
    }

    async fn finalize_evaluation(&self, eval_id: u64) -> Result<Verdict<Fineness>, BackendError> {
        self.count();
        if self.rejecting() {
            return Ok(Verdict::Rejected);
        }
        self.inner.finalize_evaluation(eval_id).await
    }

    async fn occupy_storage_cell(
        &self,
        domain: &str,
        cell: &StorageCell,
        transaction_id: &str,
    ) -> Result<StorageVerdict, BackendError> {
        self.count();
        self.inner.occupy_storage_cell(domain, cell, transaction_id).await
    }

    async fn release_storage_cell(
        &self,
        domain: &str,
        cell: &StorageCell,
        transaction_id: &str,
        strict: bool,
    ) -> Result<StorageVerdict, BackendError> {
        self.count();
        self.inner
            .release_storage_cell(domain, cell, transaction_id, strict)
            .await
    }

    async fn integration_ui_method(
        &self,
        method: &str,
        body: Map<String, Value>,
    ) -> Result<UiResponse, BackendError> {
        self.count();
        self.inner.integration_ui_method(method, body).await
    }
}

/// Holds `occupied_cells` until released, so a call can be caught mid-flight.
#[derive(Debug, Default)]
pub struct GatedBackend {
    inner: MockBackend,
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl BackendConnector for GatedBackend {
    async fn occupied_cells(&self) -> Result<OccupiedCells, BackendError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.occupied_cells().await
    }

    async fn new_eval(&self) -> Result<u64, BackendError> {
        self.inner.new_eval().await
    }

    async fn evaluate_spectrum(
        &self,
        eval_id: u64,
        spectrum: &Spectrum,
    ) -> Result<Verdict<Fineness>, BackendError> {
        self.inner.evaluate_spectrum(eval_id, spectrum).await
    }

    async fn evaluate_hydro(
        &self,
        eval_id: u64,
        dry_weight: f64,
        wet_weight: f64,
    ) -> Result<Verdict<()>, BackendError> {
        self.inner.evaluate_hydro(eval_id, dry_weight, wet_weight).await
    }

    async fn finalize_evaluation(&self, eval_id: u64) -> Result<Verdict<Fineness>, BackendError> {
        self.inner.finalize_evaluation(eval_id).await
    }

    async fn occupy_storage_cell(
        &self,
        domain: &str,
        cell: &StorageCell,
        transaction_id: &str,
    ) -> Result<StorageVerdict, BackendError> {
        self.inner.occupy_storage_cell(domain, cell, transaction_id).await
    }

    async fn release_storage_cell(
        &self,
        domain: &str,
        cell: &StorageCell,
        transaction_id: &str,
        strict: bool,
    ) -> Result<StorageVerdict, BackendError> {
        self.inner
            .release_storage_cell(domain, cell, transaction_id, strict)
            .await
    }

    async fn integration_ui_method(
        &self,
        method: &str,
        body: Map<String, Value>,
    ) -> Result<UiResponse, BackendError> {
        self.inner.integration_ui_method(method, body).await
    }
}

/// Answers every call after `latency`; with `None`, never answers.
#[derive(Debug, Default)]
pub struct SlowBackend {
    inner: MockBackend,
    latency: Option<Duration>,
}

impl SlowBackend {
    pub fn stalled() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            inner: MockBackend::new(),
            latency: Some(latency),
        }
    }

    async fn wait(&self) {
        match self.latency {
            Some(latency) => tokio::time::sleep(latency).await,
            None => pending::<()>().await,
        }
    }
}

#[async_trait]
impl BackendConnector for SlowBackend {
    async fn occupied_cells(&self) -> Result<OccupiedCells, BackendError> {
        self.wait().await;
        self.inner.occupied_cells().await
    }

    async fn new_eval(&self) -> Result<u64, BackendError> {
        self.wait().await;
        self.inner.new_eval().await
    }

    async fn evaluate_spectrum(
        &self,
        eval_id: u64,
        spectrum: &Spectrum,
    ) -> Result<Verdict<Fineness>, BackendError> {
        self.wait().await;
        self.inner.evaluate_spectrum(eval_id, spectrum).await
    }

    async fn evaluate_hydro(
        &self,
        eval_id: u64,
        dry_weight: f64,
        wet_weight: f64,
    ) -> Result<Verdict<()>, BackendError> {
        self.wait().await;
        self.inner.evaluate_hydro(eval_id, dry_weight, wet_weight).await
    }

    async fn finalize_evaluation(&self, eval_id: u64) -> Result<Verdict<Fineness>, BackendError> {
        self.wait().await;
        self.inner.finalize_evaluation(eval_id).await
    }

    async fn occupy_storage_cell(
        &self,
        domain: &str,
        cell: &StorageCell,
        transaction_id: &str,
    ) -> Result<StorageVerdict, BackendError> {
        self.wait().await;
        self.inner.occupy_storage_cell(domain, cell, transaction_id).await
    }

    async fn release_storage_cell(
        &self,
        domain: &str,
        cell: &StorageCell,
        transaction_id: &str,
        strict: bool,
    ) -> Result<StorageVerdict, BackendError> {
        self.wait().await;
        self.inner
            .release_storage_cell(domain, cell, transaction_id, strict)
            .await
    }

    async fn integration_ui_method(
        &self,
        method: &str,
        body: Map<String, Value>,
    ) -> Result<UiResponse, BackendError> {
        self.wait().await;
        self.inner.integration_ui_method(method, body).await
    }
}
