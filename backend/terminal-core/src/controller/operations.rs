use crate::backend::{StorageVerdict, UiResponse, Verdict};
use crate::controller::outcome::{Fault, Outcome, RejectionSource};
use crate::controller::{Controller, FaultFlag, time_units};
use crate::error::backend::BackendError;

use models::storage::first_free_cell;
use models::{EvaluationSessionBuilder, EvaluationStage, Fineness, Spectrum, StorageCell};

use std::collections::BTreeMap;
use std::future::Future;

use log::{debug, error, info};
use serde_json::{Map, Value};
use tokio::time::{Instant, sleep as TokioSleep, timeout_at};

const STORAGE_ACCESS_FORBIDDEN_REASON: &str = "storage access forbidden on terminal";

/// Peripherals reported by the hardware health check.
const OPTIONAL_HARDWARE: [&str; 2] = ["my-pos-terminal", "my-printer"];

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvaluation {
    pub eval_id: u64,
    pub cell: StorageCell,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpectralReport {
    pub fineness: Fineness,
    pub spectrum: Spectrum,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HydroReport {
    pub dry_weight: f64,
    pub wet_weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinalReport {
    pub fineness: Fineness,
    /// Dry weight recorded for the session.
    pub weight: f64,
}

impl Controller {
    // ============================================
    // SIMULATION PRIMITIVES
    // ============================================

    /// Pays the simulated hardware cost, then checks the hardware flag.
    async fn access_hardware(&self, time_units: u32) -> Outcome<()> {
        let delay = self.multiplier.delay_for(time_units);
        if !delay.is_zero() {
            TokioSleep(delay).await;
        }
        if self.faults.is_set(FaultFlag::HardwareFailure) {
            return Err(Fault::HardwareFailure);
        }
        Ok(())
    }

    fn access_network(&self) -> Outcome<()> {
        if self.faults.is_set(FaultFlag::NetworkFailure) {
            return Err(Fault::NetworkUnavailable);
        }
        Ok(())
    }

    fn check_local_rejection(&self) -> Outcome<()> {
        if self.faults.is_set(FaultFlag::EvalRejection) {
            return Err(Fault::EvalRejected {
                origin: RejectionSource::Local,
            });
        }
        Ok(())
    }

    fn evaluation_deadline(&self) -> Instant {
        Instant::now() + self.budgets.evaluation
    }

    async fn call_backend<T, F>(&self, operation: &str, deadline: Instant, call: F) -> Outcome<T>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        match timeout_at(deadline, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!("Failed calling backend to {operation}: {e}");
                Err(Fault::NetworkUnavailable)
            }
            Err(_) => {
                error!("Backend call to {operation} timed out");
                Err(Fault::NetworkUnavailable)
            }
        }
    }

    fn session_field<T>(
        &self,
        read: impl FnOnce(&models::EvaluationSession) -> T,
    ) -> Outcome<T> {
        self.session().as_ref().map(read).ok_or(Fault::NoSession)
    }

    /// Applies `update` only if the session is still the one with `eval_id`.
    fn update_session(&self, eval_id: u64, update: impl FnOnce(&mut models::EvaluationSession)) {
        if let Some(session) = self.session().as_mut().filter(|s| s.eval_id == eval_id) {
            update(session);
        }
    }

    // ============================================
    // WINDOWS
    // ============================================

    pub async fn open_inlet(&self) -> Outcome<()> {
        self.access_hardware(time_units::OPEN_INLET).await
    }

    pub async fn close_inlet(&self) -> Outcome<()> {
        self.access_hardware(time_units::CLOSE_INLET).await
    }

    pub async fn close_outlet(&self) -> Outcome<()> {
        self.access_hardware(time_units::CLOSE_OUTLET).await
    }

    // ============================================
    // EVALUATION
    // ============================================

    /// Starts a new evaluation and assigns it the first free storage cell.
    ///
    /// Checks run in order: hardware, network, local no-room flag, backend
    /// occupancy, backend begin. A failure at any step stops the rest.
    pub async fn new_eval(&self) -> Outcome<NewEvaluation> {
        self.access_hardware(time_units::NEW_EVAL).await?;
        self.access_network()?;
        if self.faults.is_set(FaultFlag::StorageNoRoom) {
            return Err(Fault::NoStorageRoom);
        }

        let deadline = self.evaluation_deadline();

        let occupied = self
            .call_backend("get occupied cells", deadline, self.backend.occupied_cells())
            .await?;
        let cell = first_free_cell(&occupied).ok_or(Fault::NoStorageRoom)?;

        let eval_id = self
            .call_backend("begin a new evaluation", deadline, self.backend.new_eval())
            .await?;

        let sample = self.seed.generate(&mut rand::thread_rng());
        let session = EvaluationSessionBuilder::default()
            .with_eval_id(eval_id)
            .with_cell(cell.clone())
            .with_spectrum(sample.spectrum)
            .with_weights(sample.dry_weight, sample.wet_weight)
            .build()
            .map_err(|e| {
                error!("Backend began an unusable evaluation: {e}");
                Fault::NetworkUnavailable
            })?;

        *self.session() = Some(session);
        info!("Evaluation {eval_id} started, storage cell {cell}");

        Ok(NewEvaluation { eval_id, cell })
    }

    pub async fn spectral_eval(&self) -> Outcome<SpectralReport> {
        self.access_hardware(time_units::SPECTRAL_EVAL).await?;
        self.access_network()?;
        self.check_local_rejection()?;

        let (eval_id, spectrum) =
            self.session_field(|s| (s.eval_id, s.spectrum.clone()))?;

        let verdict = self
            .call_backend(
                "evaluate spectrum",
                self.evaluation_deadline(),
                self.backend.evaluate_spectrum(eval_id, &spectrum),
            )
            .await?;

        let Verdict::Accepted(fineness) = verdict else {
            return Err(Fault::EvalRejected {
                origin: RejectionSource::Backend,
            });
        };

        self.update_session(eval_id, |session| {
            session.fineness = Some(fineness.clone());
            session.stage = EvaluationStage::SpectrallyEvaluated;
        });

        Ok(SpectralReport { fineness, spectrum })
    }

    /// An unstable scale is reported ahead of network and rejection checks.
    pub async fn hydro_eval(&self) -> Outcome<HydroReport> {
        self.access_hardware(time_units::HYDRO_EVAL).await?;
        if self.faults.is_set(FaultFlag::UnstableScale) {
            return Err(Fault::UnstableScale);
        }
        self.access_network()?;
        self.check_local_rejection()?;

        let (eval_id, dry_weight, wet_weight) =
            self.session_field(|s| (s.eval_id, s.dry_weight, s.wet_weight))?;

        let verdict = self
            .call_backend(
                "evaluate hydro",
                self.evaluation_deadline(),
                self.backend.evaluate_hydro(eval_id, dry_weight, wet_weight),
            )
            .await?;

        if verdict == Verdict::Rejected {
            return Err(Fault::EvalRejected {
                origin: RejectionSource::Backend,
            });
        }

        self.update_session(eval_id, |session| {
            session.stage = EvaluationStage::HydroEvaluated;
        });

        Ok(HydroReport {
            dry_weight,
            wet_weight,
        })
    }

    /// Pure decision call: no hardware step.
    pub async fn finalize_eval(&self) -> Outcome<FinalReport> {
        self.access_network()?;
        self.check_local_rejection()?;

        let (eval_id, weight) = self.session_field(|s| (s.eval_id, s.dry_weight))?;

        let verdict = self
            .call_backend(
                "finalize evaluation",
                self.evaluation_deadline(),
                self.backend.finalize_evaluation(eval_id),
            )
            .await?;

        let Verdict::Accepted(fineness) = verdict else {
            return Err(Fault::EvalRejected {
                origin: RejectionSource::Backend,
            });
        };

        self.update_session(eval_id, |session| {
            session.fineness = Some(fineness.clone());
            session.stage = EvaluationStage::Finalized;
        });

        Ok(FinalReport { fineness, weight })
    }

    pub async fn return_after_spectrum_eval(&self, customer_choice: bool) -> Outcome<()> {
        self.return_item(customer_choice).await
    }

    pub async fn return_after_hydro_eval(&self, customer_choice: bool) -> Outcome<()> {
        self.return_item(customer_choice).await
    }

    async fn return_item(&self, customer_choice: bool) -> Outcome<()> {
        self.access_hardware(time_units::RETURN_ITEM).await?;
        debug!("Item returned (customer choice: {customer_choice})");
        if let Some(session) = self.session().as_mut() {
            session.stage = EvaluationStage::Returned;
        }
        Ok(())
    }

    /// Moves the item into the cell assigned when the evaluation started.
    pub async fn store_after_eval(&self) -> Outcome<StorageCell> {
        self.access_hardware(time_units::STORE_ITEM).await?;
        let mut session = self.session();
        let session = session.as_mut().ok_or(Fault::NoSession)?;
        session.stage = EvaluationStage::Stored;
        info!("Evaluation {} stored in {}", session.eval_id, session.cell);
        Ok(session.cell.clone())
    }

    pub async fn extract_from_storage(&self, cell: &StorageCell) -> Outcome<()> {
        self.access_hardware(time_units::EXTRACT_ITEM).await?;
        info!("Item extracted from {cell}");
        Ok(())
    }

    // ============================================
    // STORAGE OCCUPANCY
    // ============================================

    pub async fn occupy_storage_cell(
        &self,
        cell: &StorageCell,
        domain: &str,
        transaction_id: &str,
    ) -> Outcome<()> {
        self.access_network()?;
        if self.faults.is_set(FaultFlag::StorageAccessForbidden) {
            return Err(Fault::StorageForbidden {
                reason: STORAGE_ACCESS_FORBIDDEN_REASON.to_string(),
            });
        }

        let verdict = self
            .call_backend(
                "occupy storage cell",
                self.evaluation_deadline(),
                self.backend.occupy_storage_cell(domain, cell, transaction_id),
            )
            .await?;

        Self::storage_outcome(verdict)
    }

    pub async fn release_storage_cell(
        &self,
        cell: &StorageCell,
        domain: &str,
        transaction_id: &str,
        strict: bool,
    ) -> Outcome<()> {
        self.access_network()?;
        if self.faults.is_set(FaultFlag::StorageAccessForbidden) {
            return Err(Fault::StorageForbidden {
                reason: STORAGE_ACCESS_FORBIDDEN_REASON.to_string(),
            });
        }

        let verdict = self
            .call_backend(
                "release storage cell",
                self.evaluation_deadline(),
                self.backend
                    .release_storage_cell(domain, cell, transaction_id, strict),
            )
            .await?;

        Self::storage_outcome(verdict)
    }

    fn storage_outcome(verdict: StorageVerdict) -> Outcome<()> {
        match verdict {
            StorageVerdict::Granted => Ok(()),
            StorageVerdict::Forbidden { reason } => Err(Fault::StorageForbidden { reason }),
        }
    }

    // ============================================
    // INTEGRATION AND PERIPHERALS
    // ============================================

    /// Opaque pass-through to the backend's UI integration.
    pub async fn integration_ui_method(
        &self,
        method: &str,
        body: Map<String, Value>,
    ) -> Outcome<UiResponse> {
        self.access_network()?;
        self.call_backend(
            "call integration UI method",
            Instant::now() + self.budgets.integration,
            self.backend.integration_ui_method(method, body),
        )
        .await
    }

    /// Simulated peripheral call: echoes the request after the hardware delay.
    pub async fn optional_hardware_rpc(
        &self,
        module: &str,
        method: &str,
        request: Map<String, Value>,
    ) -> Outcome<Map<String, Value>> {
        self.access_hardware(time_units::HARDWARE_RPC).await?;
        debug!("Hardware RPC {module}.{method}");
        Ok(request)
    }

    pub fn optional_hardware_health(&self) -> BTreeMap<String, bool> {
        let healthy = !self.faults.is_set(FaultFlag::HardwareFailure);
        OPTIONAL_HARDWARE
            .iter()
            .map(|name| (name.to_string(), healthy))
            .collect()
    }

    pub fn internet_connectivity(&self) -> bool {
        self.access_network().is_ok()
    }

    pub fn has_storage(&self) -> bool {
        true
    }

    pub fn has_positional_storage(&self) -> bool {
        true
    }
}
