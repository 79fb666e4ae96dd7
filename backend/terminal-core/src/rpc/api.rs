//! Shapes controller outcomes into JSONRPC results.
//!
//! A [`TerminalApi`] is one binding of the RPC surface to the controller. It
//! tracks where the customer is in the workflow so `eval.return` can pick the
//! right return path, and it is what a reset replaces.

use crate::controller::{Controller, Fault};
use crate::jsonrpc::RpcError;
use crate::rpc::method::RpcMethod;

use models::api::{
    CallRequest, CallResult, EvalFailure, EvalHydroResult, EvalNewFailure, EvalNewResult,
    EvalReturnRequest, EvalSpectrumResult, EvalStoreResult, HardwareRequest, HardwareResult,
    StatusResult, StorageCellResult, StorageExtractRequest, StorageOccupyRequest,
    StorageReleaseRequest,
};

use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Idle,
    Created,
    SpectrumEvaluated,
    HydroEvaluated,
}

pub struct TerminalApi {
    controller: Arc<Controller>,
    generation: u64,
    stage: Mutex<WorkflowStage>,
}

/// Reads request params.
///
/// Accepts a params object, a single-element array wrapping one, or nothing.
fn params<T: DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    let value = match params {
        Value::Null => Value::Object(Map::new()),
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    };
    serde_json::from_value(value).map_err(RpcError::invalid_params)
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(RpcError::internal)
}

impl TerminalApi {
    pub fn new(controller: Arc<Controller>, generation: u64) -> Self {
        Self {
            controller,
            generation,
            stage: Mutex::new(WorkflowStage::Idle),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn workflow_stage(&self) -> WorkflowStage {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_stage(&self, stage: WorkflowStage) {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner) = stage;
    }

    /// Maps a hardware-path fault, latching module-broken on hardware failure.
    fn hardware_fault(&self, fault: Fault) -> RpcError {
        if fault == Fault::HardwareFailure {
            self.controller.report_broken(&fault);
        }
        RpcError::from(&fault)
    }

    pub async fn invoke(&self, method: RpcMethod, raw_params: Value) -> Result<Value, RpcError> {
        if !method.allowed_when_broken() && !self.controller.operational() {
            warn!("Rejecting {method}: module is broken");
            return Err(RpcError::from(&Fault::ModuleBroken));
        }

        debug!("Dispatching {method} (binding {})", self.generation);

        match method {
            RpcMethod::InletOpen => self.inlet_open().await,
            RpcMethod::InletClose => self.inlet_close().await,
            RpcMethod::OutletClose => self.outlet_close().await,
            RpcMethod::EvalNew => to_result(&self.eval_new().await?),
            RpcMethod::EvalSpectrum => to_result(&self.eval_spectrum().await?),
            RpcMethod::EvalHydro => to_result(&self.eval_hydro().await?),
            RpcMethod::EvalReturn => self.eval_return(params(raw_params)?).await,
            RpcMethod::EvalStore => to_result(&self.eval_store().await?),
            RpcMethod::StorageExtract => self.storage_extract(params(raw_params)?).await,
            RpcMethod::StorageOccupy => {
                to_result(&self.storage_occupy(params(raw_params)?).await)
            }
            RpcMethod::StorageRelease => {
                to_result(&self.storage_release(params(raw_params)?).await)
            }
            RpcMethod::Status => to_result(&self.status()),
            RpcMethod::Call => to_result(&self.call(params(raw_params)?).await?),
            RpcMethod::Hardware => to_result(&self.hardware(params(raw_params)?).await),
        }
    }

    // ============================================
    // WINDOWS
    // ============================================

    pub async fn inlet_open(&self) -> Result<Value, RpcError> {
        self.controller
            .open_inlet()
            .await
            .map_err(|fault| self.hardware_fault(fault))?;
        Ok(Value::Null)
    }

    pub async fn inlet_close(&self) -> Result<Value, RpcError> {
        self.controller
            .close_inlet()
            .await
            .map_err(|fault| self.hardware_fault(fault))?;
        Ok(Value::Null)
    }

    pub async fn outlet_close(&self) -> Result<Value, RpcError> {
        self.controller
            .close_outlet()
            .await
            .map_err(|fault| self.hardware_fault(fault))?;
        Ok(Value::Null)
    }

    // ============================================
    // EVALUATION
    // ============================================

    /// A hardware failure here is reported in the result, not latched.
    pub async fn eval_new(&self) -> Result<EvalNewResult, RpcError> {
        match self.controller.new_eval().await {
            Ok(evaluation) => {
                self.set_stage(WorkflowStage::Created);
                Ok(EvalNewResult::success(evaluation.cell))
            }
            Err(Fault::HardwareFailure) => Ok(EvalNewResult::failure(EvalNewFailure {
                hardware_check: true,
                ..EvalNewFailure::default()
            })),
            Err(Fault::NetworkUnavailable) => Ok(EvalNewResult::failure(EvalNewFailure {
                network_unavailable: true,
                ..EvalNewFailure::default()
            })),
            Err(Fault::NoStorageRoom) => Ok(EvalNewResult::failure(EvalNewFailure {
                no_storage_room: true,
                ..EvalNewFailure::default()
            })),
            Err(fault) => Err(RpcError::from(&fault)),
        }
    }

    fn eval_failure(&self, fault: Fault) -> Result<EvalFailure, RpcError> {
        match fault {
            Fault::NetworkUnavailable => Ok(EvalFailure {
                network_unavailable: true,
                ..EvalFailure::default()
            }),
            Fault::EvalRejected { origin } => {
                debug!("Evaluation rejected by {origin}");
                Ok(EvalFailure {
                    eval_rejected: true,
                    ..EvalFailure::default()
                })
            }
            Fault::UnstableScale => Ok(EvalFailure {
                unstable_scale: true,
                ..EvalFailure::default()
            }),
            other => Err(self.hardware_fault(other)),
        }
    }

    pub async fn eval_spectrum(&self) -> Result<EvalSpectrumResult, RpcError> {
        match self.controller.spectral_eval().await {
            Ok(report) => {
                self.set_stage(WorkflowStage::SpectrumEvaluated);
                Ok(EvalSpectrumResult::success(&report.fineness, report.spectrum))
            }
            Err(fault) => self.eval_failure(fault).map(EvalSpectrumResult::failure),
        }
    }

    /// Hydrostatic weighing followed by finalization.
    pub async fn eval_hydro(&self) -> Result<EvalHydroResult, RpcError> {
        if let Err(fault) = self.controller.hydro_eval().await {
            return self.eval_failure(fault).map(EvalHydroResult::failure);
        }

        match self.controller.finalize_eval().await {
            Ok(report) => {
                self.set_stage(WorkflowStage::HydroEvaluated);
                Ok(EvalHydroResult::success(&report.fineness, report.weight))
            }
            Err(fault) => self.eval_failure(fault).map(EvalHydroResult::failure),
        }
    }

    pub async fn eval_return(&self, request: EvalReturnRequest) -> Result<Value, RpcError> {
        let outcome = match self.workflow_stage() {
            WorkflowStage::HydroEvaluated => {
                self.controller
                    .return_after_hydro_eval(request.customer_choice)
                    .await
            }
            _ => {
                self.controller
                    .return_after_spectrum_eval(request.customer_choice)
                    .await
            }
        };
        outcome.map_err(|fault| self.hardware_fault(fault))?;
        self.set_stage(WorkflowStage::Idle);
        Ok(Value::Null)
    }

    pub async fn eval_store(&self) -> Result<EvalStoreResult, RpcError> {
        let storage_cell = self
            .controller
            .store_after_eval()
            .await
            .map_err(|fault| self.hardware_fault(fault))?;
        self.set_stage(WorkflowStage::Idle);
        Ok(EvalStoreResult { storage_cell })
    }

    // ============================================
    // STORAGE
    // ============================================

    pub async fn storage_extract(&self, request: StorageExtractRequest) -> Result<Value, RpcError> {
        self.controller
            .extract_from_storage(&request.cell)
            .await
            .map_err(|fault| self.hardware_fault(fault))?;
        Ok(Value::Null)
    }

    fn storage_result(outcome: Result<(), Fault>) -> StorageCellResult {
        match outcome {
            Ok(()) => StorageCellResult::granted(),
            Err(Fault::StorageForbidden { reason }) => StorageCellResult::forbidden(reason),
            Err(_) => StorageCellResult::network_unavailable(),
        }
    }

    pub async fn storage_occupy(&self, request: StorageOccupyRequest) -> StorageCellResult {
        Self::storage_result(
            self.controller
                .occupy_storage_cell(&request.cell, &request.domain, &request.transaction_id)
                .await,
        )
    }

    pub async fn storage_release(&self, request: StorageReleaseRequest) -> StorageCellResult {
        Self::storage_result(
            self.controller
                .release_storage_cell(
                    &request.cell,
                    &request.domain,
                    &request.transaction_id,
                    request.strict,
                )
                .await,
        )
    }

    // ============================================
    // INTEGRATION, PERIPHERALS, STATUS
    // ============================================

    pub async fn call(&self, request: CallRequest) -> Result<CallResult, RpcError> {
        let response = self
            .controller
            .integration_ui_method(&request.method, request.body)
            .await
            .map_err(|fault| RpcError::from(&fault))?;
        Ok(CallResult {
            http_status: response.http_status,
            body: response.body,
        })
    }

    /// Peripheral failures are reported in `sub_error`, never as an RPC error.
    pub async fn hardware(&self, request: HardwareRequest) -> HardwareResult {
        match self
            .controller
            .optional_hardware_rpc(&request.module, &request.method, request.request)
            .await
        {
            Ok(result) => HardwareResult {
                result: Some(result),
                sub_error: None,
            },
            Err(fault) => HardwareResult {
                result: None,
                sub_error: Some(fault.to_string()),
            },
        }
    }

    pub fn status(&self) -> StatusResult {
        StatusResult {
            operational: self.controller.operational(),
            internet: self.controller.internet_connectivity(),
            has_storage: self.controller.has_storage(),
            has_positional_storage: self.controller.has_positional_storage(),
            hardware: self.controller.optional_hardware_health(),
            api_generation: self.generation,
        }
    }
}
