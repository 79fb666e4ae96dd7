//! Evaluation and storage state machine.
//!
//! The [`Controller`] owns the single evaluation session, the fault flags and
//! the hardware timing. Each operation pays its simulated hardware cost,
//! consults the flags relevant to it in a fixed order, and only then talks to
//! the backend.
//!
//! The session lock is held only to read or write session fields; it is never
//! held across a backend call or a hardware delay.

pub mod faults;
pub mod outcome;
pub mod seed;

mod operations;

pub use faults::{BusinessMultiplier, FaultFlag, FaultFlags};
pub use operations::{FinalReport, HydroReport, NewEvaluation, SpectralReport};
pub use outcome::{Fault, Outcome, RejectionSource};
pub use seed::{EvaluationSeed, GeneratedSample};

use crate::backend::BackendConnector;

use models::EvaluationSession;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{error, info, warn};

/// Simulated duration of each hardware step, in time units of one second.
pub mod time_units {
    pub const OPEN_INLET: u32 = 2;
    pub const CLOSE_INLET: u32 = 2;
    pub const CLOSE_OUTLET: u32 = 4;
    pub const NEW_EVAL: u32 = 1;
    pub const SPECTRAL_EVAL: u32 = 10;
    pub const HYDRO_EVAL: u32 = 10;
    pub const RETURN_ITEM: u32 = 6;
    pub const STORE_ITEM: u32 = 6;
    pub const EXTRACT_ITEM: u32 = 6;
    pub const HARDWARE_RPC: u32 = 3;
}

/// Deadlines for backend calls. Expiry is reported as a network failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallBudgets {
    pub evaluation: Duration,
    pub integration: Duration,
}

impl Default for CallBudgets {
    fn default() -> Self {
        Self {
            evaluation: Duration::from_secs(30),
            integration: Duration::from_secs(60),
        }
    }
}

pub struct Controller {
    backend: Arc<dyn BackendConnector>,
    faults: FaultFlags,
    multiplier: BusinessMultiplier,
    seed: EvaluationSeed,
    session: Mutex<Option<EvaluationSession>>,
    budgets: CallBudgets,
}

impl Controller {
    pub fn new(backend: Arc<dyn BackendConnector>) -> Self {
        Self {
            backend,
            faults: FaultFlags::default(),
            multiplier: BusinessMultiplier::default(),
            seed: EvaluationSeed::default(),
            session: Mutex::new(None),
            budgets: CallBudgets::default(),
        }
    }

    pub fn with_budgets(mut self, budgets: CallBudgets) -> Self {
        self.budgets = budgets;
        self
    }

    pub(crate) fn session(&self) -> MutexGuard<'_, Option<EvaluationSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current session, if any.
    pub fn current_session(&self) -> Option<EvaluationSession> {
        self.session().clone()
    }

    // ============================================
    // MODULE STATE
    // ============================================

    pub fn operational(&self) -> bool {
        !self.faults.is_set(FaultFlag::ModuleBroken)
    }

    /// Latches the module-broken flag. Cleared only by heal or reset.
    pub fn report_broken(&self, fault: &Fault) {
        self.faults.set(FaultFlag::ModuleBroken, true);
        error!("Module now is broken: {fault}");
    }

    // ============================================
    // CONTROL SURFACE
    // ============================================

    /// Clears all seven fault flags. The evaluation seed is left alone.
    pub fn heal_api(&self) {
        self.faults.clear_all();
        info!("All fault flags cleared");
    }

    /// Returns the multiplier actually stored after clamping.
    pub fn set_hardware_business_mult(&self, multiplier: f64) -> f64 {
        let stored = self.multiplier.set(multiplier);
        info!("Hardware business multiplier set to {stored}");
        stored
    }

    pub fn hardware_business_mult(&self) -> f64 {
        self.multiplier.get()
    }

    pub fn toggle(&self, flag: FaultFlag) -> bool {
        let enabled = self.faults.toggle(flag);
        if enabled {
            warn!("Fault flag '{flag}' enabled");
        } else {
            info!("Fault flag '{flag}' disabled");
        }
        enabled
    }

    pub fn toggle_fail_on_hardware_access(&self) -> bool {
        self.toggle(FaultFlag::HardwareFailure)
    }

    pub fn toggle_fail_on_network_access(&self) -> bool {
        self.toggle(FaultFlag::NetworkFailure)
    }

    pub fn toggle_fail_on_storage_room_check(&self) -> bool {
        self.toggle(FaultFlag::StorageNoRoom)
    }

    pub fn toggle_fail_on_storage_access(&self) -> bool {
        self.toggle(FaultFlag::StorageAccessForbidden)
    }

    pub fn toggle_eval_rejection(&self) -> bool {
        self.toggle(FaultFlag::EvalRejection)
    }

    pub fn toggle_weighing_scale_unstable(&self) -> bool {
        self.toggle(FaultFlag::UnstableScale)
    }

    pub fn toggle_module_broken(&self) -> bool {
        self.toggle(FaultFlag::ModuleBroken)
    }

    pub fn faults(&self) -> &FaultFlags {
        &self.faults
    }

    pub fn seed(&self) -> &EvaluationSeed {
        &self.seed
    }
}
