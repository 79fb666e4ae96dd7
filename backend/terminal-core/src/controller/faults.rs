//! Fault-injection flags and the hardware business multiplier.
//!
//! Every flag is its own atomic; toggling one never touches another.

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Fixed-point scale of the stored multiplier.
pub const MULTIPLIER_SCALE: u64 = 1000;
pub const MULTIPLIER_MAX: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FaultFlag {
    ModuleBroken,
    HardwareFailure,
    NetworkFailure,
    StorageNoRoom,
    StorageAccessForbidden,
    EvalRejection,
    UnstableScale,
}

impl FaultFlag {
    pub const ALL: [FaultFlag; 7] = [
        FaultFlag::ModuleBroken,
        FaultFlag::HardwareFailure,
        FaultFlag::NetworkFailure,
        FaultFlag::StorageNoRoom,
        FaultFlag::StorageAccessForbidden,
        FaultFlag::EvalRejection,
        FaultFlag::UnstableScale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FaultFlag::ModuleBroken => "module broken",
            FaultFlag::HardwareFailure => "hardware failure",
            FaultFlag::NetworkFailure => "network failure",
            FaultFlag::StorageNoRoom => "storage no room",
            FaultFlag::StorageAccessForbidden => "storage access forbidden",
            FaultFlag::EvalRejection => "eval rejection",
            FaultFlag::UnstableScale => "unstable scale",
        }
    }
}

impl Display for FaultFlag {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
pub struct FaultFlags {
    module_broken: AtomicBool,
    hardware_failure: AtomicBool,
    network_failure: AtomicBool,
    storage_no_room: AtomicBool,
    storage_access_forbidden: AtomicBool,
    eval_rejection: AtomicBool,
    unstable_scale: AtomicBool,
}

impl FaultFlags {
    fn cell(&self, flag: FaultFlag) -> &AtomicBool {
        match flag {
            FaultFlag::ModuleBroken => &self.module_broken,
            FaultFlag::HardwareFailure => &self.hardware_failure,
            FaultFlag::NetworkFailure => &self.network_failure,
            FaultFlag::StorageNoRoom => &self.storage_no_room,
            FaultFlag::StorageAccessForbidden => &self.storage_access_forbidden,
            FaultFlag::EvalRejection => &self.eval_rejection,
            FaultFlag::UnstableScale => &self.unstable_scale,
        }
    }

    pub fn is_set(&self, flag: FaultFlag) -> bool {
        self.cell(flag).load(Ordering::SeqCst)
    }

    pub fn set(&self, flag: FaultFlag, value: bool) {
        self.cell(flag).store(value, Ordering::SeqCst);
    }

    /// Flips `flag` and returns its new state.
    pub fn toggle(&self, flag: FaultFlag) -> bool {
        !self.cell(flag).fetch_xor(true, Ordering::SeqCst)
    }

    pub fn clear_all(&self) {
        for flag in FaultFlag::ALL {
            self.set(flag, false);
        }
    }

    pub fn snapshot(&self) -> Vec<(FaultFlag, bool)> {
        FaultFlag::ALL
            .into_iter()
            .map(|flag| (flag, self.is_set(flag)))
            .collect()
    }
}

/// Scales every simulated hardware delay. Range `[0, 10]`, default 1.
#[derive(Debug)]
pub struct BusinessMultiplier(AtomicU64);

impl Default for BusinessMultiplier {
    fn default() -> Self {
        Self(AtomicU64::new(MULTIPLIER_SCALE))
    }
}

impl BusinessMultiplier {
    /// Stores `multiplier` clamped to `[0, 10]` and returns the stored value.
    ///
    /// NaN is treated as zero.
    pub fn set(&self, multiplier: f64) -> f64 {
        let clamped = if multiplier.is_nan() {
            0.0
        } else {
            multiplier.clamp(0.0, MULTIPLIER_MAX)
        };
        let scaled = (clamped * MULTIPLIER_SCALE as f64).round() as u64;
        self.0.store(scaled, Ordering::SeqCst);
        scaled as f64 / MULTIPLIER_SCALE as f64
    }

    pub fn get(&self) -> f64 {
        self.0.load(Ordering::SeqCst) as f64 / MULTIPLIER_SCALE as f64
    }

    /// `time_units × 1s × multiplier`.
    pub fn delay_for(&self, time_units: u32) -> Duration {
        let scaled = self.0.load(Ordering::SeqCst);
        Duration::from_millis(u64::from(time_units) * scaled * 1000 / MULTIPLIER_SCALE)
    }
}
