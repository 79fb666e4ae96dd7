use std::fmt::{Display, Formatter, Result as FormatResult};

use thiserror::Error as ThisError;

/// Which layer refused an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionSource {
    /// The local eval-rejection flag was set.
    Local,
    /// The backend returned a reject.
    Backend,
}

impl Display for RejectionSource {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            RejectionSource::Local => formatter.write_str("terminal"),
            RejectionSource::Backend => formatter.write_str("backend"),
        }
    }
}

/// Why a controller operation did not succeed.
///
/// These are expected business and simulation outcomes, returned as values.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Fault {
    #[error("emulated hardware failure")]
    HardwareFailure,

    #[error("network unavailable")]
    NetworkUnavailable,

    #[error("no storage room")]
    NoStorageRoom,

    #[error("storage access forbidden: {reason}")]
    StorageForbidden { reason: String },

    #[error("evaluation rejected by {origin}")]
    EvalRejected { origin: RejectionSource },

    #[error("weighing scale is unstable")]
    UnstableScale,

    #[error("module is broken")]
    ModuleBroken,

    #[error("no evaluation in progress")]
    NoSession,
}

pub type Outcome<T> = Result<T, Fault>;
