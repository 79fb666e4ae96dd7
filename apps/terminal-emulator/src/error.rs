use common::ErrorLocation;

use terminal_core::error::backend::BackendError;
use terminal_core::error::config::ConfigError;
use terminal_core::error::ws::WsError;

use std::panic::Location;

use thiserror::Error;

/// Errors that stop the emulator from starting or running.
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// Error from this app
    #[error("Emulator Error: {message} {location}")]
    Emulator {
        message: String,
        location: ErrorLocation,
    },

    /// Logger could not be set up
    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Ws(#[from] WsError),
}

impl EmulatorError {
    #[track_caller]
    pub fn emulator(message: impl Into<String>) -> Self {
        EmulatorError::Emulator {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn logger(message: impl Into<String>) -> Self {
        EmulatorError::Logger {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
