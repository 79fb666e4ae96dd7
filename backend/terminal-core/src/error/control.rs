use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ControlError {
    #[error("Unknown Command Error: {message} {location}")]
    UnknownCommand {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid Argument Error: {message} {location}")]
    InvalidArgument {
        message: String,
        location: ErrorLocation,
    },
}

impl ControlError {
    #[track_caller]
    pub fn unknown_command(message: impl Into<String>) -> Self {
        ControlError::UnknownCommand {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ControlError::InvalidArgument {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
