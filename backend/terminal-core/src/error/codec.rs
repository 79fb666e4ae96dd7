use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Failures while framing JSONRPC messages.
///
/// Decode failures still carry the client id when it could be recovered, so
/// the reply can be correlated.
#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("Parse Error: {message} {location}")]
    Parse {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid Request Error: {message} {location}")]
    InvalidRequest {
        message: String,
        id: Option<serde_json::Value>,
        location: ErrorLocation,
    },
}

impl CodecError {
    #[track_caller]
    pub fn invalid_request(message: impl Into<String>, id: Option<serde_json::Value>) -> Self {
        CodecError::InvalidRequest {
            message: message.into(),
            id,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        CodecError::Parse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
