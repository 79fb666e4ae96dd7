use common::ErrorLocation;

use std::io::Error as IoError;
use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BackendError {
    #[error("HTTP Error: {message} {location}")]
    Http {
        message: String,
        location: ErrorLocation,
    },

    #[error("JSON Error: {message} {location}")]
    Json {
        message: String,
        location: ErrorLocation,
    },

    #[error("URL Parse Error: {message} {location}")]
    UrlParse {
        message: String,
        location: ErrorLocation,
    },

    #[error("TLS Error: {message} {location}")]
    Tls {
        message: String,
        location: ErrorLocation,
    },

    #[error("Server Error: {message} {location}")]
    Server {
        message: String,
        location: ErrorLocation,
    },

    #[error("Unknown Domain Error: {domain} {location}")]
    UnknownDomain {
        domain: String,
        location: ErrorLocation,
    },

    #[error("Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },
}

impl BackendError {
    #[track_caller]
    pub fn server(message: impl Into<String>) -> Self {
        BackendError::Server {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn tls(message: impl Into<String>) -> Self {
        BackendError::Tls {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<url::ParseError> for BackendError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        BackendError::UrlParse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        BackendError::Http {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for BackendError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        BackendError::Json {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<IoError> for BackendError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        BackendError::Tls {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
