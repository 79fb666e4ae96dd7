use crate::controller::Fault;

use std::fmt::{Display, Formatter, Result as FormatResult};

use serde::{Deserialize, Serialize};

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
pub const MODULE_BROKEN: i64 = -32001;
pub const HARDWARE_FAILURE: i64 = -32002;
pub const NETWORK_UNAVAILABLE: i64 = -32003;
pub const NO_SESSION: i64 = -32004;

/// The `error` member of a JSONRPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn parse_error(message: impl Display) -> Self {
        Self::new(PARSE_ERROR, format!("parse error: {message}"))
    }

    pub fn invalid_request(message: impl Display) -> Self {
        Self::new(INVALID_REQUEST, format!("invalid request: {message}"))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("method not found: {method}"))
    }

    pub fn invalid_params(message: impl Display) -> Self {
        Self::new(INVALID_PARAMS, format!("invalid params: {message}"))
    }

    pub fn internal(message: impl Display) -> Self {
        Self::new(INTERNAL_ERROR, format!("internal error: {message}"))
    }
}

impl From<&Fault> for RpcError {
    fn from(fault: &Fault) -> Self {
        let code = match fault {
            Fault::ModuleBroken => MODULE_BROKEN,
            Fault::HardwareFailure | Fault::UnstableScale => HARDWARE_FAILURE,
            Fault::NetworkUnavailable => NETWORK_UNAVAILABLE,
            Fault::NoSession => NO_SESSION,
            Fault::NoStorageRoom
            | Fault::StorageForbidden { .. }
            | Fault::EvalRejected { .. } => INTERNAL_ERROR,
        };
        Self::new(code, fault.to_string())
    }
}

impl Display for RpcError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{} ({})", self.message, self.code)
    }
}
