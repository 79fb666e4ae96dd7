//! Per-connection JSONRPC 2.0 codec.
//!
//! Each decoded request gets an internal sequence number. The client's `id`
//! (any JSON value, possibly absent) is parked under that number and put back
//! verbatim when the matching response is encoded.

use crate::error::codec::CodecError;
use crate::jsonrpc::error::RpcError;

use common::ErrorLocation;

use std::collections::HashMap;
use std::panic::Location;
use std::sync::{Mutex, PoisonError};

use serde_json::{Value, json};

pub const JSONRPC_VERSION: &str = "2.0";

/// Converts `"eval.new"` into `"EvalNew"`.
pub fn dispatch_name(method: &str) -> String {
    method
        .split('.')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRequest {
    pub seq: u64,
    /// Method as sent on the wire, e.g. `eval.new`.
    pub wire_method: String,
    /// Dispatch name, e.g. `EvalNew`.
    pub method: String,
    pub params: Value,
}

#[derive(Debug, Default)]
struct CodecState {
    seq: u64,
    pending: HashMap<u64, Option<Value>>,
}

/// Serves exactly one connection.
#[derive(Debug, Default)]
pub struct ServerCodec {
    state: Mutex<CodecState>,
}

impl ServerCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes one text frame.
    ///
    /// # Errors
    ///
    /// - [`CodecError::Parse`] if the frame is not JSON
    /// - [`CodecError::InvalidRequest`] if it is JSON but not a request object;
    ///   the client id is included when present
    pub fn decode_request(&self, text: &str) -> Result<DecodedRequest, CodecError> {
        let frame: Value = serde_json::from_str(text)?;

        let Value::Object(mut object) = frame else {
            return Err(CodecError::invalid_request("request must be an object", None));
        };

        let id = object.remove("id").filter(|id| !id.is_null());

        if let Some(version) = object.get("jsonrpc") {
            if *version != JSONRPC_VERSION {
                return Err(CodecError::InvalidRequest {
                    message: format!("unsupported jsonrpc version {version}"),
                    id,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        let wire_method = match object.remove("method") {
            Some(Value::String(method)) if !method.is_empty() => method,
            _ => {
                return Err(CodecError::invalid_request(
                    "method must be a non-empty string",
                    id,
                ));
            }
        };

        let params = object.remove("params").unwrap_or(Value::Null);

        let seq = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.seq += 1;
            let seq = state.seq;
            state.pending.insert(seq, id);
            seq
        };

        Ok(DecodedRequest {
            seq,
            method: dispatch_name(&wire_method),
            wire_method,
            params,
        })
    }

    /// Encodes the response to request `seq` and forgets its id.
    pub fn encode_response(&self, seq: u64, result: Result<Value, RpcError>) -> String {
        let id = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .remove(&seq)
            .flatten();

        Self::frame(id, result)
    }

    /// Encodes an error for a frame that never became a request.
    pub fn encode_error(&self, id: Option<Value>, error: RpcError) -> String {
        Self::frame(id, Err(error))
    }

    /// Number of decoded requests still awaiting a response.
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .len()
    }

    fn frame(id: Option<Value>, result: Result<Value, RpcError>) -> String {
        let id = id.unwrap_or(Value::Null);
        let frame = match result {
            Ok(result) => json!({"jsonrpc": JSONRPC_VERSION, "id": id, "result": result}),
            Err(error) => json!({"jsonrpc": JSONRPC_VERSION, "id": id, "error": error}),
        };
        frame.to_string()
    }
}

impl From<&CodecError> for RpcError {
    fn from(error: &CodecError) -> Self {
        match error {
            CodecError::Parse { message, .. } => RpcError::parse_error(message),
            CodecError::InvalidRequest { message, .. } => RpcError::invalid_request(message),
        }
    }
}
