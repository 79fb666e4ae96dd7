//! JSONRPC 2.0 framing.

pub mod codec;
pub mod error;

pub use codec::{DecodedRequest, JSONRPC_VERSION, ServerCodec, dispatch_name};
pub use error::RpcError;
