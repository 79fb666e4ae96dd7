//! Terminal-side controller of the item-evaluation kiosk.
//!
//! Requests flow top to bottom through these layers:
//!
//! - [`ws`]: WebSocket transport, one task per connection
//! - [`jsonrpc`]: JSONRPC 2.0 framing and id correlation
//! - [`rpc`]: method dispatch, in-flight accounting and the reset gate
//! - [`controller`]: session state machine, fault flags, hardware timing
//! - [`backend`]: business decisions, remote or mocked

pub mod backend;
pub mod config;
pub mod control;
pub mod controller;
pub mod error;
pub mod jsonrpc;
pub mod rpc;
pub mod ws;

#[cfg(test)]
mod tests;

pub const WS_PATH: &str = "/ws";
pub const DEFAULT_WS_PORT: u16 = 8080;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const USER_AGENT: &str =
    const_format::concatcp!("terminal-emulator/", env!("CARGO_PKG_VERSION"));
