//! WebSocket transport for the JSONRPC surface.
//!
//! - Text frames only; each carries one JSONRPC request or response
//! - One task per connection, requests answered strictly in receipt order
//! - Upgrades on any path but the configured one are refused with 404

mod handle;
mod server;

pub use handle::WsServerHandle;
pub use server::start_ws_server;
