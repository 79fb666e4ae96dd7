//! Method dispatch between the transport and the controller.
//!
//! [`RpcAdapter`] is shared by every connection. It counts calls in flight and
//! refuses to [`reset`](RpcAdapter::reset) while any exist, so a reset never
//! swaps the [`TerminalApi`] binding under a running call.

mod adapter;
mod api;
mod method;

pub use adapter::RpcAdapter;
pub use api::{TerminalApi, WorkflowStage};
pub use method::RpcMethod;
