//! WebSocket server handle type.

use std::net::SocketAddr;

use log::{info, warn};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Handle to a running WebSocket server.
///
/// Returned by [`start_ws_server`](crate::ws::start_ws_server).
///
/// # Lifecycle
///
/// [`shutdown`](Self::shutdown) stops accepting new connections and waits for
/// the accept loop to exit. Dropping the handle stops the accept loop as well.
/// Connections already accepted run until their clients disconnect.
pub struct WsServerHandle {
    pub(crate) local_addr: SocketAddr,
    pub(crate) shutdown: Option<oneshot::Sender<()>>,
    pub(crate) accept_task: Option<JoinHandle<()>>,
}

impl WsServerHandle {
    /// Address the listener is bound to. Useful when binding port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(accept_task) = self.accept_task.take() {
            if let Err(e) = accept_task.await {
                warn!("WebSocket accept loop ended abnormally: {e}");
            }
        }
        info!("WebSocket server on {} stopped", self.local_addr);
    }
}
