//! Wires the configured backend, controller, adapter and server together.

use crate::error::EmulatorError;

use terminal_core::backend::BackendConnector;
use terminal_core::backend::mock::MockBackend;
use terminal_core::backend::remote::RemoteBackend;
use terminal_core::config::{BackendConfig, EmulatorConfig};
use terminal_core::controller::Controller;
use terminal_core::rpc::RpcAdapter;
use terminal_core::ws::{WsServerHandle, start_ws_server};

use std::net::SocketAddr;
use std::sync::Arc;

use log::info;

/// Remote connector when an address is configured, the mock otherwise.
///
/// # Errors
///
/// Returns [`EmulatorError::Backend`] if the TLS material cannot be loaded.
pub fn select_backend(config: &BackendConfig) -> Result<Arc<dyn BackendConnector>, EmulatorError> {
    match &config.address {
        Some(address) => {
            info!("Using business backend at {address}");
            Ok(Arc::new(RemoteBackend::connect(address, &config.tls_files())?))
        }
        None => {
            info!("No backend address configured, using the mock backend");
            Ok(Arc::new(MockBackend::new()))
        }
    }
}

/// A running emulator: the RPC adapter and the server in front of it.
pub struct Emulator {
    adapter: Arc<RpcAdapter>,
    server: WsServerHandle,
}

impl Emulator {
    pub async fn start(config: &EmulatorConfig) -> Result<Self, EmulatorError> {
        let backend = select_backend(&config.backend)?;
        Self::start_with_backend(config, backend).await
    }

    pub async fn start_with_backend(
        config: &EmulatorConfig,
        backend: Arc<dyn BackendConnector>,
    ) -> Result<Self, EmulatorError> {
        let controller = Controller::new(backend);
        controller.set_hardware_business_mult(config.hardware.business_multiplier);

        let adapter = Arc::new(RpcAdapter::new(Arc::new(controller)));
        let server = start_ws_server(&config.server, adapter.clone()).await?;

        Ok(Self { adapter, server })
    }

    pub fn adapter(&self) -> &Arc<RpcAdapter> {
        &self.adapter
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    pub async fn shutdown(self) {
        self.server.shutdown().await;
    }
}
