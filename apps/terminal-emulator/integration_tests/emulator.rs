use terminal_emulator::app::{Emulator, select_backend};
use terminal_emulator::console::execute;

use terminal_core::config::{BackendConfig, EmulatorConfig};

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

fn test_config() -> EmulatorConfig {
    let mut config = EmulatorConfig::default();
    config.server.bind_address = String::from("127.0.0.1");
    config.server.port = 0;
    config.hardware.business_multiplier = 0.0;
    config
}

/// **VALUE**: Verifies the assembled emulator serves RPC and obeys console commands.
///
/// **WHY THIS MATTERS**: This is the path an operator uses: start the binary, point
/// the kiosk UI at it, type `break ...` and watch the UI react.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The server is not wired to the same adapter the console drives
/// - The configured multiplier is not applied to the controller
#[tokio::test]
async fn given_running_emulator_when_console_breaks_network_then_status_reports_offline() {
    // GIVEN: A started emulator and a connected client
    let emulator = Emulator::start(&test_config())
        .await
        .expect("Failed to start emulator");
    let url = format!("ws://{}/ws", emulator.local_addr());
    let (mut ws, _) = connect_async(&url).await.expect("Failed to connect");
    assert_eq!(emulator.adapter().controller().hardware_business_mult(), 0.0);

    // WHEN: The operator breaks the network
    execute("break network", emulator.adapter()).unwrap();
    let request = json!({"jsonrpc": "2.0", "id": 1, "method": "status"});
    ws.send(Message::Text(request.to_string().into())).await.unwrap();

    // THEN: Status reports no internet
    let reply = ws.next().await.unwrap().unwrap();
    let reply: Value = serde_json::from_str(reply.to_text().unwrap()).unwrap();
    assert_eq!(reply["result"]["internet"], json!(false));

    emulator.shutdown().await;
}

#[test]
fn given_no_backend_address_when_selecting_then_mock_is_used() {
    let backend = select_backend(&BackendConfig::default());

    assert!(backend.is_ok());
}

#[test]
fn given_missing_tls_files_when_selecting_remote_then_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = BackendConfig {
        address: Some(String::from("backend.local:8443")),
        tls_cert: dir.path().join("missing.crt"),
        tls_key: dir.path().join("missing.key"),
        tls_ca: dir.path().join("missing-ca.crt"),
    };

    assert!(select_backend(&config).is_err());
}
