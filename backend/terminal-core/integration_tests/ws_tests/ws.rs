use crate::ws_tests::helpers::{
    call, connect_to_server, receive_json, send_request, send_text, start_test_server,
};

use terminal_core::controller::FaultFlag;

use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Error as TungsteniteError;

/// **VALUE**: Verifies a request travels the whole stack and its id comes back untouched.
///
/// **WHY THIS MATTERS**: Clients correlate replies by id; the id is whatever JSON
/// value the client chose, not something the server may normalize.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The codec substitutes its internal sequence number for the client id
/// - `eval.new` is not routed to the controller
/// - The result shape drifts from `{success: {storage_cell}}`
#[tokio::test]
async fn given_server_when_eval_new_sent_then_reply_carries_same_id_and_cell() {
    // GIVEN: A running server and a connected client
    let (handle, _adapter) = start_test_server().await;
    let mut ws = connect_to_server(handle.local_addr()).await;

    // WHEN: Client starts an evaluation with a numeric id
    let response = call(&mut ws, json!(1), "eval.new", Value::Null).await;

    // THEN: Reply echoes the id and assigns the first cell
    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], json!(1));
    assert_eq!(response["result"]["success"]["storage_cell"], "A1");
    assert!(response.get("error").is_none());
}

#[tokio::test]
async fn given_string_id_when_status_sent_then_string_id_returned() {
    let (handle, _adapter) = start_test_server().await;
    let mut ws = connect_to_server(handle.local_addr()).await;

    let response = call(&mut ws, json!("req-7"), "status", Value::Null).await;

    assert_eq!(response["id"], json!("req-7"));
    assert_eq!(response["result"]["operational"], json!(true));
}

/// **VALUE**: Verifies replies leave in request order on one connection.
///
/// **BUG THIS CATCHES**: Would catch a switch to concurrent per-frame dispatch, which
/// lets a fast `status` overtake a slow hardware call.
#[tokio::test]
async fn given_pipelined_requests_when_replies_read_then_order_is_preserved() {
    // GIVEN: A connected client
    let (handle, _adapter) = start_test_server().await;
    let mut ws = connect_to_server(handle.local_addr()).await;

    // WHEN: Three requests are sent before reading anything
    send_request(&mut ws, json!(10), "inlet.open", Value::Null).await;
    send_request(&mut ws, json!(11), "status", Value::Null).await;
    send_request(&mut ws, json!(12), "inlet.close", Value::Null).await;

    // THEN: Replies arrive 10, 11, 12
    for expected in [10, 11, 12] {
        let response = receive_json(&mut ws).await;
        assert_eq!(response["id"], json!(expected));
    }
}

#[tokio::test]
async fn given_unknown_method_when_sent_then_method_not_found() {
    let (handle, _adapter) = start_test_server().await;
    let mut ws = connect_to_server(handle.local_addr()).await;

    let response = call(&mut ws, json!(3), "eval.explode", Value::Null).await;

    assert_eq!(response["id"], json!(3));
    assert_eq!(response["error"]["code"], json!(-32601));
}

/// **VALUE**: Verifies a malformed frame gets a parse error and the connection survives.
///
/// **WHY THIS MATTERS**: A buggy client frame must not cost the kiosk UI its
/// connection; it has no id to correlate, so the reply carries `null`.
#[tokio::test]
async fn given_malformed_json_when_sent_then_parse_error_with_null_id() {
    // GIVEN: A connected client
    let (handle, _adapter) = start_test_server().await;
    let mut ws = connect_to_server(handle.local_addr()).await;

    // WHEN: Client sends something that is not JSON
    send_text(&mut ws, "{not json").await;
    let response = receive_json(&mut ws).await;

    // THEN: Parse error with null id
    assert_eq!(response["id"], Value::Null);
    assert_eq!(response["error"]["code"], json!(-32700));

    // THEN: Connection still serves requests
    let status = call(&mut ws, json!(2), "status", Value::Null).await;
    assert_eq!(status["id"], json!(2));
}

#[tokio::test]
async fn given_request_without_method_when_sent_then_invalid_request_keeps_id() {
    let (handle, _adapter) = start_test_server().await;
    let mut ws = connect_to_server(handle.local_addr()).await;

    send_text(&mut ws, r#"{"jsonrpc":"2.0","id":99}"#).await;
    let response = receive_json(&mut ws).await;

    assert_eq!(response["id"], json!(99));
    assert_eq!(response["error"]["code"], json!(-32600));
}

#[tokio::test]
async fn given_wrong_path_when_connecting_then_handshake_refused() {
    let (handle, _adapter) = start_test_server().await;

    let result = connect_async(format!("ws://{}/elsewhere", handle.local_addr())).await;

    match result {
        Err(TungsteniteError::Http(response)) => assert_eq!(response.status().as_u16(), 404),
        Err(other) => panic!("Expected HTTP refusal, got {other}"),
        Ok(_) => panic!("Handshake on wrong path should fail"),
    }
}

/// **VALUE**: Verifies a broken module refuses work but still answers `status`.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - A hardware failure on a window operation does not latch module-broken
/// - `status` is refused while broken, leaving the UI blind
#[tokio::test]
async fn given_hardware_failure_when_inlet_opened_then_module_latches_broken() {
    // GIVEN: Hardware failure injected
    let (handle, adapter) = start_test_server().await;
    adapter.controller().toggle(FaultFlag::HardwareFailure);
    let mut ws = connect_to_server(handle.local_addr()).await;

    // WHEN: Client opens the inlet
    let response = call(&mut ws, json!(1), "inlet.open", Value::Null).await;

    // THEN: Hardware error, then module broken for everything but status
    assert_eq!(response["error"]["code"], json!(-32002));

    let refused = call(&mut ws, json!(2), "inlet.close", Value::Null).await;
    assert_eq!(refused["error"]["code"], json!(-32001));

    let status = call(&mut ws, json!(3), "status", Value::Null).await;
    assert_eq!(status["result"]["operational"], json!(false));
    assert_eq!(status["result"]["hardware"]["my-printer"], json!(false));
}

#[tokio::test]
async fn given_reset_when_status_requested_then_reports_new_generation() {
    let (handle, adapter) = start_test_server().await;
    let mut ws = connect_to_server(handle.local_addr()).await;

    assert!(adapter.reset());
    let status = call(&mut ws, json!(1), "status", Value::Null).await;

    assert_eq!(status["result"]["api_generation"], json!(1));
}

#[tokio::test]
async fn given_shutdown_when_connecting_then_refused() {
    // GIVEN: A server that has been shut down
    let (handle, _adapter) = start_test_server().await;
    let addr = handle.local_addr();
    handle.shutdown().await;

    // WHEN: A client tries to connect
    let result = connect_async(format!("ws://{addr}/ws")).await;

    // THEN: Nothing is listening anymore
    assert!(result.is_err(), "Listener should be closed after shutdown");
}
