use crate::controller_tests::backends::GatedBackend;

use terminal_core::controller::{Controller, FaultFlag};
use terminal_core::rpc::RpcAdapter;

use std::sync::Arc;

use serde_json::Value;

fn gated_adapter() -> (Arc<GatedBackend>, Arc<RpcAdapter>) {
    let backend = Arc::new(GatedBackend::default());
    let controller = Controller::new(backend.clone());
    controller.set_hardware_business_mult(0.0);
    (backend, Arc::new(RpcAdapter::new(Arc::new(controller))))
}

/// **VALUE**: Verifies reset is refused while a call is in flight and allowed after.
///
/// **WHY THIS MATTERS**: Swapping the binding under a running evaluation would leave
/// the customer's item in a session no binding knows about.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The pending counter is incremented after the call starts awaiting
/// - The counter is not decremented when the call completes
/// - A refused reset still clears flags or bumps the generation
#[tokio::test]
async fn given_call_in_flight_when_reset_then_refused_until_call_completes() {
    // GIVEN: A call parked inside the backend
    let (backend, adapter) = gated_adapter();
    adapter.controller().toggle(FaultFlag::StorageAccessForbidden);

    let caller = adapter.clone();
    let in_flight = tokio::spawn(async move { caller.call("EvalNew", Value::Null).await });
    backend.entered.notified().await;

    // WHEN: Reset is attempted mid-call
    assert_eq!(adapter.pending_requests(), 1);
    let refused = adapter.reset();

    // THEN: Nothing changed
    assert!(!refused);
    assert_eq!(adapter.generation(), 0);
    assert!(adapter.controller().faults().is_set(FaultFlag::StorageAccessForbidden));

    // WHEN: The call finishes
    backend.release.notify_one();
    let result = in_flight.await.unwrap();
    assert!(result.is_ok());
    assert_eq!(adapter.pending_requests(), 0);

    // THEN: Reset goes through, clearing flags and swapping the binding
    assert!(adapter.reset());
    assert_eq!(adapter.generation(), 1);
    assert_eq!(adapter.current_api().generation(), 1);
    assert!(!adapter.controller().faults().is_set(FaultFlag::StorageAccessForbidden));
}

#[tokio::test]
async fn given_refused_call_when_reset_then_counter_was_not_leaked() {
    let (_backend, adapter) = gated_adapter();

    let error = adapter.call("NoSuchMethod", Value::Null).await.unwrap_err();

    assert_eq!(error.code, -32601);
    assert_eq!(adapter.pending_requests(), 0);
    assert!(adapter.reset());
}

#[tokio::test]
async fn given_failed_call_when_finished_then_pending_returns_to_zero() {
    let (_backend, adapter) = gated_adapter();
    adapter.controller().toggle(FaultFlag::HardwareFailure);

    let error = adapter.call("InletOpen", Value::Null).await.unwrap_err();

    assert_eq!(error.code, -32002);
    assert_eq!(adapter.pending_requests(), 0);
}

#[tokio::test]
async fn given_consecutive_resets_when_idle_then_generation_counts_each() {
    let (_backend, adapter) = gated_adapter();

    assert!(adapter.reset());
    assert!(adapter.reset());
    assert!(adapter.reset());

    assert_eq!(adapter.generation(), 3);
}
