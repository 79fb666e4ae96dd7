use crate::controller_tests::backends::CountingBackend;

use terminal_core::backend::mock::MockBackend;
use terminal_core::controller::{Controller, Fault, FaultFlag, RejectionSource};
use terminal_core::rpc::RpcAdapter;

use models::{EvaluationStage, StorageCell};

use std::sync::Arc;
use std::sync::atomic::Ordering;

use serde_json::{Map, Value, json};

fn instant_controller(backend: Arc<dyn terminal_core::backend::BackendConnector>) -> Controller {
    let controller = Controller::new(backend);
    controller.set_hardware_business_mult(0.0);
    controller
}

/// **VALUE**: Verifies storage cells are handed out in order as items are stored.
///
/// **WHY THIS MATTERS**: The cell is picked from the backend's occupancy at
/// `eval.new` time. If occupying a cell does not move the next pick forward, two
/// items get routed to the same cell.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Free-cell search ignores occupied cells
/// - Assignment order is not A1, A2, A3...
/// - `store_after_eval` stores somewhere other than the assigned cell
#[tokio::test]
async fn given_items_stored_and_occupied_when_new_eval_then_cells_advance() {
    // GIVEN: A controller over the in-memory backend
    let controller = instant_controller(Arc::new(MockBackend::new()));

    for (index, expected) in ["A1", "A2", "A3"].iter().enumerate() {
        // WHEN: A full evaluate, store, occupy cycle runs
        let evaluation = controller.new_eval().await.unwrap();
        controller.spectral_eval().await.unwrap();
        controller.hydro_eval().await.unwrap();
        controller.finalize_eval().await.unwrap();
        let stored = controller.store_after_eval().await.unwrap();
        controller
            .occupy_storage_cell(&stored, "shop", &format!("tx-{index}"))
            .await
            .unwrap();

        // THEN: The next free cell was assigned and used
        assert_eq!(evaluation.cell.as_str(), *expected);
        assert_eq!(stored, evaluation.cell);
        assert_eq!(
            controller.current_session().unwrap().stage,
            EvaluationStage::Stored
        );
    }
}

/// **VALUE**: Verifies a network fault short-circuits before the backend is reached.
///
/// **BUG THIS CATCHES**: Would catch any operation that calls the backend first and
/// checks the network flag afterwards.
#[tokio::test]
async fn given_network_failure_when_backend_operations_run_then_backend_never_called() {
    // GIVEN: Network failure injected
    let backend = Arc::new(CountingBackend::default());
    let controller = instant_controller(backend.clone());
    controller.toggle_fail_on_network_access();
    let cell = StorageCell::parse("B2").unwrap();

    // WHEN: Every backend-facing operation runs
    let outcomes = [
        controller.new_eval().await.map(|_| ()),
        controller.spectral_eval().await.map(|_| ()),
        controller.hydro_eval().await.map(|_| ()),
        controller.finalize_eval().await.map(|_| ()),
        controller.occupy_storage_cell(&cell, "shop", "tx").await,
        controller.release_storage_cell(&cell, "shop", "tx", false).await,
        controller
            .integration_ui_method("show", Map::new())
            .await
            .map(|_| ()),
    ];

    // THEN: All report the network, none reached the backend
    for outcome in outcomes {
        assert_eq!(outcome, Err(Fault::NetworkUnavailable));
    }
    assert_eq!(backend.calls(), 0);
    assert!(!controller.internet_connectivity());
}

#[tokio::test]
async fn given_no_room_flag_when_new_eval_then_no_storage_room_without_backend_call() {
    let backend = Arc::new(CountingBackend::default());
    let controller = instant_controller(backend.clone());
    controller.toggle_fail_on_storage_room_check();

    assert_eq!(controller.new_eval().await, Err(Fault::NoStorageRoom));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn given_hardware_and_network_failures_when_new_eval_then_hardware_reported_first() {
    let controller = instant_controller(Arc::new(MockBackend::new()));
    controller.toggle_fail_on_hardware_access();
    controller.toggle_fail_on_network_access();

    assert_eq!(controller.new_eval().await, Err(Fault::HardwareFailure));
}

/// **VALUE**: Verifies an unstable scale outranks network and rejection faults.
#[tokio::test]
async fn given_unstable_scale_and_network_failure_when_hydro_eval_then_unstable_scale() {
    let controller = instant_controller(Arc::new(MockBackend::new()));
    controller.new_eval().await.unwrap();
    controller.toggle_weighing_scale_unstable();
    controller.toggle_fail_on_network_access();
    controller.toggle_eval_rejection();

    assert_eq!(controller.hydro_eval().await, Err(Fault::UnstableScale));
}

/// **VALUE**: Verifies local and backend rejections are told apart.
///
/// **WHY THIS MATTERS**: A terminal-side rejection never costs a backend round trip;
/// a backend rejection must still be reported as a rejection, not a network error.
#[tokio::test]
async fn given_rejections_when_spectral_eval_then_origin_identifies_decider() {
    // GIVEN: An evaluation in progress
    let backend = Arc::new(CountingBackend::default());
    let controller = instant_controller(backend.clone());
    controller.new_eval().await.unwrap();
    let calls_before = backend.calls();

    // WHEN: The terminal itself rejects
    controller.toggle_eval_rejection();
    let local = controller.spectral_eval().await;

    // THEN: Rejected locally, backend untouched
    assert_eq!(
        local,
        Err(Fault::EvalRejected {
            origin: RejectionSource::Local
        })
    );
    assert_eq!(backend.calls(), calls_before);

    // WHEN: The backend rejects
    controller.toggle_eval_rejection();
    backend.reject_evaluations.store(true, Ordering::SeqCst);
    let remote = controller.spectral_eval().await;

    // THEN: Rejected by the backend
    assert_eq!(
        remote,
        Err(Fault::EvalRejected {
            origin: RejectionSource::Backend
        })
    );
}

#[tokio::test]
async fn given_hardware_failure_and_unstable_scale_when_hydro_eval_then_hardware_first() {
    let controller = instant_controller(Arc::new(MockBackend::new()));
    controller.new_eval().await.unwrap();
    controller.toggle_fail_on_hardware_access();
    controller.toggle_weighing_scale_unstable();

    assert_eq!(controller.hydro_eval().await, Err(Fault::HardwareFailure));
}

/// **VALUE**: Verifies the network is checked before the terminal's own
/// rejection on both hydro and finalize.
#[tokio::test]
async fn given_network_failure_and_local_rejection_when_hydro_or_finalize_then_network() {
    // GIVEN: Both network failure and local rejection injected
    let backend = Arc::new(CountingBackend::default());
    let controller = instant_controller(backend.clone());
    controller.new_eval().await.unwrap();
    controller.toggle_fail_on_network_access();
    controller.toggle_eval_rejection();
    let calls_before = backend.calls();

    // WHEN / THEN: The network fault wins, the backend stays untouched
    assert_eq!(controller.hydro_eval().await, Err(Fault::NetworkUnavailable));
    assert_eq!(
        controller.finalize_eval().await,
        Err(Fault::NetworkUnavailable)
    );
    assert_eq!(backend.calls(), calls_before);
}

/// **VALUE**: Verifies finalize never touches the hardware.
///
/// **BUG THIS CATCHES**: A hardware check added to finalize would refuse the
/// final decision of an item that has already been measured.
#[tokio::test]
async fn given_hardware_failure_when_finalize_eval_then_decision_still_made() {
    // GIVEN: An item measured before the hardware fails
    let controller = instant_controller(Arc::new(MockBackend::new()));
    controller.new_eval().await.unwrap();
    controller.spectral_eval().await.unwrap();
    controller.hydro_eval().await.unwrap();
    controller.toggle_fail_on_hardware_access();

    // WHEN: Finalizing
    let report = controller.finalize_eval().await;

    // THEN: Decided as usual
    assert!(report.is_ok());
    assert_eq!(
        controller.current_session().unwrap().stage,
        EvaluationStage::Finalized
    );
}

/// **VALUE**: Verifies hydro and finalize keep local and backend rejections apart.
#[tokio::test]
async fn given_rejections_when_hydro_and_finalize_then_origin_identifies_decider() {
    // GIVEN: A spectrum-evaluated item
    let backend = Arc::new(CountingBackend::default());
    let controller = instant_controller(backend.clone());
    controller.new_eval().await.unwrap();
    controller.spectral_eval().await.unwrap();
    let local = Err(Fault::EvalRejected {
        origin: RejectionSource::Local,
    });
    let remote = Err(Fault::EvalRejected {
        origin: RejectionSource::Backend,
    });

    // WHEN / THEN: The terminal rejects without a backend call
    controller.toggle_eval_rejection();
    let calls_before = backend.calls();
    assert_eq!(controller.hydro_eval().await.map(|_| ()), local);
    assert_eq!(controller.finalize_eval().await.map(|_| ()), local);
    assert_eq!(backend.calls(), calls_before);

    // WHEN / THEN: The backend rejects
    controller.toggle_eval_rejection();
    backend.reject_evaluations.store(true, Ordering::SeqCst);
    assert_eq!(controller.hydro_eval().await.map(|_| ()), remote);
    assert_eq!(controller.finalize_eval().await.map(|_| ()), remote);
}

#[tokio::test]
async fn given_no_session_when_evaluating_then_no_session() {
    let controller = instant_controller(Arc::new(MockBackend::new()));

    assert_eq!(controller.spectral_eval().await, Err(Fault::NoSession));
    assert_eq!(controller.store_after_eval().await, Err(Fault::NoSession));
}

#[tokio::test]
async fn given_storage_access_forbidden_when_occupying_then_forbidden_with_reason() {
    let controller = instant_controller(Arc::new(MockBackend::new()));
    controller.toggle_fail_on_storage_access();
    let cell = StorageCell::parse("A1").unwrap();

    let outcome = controller.occupy_storage_cell(&cell, "shop", "tx").await;

    assert!(matches!(outcome, Err(Fault::StorageForbidden { .. })));
}

#[tokio::test]
async fn given_occupied_cell_when_occupying_again_then_backend_reason_surfaces() {
    let controller = instant_controller(Arc::new(MockBackend::new()));
    let cell = StorageCell::parse("D4").unwrap();
    controller.occupy_storage_cell(&cell, "shop", "tx-1").await.unwrap();

    let outcome = controller.occupy_storage_cell(&cell, "buyout", "tx-2").await;

    assert_eq!(
        outcome,
        Err(Fault::StorageForbidden {
            reason: String::from("already occupied")
        })
    );
}

#[tokio::test]
async fn given_every_flag_set_when_healed_then_flags_clear_and_cycle_succeeds() {
    let controller = instant_controller(Arc::new(MockBackend::new()));
    for flag in FaultFlag::ALL {
        controller.toggle(flag);
    }

    controller.heal_api();

    assert!(controller.faults().snapshot().iter().all(|(_, on)| !on));
    assert!(controller.operational());
    let evaluation = controller.new_eval().await.unwrap();
    assert_eq!(evaluation.cell.as_str(), "A1");
    controller.spectral_eval().await.unwrap();
    controller.hydro_eval().await.unwrap();
    controller.finalize_eval().await.unwrap();
}

/// **VALUE**: Verifies `eval.new` reports hardware trouble in its result instead of
/// latching module-broken.
#[tokio::test]
async fn given_hardware_failure_when_eval_new_called_then_failure_result_and_still_operational() {
    let controller = Arc::new(instant_controller(Arc::new(MockBackend::new())));
    controller.toggle_fail_on_hardware_access();
    let adapter = RpcAdapter::new(controller.clone());

    let result = adapter.call("EvalNew", Value::Null).await.unwrap();

    assert_eq!(result, json!({"failure": {"hardware_check": true}}));
    assert!(controller.operational());
}

/// **VALUE**: Verifies the full RPC evaluation path produces a consistent fineness.
#[tokio::test]
async fn given_seeded_fineness_when_evaluated_over_rpc_then_hydro_matches_spectrum() {
    // GIVEN: Seed pinned to 750 gold
    let controller = Arc::new(instant_controller(Arc::new(MockBackend::new())));
    assert!(controller.seed().set_target_millesimal(750));
    let adapter = RpcAdapter::new(controller);

    // WHEN: New, spectrum, hydro
    adapter.call("EvalNew", Value::Null).await.unwrap();
    let spectrum = adapter.call("EvalSpectrum", Value::Null).await.unwrap();
    let hydro = adapter.call("EvalHydro", Value::Null).await.unwrap();

    // THEN: Both report 750, hydro adds weight and confidence
    assert_eq!(spectrum["success"]["millesimal"], json!(750));
    assert_eq!(spectrum["success"]["carat"], json!("18K"));
    assert_eq!(hydro["success"]["millesimal"], json!(750));
    assert!(hydro["success"]["weight"].as_f64().unwrap() >= 1.0);
    assert_eq!(hydro["success"]["risky"], json!(false));
}

#[tokio::test]
async fn given_storage_rpc_when_occupy_then_release_then_both_succeed() {
    let adapter = RpcAdapter::new(Arc::new(instant_controller(Arc::new(MockBackend::new()))));
    let request = json!({"cell": "E5", "domain": "pawnshop", "transaction_id": "t-1"});

    let occupied = adapter.call("StorageOccupy", request.clone()).await.unwrap();
    let again = adapter.call("StorageOccupy", json!([request])).await.unwrap();
    let released = adapter
        .call(
            "StorageRelease",
            json!({"cell": "E5", "domain": "pawnshop", "transaction_id": "t-2", "strict": true}),
        )
        .await
        .unwrap();

    assert_eq!(occupied, json!({"success": true}));
    assert_eq!(
        again,
        json!({"success": false, "failure": {"forbidden": true, "reason": "already occupied"}})
    );
    assert_eq!(released, json!({"success": true}));
}

#[tokio::test]
async fn given_bad_cell_when_extracting_then_invalid_params() {
    let adapter = RpcAdapter::new(Arc::new(instant_controller(Arc::new(MockBackend::new()))));

    let error = adapter
        .call("StorageExtract", json!({"cell": "Z0"}))
        .await
        .unwrap_err();

    assert_eq!(error.code, -32602);
}

#[tokio::test]
async fn given_hardware_failure_when_hardware_rpc_called_then_sub_error_not_rpc_error() {
    let controller = Arc::new(instant_controller(Arc::new(MockBackend::new())));
    let adapter = RpcAdapter::new(controller.clone());
    let request = json!({"module": "my-printer", "method": "print", "request": {"text": "hi"}});

    let echoed = adapter.call("Hardware", request.clone()).await.unwrap();
    controller.toggle_fail_on_hardware_access();
    let failed = adapter.call("Hardware", request).await.unwrap();

    assert_eq!(echoed, json!({"result": {"text": "hi"}}));
    assert!(failed.get("result").is_none());
    assert!(failed["sub_error"].is_string());
}

#[tokio::test]
async fn given_call_rpc_when_invoked_then_backend_reply_passed_through() {
    let adapter = RpcAdapter::new(Arc::new(instant_controller(Arc::new(MockBackend::new()))));

    let result = adapter
        .call("Call", json!({"method": "screen", "body": {"page": 2}}))
        .await
        .unwrap();

    assert_eq!(result, json!({"http_status": 200, "body": {"page": 2}}));
}
