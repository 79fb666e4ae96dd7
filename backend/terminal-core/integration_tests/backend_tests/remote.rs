use terminal_core::backend::remote::{RemoteBackend, StorageDomain};
use terminal_core::backend::{BackendConnector, StorageVerdict, Verdict};
use terminal_core::controller::Controller;
use terminal_core::error::backend::BackendError;

use models::{Spectrum, StorageCell};

use std::sync::Arc;

use serde_json::{Map, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn backend_for(server: &MockServer) -> RemoteBackend {
    RemoteBackend::plain(&server.uri()).expect("Failed to build client")
}

fn cell(address: &str) -> StorageCell {
    StorageCell::parse(address).unwrap()
}

#[test]
fn given_address_without_scheme_when_building_then_https_and_trailing_slash_added() {
    let backend = RemoteBackend::plain("backend.local:8443/api").unwrap();

    assert_eq!(backend.base_url().as_str(), "https://backend.local:8443/api/");
}

#[test]
fn given_domain_names_when_parsed_then_known_ones_map_and_unknown_fails() {
    assert_eq!("pawnshop".parse::<StorageDomain>().unwrap(), StorageDomain::Pawnshop);
    assert_eq!("other".parse::<StorageDomain>().unwrap(), StorageDomain::Other);
    assert!(matches!(
        "warehouse".parse::<StorageDomain>(),
        Err(BackendError::UnknownDomain { .. })
    ));
}

/// **VALUE**: Verifies occupancy is read per domain from the backend.
#[tokio::test]
async fn given_backend_occupancy_when_listing_then_grouped_by_domain_name() {
    // GIVEN: Backend reports two domains
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/storage/occupied"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domains": {"shop": ["A1", "A2"], "buyout": ["C7"]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN: Listing occupied cells
    let occupied = backend_for(&server).await.occupied_cells().await.unwrap();

    // THEN: Keys are the wire domain names
    assert_eq!(occupied["shop"], vec!["A1".to_string(), "A2".to_string()]);
    assert_eq!(occupied["buyout"], vec!["C7".to_string()]);
}

#[tokio::test]
async fn given_begin_reply_when_new_eval_then_returns_backend_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/eval/begin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"eval_id": 4711})))
        .mount(&server)
        .await;

    let eval_id = backend_for(&server).await.new_eval().await.unwrap();

    assert_eq!(eval_id, 4711);
}

/// **VALUE**: Verifies the spectrum call sends the session data and reads both reply forms.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - `eval_id` or the spectrum is missing from the request body
/// - A `reject` reply is mistaken for a transport error
#[tokio::test]
async fn given_spectrum_replies_when_evaluating_then_fineness_or_rejection() {
    // GIVEN: Backend accepts eval 1 and rejects eval 2
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/eval/spectrum"))
        .and(body_partial_json(json!({"eval_id": 1, "spectrum": {"au": 75.0}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fineness": {
                "alloy": "au", "purity": 75.0, "millesimal": 750,
                "carat": "18K", "confidence": 0.8, "risky": true
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/eval/spectrum"))
        .and(body_partial_json(json!({"eval_id": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reject": {}})))
        .mount(&server)
        .await;
    let backend = backend_for(&server).await;
    let spectrum = Spectrum::from([("au".to_string(), 75.0)]);

    // WHEN: Evaluating both
    let accepted = backend.evaluate_spectrum(1, &spectrum).await.unwrap();
    let rejected = backend.evaluate_spectrum(2, &spectrum).await.unwrap();

    // THEN: Fineness for one, rejection for the other
    let Verdict::Accepted(fineness) = accepted else {
        panic!("eval 1 should be accepted");
    };
    assert_eq!(fineness.millesimal, 750);
    assert!(fineness.risky);
    assert_eq!(rejected, Verdict::Rejected);
}

#[tokio::test]
async fn given_wet_weight_rejected_when_hydro_then_rejected_after_both_weights() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/eval/dry_weight"))
        .and(body_partial_json(json!({"eval_id": 3, "weight": 10.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/eval/wet_weight"))
        .and(body_partial_json(json!({"eval_id": 3, "weight": 9.48})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reject": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let verdict = backend_for(&server)
        .await
        .evaluate_hydro(3, 10.0, 9.48)
        .await
        .unwrap();

    assert_eq!(verdict, Verdict::Rejected);
}

#[tokio::test]
async fn given_finalize_reply_without_fineness_when_finalizing_then_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/eval/finalize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let result = backend_for(&server).await.finalize_evaluation(5).await;

    assert!(matches!(result, Err(BackendError::Server { .. })));
}

/// **VALUE**: Verifies each storage refusal from the backend maps to a distinct reason.
#[tokio::test]
async fn given_storage_refusals_when_changing_cells_then_reasons_mapped() {
    // GIVEN: Occupy reports already-occupied, strict release reports wrong domain
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/storage/occupy"))
        .and(body_partial_json(json!({"domain": "shop", "cell": "B3", "transaction_id": "t1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"already_occupied": {}})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/storage/release"))
        .and(body_partial_json(json!({"strict_domain": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"wrong_domain": {}})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/storage/release"))
        .and(body_partial_json(json!({"strict_domain": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": {}})))
        .mount(&server)
        .await;
    let backend = backend_for(&server).await;

    // WHEN / THEN
    assert_eq!(
        backend.occupy_storage_cell("shop", &cell("B3"), "t1").await.unwrap(),
        StorageVerdict::forbidden("already occupied")
    );
    assert_eq!(
        backend.release_storage_cell("buyout", &cell("B3"), "t2", true).await.unwrap(),
        StorageVerdict::forbidden("cell is occupied under another domain")
    );
    assert_eq!(
        backend.release_storage_cell("buyout", &cell("B3"), "t3", false).await.unwrap(),
        StorageVerdict::Granted
    );
}

#[tokio::test]
async fn given_empty_storage_reply_when_occupying_then_not_implemented_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/storage/occupy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let verdict = backend_for(&server)
        .await
        .occupy_storage_cell("dashboard", &cell("J9"), "t")
        .await
        .unwrap();

    assert_eq!(verdict, StorageVerdict::forbidden("not implemented"));
}

#[tokio::test]
async fn given_unknown_domain_when_occupying_then_error_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/storage/occupy"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = backend_for(&server)
        .await
        .occupy_storage_cell("warehouse", &cell("A1"), "t")
        .await;

    assert!(matches!(result, Err(BackendError::UnknownDomain { .. })));
}

#[tokio::test]
async fn given_server_failure_when_calling_then_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/storage/occupied"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let result = backend_for(&server).await.occupied_cells().await;

    match result {
        Err(BackendError::Server { message, .. }) => assert!(message.contains("503")),
        other => panic!("Expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn given_ui_method_when_called_then_status_and_body_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/integration/ui_method"))
        .and(body_partial_json(json!({"method": "screen", "body": {"page": 1}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "http_status": 418, "body": {"hint": "teapot"}
        })))
        .mount(&server)
        .await;
    let body: Map<_, _> = json!({"page": 1}).as_object().cloned().unwrap();

    let response = backend_for(&server)
        .await
        .integration_ui_method("screen", body)
        .await
        .unwrap();

    assert_eq!(response.http_status, 418);
    assert_eq!(response.body["hint"], json!("teapot"));
}

/// **VALUE**: Verifies the controller picks its cell from the remote occupancy.
#[tokio::test]
async fn given_remote_occupancy_when_controller_starts_eval_then_skips_taken_cells() {
    // GIVEN: A1 and A2 held remotely
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/storage/occupied"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domains": {"shop": ["A1"], "pawnshop": ["A2"]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/eval/begin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"eval_id": 9})))
        .mount(&server)
        .await;
    let controller = Controller::new(Arc::new(backend_for(&server).await));
    controller.set_hardware_business_mult(0.0);

    // WHEN: Starting an evaluation
    let evaluation = controller.new_eval().await.unwrap();

    // THEN: First free cell, backend id
    assert_eq!(evaluation.cell.as_str(), "A3");
    assert_eq!(evaluation.eval_id, 9);
}

/// **VALUE**: Verifies occupancy stays readable when the backend reports a
/// domain this terminal has never heard of.
///
/// **BUG THIS CATCHES**: Parsing occupancy keys through the known-domain list
/// would fail the whole reply and turn every `eval.new` into a network error
/// even though free cells exist.
#[tokio::test]
async fn given_unknown_domain_in_occupancy_when_starting_eval_then_cells_still_counted() {
    // GIVEN: Occupancy with a domain outside the known set
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/storage/occupied"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domains": {"shop": ["A1"], "warehouse": ["A2"]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/eval/begin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"eval_id": 12})))
        .mount(&server)
        .await;
    let backend = Arc::new(backend_for(&server).await);

    // WHEN: Listing occupancy and starting an evaluation
    let occupied = backend.occupied_cells().await.unwrap();
    let controller = Controller::new(backend);
    controller.set_hardware_business_mult(0.0);
    let evaluation = controller.new_eval().await.unwrap();

    // THEN: Unknown domain kept by name, and its cell is skipped
    assert_eq!(occupied["warehouse"], vec!["A2".to_string()]);
    assert_eq!(evaluation.cell.as_str(), "A3");
    assert_eq!(evaluation.eval_id, 12);
}
