use crate::backend::mock::{MOCK_CONFIDENCE, MockBackend};
use crate::backend::{
    BackendConnector, REASON_ALREADY_OCCUPIED, REASON_NOT_OCCUPIED, REASON_WRONG_DOMAIN,
    StorageVerdict, Verdict,
};

use models::{Spectrum, StorageCell};

use serde_json::{Map, Value, json};

fn cell(address: &str) -> StorageCell {
    StorageCell::parse(address).unwrap()
}

#[tokio::test]
async fn given_mock_when_beginning_evaluations_then_ids_increase_from_one() {
    let backend = MockBackend::new();

    assert_eq!(backend.new_eval().await.unwrap(), 1);
    assert_eq!(backend.new_eval().await.unwrap(), 2);
}

/// **VALUE**: Verifies the mock classifies with the shared table and finalizes with the
/// same result.
#[tokio::test]
async fn given_spectrum_when_evaluated_then_finalize_returns_same_fineness() {
    // GIVEN: A mock and a 92% gold reading
    let backend = MockBackend::new();
    let spectrum = Spectrum::from([("au".to_string(), 92.0)]);

    // WHEN: Evaluating and finalizing
    let evaluated = backend.evaluate_spectrum(1, &spectrum).await.unwrap();
    let finalized = backend.finalize_evaluation(1).await.unwrap();

    // THEN: Both carry the same classification
    let Verdict::Accepted(fineness) = evaluated else {
        panic!("mock never rejects");
    };
    assert_eq!(fineness.alloy, "au");
    assert_eq!(fineness.millesimal, 925);
    assert_eq!(fineness.carat, "23K");
    assert_eq!(fineness.confidence, MOCK_CONFIDENCE);
    assert!(!fineness.risky);
    assert_eq!(finalized, Verdict::Accepted(fineness));
}

#[tokio::test]
async fn given_nothing_evaluated_when_finalizing_then_returns_error() {
    let backend = MockBackend::new();

    assert!(backend.finalize_evaluation(1).await.is_err());
}

/// **VALUE**: Verifies each refusal carries its own reason.
///
/// **WHY THIS MATTERS**: Operators need to tell "someone else holds it" from "nobody
/// holds it"; collapsing both into a bare `forbidden` hides which side is wrong.
#[tokio::test]
async fn given_occupancy_conflicts_when_changing_cells_then_reasons_are_distinct() {
    let backend = MockBackend::new();

    assert_eq!(
        backend.occupy_storage_cell("shop", &cell("A1"), "tx-1").await.unwrap(),
        StorageVerdict::Granted
    );
    assert_eq!(
        backend.occupy_storage_cell("buyout", &cell("A1"), "tx-2").await.unwrap(),
        StorageVerdict::forbidden(REASON_ALREADY_OCCUPIED)
    );
    assert_eq!(
        backend.release_storage_cell("shop", &cell("B1"), "tx-3", false).await.unwrap(),
        StorageVerdict::forbidden(REASON_NOT_OCCUPIED)
    );
    assert_eq!(
        backend.release_storage_cell("buyout", &cell("A1"), "tx-4", true).await.unwrap(),
        StorageVerdict::forbidden(REASON_WRONG_DOMAIN)
    );
}

#[tokio::test]
async fn given_non_strict_release_when_domain_differs_then_cell_is_freed() {
    let backend = MockBackend::new();
    backend.occupy_storage_cell("shop", &cell("C3"), "tx").await.unwrap();

    let verdict = backend
        .release_storage_cell("pawnshop", &cell("C3"), "tx", false)
        .await
        .unwrap();

    assert_eq!(verdict, StorageVerdict::Granted);
    assert!(backend.occupied_cells().await.unwrap().is_empty());
}

#[tokio::test]
async fn given_occupied_cells_when_listed_then_grouped_by_domain() {
    let backend = MockBackend::new();
    backend.occupy_storage_cell("shop", &cell("A1"), "t1").await.unwrap();
    backend.occupy_storage_cell("shop", &cell("A2"), "t2").await.unwrap();
    backend.occupy_storage_cell("other", &cell("B5"), "t3").await.unwrap();

    let mut occupied = backend.occupied_cells().await.unwrap();
    occupied.values_mut().for_each(|cells| cells.sort());

    assert_eq!(occupied["shop"], vec!["A1".to_string(), "A2".to_string()]);
    assert_eq!(occupied["other"], vec!["B5".to_string()]);
}

#[tokio::test]
async fn given_ui_method_when_called_then_body_is_echoed_with_ok_status() {
    let backend = MockBackend::new();
    let body: Map<String, Value> = json!({"screen": "welcome"}).as_object().cloned().unwrap();

    let response = backend.integration_ui_method("show", body.clone()).await.unwrap();

    assert_eq!(response.http_status, 200);
    assert_eq!(response.body, body);
}
