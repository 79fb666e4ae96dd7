use crate::StorageCell;
use crate::api::{
    EvalNewFailure, EvalNewResult, EvalReturnRequest, StorageCellResult, StorageReleaseRequest,
};

use serde_json::json;

/// **VALUE**: Verifies that result payloads omit the member that does not apply and every
/// false failure flag.
///
/// **WHY THIS MATTERS**: Kiosk UIs branch on the presence of `success` / `failure`. Sending
/// `"failure": null` or a wall of `false` flags breaks those checks.
#[test]
fn given_eval_new_results_when_serialized_then_only_present_members_appear() {
    let success = EvalNewResult::success(StorageCell::parse("A1").unwrap());
    assert_eq!(
        serde_json::to_value(&success).unwrap(),
        json!({"success": {"storage_cell": "A1"}})
    );

    let failure = EvalNewResult::failure(EvalNewFailure {
        no_storage_room: true,
        ..EvalNewFailure::default()
    });
    assert_eq!(
        serde_json::to_value(&failure).unwrap(),
        json!({"failure": {"no_storage_room": true}})
    );
}

#[test]
fn given_forbidden_storage_result_when_serialized_then_reason_is_kept() {
    let result = StorageCellResult::forbidden("already occupied");

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"success": false, "failure": {"forbidden": true, "reason": "already occupied"}})
    );
}

#[test]
fn given_request_without_optional_fields_when_deserialized_then_defaults_apply() {
    let release: StorageReleaseRequest = serde_json::from_value(json!({
        "cell": "B2", "domain": "shop", "transaction_id": "tx-1"
    }))
    .unwrap();
    assert!(!release.strict);

    let ret: EvalReturnRequest = serde_json::from_value(json!({})).unwrap();
    assert!(ret.customer_choice);
}
