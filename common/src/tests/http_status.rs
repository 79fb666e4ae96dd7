use crate::HttpStatusCode;

#[test]
fn given_status_codes_when_categorized_then_ranges_are_exclusive() {
    assert!(HttpStatusCode::OK.is_success());
    assert!(HttpStatusCode(204).is_success());
    assert!(!HttpStatusCode(302).is_success());

    assert!(HttpStatusCode(404).is_client_error());
    assert!(!HttpStatusCode(404).is_server_error());

    assert!(HttpStatusCode(503).is_server_error());
    assert!(!HttpStatusCode(503).is_success());
}

#[test]
fn given_status_when_displayed_then_prints_bare_code() {
    assert_eq!(HttpStatusCode::from(418).to_string(), "418");
}
