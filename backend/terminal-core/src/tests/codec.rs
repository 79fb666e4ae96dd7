use crate::jsonrpc::error::{INVALID_REQUEST, PARSE_ERROR};
use crate::jsonrpc::{RpcError, ServerCodec, dispatch_name};
use crate::error::codec::CodecError;

use serde_json::{Value, json};

fn parse(frame: &str) -> Value {
    serde_json::from_str(frame).unwrap()
}

/// **VALUE**: Verifies the dotted-to-dispatch method name translation.
///
/// **BUG THIS CATCHES**: Would catch if only the first segment were capitalized, turning
/// `eval.new` into `Evalnew` and every call into "method not found".
#[test]
fn given_dotted_method_when_translated_then_each_segment_is_capitalized() {
    assert_eq!(dispatch_name("eval.new"), "EvalNew");
    assert_eq!(dispatch_name("storage.extract"), "StorageExtract");
    assert_eq!(dispatch_name("status"), "Status");
    assert_eq!(dispatch_name("inlet.open"), "InletOpen");
}

/// **VALUE**: Verifies the client id comes back verbatim, not the internal sequence.
///
/// **WHY THIS MATTERS**: Clients correlate replies by id. Echoing the internal sequence
/// number would break every client that uses string ids or starts counting at 100.
#[test]
fn given_string_id_when_response_encoded_then_original_id_is_returned() {
    // GIVEN: A request with a string id
    let codec = ServerCodec::new();
    let request = codec
        .decode_request(r#"{"jsonrpc":"2.0","id":"abc","method":"eval.new","params":null}"#)
        .unwrap();

    // WHEN: Encoding its response
    let frame = parse(&codec.encode_response(request.seq, Ok(json!({"ok": true}))));

    // THEN: The id is the original string and the mapping is gone
    assert_eq!(frame["id"], json!("abc"));
    assert_eq!(frame["result"], json!({"ok": true}));
    assert_eq!(frame["jsonrpc"], json!("2.0"));
    assert_eq!(codec.pending(), 0);
}

#[test]
fn given_request_without_id_when_response_encoded_then_id_is_null() {
    let codec = ServerCodec::new();
    let request = codec.decode_request(r#"{"method":"status"}"#).unwrap();

    let frame = parse(&codec.encode_response(request.seq, Ok(Value::Null)));

    assert_eq!(frame["id"], Value::Null);
    assert!(frame.get("result").is_some(), "null result must still be present");
}

#[test]
fn given_successive_requests_when_decoded_then_sequence_strictly_increases() {
    let codec = ServerCodec::new();

    let first = codec.decode_request(r#"{"id":7,"method":"status"}"#).unwrap();
    let second = codec.decode_request(r#"{"id":7,"method":"status"}"#).unwrap();

    assert!(second.seq > first.seq);
    assert_eq!(codec.pending(), 2);
}

#[test]
fn given_failed_call_when_encoded_then_error_member_replaces_result() {
    let codec = ServerCodec::new();
    let request = codec.decode_request(r#"{"id":3,"method":"nope"}"#).unwrap();

    let frame = parse(&codec.encode_response(request.seq, Err(RpcError::method_not_found("Nope"))));

    assert_eq!(frame["id"], json!(3));
    assert_eq!(frame["error"]["code"], json!(-32601));
    assert!(frame.get("result").is_none());
}

#[test]
fn given_malformed_json_when_decoded_then_parse_error() {
    let codec = ServerCodec::new();

    let error = codec.decode_request("{not json").unwrap_err();

    assert!(matches!(error, CodecError::Parse { .. }));
    assert_eq!(RpcError::from(&error).code, PARSE_ERROR);
}

/// **VALUE**: Verifies that a request without a method still reports back under its id.
#[test]
fn given_missing_method_when_decoded_then_invalid_request_keeps_id() {
    let codec = ServerCodec::new();

    let error = codec.decode_request(r#"{"id":42,"params":{}}"#).unwrap_err();

    match &error {
        CodecError::InvalidRequest { id, .. } => assert_eq!(id, &Some(json!(42))),
        other => panic!("expected InvalidRequest, got {other:?}"),
    }
    assert_eq!(RpcError::from(&error).code, INVALID_REQUEST);
    assert_eq!(codec.pending(), 0);
}

#[test]
fn given_wrong_protocol_version_when_decoded_then_invalid_request() {
    let codec = ServerCodec::new();

    let error = codec
        .decode_request(r#"{"jsonrpc":"1.0","id":1,"method":"status"}"#)
        .unwrap_err();

    assert!(matches!(error, CodecError::InvalidRequest { .. }));
}
