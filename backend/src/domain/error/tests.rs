//! Tests for the domain error type.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("no token"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("nope"), ErrorCode::Forbidden)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::service_unavailable("db down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn details_and_message_are_preserved() {
    let err = Error::invalid_request("bad").with_details(json!({ "field": "email" }));
    assert_eq!(err.message(), "bad");
    assert_eq!(err.to_string(), "bad");
    assert_eq!(err.details(), Some(&json!({ "field": "email" })));
}

#[rstest]
fn error_outside_request_scope_has_no_trace_id() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[tokio::test]
async fn error_inside_request_scope_captures_trace_id() {
    let id: TraceId = "00000000-0000-0000-0000-000000000001"
        .parse()
        .expect("valid UUID");
    let err = TraceId::scope(id, async { Error::forbidden("nope") }).await;
    assert_eq!(err.trace_id(), Some("00000000-0000-0000-0000-000000000001"));
}

#[rstest]
#[case(ErrorCode::InvalidRequest, "invalid_request")]
#[case(ErrorCode::ServiceUnavailable, "service_unavailable")]
#[case(ErrorCode::InternalError, "internal_error")]
fn wire_names_match_serde(#[case] code: ErrorCode, #[case] expected: &str) {
    assert_eq!(code.as_str(), expected);
    assert_eq!(
        serde_json::to_value(code).expect("serialise code"),
        json!(expected)
    );
}
