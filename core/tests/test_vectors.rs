//! Verify status validation against the JSON cases in `test-vectors/`.
//!
//! Each case names a mock-server path, an optional expected status and the
//! outcome the caller should see.

mod common;

use jsonreq::{execute_discarding, Error, RequestParams};
use serde::Deserialize;

#[derive(Deserialize)]
struct Vectors {
    cases: Vec<Case>,
}

#[derive(Deserialize)]
struct Case {
    name: String,
    path: String,
    expected_status: u16,
    outcome: Outcome,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Outcome {
    Ok,
    Unexpected { message: String },
    Status { status: u16, message: Option<String> },
}

#[test]
fn status_test_vectors() {
    let raw = include_str!("../../test-vectors/status.json");
    let vectors: Vectors = serde_json::from_str(raw).unwrap();

    for case in vectors.cases {
        let name = &case.name;
        let mut params = RequestParams::get(&common::url(&case.path));
        params.expected_status = Some(case.expected_status);

        let result = execute_discarding(params, None);
        match case.outcome {
            Outcome::Ok => assert!(result.is_ok(), "{name}: {result:?}"),
            Outcome::Unexpected { message } => {
                let err = result.expect_err(name);
                assert!(matches!(err, Error::UnexpectedStatus { .. }), "{name}: {err:?}");
                assert_eq!(err.to_string(), message, "{name}");
            }
            Outcome::Status { status, message } => match result.expect_err(name) {
                Error::Status(err) => {
                    assert_eq!(err.status, status, "{name}: status");
                    assert_eq!(err.message, message, "{name}: message");
                }
                other => panic!("{name}: expected a status error, got {other:?}"),
            },
        }
    }
}
