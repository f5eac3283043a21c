//! HTTP response assertions.

use axum_test::TestResponse;
use serde_json::Value;

/// Asserts that the response has the expected status code.
pub fn assert_status(response: &TestResponse, expected: u16) {
    let actual = response.status_code().as_u16();
    assert_eq!(
        actual,
        expected,
        "Expected status {}, got {}: {}",
        expected,
        actual,
        response.text()
    );
}

/// Asserts that the response is an error body with the given status and code.
pub fn assert_error(response: &TestResponse, status: u16, code: &str) {
    assert_status(response, status);
    let body: Value = response.json();
    assert_eq!(body["error"]["status"], status, "Unexpected body: {}", body);
    assert_eq!(body["error"]["code"], code, "Unexpected body: {}", body);
}

/// Asserts that the response has no body.
pub fn assert_no_content(response: &TestResponse) {
    assert_status(response, 204);
    assert!(
        response.text().is_empty(),
        "Expected empty body, got {}",
        response.text()
    );
}

/// Extracts the `name` of every document in a JSON array body.
pub fn names(response: &TestResponse) -> Vec<String> {
    let body: Value = response.json();
    body.as_array()
        .expect("Expected a JSON array")
        .iter()
        .filter_map(|d| d["name"].as_str().map(str::to_string))
        .collect()
}
