//! Shared fixtures for the wiremock-backed tests.

#![allow(dead_code)]

use jetnet::rest::endpoints::LOGIN_PATH;
use jetnet::{JetnetConfig, TokenPair};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const EMAIL: &str = "pilot@example.com";
pub const PASSWORD: &str = "hunter2";

/// Config pointed at the mock server, probing disabled.
pub fn config(server: &MockServer) -> JetnetConfig {
    JetnetConfig::new(EMAIL, PASSWORD)
        .with_base_url(server.uri())
        .with_validate_on_ensure(false)
}

pub fn pair(bearer: &str, api: &str) -> TokenPair {
    TokenPair {
        bearer_token: bearer.into(),
        api_token: api.into(),
    }
}

pub fn login_response(bearer: &str, api: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "responsestatus": "SUCCESS",
        "bearerToken": bearer,
        "apiToken": api
    }))
}

pub fn invalid_token() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "responsestatus": "ERROR: INVALID SECURITY TOKEN"
    }))
}

/// Login that answers once with the given pair and must be hit exactly once.
/// Mount in the order the logins are expected.
pub async fn mount_login_once(server: &MockServer, bearer: &str, api: &str) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_json(json!({"emailAddress": EMAIL, "password": PASSWORD})))
        .respond_with(login_response(bearer, api))
        .up_to_n_times(1)
        .expect(1)
        .named(format!("login -> {bearer}"))
        .mount(server)
        .await;
}

/// Login that must never be called.
pub async fn forbid_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(login_response("unexpected", "unexpected"))
        .expect(0)
        .named("no login")
        .mount(server)
        .await;
}
