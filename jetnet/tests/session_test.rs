//! Session lifecycle against a mock provider: login, proactive refresh,
//! validation probes and the one-shot retry on a rejected token.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use jetnet::rest::endpoints::{ACCOUNT_INFO_PATH, LOGIN_PATH};
use jetnet::{ErrorKind, Jetnet, SessionState};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

fn account_info_path(api_token: &str) -> String {
    ACCOUNT_INFO_PATH.replace("{apiToken}", api_token)
}

fn account_info_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "responsestatus": "SUCCESS",
        "emailaddress": EMAIL
    }))
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_login_returns_both_tokens() {
    let server = MockServer::start().await;
    mount_login_once(&server, "B1", "A1").await;

    let before = Utc::now();
    let client = Jetnet::connect(config(&server)).await.unwrap();

    let session = client.session().await;
    assert_eq!(session.state(), SessionState::Authenticated);
    assert_eq!(session.tokens(), Some(&pair("B1", "A1")));
    assert_eq!(session.generation(), 1);
    let issued = session.issued_at().unwrap();
    assert!(issued >= before && issued <= Utc::now());
}

#[tokio::test]
async fn test_login_accepts_security_token_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responsestatus": "SUCCESS",
            "bearerToken": "B1",
            "securityToken": "S1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = Jetnet::new(config(&server)).unwrap();
    let tokens = client.login().await.unwrap();
    assert_eq!(tokens, pair("B1", "S1"));
}

#[tokio::test]
async fn test_login_missing_api_token_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"responsestatus": "SUCCESS", "bearerToken": "B1"})),
        )
        .mount(&server)
        .await;

    let err = Jetnet::connect(config(&server)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn test_login_http_failure_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = Jetnet::connect(config(&server)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_login_error_status_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"responsestatus": "ERROR: INVALID LOGIN"})),
        )
        .mount(&server)
        .await;

    let client = Jetnet::new(config(&server)).unwrap();
    let err = client.login().await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(client.session().await.state(), SessionState::Unauthenticated);
}

// ---------------------------------------------------------------------------
// Authenticated requests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_lookup_substitutes_token_and_sends_bearer() {
    let server = MockServer::start().await;
    mount_login_once(&server, "B1", "A1").await;
    Mock::given(method("GET"))
        .and(path("/api/Aircraft/getRegNumber/N1KE/A1"))
        .and(header("Authorization", "Bearer B1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responsestatus": "SUCCESS",
            "aircraftresult": {
                "aircraftid": 211870,
                "regnbr": "N1KE",
                "make": "GULFSTREAM",
                "model": "G550"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = Jetnet::new(config(&server)).unwrap();
    let aircraft = client.lookup_registration("n1ke").await.unwrap().unwrap();
    assert_eq!(aircraft["regnbr"], "N1KE");
    assert_eq!(aircraft["model"], "G550");

    let requests = server.received_requests().await.unwrap();
    let lookup = requests
        .iter()
        .find(|r| r.method.as_str() == "GET")
        .unwrap();
    assert!(lookup.url.path().contains("A1"));
    assert!(!lookup.url.path().contains("{apiToken}"));
    assert_eq!(
        lookup.headers.get("authorization").unwrap().to_str().unwrap(),
        "Bearer B1"
    );
}

#[tokio::test]
async fn test_lookup_without_aircraft_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Aircraft/getRegNumber/N0NE/A1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"responsestatus": "SUCCESS", "aircraftresult": {}})),
        )
        .mount(&server)
        .await;

    let client = Jetnet::with_tokens(config(&server), pair("B1", "A1"), Utc::now()).unwrap();
    assert!(client.lookup_registration("N0NE").await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_token_relogs_once_and_retries() {
    let server = MockServer::start().await;
    mount_login_once(&server, "B1", "A1").await;
    mount_login_once(&server, "B2", "A2").await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A1")))
        .and(header("Authorization", "Bearer B1"))
        .respond_with(invalid_token())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A2")))
        .and(header("Authorization", "Bearer B2"))
        .respond_with(account_info_ok())
        .expect(1)
        .mount(&server)
        .await;

    let client = Jetnet::new(config(&server)).unwrap();
    let info = client.account_info().await.unwrap();
    assert_eq!(info["emailaddress"], EMAIL);

    let session = client.session().await;
    assert_eq!(session.tokens(), Some(&pair("B2", "A2")));
    assert_eq!(session.generation(), 2);
}

#[tokio::test]
async fn test_invalid_token_twice_stops_after_one_retry() {
    let server = MockServer::start().await;
    mount_login_once(&server, "B1", "A1").await;
    mount_login_once(&server, "B2", "A2").await;
    forbid_login(&server).await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A1")))
        .respond_with(invalid_token())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A2")))
        .respond_with(invalid_token())
        .expect(1)
        .mount(&server)
        .await;

    let client = Jetnet::new(config(&server)).unwrap();
    let err = client.account_info().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(err.to_string().contains("INVALID SECURITY TOKEN"));
}

#[tokio::test]
async fn test_api_error_is_not_retried() {
    let server = MockServer::start().await;
    forbid_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/Aircraft/getRegNumber/N404/A1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"responsestatus": "ERROR: NO AIRCRAFT FOUND"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = Jetnet::with_tokens(config(&server), pair("B1", "A1"), Utc::now()).unwrap();
    let err = client.lookup_registration("N404").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert!(err.to_string().contains("ERROR: NO AIRCRAFT FOUND"));
}

#[tokio::test]
async fn test_http_error_is_transport_and_not_retried() {
    let server = MockServer::start().await;
    forbid_login(&server).await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A1")))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let client = Jetnet::with_tokens(config(&server), pair("B1", "A1"), Utc::now()).unwrap();
    let err = client.account_info().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("maintenance"));
}

#[tokio::test]
async fn test_problem_details_401_triggers_retry() {
    let server = MockServer::start().await;
    mount_login_once(&server, "B2", "A2").await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "https://tools.ietf.org/html/rfc7235#section-3.1",
            "title": "Unauthorized",
            "status": 401
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A2")))
        .respond_with(account_info_ok())
        .expect(1)
        .mount(&server)
        .await;

    let client = Jetnet::with_tokens(config(&server), pair("B1", "A1"), Utc::now()).unwrap();
    client.account_info().await.unwrap();
}

#[tokio::test]
async fn test_stale_session_logs_in_before_request() {
    let server = MockServer::start().await;
    mount_login_once(&server, "B2", "A2").await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A1")))
        .respond_with(account_info_ok())
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A2")))
        .respond_with(account_info_ok())
        .expect(1)
        .mount(&server)
        .await;

    let issued = Utc::now() - TimeDelta::minutes(51);
    let client = Jetnet::with_tokens(config(&server), pair("B1", "A1"), issued).unwrap();
    client.account_info().await.unwrap();
}

// ---------------------------------------------------------------------------
// ensure_valid
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ensure_valid_stale_logs_in_without_probe() {
    let server = MockServer::start().await;
    mount_login_once(&server, "B2", "A2").await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A1")))
        .respond_with(account_info_ok())
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A2")))
        .respond_with(account_info_ok())
        .expect(0)
        .mount(&server)
        .await;

    let issued = Utc::now() - TimeDelta::minutes(51);
    let config = config(&server).with_validate_on_ensure(true);
    let client = Jetnet::with_tokens(config, pair("B1", "A1"), issued).unwrap();
    assert!(client.is_stale().await);

    let tokens = client.ensure_valid().await.unwrap();
    assert_eq!(tokens, pair("B2", "A2"));
    assert!(!client.is_stale().await);
}

#[tokio::test]
async fn test_ensure_valid_fresh_session_probes() {
    let server = MockServer::start().await;
    forbid_login(&server).await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A1")))
        .and(header("Authorization", "Bearer B1"))
        .respond_with(account_info_ok())
        .expect(1)
        .mount(&server)
        .await;

    let issued = Utc::now() - TimeDelta::minutes(10);
    let config = config(&server).with_validate_on_ensure(true);
    let client = Jetnet::with_tokens(config, pair("B1", "A1"), issued).unwrap();

    let tokens = client.ensure_valid().await.unwrap();
    assert_eq!(tokens, pair("B1", "A1"));
    let session = client.session().await;
    assert!(session.last_validated_at().unwrap() > session.issued_at().unwrap());
}

#[tokio::test]
async fn test_ensure_valid_without_probe_skips_call() {
    let server = MockServer::start().await;
    forbid_login(&server).await;

    let client = Jetnet::with_tokens(config(&server), pair("B1", "A1"), Utc::now()).unwrap();
    assert_eq!(client.ensure_valid().await.unwrap(), pair("B1", "A1"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ensure_valid_failed_probe_relogs() {
    let server = MockServer::start().await;
    mount_login_once(&server, "B1", "A1").await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A0")))
        .respond_with(invalid_token())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A1")))
        .respond_with(account_info_ok())
        .expect(1)
        .mount(&server)
        .await;

    let config = config(&server).with_validate_on_ensure(true);
    let client = Jetnet::with_tokens(config, pair("B0", "A0"), Utc::now()).unwrap();
    assert_eq!(client.ensure_valid().await.unwrap(), pair("B1", "A1"));
}

#[tokio::test]
async fn test_ensure_valid_fails_when_relogin_does_not_help() {
    let server = MockServer::start().await;
    mount_login_once(&server, "B1", "A1").await;
    forbid_login(&server).await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A0")))
        .respond_with(invalid_token())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A1")))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(&server).with_validate_on_ensure(true);
    let client = Jetnet::with_tokens(config, pair("B0", "A0"), Utc::now()).unwrap();
    let err = client.ensure_valid().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(client.session().await.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_probe_account_info_does_not_refresh() {
    let server = MockServer::start().await;
    forbid_login(&server).await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A1")))
        .respond_with(invalid_token())
        .expect(1)
        .mount(&server)
        .await;

    let client = Jetnet::with_tokens(config(&server), pair("B1", "A1"), Utc::now()).unwrap();
    let err = client.probe_account_info().await.unwrap_err();
    assert!(err.is_auth());
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_concurrent_refreshes_collapse_into_one_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(login_response("B2", "A2").set_delay(Duration::from_millis(50)))
        .expect(1)
        .mount(&server)
        .await;

    let issued = Utc::now() - TimeDelta::hours(2);
    let client = Arc::new(Jetnet::with_tokens(config(&server), pair("B1", "A1"), issued).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.ensure_valid().await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), pair("B2", "A2"));
    }
    assert_eq!(client.session().await.generation(), 2);
}

#[tokio::test]
async fn test_concurrent_rejections_trigger_one_login() {
    let server = MockServer::start().await;
    mount_login_once(&server, "B1", "A1").await;
    forbid_login(&server).await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A0")))
        .respond_with(invalid_token())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(account_info_path("A1")))
        .respond_with(account_info_ok())
        .mount(&server)
        .await;

    let client = Jetnet::with_tokens(config(&server), pair("B0", "A0"), Utc::now()).unwrap();
    let (a, b, c) = tokio::join!(
        client.account_info(),
        client.account_info(),
        client.account_info()
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();
}
