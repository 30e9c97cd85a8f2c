use super::*;
use crate::storage::MemoryStore;
use crate::test_helpers::{RecordingRedirect, ScriptedTransport, login_body, ok, status};
use crate::net::tokens::TokenStore;
use std::sync::Arc;

fn wired(
    responses: Vec<Result<crate::net::transport::ApiResponse, ApiError>>,
) -> (Arc<ScriptedTransport>, SessionStore, ApiClient) {
    let storage = Arc::new(MemoryStore::new());
    let transport = ScriptedTransport::new(responses);
    let api = ApiClient::authenticated(transport.clone(), TokenStore::new(storage.clone()), RecordingRedirect::new());
    (transport, SessionStore::new(storage), api)
}

#[test]
fn username_is_trimmed() {
    let form = LoginForm::new("  alice ", " pw ");
    assert_eq!(form.username, "alice");
    assert_eq!(form.password, " pw ");
    assert!(form.check().is_ok());
}

#[test]
fn blank_fields_are_rejected() {
    for (username, password) in [("", "secret"), ("   ", "secret"), ("alice", ""), ("", "")] {
        let error = LoginForm::new(username, password).check().unwrap_err();
        assert_eq!(error.message, MISSING_FIELDS_MESSAGE);
    }
}

#[test]
fn missing_username_is_reported_first() {
    let error = LoginForm::new("", "").check().unwrap_err();
    assert_eq!(error.field, "username");
}

#[tokio::test]
async fn invalid_form_makes_no_request() {
    let (transport, session, api) = wired(vec![]);

    let error = LoginForm::new("alice", "").submit(&session, &api).await.unwrap_err();

    assert!(matches!(error, LoginError::Validation(_)));
    assert_eq!(error.message(), MISSING_FIELDS_MESSAGE);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn successful_submit_lands_on_dashboard() {
    let (_, session, api) = wired(vec![ok(login_body("A1", "R1"))]);

    let route = LoginForm::new("alice", "secret").submit(&session, &api).await.unwrap();

    assert_eq!(route, Route::Dashboard);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn server_message_is_surfaced() {
    let (_, session, api) = wired(vec![status(401, "User is inactive")]);

    let error = LoginForm::new("alice", "secret").submit(&session, &api).await.unwrap_err();

    assert_eq!(error.message(), "User is inactive");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn missing_server_message_uses_fallback() {
    let (_, session, api) = wired(vec![Err(ApiError::Request("connection refused".into()))]);

    let error = LoginForm::new("alice", "secret").submit(&session, &api).await.unwrap_err();

    assert_eq!(error.message(), LOGIN_FAILED_MESSAGE);
}
