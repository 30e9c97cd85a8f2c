//! Shared fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::error::ApiError;
use crate::net::auth_layer::LoginRedirect;
use crate::net::transport::{ApiRequest, ApiResponse, Transport};
use crate::net::types::User;
use crate::storage::{KeyValueStore, MemoryStore, StorageError};

/// Transport that answers from a queue and records what it was sent.
///
/// An empty queue answers `200 null`.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<ApiResponse, ApiError>>) -> Arc<Self> {
        Arc::new(Self { responses: Mutex::new(responses.into()), requests: Mutex::new(Vec::new()) })
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(200, Value::Null)))
    }
}

/// Redirect sink that counts how often it fired.
#[derive(Default)]
pub struct RecordingRedirect {
    count: Mutex<usize>,
}

impl RecordingRedirect {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        *self.count.lock().unwrap()
    }
}

impl LoginRedirect for RecordingRedirect {
    fn redirect_to_login(&self) {
        *self.count.lock().unwrap() += 1;
    }
}

/// In-memory store whose writes to one key always fail.
pub struct RejectingStore {
    inner: MemoryStore,
    rejected_key: &'static str,
}

impl RejectingStore {
    pub fn new(rejected_key: &'static str) -> Arc<Self> {
        Arc::new(Self { inner: MemoryStore::new(), rejected_key })
    }
}

impl KeyValueStore for RejectingStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == self.rejected_key {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.inner.save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

pub fn ok(body: Value) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse::new(200, body))
}

pub fn status(status: u16, message: &str) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse::new(status, json!({ "message": message })))
}

pub fn user(roles: &[&str], permissions: &[&str]) -> User {
    User {
        id: "u-1".into(),
        username: "alice".into(),
        email: "alice@lab.test".into(),
        full_name: "Alice Souza".into(),
        laboratory_id: Some("lab-1".into()),
        is_global_admin: false,
        roles: roles.iter().map(|r| (*r).to_owned()).collect(),
        permissions: permissions.iter().map(|p| (*p).to_owned()).collect(),
    }
}

pub fn global_admin() -> User {
    User { laboratory_id: None, is_global_admin: true, ..user(&[], &[]) }
}

pub fn login_body(access: &str, refresh: &str) -> Value {
    json!({
        "user": {
            "id": "u-1",
            "username": "alice",
            "email": "alice@lab.test",
            "fullName": "Alice Souza",
            "laboratoryId": "lab-1",
            "isGlobalAdmin": false,
            "roles": ["TECHNICIAN"],
            "permissions": ["samples:read", "samples:write"]
        },
        "tokens": { "accessToken": access, "refreshToken": refresh }
    })
}
