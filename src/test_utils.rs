// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock HTTP service for the Vault client and an in-memory store.

use crate::error::{StoreError, StoreResult};
use crate::types::{SecretPayload, TokenInfo};
use crate::vault::{SecretsClient, VaultClient};
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;
use url::Url;

/// A request observed by [`MockService`]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub token: Option<String>,
    pub body: Bytes,
}

/// A mock HTTP service that returns predefined responses based on request paths.
///
/// Registering the same method and path more than once queues the responses;
/// the last one keeps being returned once the queue is drained.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), VecDeque<(u16, String)>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for PUT requests matching the exact path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Build a store client from this mock service
    pub fn into_client(self) -> VaultClient {
        VaultClient::new(
            self,
            Url::parse("http://vault.test:8200").unwrap(),
            "test-token",
        )
    }

    /// All requests received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(&(method.to_string(), path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Bytes>> for MockService {
    type Response = Response<Bytes>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Bytes>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: req.uri().query().map(str::to_string),
            token: req
                .headers()
                .get(crate::constants::VAULT_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: req.body().clone(),
        });

        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, r#"{"errors": []}"#.to_string()));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Bytes::from(body))
                .unwrap())
        })
    }
}

/// Version history of one secret. `None` marks a deleted version.
type History = Vec<Option<SecretPayload>>;

#[derive(Default)]
struct FakeState {
    secrets: HashMap<(String, String), History>,
    failures: HashMap<(String, String), StoreError>,
    sealed: bool,
    unseal_succeeds: bool,
    seal_error: Option<StoreError>,
    token: Option<TokenInfo>,
    token_error: Option<StoreError>,
    submitted_keys: Vec<String>,
    renewals: Vec<Duration>,
    metadata_reads: usize,
    data_reads: usize,
    writes: Vec<(String, String, SecretPayload)>,
}

/// In-memory [`SecretsClient`] with failure injection and call counters
#[derive(Clone, Default)]
pub struct FakeSecretsClient {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSecretsClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new version for `mount/path`, returning its number
    pub fn put(&self, mount: &str, path: &str, payload: SecretPayload) -> u64 {
        let mut state = self.state.lock().unwrap();
        let history = state
            .secrets
            .entry((mount.to_string(), path.to_string()))
            .or_default();
        history.push(Some(payload));
        history.len() as u64
    }

    /// Mark the current version of `mount/path` as deleted
    pub fn delete_current(&self, mount: &str, path: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(last) = state
            .secrets
            .get_mut(&(mount.to_string(), path.to_string()))
            .and_then(|h| h.last_mut())
        {
            *last = None;
        }
    }

    /// Make every KV operation on `mount/path` fail with `error`
    pub fn fail_path(&self, mount: &str, path: &str, error: StoreError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((mount.to_string(), path.to_string()), error);
    }

    pub fn set_sealed(&self, sealed: bool, unseal_succeeds: bool) {
        let mut state = self.state.lock().unwrap();
        state.sealed = sealed;
        state.unseal_succeeds = unseal_succeeds;
    }

    pub fn fail_seal_status(&self, error: StoreError) {
        self.state.lock().unwrap().seal_error = Some(error);
    }

    pub fn set_token(&self, token: TokenInfo) {
        self.state.lock().unwrap().token = Some(token);
    }

    pub fn fail_token_lookup(&self, error: StoreError) {
        self.state.lock().unwrap().token_error = Some(error);
    }

    pub fn submitted_keys(&self) -> Vec<String> {
        self.state.lock().unwrap().submitted_keys.clone()
    }

    pub fn renewals(&self) -> Vec<Duration> {
        self.state.lock().unwrap().renewals.clone()
    }

    /// Number of payload downloads performed
    pub fn data_reads(&self) -> usize {
        self.state.lock().unwrap().data_reads
    }

    pub fn metadata_reads(&self) -> usize {
        self.state.lock().unwrap().metadata_reads
    }

    pub fn writes(&self) -> Vec<(String, String, SecretPayload)> {
        self.state.lock().unwrap().writes.clone()
    }

    fn check_failure(state: &FakeState, mount: &str, path: &str) -> StoreResult<()> {
        match state.failures.get(&(mount.to_string(), path.to_string())) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn history<'a>(state: &'a FakeState, mount: &str, path: &str) -> StoreResult<&'a History> {
        state
            .secrets
            .get(&(mount.to_string(), path.to_string()))
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", mount, path)))
    }
}

#[async_trait]
impl SecretsClient for FakeSecretsClient {
    async fn current_version(&self, mount: &str, path: &str) -> StoreResult<u64> {
        let mut state = self.state.lock().unwrap();
        state.metadata_reads += 1;
        Self::check_failure(&state, mount, path)?;
        Ok(Self::history(&state, mount, path)?.len() as u64)
    }

    async fn fetch_version(
        &self,
        mount: &str,
        path: &str,
        version: u64,
    ) -> StoreResult<SecretPayload> {
        let mut state = self.state.lock().unwrap();
        state.data_reads += 1;
        Self::check_failure(&state, mount, path)?;
        let history = Self::history(&state, mount, path)?;
        match history.get((version as usize).wrapping_sub(1)) {
            Some(Some(payload)) => Ok(payload.clone()),
            Some(None) => Err(StoreError::DeletedVersion { version }),
            None => Err(StoreError::NotFound(format!("{}/{} v{}", mount, path, version))),
        }
    }

    async fn fetch_latest(&self, mount: &str, path: &str) -> StoreResult<(SecretPayload, u64)> {
        let mut state = self.state.lock().unwrap();
        state.data_reads += 1;
        Self::check_failure(&state, mount, path)?;
        let history = Self::history(&state, mount, path)?;
        let version = history.len() as u64;
        match history.last() {
            Some(Some(payload)) => Ok((payload.clone(), version)),
            Some(None) => Err(StoreError::DeletedVersion { version }),
            None => Err(StoreError::NotFound(format!("{}/{}", mount, path))),
        }
    }

    async fn write_version(
        &self,
        mount: &str,
        path: &str,
        payload: &SecretPayload,
    ) -> StoreResult<u64> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state, mount, path)?;
        state
            .writes
            .push((mount.to_string(), path.to_string(), payload.clone()));
        let history = state
            .secrets
            .entry((mount.to_string(), path.to_string()))
            .or_default();
        history.push(Some(payload.clone()));
        Ok(history.len() as u64)
    }

    async fn is_sealed(&self) -> StoreResult<bool> {
        let state = self.state.lock().unwrap();
        match &state.seal_error {
            Some(error) => Err(error.clone()),
            None => Ok(state.sealed),
        }
    }

    async fn submit_unseal_keys(&self, keys: &[String]) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        state.submitted_keys.extend(keys.iter().cloned());
        if state.unseal_succeeds {
            state.sealed = false;
        }
        Ok(state.sealed)
    }

    async fn lookup_self_token(&self) -> StoreResult<TokenInfo> {
        let state = self.state.lock().unwrap();
        if let Some(error) = &state.token_error {
            return Err(error.clone());
        }
        Ok(state.token.clone().unwrap_or(TokenInfo {
            expire_time: None,
            renewable: false,
        }))
    }

    async fn renew_self_token(&self, increment: Duration) -> StoreResult<()> {
        self.state.lock().unwrap().renewals.push(increment);
        Ok(())
    }
}
