//! Scripted in-process backend

#![allow(dead_code)]

use async_trait::async_trait;
use boxtrack_core::{Credentials, Error, RefreshPolicy, Result};
use boxtrack_networking::{ApiRequest, ApiResponse, AuthorizedClient, Method, Session, Transport};
use boxtrack_persistence::{CredentialStore, MemoryCredentialStore};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const REFRESH: &str = "auth/token/refresh/";

#[derive(Clone)]
enum Scripted {
    Respond(ApiResponse),
    Fault(String),
}

/// What the backend saw
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

/// Answers by (method, path). The last scripted answer for a route repeats.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    log: Mutex<Vec<Recorded>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Scripted::Respond(ApiResponse::new(status, body)));
    }

    pub fn fail(&self, method: Method, path: &str) {
        self.push(method, path, Scripted::Fault("connection refused".to_string()));
    }

    fn push(&self, method: Method, path: &str, answer: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(answer);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.log.lock().unwrap().push(Recorded {
            method: request.method.clone(),
            path: request.path.clone(),
            bearer: request.bearer.clone(),
            body: request.body.clone(),
        });

        let answer = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&(request.method.clone(), request.path.clone())) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        // Let concurrent callers interleave
        tokio::task::yield_now().await;

        match answer {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fault(reason)) => Err(Error::TransportFault(reason)),
            None => Ok(ApiResponse::new(404, json!({"detail": "Not found."}))),
        }
    }
}

pub struct Harness {
    pub transport: Arc<MockTransport>,
    pub store: Arc<MemoryCredentialStore>,
    pub session: Arc<Session>,
    pub client: AuthorizedClient,
}

impl Harness {
    /// Signed in as `a1`/`r1`, refresh renews to `a2`
    pub async fn signed_in() -> Self {
        Self::signed_in_with(RefreshPolicy::Always, Credentials::new("a1", "r1")).await
    }

    pub async fn signed_in_with(policy: RefreshPolicy, credentials: Credentials) -> Self {
        let harness = Self::build(policy, Some(credentials)).await;
        harness
            .transport
            .on(Method::POST, REFRESH, 200, json!({"access": "a2"}));
        harness
    }

    /// No tokens, positioned at the login entry point
    pub async fn signed_out() -> Self {
        Self::build(RefreshPolicy::Always, None).await
    }

    async fn build(policy: RefreshPolicy, credentials: Option<Credentials>) -> Self {
        let transport = MockTransport::new();
        let store = Arc::new(match credentials {
            Some(c) => MemoryCredentialStore::with_credentials(c),
            None => MemoryCredentialStore::new(),
        });
        let session = Arc::new(Session::restore(store.clone()).await.unwrap());
        let client = AuthorizedClient::new(session.clone(), transport.clone(), policy);
        Self {
            transport,
            store,
            session,
            client,
        }
    }

    pub async fn stored(&self) -> Option<Credentials> {
        self.store.load().await.unwrap()
    }
}

pub fn envelope(data: Value) -> Value {
    json!({"success": true, "message": "Data retrieved successfully", "data": data})
}

pub fn balance_body() -> Value {
    envelope(json!({
        "total_balance": "1500.00000000",
        "usdt_balance": "1000.00000000",
        "coin_balance": "500.00000000"
    }))
}
