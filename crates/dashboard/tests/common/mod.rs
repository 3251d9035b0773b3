//! In-process backend and a dashboard wired to it

#![allow(dead_code)]

use async_trait::async_trait;
use boxtrack_core::{Credentials, Error, RefreshPolicy, ReloadPolicy, Result};
use boxtrack_dashboard::{DashboardController, DashboardEvent};
use boxtrack_networking::{ApiRequest, ApiResponse, AuthorizedClient, Method, Session, Transport};
use boxtrack_persistence::{CredentialStore, EntityCache, MemoryCredentialStore};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

pub const REFRESH: &str = "auth/token/refresh/";
pub const BALANCE: &str = "balance/";
pub const SUMMARY: &str = "summary/";
pub const OPEN: &str = "boxes/?closed=false";
pub const CLOSED: &str = "boxes/?closed=true";

#[derive(Clone)]
enum Scripted {
    Respond(ApiResponse),
    Fault,
}

/// Answers by (method, path); the last queued answer repeats
#[derive(Default)]
pub struct MockBackend {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    log: Mutex<Vec<(Method, String)>>,
}

impl MockBackend {
    /// Queue an answer after the ones already scripted
    pub fn then(&self, method: Method, path: &str, status: u16, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Scripted::Respond(ApiResponse::new(status, body)));
    }

    /// Replace every scripted answer for the route
    pub fn set(&self, method: Method, path: &str, status: u16, body: Value) {
        let mut routes = self.routes.lock().unwrap();
        let queue = routes.entry((method, path.to_string())).or_default();
        queue.clear();
        queue.push_back(Scripted::Respond(ApiResponse::new(status, body)));
    }

    /// Drop the connection on the next call only
    pub fn fail_once(&self, method: Method, path: &str) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_front(Scripted::Fault);
    }

    pub fn count(&self, path: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|(_, p)| p == path).count()
    }

    pub fn count_call(&self, method: Method, path: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, p)| *m == method && p == path)
            .count()
    }

    pub fn total(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.log
            .lock()
            .unwrap()
            .push((request.method.clone(), request.path.clone()));

        let answer = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&(request.method.clone(), request.path.clone())) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        tokio::task::yield_now().await;

        match answer {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fault) => Err(Error::TransportFault("connection reset".to_string())),
            None => Ok(ApiResponse::new(404, json!({"detail": "Not found."}))),
        }
    }
}

pub struct Harness {
    pub backend: Arc<MockBackend>,
    pub store: Arc<MemoryCredentialStore>,
    pub session: Arc<Session>,
    pub dashboard: DashboardController,
}

impl Harness {
    /// Signed in with a scripted portfolio: BTC (1) and ETH (2) open, SOL (3) closed
    pub async fn signed_in(policy: ReloadPolicy) -> Self {
        let harness = Self::build(policy, Some(Credentials::new("a1", "r1"))).await;
        harness.script_portfolio();
        harness
    }

    pub async fn mounted(policy: ReloadPolicy) -> Self {
        let harness = Self::signed_in(policy).await;
        harness.dashboard.mount().await;
        harness
    }

    pub async fn signed_out() -> Self {
        Self::build(ReloadPolicy::Targeted, None).await
    }

    async fn build(policy: ReloadPolicy, credentials: Option<Credentials>) -> Self {
        let backend = Arc::new(MockBackend::default());
        let store = Arc::new(match credentials {
            Some(c) => MemoryCredentialStore::with_credentials(c),
            None => MemoryCredentialStore::new(),
        });
        let session = Arc::new(Session::restore(store.clone()).await.unwrap());
        let client = AuthorizedClient::new(session.clone(), backend.clone(), RefreshPolicy::Always);
        let dashboard = DashboardController::new(Arc::new(client), Arc::new(EntityCache::new()), policy);
        Self {
            backend,
            store,
            session,
            dashboard,
        }
    }

    fn script_portfolio(&self) {
        let b = &self.backend;
        b.set(Method::POST, REFRESH, 200, json!({"access": "a2"}));
        b.set(
            Method::GET,
            BALANCE,
            200,
            envelope(json!({
                "total_balance": "1500.00000000",
                "usdt_balance": "1000.00000000",
                "coin_balance": "500.00000000"
            })),
        );
        b.set(
            Method::GET,
            SUMMARY,
            200,
            envelope(json!({"total_profit_loss": "42.00000000", "total_profit_loss_percentage": "2.80000000"})),
        );
        b.set(
            Method::GET,
            OPEN,
            200,
            envelope(json!([box_json(1, "BTC", false), box_json(2, "ETH", false)])),
        );
        b.set(Method::GET, CLOSED, 200, envelope(json!([box_json(3, "SOL", true)])));
        b.set(
            Method::GET,
            &ledger_path(1),
            200,
            envelope(json!([tx_json(11, "buy"), tx_json(12, "sell")])),
        );
        b.set(Method::GET, &ledger_path(2), 200, envelope(json!([tx_json(21, "buy")])));
    }

    pub async fn stored(&self) -> Option<Credentials> {
        self.store.load().await.unwrap()
    }
}

/// Holds a signed-in pair until `break_reads` makes every read fail
#[derive(Default)]
pub struct UnreadableStore {
    inner: MemoryCredentialStore,
    broken: AtomicBool,
}

impl UnreadableStore {
    pub fn signed_in() -> Self {
        Self {
            inner: MemoryCredentialStore::with_credentials(Credentials::new("a1", "r1")),
            broken: AtomicBool::new(false),
        }
    }

    pub fn break_reads(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(Error::DatabaseError("disk I/O error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for UnreadableStore {
    async fn save(&self, credentials: &Credentials) -> Result<()> {
        self.check()?;
        self.inner.save(credentials).await
    }

    async fn load(&self) -> Result<Option<Credentials>> {
        self.check()?;
        self.inner.load().await
    }

    async fn replace_access_token(&self, access_token: &str) -> Result<()> {
        self.check()?;
        self.inner.replace_access_token(access_token).await
    }

    async fn clear(&self) -> Result<()> {
        self.check()?;
        self.inner.clear().await
    }
}

/// Dashboard over a session whose store can no longer be read
pub async fn unreadable_session() -> (Arc<MockBackend>, DashboardController) {
    let backend = Arc::new(MockBackend::default());
    let store = Arc::new(UnreadableStore::signed_in());
    let session = Arc::new(Session::restore(store.clone()).await.unwrap());
    store.break_reads();
    let client = AuthorizedClient::new(session, backend.clone(), RefreshPolicy::Always);
    let dashboard = DashboardController::new(Arc::new(client), Arc::new(EntityCache::new()), ReloadPolicy::Targeted);
    (backend, dashboard)
}

pub fn ledger_path(box_id: i64) -> String {
    format!("boxes/{}/transactions/", box_id)
}

pub fn envelope(data: Value) -> Value {
    json!({"success": true, "message": "Data retrieved successfully", "data": data})
}

pub fn box_json(id: i64, symbol: &str, closed: bool) -> Value {
    json!({
        "id": id,
        "coin_symbol": symbol,
        "coin_name": symbol,
        "amount": "1.00000000",
        "average_buy_price": "100.00000000",
        "current_price": "110.00000000",
        "value": "110.00000000",
        "profit_loss_value": "10.00000000",
        "profit_loss_percentage": "10.00000000",
        "age": 3,
        "is_closed": closed
    })
}

pub fn tx_json(id: i64, kind: &str) -> Value {
    json!({
        "id": id,
        "type": kind,
        "amount": "1.00000000",
        "price": "100.00000000",
        "value": "100.00000000",
        "fee": "0.10000000",
        "transaction_date": "2024-05-17 09:45"
    })
}

/// Everything broadcast so far
pub fn drain(rx: &mut broadcast::Receiver<DashboardEvent>) -> Vec<DashboardEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
