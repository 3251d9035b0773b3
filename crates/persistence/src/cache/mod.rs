//! In-memory cache of dashboard entities
//!
//! Each fetch takes a [`FetchTicket`]. A result is stored only while its
//! ticket is still the newest one issued for that key, so a slow response
//! can never overwrite data from a later fetch or survive an invalidation.

use boxtrack_core::{Balance, BoxId, BoxStatus, PortfolioBox, ProfitLossSummary, Transaction};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::debug;

/// What a cached entry is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Balance,
    Summary,
    OpenBoxes,
    ClosedBoxes,
    Ledger(BoxId),
}

impl CacheKey {
    pub fn boxes(status: BoxStatus) -> Self {
        match status {
            BoxStatus::Open => CacheKey::OpenBoxes,
            BoxStatus::Closed => CacheKey::ClosedBoxes,
        }
    }
}

/// Proof that a fetch was started; hand it back with the result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    key: CacheKey,
    generation: u64,
}

/// Where a box's ledger stands
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerState {
    NotFetched,
    Pending,
    Ready(Vec<Transaction>),
}

enum LedgerSlot {
    Pending { generation: u64 },
    Ready { transactions: Vec<Transaction> },
}

#[derive(Default)]
struct CacheState {
    next_generation: u64,
    latest: HashMap<CacheKey, u64>,
    balance: Option<Balance>,
    summary: Option<ProfitLossSummary>,
    open_boxes: Option<Vec<PortfolioBox>>,
    closed_boxes: Option<Vec<PortfolioBox>>,
    ledgers: HashMap<BoxId, LedgerSlot>,
}

impl CacheState {
    fn issue(&mut self, key: CacheKey) -> FetchTicket {
        self.next_generation += 1;
        self.latest.insert(key, self.next_generation);
        FetchTicket {
            key,
            generation: self.next_generation,
        }
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.latest.get(&ticket.key) == Some(&ticket.generation)
    }

    fn bump(&mut self, key: CacheKey) {
        self.next_generation += 1;
        self.latest.insert(key, self.next_generation);
    }
}

/// Thread-safe store for balance, summary, box lists and per-box ledgers
#[derive(Default)]
pub struct EntityCache {
    state: RwLock<CacheState>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch of an aggregate or box list; superseding any fetch in flight
    pub fn begin(&self, key: CacheKey) -> Option<FetchTicket> {
        let mut state = self.state.write().ok()?;
        Some(state.issue(key))
    }

    /// Whether a ticket is still the newest for its key
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.state
            .read()
            .map(|s| s.is_current(ticket))
            .unwrap_or(false)
    }

    /// Store a fetched balance; false when the ticket was superseded
    pub fn complete_balance(&self, ticket: FetchTicket, balance: Balance) -> bool {
        let Ok(mut state) = self.state.write() else {
            return false;
        };
        if ticket.key != CacheKey::Balance || !state.is_current(&ticket) {
            debug!("Discarding stale balance (generation {})", ticket.generation);
            return false;
        }
        state.balance = Some(balance);
        true
    }

    /// Store a fetched summary; false when the ticket was superseded
    pub fn complete_summary(&self, ticket: FetchTicket, summary: ProfitLossSummary) -> bool {
        let Ok(mut state) = self.state.write() else {
            return false;
        };
        if ticket.key != CacheKey::Summary || !state.is_current(&ticket) {
            debug!("Discarding stale summary (generation {})", ticket.generation);
            return false;
        }
        state.summary = Some(summary);
        true
    }

    /// Replace a box list. A box never sits in both lists: closed wins.
    pub fn complete_boxes(&self, ticket: FetchTicket, boxes: Vec<PortfolioBox>) -> bool {
        let Ok(mut state) = self.state.write() else {
            return false;
        };
        if !state.is_current(&ticket) {
            debug!("Discarding stale {:?} (generation {})", ticket.key, ticket.generation);
            return false;
        }

        match ticket.key {
            CacheKey::OpenBoxes => {
                let closed: HashSet<BoxId> = state
                    .closed_boxes
                    .iter()
                    .flatten()
                    .map(|b| b.id)
                    .collect();
                let open = boxes.into_iter().filter(|b| !closed.contains(&b.id)).collect();
                state.open_boxes = Some(open);
            }
            CacheKey::ClosedBoxes => {
                let closed: HashSet<BoxId> = boxes.iter().map(|b| b.id).collect();
                if let Some(open) = state.open_boxes.as_mut() {
                    open.retain(|b| !closed.contains(&b.id));
                }
                state.closed_boxes = Some(boxes);
            }
            _ => return false,
        }
        true
    }

    /// Claim a never-fetched ledger. `None` when it is pending or ready.
    pub fn begin_ledger_fetch(&self, box_id: BoxId) -> Option<FetchTicket> {
        let mut state = self.state.write().ok()?;
        if state.ledgers.contains_key(&box_id) {
            return None;
        }
        let ticket = state.issue(CacheKey::Ledger(box_id));
        state.ledgers.insert(
            box_id,
            LedgerSlot::Pending {
                generation: ticket.generation,
            },
        );
        Some(ticket)
    }

    /// Store a fetched ledger, stamping each row with its box
    pub fn complete_ledger(&self, ticket: FetchTicket, mut transactions: Vec<Transaction>) -> bool {
        let CacheKey::Ledger(box_id) = ticket.key else {
            return false;
        };
        let Ok(mut state) = self.state.write() else {
            return false;
        };
        let pending_here = matches!(
            state.ledgers.get(&box_id),
            Some(LedgerSlot::Pending { generation }) if *generation == ticket.generation
        );
        if !pending_here || !state.is_current(&ticket) {
            debug!("Discarding stale ledger for box {}", box_id);
            return false;
        }

        for tx in &mut transactions {
            tx.box_id = box_id;
        }
        state.ledgers.insert(box_id, LedgerSlot::Ready { transactions });
        true
    }

    /// Release a failed ledger fetch so the next expand retries
    pub fn fail_ledger(&self, ticket: FetchTicket) {
        let CacheKey::Ledger(box_id) = ticket.key else {
            return;
        };
        if let Ok(mut state) = self.state.write() {
            let ours = matches!(
                state.ledgers.get(&box_id),
                Some(LedgerSlot::Pending { generation }) if *generation == ticket.generation
            );
            if ours {
                state.ledgers.remove(&box_id);
            }
        }
    }

    pub fn ledger_state(&self, box_id: BoxId) -> LedgerState {
        let Ok(state) = self.state.read() else {
            return LedgerState::NotFetched;
        };
        match state.ledgers.get(&box_id) {
            None => LedgerState::NotFetched,
            Some(LedgerSlot::Pending { .. }) => LedgerState::Pending,
            Some(LedgerSlot::Ready { transactions }) => LedgerState::Ready(transactions.clone()),
        }
    }

    /// Fetched transactions of a box, if ready
    pub fn ledger(&self, box_id: BoxId) -> Option<Vec<Transaction>> {
        match self.ledger_state(box_id) {
            LedgerState::Ready(transactions) => Some(transactions),
            _ => None,
        }
    }

    pub fn balance(&self) -> Option<Balance> {
        self.state.read().ok()?.balance.clone()
    }

    pub fn summary(&self) -> Option<ProfitLossSummary> {
        self.state.read().ok()?.summary.clone()
    }

    /// Last accepted list; empty when never fetched
    pub fn boxes(&self, status: BoxStatus) -> Vec<PortfolioBox> {
        let Ok(state) = self.state.read() else {
            return Vec::new();
        };
        let list = match status {
            BoxStatus::Open => &state.open_boxes,
            BoxStatus::Closed => &state.closed_boxes,
        };
        list.clone().unwrap_or_default()
    }

    /// The open box holding a coin, if one is known
    pub fn find_open_box_by_symbol(&self, coin_symbol: &str) -> Option<BoxId> {
        let state = self.state.read().ok()?;
        state
            .open_boxes
            .iter()
            .flatten()
            .find(|b| b.holds(coin_symbol))
            .map(|b| b.id)
    }

    /// Drop in-flight results for a key. A ledger also returns to `NotFetched`.
    pub fn invalidate(&self, key: CacheKey) {
        if let Ok(mut state) = self.state.write() {
            state.bump(key);
            if let CacheKey::Ledger(box_id) = key {
                state.ledgers.remove(&box_id);
            }
        }
    }

    pub fn invalidate_all_ledgers(&self) {
        if let Ok(mut state) = self.state.write() {
            let ids: Vec<BoxId> = state.ledgers.keys().copied().collect();
            for id in ids {
                state.bump(CacheKey::Ledger(id));
            }
            state.ledgers.clear();
        }
    }

    /// Forget everything; fetches still in flight are discarded on arrival
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.write() {
            let keys: Vec<CacheKey> = state.latest.keys().copied().collect();
            for key in keys {
                state.bump(key);
            }
            state.balance = None;
            state.summary = None;
            state.open_boxes = None;
            state.closed_boxes = None;
            state.ledgers.clear();
        }
    }
}
