//! Dashboard controller
//!
//! Drives every fetch the dashboard needs, keeps the entity cache current
//! after mutations, and owns the view state. Errors are recovered here:
//! they end up in the banner or a form outcome, never in the caller.

use crate::events::DashboardEvent;
use crate::mutation::Mutation;
use crate::state::{ActiveTab, BalanceForm, DashboardSnapshot, LoadingFlags, ViewState};
use boxtrack_core::{
    BalanceDirection, BoxId, BoxStatus, DecimalInput, Error, FieldErrors, NewTransaction, ReloadPolicy, TransactionId,
    TransactionReceipt,
};
use boxtrack_networking::{api, AuthorizedClient, Route};
use boxtrack_persistence::{CacheKey, EntityCache, LedgerState};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

pub const BALANCE_LOAD_FAILED: &str = "Failed to load balance.";
pub const SUMMARY_LOAD_FAILED: &str = "Failed to load summary data.";
pub const OPEN_BOXES_LOAD_FAILED: &str = "Failed to fetch open boxes.";
pub const CLOSED_BOXES_LOAD_FAILED: &str = "Failed to fetch closed boxes.";
pub const LEDGER_LOAD_FAILED: &str = "Failed to fetch transactions.";
pub const BALANCE_CHANGE_FAILED: &str = "Transaction failed.";
pub const CLOSE_BOX_FAILED: &str = "Failed to close box";
pub const DELETE_TRANSACTION_FAILED: &str = "Failed to delete transaction.";
pub const LOGOUT_FAILED: &str = "Failed to log out.";
pub const SESSION_UNAVAILABLE: &str = "Failed to read the stored session.";

const EVENT_CAPACITY: usize = 256;

/// Result of a user action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Completed,
    /// Failed; the message is also in the banner
    Rejected(String),
    /// Nothing to do in the current state
    Ignored,
    /// The session ended; the route is back at login
    SignedOut,
}

/// Result of submitting the add-transaction form
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    Submitted(Option<TransactionReceipt>),
    /// Shown inline in the form, not in the banner
    Rejected {
        message: String,
        field_errors: FieldErrors,
    },
    SignedOut,
}

pub struct DashboardController {
    client: Arc<AuthorizedClient>,
    cache: Arc<EntityCache>,
    reload_policy: ReloadPolicy,
    view: RwLock<ViewState>,
    events: broadcast::Sender<DashboardEvent>,
}

impl DashboardController {
    pub fn new(client: Arc<AuthorizedClient>, cache: Arc<EntityCache>, reload_policy: ReloadPolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            cache,
            reload_policy,
            view: RwLock::new(ViewState::default()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub fn cache(&self) -> &Arc<EntityCache> {
        &self.cache
    }

    pub fn view(&self) -> ViewState {
        self.view
            .read()
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let view = self.view();
        let expanded_ledger = view.expanded.map(|id| self.cache.ledger_state(id));
        DashboardSnapshot {
            balance: self.cache.balance(),
            summary: self.cache.summary(),
            open_boxes: self.cache.boxes(BoxStatus::Open),
            closed_boxes: self.cache.boxes(BoxStatus::Closed),
            expanded_ledger,
            view,
        }
    }

    fn emit(&self, event: DashboardEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn update<F: FnOnce(&mut ViewState)>(&self, f: F) {
        if let Ok(mut view) = self.view.write() {
            f(&mut view);
        }
    }

    fn set_loading<F: FnOnce(&mut LoadingFlags)>(&self, f: F) {
        let mut flags = LoadingFlags::default();
        self.update(|v| {
            f(&mut v.loading);
            flags = v.loading;
        });
        self.emit(DashboardEvent::LoadingChanged(flags));
    }

    fn raise(&self, message: &str) {
        self.update(|v| v.banner = Some(message.to_string()));
        self.emit(DashboardEvent::BannerRaised(message.to_string()));
    }

    pub fn dismiss_banner(&self) {
        let had_banner = self.view().banner.is_some();
        self.update(|v| v.banner = None);
        if had_banner {
            self.emit(DashboardEvent::BannerDismissed);
        }
    }

    /// Mirror a torn-down session: back to login, cached data dropped
    fn signed_out(&self) {
        self.cache.clear();
        self.update(|v| {
            *v = ViewState {
                route: Route::Login,
                ..ViewState::default()
            };
        });
        self.emit(DashboardEvent::SignedOut);
    }

    fn recover(&self, err: Error, fallback: &str) -> ActionOutcome {
        // A sibling fetch may already have ended the session
        if err.is_unauthenticated() || self.client.session().route() == Route::Login {
            self.signed_out();
            return ActionOutcome::SignedOut;
        }
        warn!("{} ({})", fallback, err);
        let message = match &err {
            Error::DomainRejection { message, .. } if !message.is_empty() => message.clone(),
            Error::ValidationFailure(_) => err.user_message(),
            _ => fallback.to_string(),
        };
        self.raise(&message);
        ActionOutcome::Rejected(message)
    }

    fn outcome_after_fetches(&self) -> ActionOutcome {
        if self.view().route == Route::Login {
            ActionOutcome::SignedOut
        } else {
            ActionOutcome::Completed
        }
    }

    /// `Some` when there is no usable session: nothing may be sent
    async fn require_session(&self) -> Option<ActionOutcome> {
        match self.client.session().resolve(Route::Dashboard).await {
            Ok(Route::Dashboard) => None,
            Ok(Route::Login) => {
                self.signed_out();
                Some(ActionOutcome::SignedOut)
            }
            Err(e) if e.is_unauthenticated() => {
                self.signed_out();
                Some(ActionOutcome::SignedOut)
            }
            Err(e) => {
                warn!("Stored session unreadable ({})", e);
                self.raise(SESSION_UNAVAILABLE);
                Some(ActionOutcome::Rejected(SESSION_UNAVAILABLE.to_string()))
            }
        }
    }

    /// Initial load: balance alongside open boxes, closed boxes and summary
    #[instrument(skip(self))]
    pub async fn mount(&self) -> ActionOutcome {
        if let Some(stopped) = self.require_session().await {
            return stopped;
        }
        self.update(|v| v.route = Route::Dashboard);

        self.set_loading(|l| l.boxes = true);
        let boxes = async {
            tokio::join!(
                self.refresh_boxes(BoxStatus::Open),
                self.refresh_boxes(BoxStatus::Closed),
                self.refresh_summary(),
            );
            self.set_loading(|l| l.boxes = false);
        };
        tokio::join!(self.refresh_balance(), boxes);

        info!("Dashboard mounted");
        self.emit(DashboardEvent::Mounted);
        self.outcome_after_fetches()
    }

    async fn refresh_balance(&self) {
        let Some(ticket) = self.cache.begin(CacheKey::Balance) else {
            return;
        };
        self.set_loading(|l| l.balance = true);
        let result = api::read_balance(&self.client).await;
        self.set_loading(|l| l.balance = false);

        match result {
            Ok(balance) => {
                if self.cache.complete_balance(ticket, balance) {
                    self.emit(DashboardEvent::BalanceLoaded);
                }
            }
            Err(e) => {
                self.recover(e, BALANCE_LOAD_FAILED);
            }
        }
    }

    async fn refresh_summary(&self) {
        let Some(ticket) = self.cache.begin(CacheKey::Summary) else {
            return;
        };
        match api::read_summary(&self.client).await {
            Ok(summary) => {
                if self.cache.complete_summary(ticket, summary) {
                    self.emit(DashboardEvent::SummaryLoaded);
                }
            }
            Err(e) => {
                self.recover(e, SUMMARY_LOAD_FAILED);
            }
        }
    }

    async fn refresh_boxes(&self, status: BoxStatus) {
        let Some(ticket) = self.cache.begin(CacheKey::boxes(status)) else {
            return;
        };
        let (loaded, failed) = match status {
            BoxStatus::Open => (DashboardEvent::OpenBoxesLoaded, OPEN_BOXES_LOAD_FAILED),
            BoxStatus::Closed => (DashboardEvent::ClosedBoxesLoaded, CLOSED_BOXES_LOAD_FAILED),
        };
        match api::list_boxes(&self.client, status).await {
            Ok(boxes) => {
                if self.cache.complete_boxes(ticket, boxes) {
                    self.emit(loaded);
                }
            }
            Err(e) => {
                self.recover(e, failed);
            }
        }
    }

    /// Fetch a ledger unless it is already pending or ready
    async fn load_ledger(&self, box_id: BoxId) -> ActionOutcome {
        let Some(ticket) = self.cache.begin_ledger_fetch(box_id) else {
            debug!("Ledger for box {} already fetched or in flight", box_id);
            return ActionOutcome::Completed;
        };

        self.set_loading(|l| l.transactions = true);
        let result = api::list_transactions(&self.client, box_id).await;
        self.set_loading(|l| l.transactions = false);

        match result {
            Ok(transactions) => {
                if self.cache.complete_ledger(ticket, transactions) {
                    self.emit(DashboardEvent::LedgerLoaded(box_id));
                }
                ActionOutcome::Completed
            }
            Err(e) => {
                self.cache.fail_ledger(ticket);
                self.recover(e, LEDGER_LOAD_FAILED)
            }
        }
    }

    /// Expand a row, or collapse it when it is already expanded.
    ///
    /// Expanding a different row first collapses the current one. The
    /// ledger is fetched only the first time a box is expanded.
    #[instrument(skip(self))]
    pub async fn toggle_box(&self, box_id: BoxId) -> ActionOutcome {
        if let Some(stopped) = self.require_session().await {
            return stopped;
        }
        let previous = self.view().expanded;

        if previous == Some(box_id) {
            self.update(|v| v.expanded = None);
            self.emit(DashboardEvent::RowCollapsed(box_id));
            return ActionOutcome::Completed;
        }
        if let Some(other) = previous {
            self.update(|v| v.expanded = None);
            self.emit(DashboardEvent::RowCollapsed(other));
        }

        self.update(|v| v.expanded = Some(box_id));
        self.emit(DashboardEvent::RowExpanded(box_id));
        self.load_ledger(box_id).await
    }

    pub fn select_tab(&self, tab: ActiveTab) {
        self.update(|v| v.active_tab = tab);
        self.emit(DashboardEvent::TabSelected(tab));
    }

    fn set_balance_form(&self, form: BalanceForm) {
        self.update(|v| {
            v.balance_form = form;
            v.amount_input.clear();
        });
        self.emit(DashboardEvent::BalanceFormChanged(form));
    }

    pub fn begin_deposit(&self) {
        self.set_balance_form(BalanceForm::EditingDeposit);
    }

    pub fn begin_withdraw(&self) {
        self.set_balance_form(BalanceForm::EditingWithdraw);
    }

    pub fn cancel_balance_form(&self) {
        self.set_balance_form(BalanceForm::Idle);
    }

    pub fn set_amount(&self, text: &str) {
        self.update(|v| v.amount_input = text.to_string());
    }

    /// Submit the open deposit/withdraw editor
    #[instrument(skip(self))]
    pub async fn submit_balance(&self) -> ActionOutcome {
        let view = self.view();
        let Some(direction) = view.balance_form.direction() else {
            return ActionOutcome::Ignored;
        };
        if let Some(stopped) = self.require_session().await {
            return stopped;
        }
        // A bad amount keeps the editor open for correction
        if DecimalInput::parse_positive(&view.amount_input).is_none() {
            self.raise(api::INVALID_AMOUNT_MESSAGE);
            return ActionOutcome::Rejected(api::INVALID_AMOUNT_MESSAGE.to_string());
        }

        self.dismiss_banner();
        self.set_loading(|l| l.action = true);
        let result = api::change_balance(&self.client, direction, &view.amount_input).await;
        self.set_loading(|l| l.action = false);

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                let outcome = self.recover(e, BALANCE_CHANGE_FAILED);
                if outcome != ActionOutcome::SignedOut {
                    self.set_balance_form(BalanceForm::Idle);
                }
                return outcome;
            }
        };

        self.set_balance_form(BalanceForm::Idle);
        if !reply.success {
            // Field detail first, e.g. "Insufficient balance"
            let message = match reply.field_errors.first_message() {
                Some(detail) => detail.to_string(),
                None => non_empty_or(&reply.message, BALANCE_CHANGE_FAILED),
            };
            self.raise(&message);
            return ActionOutcome::Rejected(message);
        }

        info!("{} of {} accepted", direction.as_str(), view.amount_input);
        let mutation = match direction {
            BalanceDirection::Deposit => Mutation::Deposit,
            BalanceDirection::Withdraw => Mutation::Withdraw,
        };
        self.reload_after(mutation).await;
        self.outcome_after_fetches()
    }

    /// Close a box, moving it from the open list to the closed list
    #[instrument(skip(self))]
    pub async fn close_box(&self, box_id: BoxId) -> ActionOutcome {
        if let Some(stopped) = self.require_session().await {
            return stopped;
        }
        self.dismiss_banner();
        self.set_loading(|l| l.action = true);
        let result = api::close_box(&self.client, box_id).await;
        self.set_loading(|l| l.action = false);

        match result {
            Ok(reply) if reply.success => {
                self.reload_after(Mutation::CloseBox(box_id)).await;
                self.outcome_after_fetches()
            }
            Ok(reply) => {
                let message = non_empty_or(&reply.message, CLOSE_BOX_FAILED);
                self.raise(&message);
                ActionOutcome::Rejected(message)
            }
            Err(e) => self.recover(e, CLOSE_BOX_FAILED),
        }
    }

    /// Submit the add-transaction form. Rejections stay in the form.
    #[instrument(skip(self, form), fields(coin = %form.coin_symbol))]
    pub async fn add_transaction(&self, form: &NewTransaction) -> FormOutcome {
        match self.require_session().await {
            None => {}
            Some(ActionOutcome::Rejected(message)) => {
                return FormOutcome::Rejected {
                    message,
                    field_errors: FieldErrors::new(),
                }
            }
            Some(_) => return FormOutcome::SignedOut,
        }
        let box_id = self.cache.find_open_box_by_symbol(&form.coin_symbol);

        self.set_loading(|l| l.action = true);
        let result = api::create_transaction(&self.client, form).await;
        self.set_loading(|l| l.action = false);

        match result {
            Ok(reply) if reply.success => {
                self.reload_after(Mutation::CreateTransaction { box_id }).await;
                FormOutcome::Submitted(reply.data)
            }
            Ok(reply) => FormOutcome::Rejected {
                message: non_empty_or(&reply.message, BALANCE_CHANGE_FAILED),
                field_errors: reply.field_errors,
            },
            Err(Error::Unauthenticated) => {
                self.signed_out();
                FormOutcome::SignedOut
            }
            Err(e) => FormOutcome::Rejected {
                message: e.user_message(),
                field_errors: e.field_errors().cloned().unwrap_or_default(),
            },
        }
    }

    /// Delete a transaction of a box. Only a 204 counts as deleted.
    #[instrument(skip(self))]
    pub async fn delete_transaction(&self, box_id: BoxId, transaction_id: TransactionId) -> ActionOutcome {
        if let Some(stopped) = self.require_session().await {
            return stopped;
        }
        self.set_loading(|l| l.action = true);
        let result = api::delete_transaction(&self.client, transaction_id).await;
        self.set_loading(|l| l.action = false);

        match result {
            Ok(reply) if reply.status == 204 => {
                self.reload_after(Mutation::DeleteTransaction { box_id }).await;
                self.outcome_after_fetches()
            }
            Ok(reply) => {
                warn!(
                    "Delete of transaction {} answered with status {}",
                    transaction_id, reply.status
                );
                self.raise(DELETE_TRANSACTION_FAILED);
                ActionOutcome::Rejected(DELETE_TRANSACTION_FAILED.to_string())
            }
            Err(e) => self.recover(e, DELETE_TRANSACTION_FAILED),
        }
    }

    /// End the session and drop every cached entity
    #[instrument(skip(self))]
    pub async fn logout(&self) -> ActionOutcome {
        self.set_loading(|l| l.action = true);
        let result = api::logout(&self.client).await;
        self.set_loading(|l| l.action = false);

        match result {
            Ok(_) => {
                self.signed_out();
                ActionOutcome::SignedOut
            }
            Err(e) => self.recover(e, LOGOUT_FAILED),
        }
    }

    /// Refetch what a mutation made stale
    async fn reload_after(&self, mutation: Mutation) {
        let keys = mutation.reload_keys(self.reload_policy);

        match self.reload_policy {
            ReloadPolicy::Full => self.cache.invalidate_all_ledgers(),
            ReloadPolicy::Targeted => {
                for key in keys.iter().filter(|k| matches!(k, CacheKey::Ledger(_))) {
                    self.cache.invalidate(*key);
                }
            }
        }
        debug!("Reloading {:?} after {:?}", keys, mutation);
        self.emit(DashboardEvent::Invalidated(keys.clone()));

        let wants = |key: CacheKey| keys.contains(&key);
        let touches_boxes = wants(CacheKey::Summary) || wants(CacheKey::OpenBoxes) || wants(CacheKey::ClosedBoxes);
        if touches_boxes {
            self.set_loading(|l| l.boxes = true);
        }

        // An invalidated ledger that is on screen is refetched right away
        let expanded = self
            .view()
            .expanded
            .filter(|id| self.cache.ledger_state(*id) == LedgerState::NotFetched);

        tokio::join!(
            async {
                if wants(CacheKey::Balance) {
                    self.refresh_balance().await;
                }
            },
            async {
                if wants(CacheKey::Summary) {
                    self.refresh_summary().await;
                }
            },
            async {
                if wants(CacheKey::OpenBoxes) {
                    self.refresh_boxes(BoxStatus::Open).await;
                }
            },
            async {
                if wants(CacheKey::ClosedBoxes) {
                    self.refresh_boxes(BoxStatus::Closed).await;
                }
            },
            async {
                if let Some(box_id) = expanded {
                    self.load_ledger(box_id).await;
                }
            },
        );

        if touches_boxes {
            self.set_loading(|l| l.boxes = false);
        }
    }
}

fn non_empty_or(message: &str, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}
