//! View state of the dashboard

use boxtrack_core::{Balance, BalanceDirection, BoxId, PortfolioBox, ProfitLossSummary};
use boxtrack_networking::Route;
use boxtrack_persistence::LedgerState;

/// Which box list is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveTab {
    #[default]
    Open,
    Closed,
}

/// Deposit/withdraw affordance; at most one editor open at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalanceForm {
    #[default]
    Idle,
    EditingDeposit,
    EditingWithdraw,
}

impl BalanceForm {
    pub fn direction(&self) -> Option<BalanceDirection> {
        match self {
            BalanceForm::Idle => None,
            BalanceForm::EditingDeposit => Some(BalanceDirection::Deposit),
            BalanceForm::EditingWithdraw => Some(BalanceDirection::Withdraw),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadingFlags {
    pub balance: bool,
    /// Open list, closed list and summary together
    pub boxes: bool,
    pub transactions: bool,
    /// A mutation is in flight
    pub action: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub route: Route,
    pub active_tab: ActiveTab,
    pub balance_form: BalanceForm,
    /// Amount typed into the balance editor
    pub amount_input: String,
    pub expanded: Option<BoxId>,
    pub loading: LoadingFlags,
    /// Dismissible error banner
    pub banner: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            route: Route::Dashboard,
            active_tab: ActiveTab::default(),
            balance_form: BalanceForm::default(),
            amount_input: String::new(),
            expanded: None,
            loading: LoadingFlags::default(),
            banner: None,
        }
    }
}

/// View state plus the cached data it renders
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub view: ViewState,
    pub balance: Option<Balance>,
    pub summary: Option<ProfitLossSummary>,
    pub open_boxes: Vec<PortfolioBox>,
    pub closed_boxes: Vec<PortfolioBox>,
    /// Ledger of the expanded box, if any
    pub expanded_ledger: Option<LedgerState>,
}

impl DashboardSnapshot {
    /// Boxes of the active tab
    pub fn visible_boxes(&self) -> &[PortfolioBox] {
        match self.view.active_tab {
            ActiveTab::Open => &self.open_boxes,
            ActiveTab::Closed => &self.closed_boxes,
        }
    }
}
