//! Transitions broadcast to whoever renders the dashboard

use crate::state::{ActiveTab, BalanceForm, LoadingFlags};
use boxtrack_core::BoxId;
use boxtrack_persistence::CacheKey;

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Initial fetches have all settled
    Mounted,
    BalanceLoaded,
    SummaryLoaded,
    OpenBoxesLoaded,
    ClosedBoxesLoaded,
    LedgerLoaded(BoxId),
    /// Always precedes the `RowExpanded` of a different row
    RowCollapsed(BoxId),
    RowExpanded(BoxId),
    TabSelected(ActiveTab),
    BalanceFormChanged(BalanceForm),
    LoadingChanged(LoadingFlags),
    BannerRaised(String),
    BannerDismissed,
    /// Keys refetched or invalidated after a mutation
    Invalidated(Vec<CacheKey>),
    SignedOut,
}
