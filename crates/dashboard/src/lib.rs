//! Boxtrack Dashboard - view state, fetch orchestration and cache upkeep

pub mod controller;
pub mod events;
pub mod mutation;
pub mod state;

pub use controller::{ActionOutcome, DashboardController, FormOutcome};
pub use events::DashboardEvent;
pub use mutation::Mutation;
pub use state::{ActiveTab, BalanceForm, DashboardSnapshot, LoadingFlags, ViewState};
