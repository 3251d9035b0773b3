//! Data models for Boxtrack entities

mod auth;
mod balance;
mod boxes;
mod summary;
mod transaction;

pub use auth::*;
pub use balance::*;
pub use boxes::*;
pub use summary::*;
pub use transaction::*;
