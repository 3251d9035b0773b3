//! Named operations over the Boxtrack REST API
//!
//! Each wrapper validates its input before touching the network and
//! decodes the backend's reply envelope.

mod auth;
mod balance;
mod boxes;
mod summary;
mod transactions;

pub use auth::*;
pub use balance::*;
pub use boxes::*;
pub use summary::*;
pub use transactions::*;
