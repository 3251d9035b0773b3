//! SQLite database management

mod connection;
mod credentials;

pub use connection::Database;
pub use credentials::*;
