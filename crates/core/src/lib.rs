//! Boxtrack Core - Shared data models, error taxonomy, and configuration

pub mod config;
pub mod errors;
pub mod models;
pub mod types;

pub use config::{Config, RefreshPolicy, ReloadPolicy};
pub use errors::{Error, Result};
pub use models::*;
pub use types::*;
