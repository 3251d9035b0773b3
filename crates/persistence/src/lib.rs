//! Boxtrack Persistence - credential storage, token encryption and entity cache

pub mod cache;
pub mod credentials;
pub mod encryption;
pub mod sqlite;

pub use cache::{CacheKey, EntityCache, FetchTicket, LedgerState};
pub use credentials::{CredentialStore, MemoryCredentialStore, SqliteCredentialStore};
pub use encryption::{derive_machine_key, SealedToken, TokenCipher};
pub use sqlite::Database;
