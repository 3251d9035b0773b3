//! State-changing actions and the cache keys they disturb

use boxtrack_core::{BoxId, ReloadPolicy};
use boxtrack_persistence::CacheKey;

/// A successful state change on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Deposit,
    Withdraw,
    CloseBox(BoxId),
    /// `box_id` is the open box of the coin, when one was already known
    CreateTransaction { box_id: Option<BoxId> },
    DeleteTransaction { box_id: BoxId },
}

impl Mutation {
    /// Keys whose cached value is now out of date
    pub fn affected_keys(&self) -> Vec<CacheKey> {
        match *self {
            Mutation::Deposit | Mutation::Withdraw => vec![CacheKey::Balance],
            Mutation::CloseBox(_) => vec![CacheKey::OpenBoxes, CacheKey::ClosedBoxes, CacheKey::Summary],
            Mutation::CreateTransaction { box_id } => {
                let mut keys = vec![CacheKey::Balance, CacheKey::Summary, CacheKey::OpenBoxes];
                keys.extend(box_id.map(CacheKey::Ledger));
                keys
            }
            Mutation::DeleteTransaction { box_id } => vec![
                CacheKey::Balance,
                CacheKey::Summary,
                CacheKey::OpenBoxes,
                CacheKey::Ledger(box_id),
            ],
        }
    }

    /// Keys to refresh under a reload policy. `Full` touches every
    /// aggregate and list; ledgers are handled separately.
    pub fn reload_keys(&self, policy: ReloadPolicy) -> Vec<CacheKey> {
        match policy {
            ReloadPolicy::Targeted => self.affected_keys(),
            ReloadPolicy::Full => vec![
                CacheKey::Balance,
                CacheKey::Summary,
                CacheKey::OpenBoxes,
                CacheKey::ClosedBoxes,
            ],
        }
    }
}
