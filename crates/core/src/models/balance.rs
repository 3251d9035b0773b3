//! Balance models

use crate::types::{DecimalInput, Figure};
use serde::{Deserialize, Serialize};

/// Response data of GET /balance/
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub total_balance: Figure,
    pub usdt_balance: Figure,
    pub coin_balance: Figure,
}

/// Body of POST /balance/ (deposit) and DELETE /balance/ (withdraw)
#[derive(Debug, Clone, Serialize)]
pub struct BalanceChange {
    pub amount: DecimalInput,
}

/// Response data of a deposit or withdrawal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceUpdate {
    #[serde(default)]
    pub new_balance: Figure,
}

/// Direction of a balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceDirection {
    Deposit,
    Withdraw,
}

impl BalanceDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceDirection::Deposit => "deposit",
            BalanceDirection::Withdraw => "withdraw",
        }
    }
}

/// One entry of GET /balance/history/ (newest first)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    #[serde(default)]
    pub usdt_balance: Figure,
    #[serde(default)]
    pub coin_balance: Figure,
    #[serde(default)]
    pub total_balance: Figure,
    pub timestamp: String,
}
