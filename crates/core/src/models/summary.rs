//! Profit/loss summary model

use crate::types::Figure;
use serde::{Deserialize, Serialize};

/// Response data of GET /summary/
///
/// Computed server-side from the open and closed boxes; only displayed here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitLossSummary {
    #[serde(default)]
    pub realized_profit_loss: Figure,
    #[serde(default)]
    pub realized_profit_loss_percentage: Figure,
    #[serde(default)]
    pub unrealized_profit_loss: Figure,
    #[serde(default)]
    pub unrealized_profit_loss_percentage: Figure,
    #[serde(default)]
    pub total_profit_loss: Figure,
    #[serde(default)]
    pub total_profit_loss_percentage: Figure,
}
