//! Box (lot) models

use crate::types::{BoxId, Figure};
use serde::{Deserialize, Serialize};

/// Which partition of boxes to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxStatus {
    Open,
    Closed,
}

impl BoxStatus {
    /// Value of the `closed` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            BoxStatus::Open => "false",
            BoxStatus::Closed => "true",
        }
    }
}

/// A tracked lot of a single coin, as returned by GET /boxes/
///
/// All figures are computed by the backend. Closed boxes additionally
/// carry sell-side totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioBox {
    pub id: BoxId,
    pub coin_symbol: String,
    #[serde(default)]
    pub coin_name: String,
    #[serde(default)]
    pub coin_icon: Option<String>,
    #[serde(default)]
    pub amount: Figure,
    #[serde(default)]
    pub average_buy_price: Figure,
    #[serde(default)]
    pub current_price: Figure,
    #[serde(default)]
    pub value: Figure,
    #[serde(default)]
    pub profit_loss_value: Figure,
    #[serde(default)]
    pub profit_loss_percentage: Figure,
    #[serde(default, alias = "age")]
    pub age_days: u32,
    #[serde(default, alias = "is_closed")]
    pub closed: bool,
    #[serde(default)]
    pub average_sell_price: Figure,
    #[serde(default)]
    pub total_buy_value: Figure,
    #[serde(default)]
    pub total_sell_value: Figure,
}

impl PortfolioBox {
    pub fn status(&self) -> BoxStatus {
        if self.closed {
            BoxStatus::Closed
        } else {
            BoxStatus::Open
        }
    }

    /// Whether the box holds the given coin (case-insensitive)
    pub fn holds(&self, coin_symbol: &str) -> bool {
        self.coin_symbol.eq_ignore_ascii_case(coin_symbol.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_box() {
        let raw = json!({
            "id": 12,
            "coin_icon": "http://minio/icons/btc.png",
            "coin_name": "Bitcoin",
            "coin_symbol": "BTC",
            "current_price": "N/A",
            "amount": "0.50000000",
            "value": "21000.00000000",
            "average_buy_price": "40000.00000000",
            "profit_loss_value": "N/A",
            "profit_loss_percentage": "N/A",
            "is_closed": false,
            "age": 14,
            "average_sell_price": 0,
            "total_buy_value": 20000,
            "total_sell_value": 0
        });
        let b: PortfolioBox = serde_json::from_value(raw).unwrap();
        assert_eq!(b.id, 12);
        assert_eq!(b.age_days, 14);
        assert_eq!(b.status(), BoxStatus::Open);
        assert_eq!(b.amount.value(), Some(0.5));
        assert!(!b.current_price.is_available());
        assert!(b.holds("btc"));
    }
}
