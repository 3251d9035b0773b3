//! Transaction models

use crate::errors::{Error, Result};
use crate::types::{BoxId, DecimalInput, FieldErrors, Figure, TransactionId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Wire format of `transaction_date` on create
pub const TRANSACTION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Transaction type (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "buy",
            TransactionType::Sell => "sell",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TransactionType::Buy),
            "sell" => Ok(TransactionType::Sell),
            _ => Err(Error::invalid_field("type", "Type must be buy or sell")),
        }
    }
}

/// A buy or sell belonging to exactly one box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Owning box; filled in by the ledger when the list is stored
    #[serde(default)]
    pub box_id: BoxId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub amount: Figure,
    #[serde(default)]
    pub price: Figure,
    #[serde(default)]
    pub value: Figure,
    #[serde(default)]
    pub fee: Figure,
    pub transaction_date: String,
    #[serde(default)]
    pub profit_loss_value: Option<Figure>,
    #[serde(default)]
    pub profit_loss_percentage: Option<Figure>,
}

impl Transaction {
    /// Realized profit/loss `(value, percentage)`; only sells carry one
    pub fn realized_profit_loss(&self) -> Option<(Figure, Figure)> {
        if self.transaction_type != TransactionType::Sell {
            return None;
        }
        Some((
            self.profit_loss_value.unwrap_or_default(),
            self.profit_loss_percentage.unwrap_or_default(),
        ))
    }
}

/// Form input for a new transaction, as typed by the user
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub coin_symbol: String,
    pub transaction_type: TransactionType,
    pub price: String,
    pub amount: String,
    pub fee: Option<String>,
    pub transaction_date: NaiveDateTime,
}

impl NewTransaction {
    pub fn new(
        coin_symbol: impl Into<String>,
        transaction_type: TransactionType,
        price: impl Into<String>,
        amount: impl Into<String>,
        transaction_date: NaiveDateTime,
    ) -> Self {
        Self {
            coin_symbol: coin_symbol.into(),
            transaction_type,
            price: price.into(),
            amount: amount.into(),
            fee: None,
            transaction_date,
        }
    }

    pub fn with_fee(mut self, fee: impl Into<String>) -> Self {
        self.fee = Some(fee.into());
        self
    }

    /// Check the form before any network call.
    ///
    /// Collects every failing field so the form can mark them all at once.
    pub fn validate(&self) -> Result<TransactionRequest> {
        let mut errors = FieldErrors::new();

        let coin_symbol = self.coin_symbol.trim().to_uppercase();
        if coin_symbol.is_empty() {
            errors.insert("coin_symbol", "Coin symbol is required");
        }
        let price = DecimalInput::parse(&self.price);
        if price.is_none() {
            errors.insert("price", "Valid price is required");
        }
        let amount = DecimalInput::parse(&self.amount);
        if amount.is_none() {
            errors.insert("amount", "Valid amount is required");
        }
        let fee = match self.fee.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let parsed = DecimalInput::parse(raw);
                if parsed.is_none() {
                    errors.insert("fee", "Valid fee is required");
                }
                parsed
            }
        };

        match (price, amount) {
            (Some(price), Some(amount)) if errors.is_empty() => Ok(TransactionRequest {
                coin_symbol,
                transaction_type: self.transaction_type,
                price,
                amount,
                fee,
                transaction_date: self.transaction_date.format(TRANSACTION_DATE_FORMAT).to_string(),
            }),
            _ => Err(Error::ValidationFailure(errors)),
        }
    }
}

/// Validated body of POST /transactions/
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRequest {
    pub coin_symbol: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub price: DecimalInput,
    pub amount: DecimalInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<DecimalInput>,
    pub transaction_date: String,
}

/// Response data of a created transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_id: TransactionId,
    #[serde(default)]
    pub coin_name: String,
}
