//! Balance reads and changes

use crate::http::{AuthorizedClient, Method, Reply};
use boxtrack_core::{
    Balance, BalanceChange, BalanceDirection, BalanceSnapshot, BalanceUpdate, DecimalInput, Error, Result,
};
use tracing::{info, instrument};

pub const BALANCE_PATH: &str = "balance/";
pub const BALANCE_HISTORY_PATH: &str = "balance/history/";
pub const INVALID_AMOUNT_MESSAGE: &str = "Please enter a valid amount.";

#[instrument(skip(client))]
pub async fn read_balance(client: &AuthorizedClient) -> Result<Balance> {
    client
        .request::<Balance>(Method::GET, BALANCE_PATH, None)
        .await?
        .require_data()
}

/// Add funds
pub async fn deposit(client: &AuthorizedClient, amount: &str) -> Result<Reply<BalanceUpdate>> {
    change_balance(client, BalanceDirection::Deposit, amount).await
}

/// Take funds out
pub async fn withdraw(client: &AuthorizedClient, amount: &str) -> Result<Reply<BalanceUpdate>> {
    change_balance(client, BalanceDirection::Withdraw, amount).await
}

/// Deposit (POST) or withdraw (DELETE with body) a positive amount
pub async fn change_balance(
    client: &AuthorizedClient,
    direction: BalanceDirection,
    amount: &str,
) -> Result<Reply<BalanceUpdate>> {
    let Some(amount) = DecimalInput::parse_positive(amount) else {
        return Err(Error::invalid_field("amount", INVALID_AMOUNT_MESSAGE));
    };

    let method = match direction {
        BalanceDirection::Deposit => Method::POST,
        BalanceDirection::Withdraw => Method::DELETE,
    };

    info!("Requesting {} of {}", direction.as_str(), amount);
    let body = serde_json::to_value(BalanceChange { amount })?;
    client.request(method, BALANCE_PATH, Some(body)).await
}

/// Recorded balance snapshots, newest first
#[instrument(skip(client))]
pub async fn balance_history(client: &AuthorizedClient) -> Result<Vec<BalanceSnapshot>> {
    Ok(client
        .request::<Vec<BalanceSnapshot>>(Method::GET, BALANCE_HISTORY_PATH, None)
        .await?
        .into_result()?
        .unwrap_or_default())
}
