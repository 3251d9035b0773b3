//! Transaction creation and deletion

use crate::http::{AuthorizedClient, Method, Reply};
use boxtrack_core::{NewTransaction, Result, TransactionId, TransactionReceipt};
use serde_json::Value;
use tracing::info;

pub const TRANSACTIONS_PATH: &str = "transactions/";

/// Record a buy or sell. Validates the form first.
pub async fn create_transaction(
    client: &AuthorizedClient,
    form: &NewTransaction,
) -> Result<Reply<TransactionReceipt>> {
    let request = form.validate()?;
    info!(
        "Recording {} of {} {}",
        request.transaction_type.as_str(),
        request.amount,
        request.coin_symbol
    );
    let body = serde_json::to_value(&request)?;
    client.request(Method::POST, TRANSACTIONS_PATH, Some(body)).await
}

/// Delete a transaction; the backend answers 204 when it is gone
pub async fn delete_transaction(client: &AuthorizedClient, transaction_id: TransactionId) -> Result<Reply<Value>> {
    info!("Deleting transaction {}", transaction_id);
    let path = format!("{}{}/", TRANSACTIONS_PATH, transaction_id);
    client.request(Method::DELETE, &path, None).await
}
