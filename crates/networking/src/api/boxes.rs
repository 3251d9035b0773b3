//! Box listing, ledgers and closing

use crate::http::{AuthorizedClient, Method, Reply};
use boxtrack_core::{BoxId, BoxStatus, PortfolioBox, Result, Transaction};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Response data of a successful close
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedBox {
    /// Coin name of the closed box
    #[serde(rename = "box", default)]
    pub coin_name: String,
}

#[instrument(skip(client))]
pub async fn list_boxes(client: &AuthorizedClient, status: BoxStatus) -> Result<Vec<PortfolioBox>> {
    let path = format!("boxes/?closed={}", status.as_query());
    Ok(client
        .request::<Vec<PortfolioBox>>(Method::GET, &path, None)
        .await?
        .into_result()?
        .unwrap_or_default())
}

/// Transactions of one box in backend order
#[instrument(skip(client))]
pub async fn list_transactions(client: &AuthorizedClient, box_id: BoxId) -> Result<Vec<Transaction>> {
    let path = format!("boxes/{}/transactions/", box_id);
    let mut transactions = client
        .request::<Vec<Transaction>>(Method::GET, &path, None)
        .await?
        .into_result()?
        .unwrap_or_default();
    for tx in &mut transactions {
        tx.box_id = box_id;
    }
    Ok(transactions)
}

/// Move a box from open to closed
pub async fn close_box(client: &AuthorizedClient, box_id: BoxId) -> Result<Reply<ClosedBox>> {
    info!("Closing box {}", box_id);
    let path = format!("boxes/{}/close/", box_id);
    client.request(Method::PATCH, &path, None).await
}
