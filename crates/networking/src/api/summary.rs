use crate::http::{AuthorizedClient, Method};
use boxtrack_core::{ProfitLossSummary, Result};
use tracing::instrument;

pub const SUMMARY_PATH: &str = "summary/";

/// Realized, unrealized and total profit/loss across all boxes
#[instrument(skip(client))]
pub async fn read_summary(client: &AuthorizedClient) -> Result<ProfitLossSummary> {
    client
        .request::<ProfitLossSummary>(Method::GET, SUMMARY_PATH, None)
        .await?
        .require_data()
}
