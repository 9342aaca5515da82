mod coinmarketcap;
mod defillama;

pub use coinmarketcap::{CoinMarketCapHandler, CoinMarketCapOperation};
pub use defillama::{DefiLlamaHandler, DefiLlamaOperation};

use crate::api_client::ApiClient;
use crate::handler::ConnectionTracker;
use crate::normalize::{self, PayloadShape};
use crate::{ConnectionStatus, QueryResponse};

/// One GET, unwrap the payload, flatten it. Every failure becomes an error response.
async fn fetch_table(
    api: &ApiClient,
    path: &str,
    query: &[(&str, String)],
    shape: PayloadShape,
) -> QueryResponse {
    let outcome = match api.get_json(path, query).await {
        Ok(body) => normalize::extract(&body, shape)
            .map(|payload| normalize::normalize(&payload))
            .map_err(|error| error.to_string()),
        Err(error) => Err(error.to_string()),
    };

    match outcome {
        Ok(table) => {
            tracing::debug!(
                provider = %api.provider(),
                path,
                rows = table.row_count(),
                columns = table.column_count(),
                "normalized upstream payload"
            );
            QueryResponse::Table(table)
        }
        Err(message) => {
            tracing::warn!(
                provider = %api.provider(),
                path,
                error = %message,
                "upstream query failed"
            );
            QueryResponse::error(message)
        }
    }
}

async fn run_health_check(
    api: &ApiClient,
    path: &str,
    tracker: &ConnectionTracker,
) -> ConnectionStatus {
    let status = api.probe(path).await;
    tracker.record(&status);

    match &status.error_message {
        None => tracing::info!(provider = %api.provider(), "connection check succeeded"),
        Some(reason) => {
            tracing::warn!(provider = %api.provider(), reason = %reason, "connection check failed")
        }
    }

    status
}
