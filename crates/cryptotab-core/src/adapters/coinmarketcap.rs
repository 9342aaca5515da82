use std::sync::Arc;

use crate::api_client::ApiClient;
use crate::catalog::{SchemaCatalog, TableSchema};
use crate::handler::{ConnectionState, ConnectionTracker, DataHandler, HandlerFuture};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::normalize::PayloadShape;
use crate::query_router::{QueryRouter, UNSUPPORTED_QUERY_MESSAGE};
use crate::{ConnectionConfig, ConnectionStatus, ProviderId, QueryResponse, ValidationError};

const KEY_INFO_PATH: &str = "key/info";
const LISTINGS_PATH: &str = "cryptocurrency/listings/latest";
const QUOTES_PATH: &str = "cryptocurrency/quotes/latest";
const OHLCV_PATH: &str = "cryptocurrency/ohlcv/historical";

/// Upstream calls reachable from a CoinMarketCap query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinMarketCapOperation {
    /// Top-N assets by market cap.
    Listings,
    /// Latest quotes for the configured symbols.
    Quotes,
    /// Historical OHLCV for the first configured symbol.
    Ohlcv,
}

/// Handler fronting the CoinMarketCap pro API.
pub struct CoinMarketCapHandler {
    api: ApiClient,
    catalog: SchemaCatalog,
    router: QueryRouter<CoinMarketCapOperation>,
    connection: ConnectionTracker,
}

impl CoinMarketCapHandler {
    pub fn new(
        config: ConnectionConfig,
        http_client: Arc<dyn HttpClient>,
        catalog: SchemaCatalog,
    ) -> Result<Self, ValidationError> {
        if config.provider() != ProviderId::CoinMarketCap {
            return Err(ValidationError::ProviderMismatch {
                expected: ProviderId::CoinMarketCap,
                actual: config.provider(),
            });
        }

        if !config.has_api_key() {
            tracing::warn!(
                "coinmarketcap handler configured without an API key; calls will be rejected upstream"
            );
        }

        Ok(Self {
            api: ApiClient::new(config, http_client),
            catalog,
            router: Self::default_router(),
            connection: ConnectionTracker::default(),
        })
    }

    /// Handler with the default catalog over the given transport.
    pub fn with_http_client(
        config: ConnectionConfig,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, ValidationError> {
        Self::new(config, http_client, Self::default_catalog())
    }

    /// Handler with the default catalog over a reqwest transport.
    pub fn from_config(config: ConnectionConfig) -> Result<Self, ValidationError> {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn default_router() -> QueryRouter<CoinMarketCapOperation> {
        QueryRouter::new()
            .route("listings", CoinMarketCapOperation::Listings)
            .route("quotes", CoinMarketCapOperation::Quotes)
            .route("ohlcv", CoinMarketCapOperation::Ohlcv)
    }

    pub fn default_catalog() -> SchemaCatalog {
        SchemaCatalog::new([
            TableSchema::new(
                "listings",
                [
                    "id",
                    "name",
                    "symbol",
                    "slug",
                    "cmc_rank",
                    "market_cap",
                    "price",
                    "volume_24h",
                ],
            ),
            TableSchema::new(
                "quotes",
                [
                    "id",
                    "name",
                    "symbol",
                    "price",
                    "volume_24h",
                    "market_cap",
                    "percent_change_1h",
                    "percent_change_24h",
                ],
            ),
            TableSchema::new(
                "ohlcv",
                [
                    "time_open",
                    "time_close",
                    "open",
                    "high",
                    "low",
                    "close",
                    "volume",
                ],
            ),
            TableSchema::new("market_metrics", Vec::<String>::new()),
            TableSchema::new("global_metrics", Vec::<String>::new()),
        ])
    }

    pub fn config(&self) -> &ConnectionConfig {
        self.api.config()
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn resolve(&self, query: &str) -> Option<CoinMarketCapOperation> {
        self.router.resolve(query)
    }

    /// Runs one operation against the upstream.
    pub async fn execute(&self, operation: CoinMarketCapOperation) -> QueryResponse {
        match operation {
            CoinMarketCapOperation::Listings => self.listings().await,
            CoinMarketCapOperation::Quotes => self.quotes().await,
            CoinMarketCapOperation::Ohlcv => self.ohlcv().await,
        }
    }

    async fn listings(&self) -> QueryResponse {
        let limit = self.config().listing_limit().to_string();
        super::fetch_table(
            &self.api,
            LISTINGS_PATH,
            &[("limit", limit)],
            PayloadShape::Field("data"),
        )
        .await
    }

    async fn quotes(&self) -> QueryResponse {
        let symbols = self.config().symbols();
        let query = if symbols.is_empty() {
            Vec::new()
        } else {
            vec![("symbol", symbols.join(","))]
        };

        super::fetch_table(&self.api, QUOTES_PATH, &query, PayloadShape::Keyed("data")).await
    }

    async fn ohlcv(&self) -> QueryResponse {
        let Some(symbol) = self.config().symbols().first() else {
            return QueryResponse::error("ohlcv query requires at least one configured symbol");
        };

        super::fetch_table(
            &self.api,
            OHLCV_PATH,
            &[
                ("symbol", symbol.clone()),
                ("time_period", self.config().time_period().to_owned()),
            ],
            PayloadShape::Path(&["data", "quotes"]),
        )
        .await
    }
}

impl DataHandler for CoinMarketCapHandler {
    fn id(&self) -> ProviderId {
        ProviderId::CoinMarketCap
    }

    fn keywords(&self) -> Vec<&str> {
        self.router.keywords()
    }

    fn connect<'a>(&'a self) -> HandlerFuture<'a, ConnectionStatus> {
        Box::pin(super::run_health_check(&self.api, KEY_INFO_PATH, &self.connection))
    }

    fn disconnect(&self) {
        self.connection.reset();
    }

    fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    fn native_query<'a>(&'a self, query: &'a str) -> HandlerFuture<'a, QueryResponse> {
        Box::pin(async move {
            match self.resolve(query) {
                Some(operation) => {
                    tracing::debug!(?operation, "routing coinmarketcap query");
                    self.execute(operation).await
                }
                None => QueryResponse::error(UNSUPPORTED_QUERY_MESSAGE),
            }
        })
    }

    fn get_tables(&self) -> QueryResponse {
        QueryResponse::Table(self.catalog.list_tables())
    }

    fn get_columns(&self, table_name: &str) -> QueryResponse {
        QueryResponse::Table(self.catalog.list_columns(table_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionParams;
    use crate::http_client::{HttpError, HttpRequest, HttpResponse};
    use serde_json::json;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn replying(body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(HttpResponse::ok_json(body)),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn config(symbols: &[&str]) -> ConnectionConfig {
        ConnectionConfig::new(
            ProviderId::CoinMarketCap,
            ConnectionParams {
                api_key: Some(String::from("cmc-key")),
                listing_limit: Some(25),
                symbols: Some(symbols.iter().map(|s| s.to_string()).collect()),
                ..ConnectionParams::default()
            },
        )
        .expect("valid config")
    }

    #[tokio::test]
    async fn listings_sends_limit_and_api_key_header() {
        let client = RecordingHttpClient::replying(r#"{"data":[]}"#);
        let handler = CoinMarketCapHandler::with_http_client(config(&[]), client.clone())
            .expect("valid handler");

        let response = handler.native_query("SELECT * FROM listings").await;
        assert_eq!(response, QueryResponse::Table(crate::Table::empty()));

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].full_url(),
            "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest?limit=25"
        );
        assert_eq!(
            requests[0].headers.get("x-cmc_pro_api_key").map(String::as_str),
            Some("cmc-key")
        );
        assert_eq!(
            requests[0].headers.get("accept").map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn quotes_join_symbols_and_unroll_keyed_data() {
        let client = RecordingHttpClient::replying(
            &json!({ "data": {
                "BTC": { "id": 1, "symbol": "BTC", "quote": { "USD": { "price": 50000 } } },
                "ETH": { "id": 1027, "symbol": "ETH", "quote": { "USD": { "price": 3000 } } }
            } })
            .to_string(),
        );
        let handler =
            CoinMarketCapHandler::with_http_client(config(&["btc", "eth"]), client.clone())
                .expect("valid handler");

        let response = handler.native_query("latest QUOTES").await;
        let table = response.table().expect("table response");
        assert_eq!(table.columns(), ["id", "symbol", "quote.USD.price"]);
        assert_eq!(table.row_count(), 2);

        let requests = client.recorded_requests();
        assert!(requests[0].full_url().ends_with("quotes/latest?symbol=BTC%2CETH"));
    }

    #[tokio::test]
    async fn ohlcv_without_symbols_fails_without_calling_upstream() {
        let client = RecordingHttpClient::replying("{}");
        let handler = CoinMarketCapHandler::with_http_client(config(&[]), client.clone())
            .expect("valid handler");

        let response = handler.native_query("ohlcv").await;
        assert!(response.is_error());
        assert!(client.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn ohlcv_reads_nested_quotes() {
        let client = RecordingHttpClient::replying(
            &json!({ "data": { "id": 1, "symbol": "BTC", "quotes": [
                { "time_open": "2024-01-01T00:00:00.000Z", "quote": { "USD": { "open": 1.0 } } }
            ] } })
            .to_string(),
        );
        let handler = CoinMarketCapHandler::with_http_client(config(&["BTC"]), client.clone())
            .expect("valid handler");

        let table = handler
            .native_query("ohlcv history")
            .await
            .into_table()
            .expect("table response");
        assert_eq!(table.columns(), ["time_open", "quote.USD.open"]);

        let url = client.recorded_requests()[0].full_url();
        assert!(url.ends_with("ohlcv/historical?symbol=BTC&time_period=daily"));
    }

    #[test]
    fn rejects_defillama_config() {
        let result =
            CoinMarketCapHandler::from_config(ConnectionConfig::defaults(ProviderId::DefiLlama));
        assert!(matches!(
            result,
            Err(ValidationError::ProviderMismatch {
                expected: ProviderId::CoinMarketCap,
                actual: ProviderId::DefiLlama
            })
        ));
    }

    #[test]
    fn catalog_declares_metric_tables_without_columns() {
        let catalog = CoinMarketCapHandler::default_catalog();
        assert_eq!(
            catalog.table_names().collect::<Vec<_>>(),
            vec!["listings", "quotes", "ohlcv", "market_metrics", "global_metrics"]
        );
        assert!(catalog.columns("global_metrics").is_empty());
        assert_eq!(catalog.columns("ohlcv").len(), 7);
    }
}
