use std::sync::Arc;

use crate::api_client::ApiClient;
use crate::catalog::{SchemaCatalog, TableSchema};
use crate::handler::{ConnectionState, ConnectionTracker, DataHandler, HandlerFuture};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::normalize::PayloadShape;
use crate::query_router::{QueryRouter, UNSUPPORTED_QUERY_MESSAGE};
use crate::{ConnectionConfig, ConnectionStatus, ProviderId, QueryResponse, ValidationError};

const PROTOCOLS_PATH: &str = "protocols";
const CHARTS_PATH: &str = "charts";
const CHAINS_PATH: &str = "chains";
const YIELDS_PATH: &str = "yields";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefiLlamaOperation {
    Protocols,
    /// Aggregate TVL history from `/charts`.
    Tvl,
    Chains,
    /// Yield pools; the records sit under `data`.
    Yields,
}

impl DefiLlamaOperation {
    const fn endpoint(self) -> (&'static str, PayloadShape) {
        match self {
            Self::Protocols => (PROTOCOLS_PATH, PayloadShape::Root),
            Self::Tvl => (CHARTS_PATH, PayloadShape::Root),
            Self::Chains => (CHAINS_PATH, PayloadShape::Root),
            Self::Yields => (YIELDS_PATH, PayloadShape::Field("data")),
        }
    }
}

/// Handler fronting the public DefiLlama API. No credential is sent.
pub struct DefiLlamaHandler {
    api: ApiClient,
    catalog: SchemaCatalog,
    router: QueryRouter<DefiLlamaOperation>,
    connection: ConnectionTracker,
}

impl DefiLlamaHandler {
    pub fn new(
        config: ConnectionConfig,
        http_client: Arc<dyn HttpClient>,
        catalog: SchemaCatalog,
    ) -> Result<Self, ValidationError> {
        if config.provider() != ProviderId::DefiLlama {
            return Err(ValidationError::ProviderMismatch {
                expected: ProviderId::DefiLlama,
                actual: config.provider(),
            });
        }

        Ok(Self {
            api: ApiClient::new(config, http_client),
            catalog,
            router: Self::default_router(),
            connection: ConnectionTracker::default(),
        })
    }

    pub fn with_http_client(
        config: ConnectionConfig,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, ValidationError> {
        Self::new(config, http_client, Self::default_catalog())
    }

    pub fn from_config(config: ConnectionConfig) -> Result<Self, ValidationError> {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    /// `protocols` is checked before `tvl`, so "protocols tvl" lists protocols.
    pub fn default_router() -> QueryRouter<DefiLlamaOperation> {
        QueryRouter::new()
            .route("protocols", DefiLlamaOperation::Protocols)
            .route("tvl", DefiLlamaOperation::Tvl)
            .route("chains", DefiLlamaOperation::Chains)
            .route("yields", DefiLlamaOperation::Yields)
    }

    pub fn default_catalog() -> SchemaCatalog {
        SchemaCatalog::new([
            TableSchema::new(
                "protocols",
                [
                    "id",
                    "name",
                    "address",
                    "symbol",
                    "url",
                    "description",
                    "chain",
                    "logo",
                    "audits",
                    "audit_note",
                    "gecko_id",
                    "cmcId",
                    "category",
                    "chains",
                    "module",
                    "twitter",
                    "forkedFrom",
                    "oracles",
                    "listedAt",
                    "methodology",
                    "slug",
                    "tvl",
                    "chainTvls",
                    "change_1h",
                    "change_1d",
                    "change_7d",
                    "tokenBreakdowns",
                    "mcap",
                ],
            ),
            TableSchema::new("tvl", ["date", "totalLiquidityUSD"]),
            TableSchema::new(
                "chains",
                ["gecko_id", "tvl", "tokenSymbol", "cmcId", "name", "chainId"],
            ),
            TableSchema::new(
                "yields",
                [
                    "chain",
                    "project",
                    "symbol",
                    "tvlUsd",
                    "apyBase",
                    "apyReward",
                    "apy",
                    "rewardTokens",
                    "pool",
                    "apyPct1D",
                    "apyPct7D",
                    "apyPct30D",
                    "stablecoin",
                    "ilRisk",
                    "exposure",
                    "predictions",
                    "poolMeta",
                    "mu",
                    "sigma",
                    "count",
                    "outlier",
                    "underlyingTokens",
                    "il7d",
                    "apyBase7d",
                    "apyMean30d",
                    "volumeUsd1d",
                    "volumeUsd7d",
                    "apyBaseInception",
                ],
            ),
            TableSchema::new("stablecoins", Vec::<String>::new()),
            TableSchema::new("fees", Vec::<String>::new()),
        ])
    }

    pub fn config(&self) -> &ConnectionConfig {
        self.api.config()
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn resolve(&self, query: &str) -> Option<DefiLlamaOperation> {
        self.router.resolve(query)
    }

    pub async fn execute(&self, operation: DefiLlamaOperation) -> QueryResponse {
        let (path, shape) = operation.endpoint();
        super::fetch_table(&self.api, path, &[], shape).await
    }
}

impl DataHandler for DefiLlamaHandler {
    fn id(&self) -> ProviderId {
        ProviderId::DefiLlama
    }

    fn keywords(&self) -> Vec<&str> {
        self.router.keywords()
    }

    fn connect<'a>(&'a self) -> HandlerFuture<'a, ConnectionStatus> {
        Box::pin(super::run_health_check(&self.api, PROTOCOLS_PATH, &self.connection))
    }

    fn disconnect(&self) {
        self.connection.reset();
    }

    fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    fn native_query<'a>(&'a self, query: &'a str) -> HandlerFuture<'a, QueryResponse> {
        Box::pin(async move {
            let Some(operation) = self.resolve(query) else {
                return QueryResponse::error(UNSUPPORTED_QUERY_MESSAGE);
            };
            tracing::debug!(?operation, "routing defillama query");
            self.execute(operation).await
        })
    }

    fn get_tables(&self) -> QueryResponse {
        QueryResponse::Table(self.catalog.list_tables())
    }

    fn get_columns(&self, table_name: &str) -> QueryResponse {
        QueryResponse::Table(self.catalog.list_columns(table_name))
    }
}
