use std::env;
use std::sync::Arc;

use crate::adapters::{CoinMarketCapHandler, DefiLlamaHandler};
use crate::config::ConnectionParams;
use crate::handler::DataHandler;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{ConnectionConfig, ConnectionStatus, ProviderId, QueryResponse, ValidationError};

/// Data-source handlers addressable by name.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Vec<(String, Arc<dyn DataHandler>)>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under its provider name, replacing any earlier one.
    pub fn register(&mut self, handler: Arc<dyn DataHandler>) {
        let name = handler.id().as_str().to_owned();
        match self.handlers.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, slot)) => *slot = handler,
            None => self.handlers.push((name, handler)),
        }
    }

    /// Looks a handler up by name; `cmc` and `llama` are accepted as aliases.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn DataHandler>> {
        let canonical = name.parse::<ProviderId>().ok()?;
        self.handlers
            .iter()
            .find(|(seen, _)| seen == canonical.as_str())
            .map(|(_, handler)| handler)
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn handlers(&self) -> impl Iterator<Item = &Arc<dyn DataHandler>> {
        self.handlers.iter().map(|(_, handler)| handler)
    }

    pub async fn native_query(&self, name: &str, query: &str) -> QueryResponse {
        match self.get(name) {
            Some(handler) => handler.native_query(query).await,
            None => QueryResponse::error(not_registered(name)),
        }
    }

    pub fn get_tables(&self, name: &str) -> QueryResponse {
        match self.get(name) {
            Some(handler) => handler.get_tables(),
            None => QueryResponse::error(not_registered(name)),
        }
    }

    pub fn get_columns(&self, name: &str, table_name: &str) -> QueryResponse {
        match self.get(name) {
            Some(handler) => handler.get_columns(table_name),
            None => QueryResponse::error(not_registered(name)),
        }
    }

    pub async fn check_connection(&self, name: &str) -> ConnectionStatus {
        match self.get(name) {
            Some(handler) => handler.check_connection().await,
            None => ConnectionStatus::failed(not_registered(name)),
        }
    }
}

fn not_registered(name: &str) -> String {
    format!("data source '{name}' is not registered")
}

/// Builder wiring both handlers from explicit settings and/or the environment.
///
/// ```rust,no_run
/// use cryptotab_core::HandlerRegistryBuilder;
///
/// let registry = HandlerRegistryBuilder::new()
///     .with_env()
///     .with_symbols(["BTC", "ETH"])
///     .build()
///     .expect("valid configuration");
/// ```
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    cmc: ConnectionParams,
    defillama: ConnectionParams,
    http_client: Option<Arc<dyn HttpClient>>,
}

impl HandlerRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `CRYPTOTAB_*` variables. Values already set on the builder win.
    ///
    /// The key comes from `CRYPTOTAB_CMC_API_KEY`, then `CMC_PRO_API_KEY`;
    /// blank variables count as unset.
    pub fn with_env(self) -> Self {
        self.with_env_lookup(|name| env::var(name).ok())
    }

    fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if !self.has_cmc_api_key() {
            self.cmc.api_key = var("CRYPTOTAB_CMC_API_KEY").or_else(|| var("CMC_PRO_API_KEY"));
        }
        if self.cmc.base_url.is_none() {
            self.cmc.base_url = var("CRYPTOTAB_CMC_BASE_URL");
        }
        if self.defillama.base_url.is_none() {
            self.defillama.base_url = var("CRYPTOTAB_DEFILLAMA_BASE_URL");
        }
        self
    }

    pub fn has_cmc_api_key(&self) -> bool {
        self.cmc
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    pub fn with_cmc_api_key(mut self, key: impl Into<String>) -> Self {
        self.cmc.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, provider: ProviderId, base_url: impl Into<String>) -> Self {
        self.params_mut(provider).base_url = Some(base_url.into());
        self
    }

    /// Applies to both handlers.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.cmc.timeout_ms = Some(timeout_ms);
        self.defillama.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_listing_limit(mut self, limit: u32) -> Self {
        self.cmc.listing_limit = Some(limit);
        self
    }

    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cmc.symbols = Some(symbols.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_time_period(mut self, time_period: impl Into<String>) -> Self {
        self.cmc.time_period = Some(time_period.into());
        self
    }

    /// Replaces the connection parameters of one provider wholesale.
    pub fn with_params(mut self, provider: ProviderId, params: ConnectionParams) -> Self {
        *self.params_mut(provider) = params;
        self
    }

    /// Shares one transport between both handlers instead of reqwest.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn build(self) -> Result<HandlerRegistry, ValidationError> {
        let http_client: Arc<dyn HttpClient> = match self.http_client {
            Some(client) => client,
            None => Arc::new(ReqwestHttpClient::new()),
        };

        let cmc = ConnectionConfig::new(ProviderId::CoinMarketCap, self.cmc)?;
        let defillama = ConnectionConfig::new(ProviderId::DefiLlama, self.defillama)?;

        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(CoinMarketCapHandler::with_http_client(
            cmc,
            Arc::clone(&http_client),
        )?));
        registry.register(Arc::new(DefiLlamaHandler::with_http_client(
            defillama,
            http_client,
        )?));

        tracing::debug!(sources = ?registry.names(), "handler registry built");
        Ok(registry)
    }

    fn params_mut(&mut self, provider: ProviderId) -> &mut ConnectionParams {
        match provider {
            ProviderId::CoinMarketCap => &mut self.cmc,
            ProviderId::DefiLlama => &mut self.defillama,
        }
    }
}
