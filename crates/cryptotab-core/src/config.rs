//! Connection configuration for a handler instance.
//!
//! A [`ConnectionConfig`] is built once per handler and never mutated. It can
//! be assembled from the connection-data object a host platform passes in
//! ([`ConnectionConfig::from_connection_data`]) or from typed
//! [`ConnectionParams`].
//!
//! | Field | Default | Notes |
//! |-------|---------|-------|
//! | `api_key` | none | sent as `X-CMC_PRO_API_KEY` for CoinMarketCap |
//! | `base_url` | provider default | trailing `/` stripped |
//! | `timeout_ms` | `30000` | health checks always use `10000` |
//! | `listing_limit` | `100` | `1..=5000` |
//! | `symbols` | empty | used by `quotes` and `ohlcv` |
//! | `time_period` | `daily` | used by `ohlcv` |

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

use serde::Deserialize;
use serde_json::Value;

use crate::http_client::{HttpAuth, HttpRequest};
use crate::{CoreError, ProviderId, ValidationError};

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const HEALTH_CHECK_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LISTING_LIMIT: u32 = 100;
pub const MAX_LISTING_LIMIT: u32 = 5_000;
pub const DEFAULT_TIME_PERIOD: &str = "daily";

const CMC_API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Host-supplied connection parameters. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionParams {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub listing_limit: Option<u32>,
    pub symbols: Option<Vec<String>>,
    pub time_period: Option<String>,
}

/// Immutable per-handler connection configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    provider: ProviderId,
    api_key: Option<String>,
    base_url: String,
    headers: BTreeMap<String, String>,
    timeout_ms: u64,
    listing_limit: u32,
    symbols: Vec<String>,
    time_period: String,
}

impl ConnectionConfig {
    pub fn new(provider: ProviderId, params: ConnectionParams) -> Result<Self, ValidationError> {
        let api_key = params
            .api_key
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty());

        let base_url = normalize_base_url(
            params
                .base_url
                .as_deref()
                .unwrap_or(provider.default_base_url()),
        )?;

        let timeout_ms = params.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(ValidationError::ZeroTimeout);
        }

        let listing_limit = params.listing_limit.unwrap_or(DEFAULT_LISTING_LIMIT);
        if listing_limit == 0 || listing_limit > MAX_LISTING_LIMIT {
            return Err(ValidationError::InvalidListingLimit {
                value: listing_limit,
            });
        }

        let symbols = params
            .symbols
            .unwrap_or_default()
            .into_iter()
            .map(|symbol| {
                let symbol = symbol.trim().to_ascii_uppercase();
                if symbol.is_empty() {
                    Err(ValidationError::EmptySymbol)
                } else {
                    Ok(symbol)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let time_period = params
            .time_period
            .unwrap_or_else(|| String::from(DEFAULT_TIME_PERIOD));
        if time_period.trim().is_empty() {
            return Err(ValidationError::EmptyTimePeriod);
        }

        let headers = derive_headers(provider, api_key.as_deref());

        Ok(Self {
            provider,
            api_key,
            base_url,
            headers,
            timeout_ms,
            listing_limit,
            symbols,
            time_period: time_period.trim().to_owned(),
        })
    }

    /// Provider defaults with no credential.
    pub fn defaults(provider: ProviderId) -> Self {
        Self {
            provider,
            api_key: None,
            base_url: provider.default_base_url().to_owned(),
            headers: derive_headers(provider, None),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            listing_limit: DEFAULT_LISTING_LIMIT,
            symbols: Vec::new(),
            time_period: String::from(DEFAULT_TIME_PERIOD),
        }
    }

    /// Builds a configuration from the JSON object a host passes as connection data.
    ///
    /// `null` is treated as an empty object.
    pub fn from_connection_data(provider: ProviderId, data: Value) -> Result<Self, CoreError> {
        let params = if data.is_null() {
            ConnectionParams::default()
        } else {
            serde_json::from_value::<ConnectionParams>(data)?
        };
        Ok(Self::new(provider, params)?)
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub const fn listing_limit(&self) -> u32 {
        self.listing_limit
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn time_period(&self) -> &str {
        &self.time_period
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET request for `path` carrying the derived headers and the configured timeout.
    pub fn request(&self, path: &str) -> HttpRequest {
        HttpRequest::get(self.url(path))
            .with_headers(&self.headers)
            .with_timeout_ms(self.timeout_ms)
    }
}

impl Debug for ConnectionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("listing_limit", &self.listing_limit)
            .field("symbols", &self.symbols)
            .field("time_period", &self.time_period)
            .finish()
    }
}

fn derive_headers(provider: ProviderId, api_key: Option<&str>) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    if provider == ProviderId::CoinMarketCap {
        let auth = match api_key {
            Some(key) => HttpAuth::Header {
                name: String::from(CMC_API_KEY_HEADER),
                value: key.to_owned(),
            },
            None => HttpAuth::None,
        };
        auth.apply(&mut headers);
        headers.insert(String::from("accept"), String::from("application/json"));
    }
    headers
}

fn normalize_base_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ValidationError::InvalidBaseUrl {
            value: raw.to_owned(),
        });
    }
    Ok(trimmed.to_owned())
}
