//! Core contracts for cryptotab.
//!
//! This crate exposes crypto market and DeFi HTTP APIs as tabular data
//! sources:
//! - Provider identifiers and validated connection configuration
//! - A swappable HTTP transport and a single-attempt JSON client
//! - JSON-to-table normalization and keyword query routing
//! - Static schema catalogs and per-source handlers
//! - A name-addressed handler registry and the output envelope
//!
//! | Source | Base URL | Auth | Health probe |
//! |--------|----------|------|--------------|
//! | `coinmarketcap` | `https://pro-api.coinmarketcap.com/v1` | `X-CMC_PRO_API_KEY` | `GET /key/info` |
//! | `defillama` | `https://api.llama.fi` | none | `GET /protocols` |

pub mod adapters;
pub mod api_client;
pub mod catalog;
pub mod config;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod http_client;
pub mod normalize;
pub mod query_router;
pub mod registry;
pub mod source;
pub mod table;

pub use adapters::{
    CoinMarketCapHandler, CoinMarketCapOperation, DefiLlamaHandler, DefiLlamaOperation,
};
pub use api_client::{ApiClient, ApiError};
pub use catalog::{SchemaCatalog, TableSchema};
pub use config::{ConnectionConfig, ConnectionParams};
pub use envelope::{Envelope, EnvelopeMeta, GeneratedAt};
pub use error::{CoreError, ValidationError};
pub use handler::{ConnectionState, DataHandler, HandlerFuture};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use normalize::{NormalizeError, PayloadShape};
pub use query_router::{QueryRouter, UNSUPPORTED_QUERY_MESSAGE};
pub use registry::{HandlerRegistry, HandlerRegistryBuilder};
pub use source::ProviderId;
pub use table::{ConnectionStatus, QueryResponse, Table};
