//! CLI argument definitions for cryptotab.
//!
//! # Commands
//!
//! | Command | Network | Description |
//! |---------|---------|-------------|
//! | `query` | one GET | Route a free-text query to a source and print the table |
//! | `tables` | none | List catalog tables of a source |
//! | `columns` | none | List catalog columns of a table |
//! | `check` | one probe per source | Run the health check |
//! | `sources` | none | List registered sources and their keywords |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `30000` | Request timeout in ms |
//! | `--api-key` | env | CoinMarketCap API key |
//! | `--symbols` | none | Comma-separated symbols for quotes/ohlcv |
//! | `--limit` | `100` | Listing size |
//! | `--log-level` | `warn` | tracing filter when `RUST_LOG` is unset |
//!
//! # Examples
//!
//! ```bash
//! cryptotab query cmc "top listings" --limit 10 --format table
//! cryptotab query defillama "tvl history" --pretty
//! cryptotab columns defillama yields
//! cryptotab check
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use cryptotab_core::ProviderId;

#[derive(Debug, Parser)]
#[command(
    name = "cryptotab",
    author,
    version,
    about = "Query crypto market and DeFi APIs as tables"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Request timeout in milliseconds (health checks always use 10000).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// CoinMarketCap API key. Falls back to CRYPTOTAB_CMC_API_KEY, then CMC_PRO_API_KEY.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Symbols used by the quotes and ohlcv queries.
    #[arg(long, global = true, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Number of assets returned by the listings query (1..=5000).
    #[arg(long, global = true)]
    pub limit: Option<u32>,

    /// OHLCV aggregation period, e.g. daily or hourly.
    #[arg(long, global = true)]
    pub time_period: Option<String>,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON envelope.
    Json,
    /// Metadata header plus an ASCII grid.
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    #[value(name = "coinmarketcap", alias = "cmc")]
    CoinMarketCap,
    #[value(name = "defillama", alias = "llama")]
    DefiLlama,
}

impl From<SourceSelector> for ProviderId {
    fn from(selector: SourceSelector) -> Self {
        match selector {
            SourceSelector::CoinMarketCap => ProviderId::CoinMarketCap,
            SourceSelector::DefiLlama => ProviderId::DefiLlama,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Route a free-text query to one upstream call.
    Query(QueryArgs),
    /// List the tables a source declares.
    Tables(TablesArgs),
    /// List the declared columns of a table.
    Columns(ColumnsArgs),
    /// Probe upstream reachability.
    Check(CheckArgs),
    /// List registered sources.
    Sources(SourcesArgs),
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[arg(value_enum)]
    pub source: SourceSelector,
    /// Free text; the first recognised keyword selects the operation.
    pub query: String,
}

#[derive(Debug, Args)]
pub struct TablesArgs {
    #[arg(value_enum)]
    pub source: SourceSelector,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[arg(value_enum)]
    pub source: SourceSelector,
    pub table: String,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Source to probe; every source when omitted.
    #[arg(value_enum)]
    pub source: Option<SourceSelector>,
}

#[derive(Debug, Args)]
pub struct SourcesArgs {
    /// Include catalog tables.
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}
