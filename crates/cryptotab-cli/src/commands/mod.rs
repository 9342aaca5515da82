mod check;
mod columns;
mod query;
mod sources;
mod tables;

use cryptotab_core::{Envelope, EnvelopeMeta, HandlerRegistryBuilder, ProviderId, QueryResponse};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::RequestId;

pub struct CommandResult {
    pub data: Value,
    pub source: Option<ProviderId>,
    pub warnings: Vec<String>,
    pub latency_ms: u64,
    /// Set when a source answered with an error result; the envelope is still printed.
    pub failure: Option<CliError>,
}

impl CommandResult {
    pub fn ok(data: Value, source: Option<ProviderId>) -> Self {
        Self {
            data,
            source,
            warnings: Vec::new(),
            latency_ms: 0,
            failure: None,
        }
    }

    /// Serializes a handler response and records its error message, if any.
    pub fn from_response(response: &QueryResponse, source: ProviderId) -> Result<Self, CliError> {
        let failure = response.error_message().map(|message| CliError::QueryFailed {
            source_name: source.as_str().to_owned(),
            message: message.to_owned(),
        });

        let mut result = Self::ok(serde_json::to_value(response)?, Some(source));
        result.failure = failure;
        Ok(result)
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_failure(mut self, failure: Option<CliError>) -> Self {
        self.failure = failure;
        self
    }
}

pub struct CommandOutput {
    pub envelope: Envelope<Value>,
    pub failure: Option<CliError>,
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    execute(cli, registry_builder(cli).with_env()).await
}

/// Runs the command against handlers wired by `builder`.
pub async fn execute(
    cli: &Cli,
    builder: HandlerRegistryBuilder,
) -> Result<CommandOutput, CliError> {
    let has_cmc_api_key = builder.has_cmc_api_key();
    let registry = builder.build()?;

    let mut result = match &cli.command {
        Command::Query(args) => query::run(args, &registry).await?,
        Command::Tables(args) => tables::run(args, &registry)?,
        Command::Columns(args) => columns::run(args, &registry)?,
        Command::Check(args) => check::run(args, &registry).await?,
        Command::Sources(args) => sources::run(args, &registry)?,
    };

    let touches_cmc = matches!(
        (&cli.command, result.source),
        (Command::Query(_) | Command::Check(_), Some(ProviderId::CoinMarketCap))
            | (Command::Check(_), None)
    );
    if touches_cmc && !has_cmc_api_key {
        result = result.with_warning("no API key configured for coinmarketcap");
    }

    let CommandResult {
        data,
        source,
        warnings,
        latency_ms,
        failure,
    } = result;

    let mut meta = EnvelopeMeta::new(RequestId::new_v4().to_string(), source, latency_ms)?;
    for warning in warnings {
        meta.push_warning(warning);
    }

    Ok(CommandOutput {
        envelope: Envelope::new(meta, data),
        failure,
    })
}

/// Builder seeded from command-line flags; `run` layers the environment on top.
fn registry_builder(cli: &Cli) -> HandlerRegistryBuilder {
    let mut builder = HandlerRegistryBuilder::new();
    if let Some(key) = &cli.api_key {
        builder = builder.with_cmc_api_key(key.clone());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        builder = builder.with_timeout_ms(timeout_ms);
    }
    if let Some(limit) = cli.limit {
        builder = builder.with_listing_limit(limit);
    }
    if !cli.symbols.is_empty() {
        builder = builder.with_symbols(cli.symbols.iter().cloned());
    }
    if let Some(time_period) = &cli.time_period {
        builder = builder.with_time_period(time_period.clone());
    }
    builder
}
