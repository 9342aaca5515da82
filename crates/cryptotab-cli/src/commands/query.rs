use std::time::Instant;

use cryptotab_core::{HandlerRegistry, ProviderId};

use crate::cli::QueryArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &QueryArgs, registry: &HandlerRegistry) -> Result<CommandResult, CliError> {
    let source = ProviderId::from(args.source);
    let started = Instant::now();

    let response = registry.native_query(source.as_str(), &args.query).await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::info!(%source, latency_ms, failed = response.is_error(), "query finished");

    Ok(CommandResult::from_response(&response, source)?.with_latency(latency_ms))
}
