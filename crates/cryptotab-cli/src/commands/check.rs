use std::time::Instant;

use cryptotab_core::{ConnectionStatus, HandlerRegistry, ProviderId};
use serde::Serialize;

use crate::cli::CheckArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SourceCheck {
    source: ProviderId,
    #[serde(flatten)]
    status: ConnectionStatus,
}

#[derive(Debug, Serialize)]
struct CheckResponseData {
    checks: Vec<SourceCheck>,
}

pub async fn run(args: &CheckArgs, registry: &HandlerRegistry) -> Result<CommandResult, CliError> {
    let targets = match args.source {
        Some(selector) => vec![ProviderId::from(selector)],
        None => ProviderId::ALL.to_vec(),
    };

    let started = Instant::now();
    let mut checks = Vec::with_capacity(targets.len());
    for source in targets.iter().copied() {
        let status = registry.check_connection(source.as_str()).await;
        checks.push(SourceCheck { source, status });
    }
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let failure = checks.iter().find_map(|check| {
        check
            .status
            .error_message
            .as_ref()
            .map(|message| CliError::QueryFailed {
                source_name: check.source.as_str().to_owned(),
                message: message.clone(),
            })
    });

    let source = args.source.map(ProviderId::from);
    let data = serde_json::to_value(CheckResponseData { checks })?;
    Ok(CommandResult::ok(data, source)
        .with_latency(latency_ms)
        .with_failure(failure))
}
