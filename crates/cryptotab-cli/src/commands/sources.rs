use cryptotab_core::catalog::TABLE_NAME_COLUMN;
use cryptotab_core::{HandlerRegistry, ProviderId};
use serde::Serialize;

use crate::cli::SourcesArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SourceEntry<'a> {
    id: ProviderId,
    base_url: &'static str,
    requires_api_key: bool,
    keywords: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tables: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct SourcesResponseData<'a> {
    sources: Vec<SourceEntry<'a>>,
}

pub fn run(args: &SourcesArgs, registry: &HandlerRegistry) -> Result<CommandResult, CliError> {
    let sources = registry
        .handlers()
        .map(|handler| {
            let id = handler.id();
            let tables = args.verbose.then(|| {
                handler
                    .get_tables()
                    .table()
                    .and_then(|table| table.column_values(TABLE_NAME_COLUMN))
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|value| value.as_str().map(str::to_owned))
                    .collect()
            });

            SourceEntry {
                id,
                base_url: id.default_base_url(),
                requires_api_key: id.requires_api_key(),
                keywords: handler.keywords(),
                tables,
            }
        })
        .collect::<Vec<_>>();

    let data = serde_json::to_value(SourcesResponseData { sources })?;
    Ok(CommandResult::ok(data, None))
}
