use cryptotab_core::{HandlerRegistry, ProviderId};

use crate::cli::ColumnsArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &ColumnsArgs, registry: &HandlerRegistry) -> Result<CommandResult, CliError> {
    let source = ProviderId::from(args.source);
    let response = registry.get_columns(source.as_str(), &args.table);

    let mut result = CommandResult::from_response(&response, source)?;
    if response.table().is_some_and(|table| table.is_empty()) {
        result = result.with_warning(format!(
            "table '{}' declares no columns on {source}",
            args.table
        ));
    }
    Ok(result)
}
