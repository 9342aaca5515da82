use cryptotab_core::{HandlerRegistry, ProviderId};

use crate::cli::TablesArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &TablesArgs, registry: &HandlerRegistry) -> Result<CommandResult, CliError> {
    let source = ProviderId::from(args.source);
    let response = registry.get_tables(source.as_str());
    CommandResult::from_response(&response, source)
}
