use std::io::{self, Write};

use cryptotab_core::Envelope;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::commands::CommandOutput;
use crate::error::CliError;

/// Writes the envelope, then hands back the command failure (if any) for the exit code.
pub fn emit<W: Write>(
    out: &mut W,
    output: CommandOutput,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    write_envelope(out, &output.envelope, format, pretty)?;
    out.flush()?;

    match output.failure {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}

pub fn write_envelope<W: Write>(
    out: &mut W,
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => write_table(out, envelope)?,
    }

    Ok(())
}

fn write_table<W: Write>(out: &mut W, envelope: &Envelope<Value>) -> Result<(), CliError> {
    let meta = &envelope.meta;
    writeln!(out, "request_id  : {}", meta.request_id)?;
    writeln!(out, "schema      : {}", meta.schema_version)?;
    writeln!(out, "generated_at: {}", meta.generated_at)?;
    if let Some(source) = meta.source {
        writeln!(out, "source      : {source}")?;
    }
    writeln!(out, "latency_ms  : {}", meta.latency_ms)?;

    if !meta.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    match tabular_parts(&envelope.data) {
        Some((columns, rows)) => write_grid(out, &columns, &rows)?,
        None => match envelope.data.get("error_message").and_then(Value::as_str) {
            Some(message) => writeln!(out, "error: {message}")?,
            None => {
                writeln!(out, "data:")?;
                for line in serde_json::to_string_pretty(&envelope.data)?.lines() {
                    writeln!(out, "  {line}")?;
                }
            }
        },
    }

    Ok(())
}

/// Columns and rendered cells when `data` is a serialized table response.
fn tabular_parts(data: &Value) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    if data.get("type").and_then(Value::as_str) != Some("table") {
        return None;
    }

    let columns = data
        .get("columns")?
        .as_array()?
        .iter()
        .map(|column| column.as_str().map(str::to_owned))
        .collect::<Option<Vec<_>>>()?;

    let rows = data
        .get("rows")?
        .as_array()?
        .iter()
        .map(|row| row.as_array().map(|cells| cells.iter().map(render_cell).collect()))
        .collect::<Option<Vec<_>>>()?;

    Some((columns, rows))
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn write_grid<W: Write>(out: &mut W, columns: &[String], rows: &[Vec<String>]) -> io::Result<()> {
    if columns.is_empty() {
        return writeln!(out, "(no columns)");
    }

    let mut widths = columns.iter().map(|column| column.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = widths
        .iter()
        .map(|width| "-".repeat(width + 2))
        .collect::<Vec<_>>()
        .join("+");

    writeln!(out, "+{separator}+")?;
    write_grid_row(out, &widths, columns)?;
    writeln!(out, "+{separator}+")?;
    for row in rows {
        write_grid_row(out, &widths, row)?;
    }
    writeln!(out, "+{separator}+")?;
    writeln!(out, "({} rows)", rows.len())
}

fn write_grid_row<W: Write>(out: &mut W, widths: &[usize], cells: &[String]) -> io::Result<()> {
    let rendered = widths
        .iter()
        .enumerate()
        .map(|(index, width)| {
            let cell = cells.get(index).map(String::as_str).unwrap_or("");
            format!(" {cell:<width$} ")
        })
        .collect::<Vec<_>>()
        .join("|");
    writeln!(out, "|{rendered}|")
}
