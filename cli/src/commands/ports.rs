//! Ports command - show socket bindings and their owners.

use anyhow::Result;
use portscope_core::domain::validate_port;
use portscope_core::table::{port_rows, render_ports_table};
use portscope_core::{CommandExecutor, PortQueryService, PortRecord};

use super::Context;

/// Which connection states to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    Any,
    Listening,
    Established,
}

impl StateFilter {
    pub fn from_flags(listening: bool, established: bool) -> Self {
        match (listening, established) {
            (true, _) => StateFilter::Listening,
            (_, true) => StateFilter::Established,
            _ => StateFilter::Any,
        }
    }
}

pub async fn run(ctx: &Context, port: Option<&str>, state: StateFilter) -> Result<()> {
    let service = PortQueryService::new(ctx.executor.clone(), ctx.os)
        .with_details(ctx.config.resolve_command_lines);

    let records = fetch(&service, port, state).await?;
    print_records(ctx, &records)
}

/// Validate the port filter, then run the query for the requested states.
async fn fetch<E: CommandExecutor>(
    service: &PortQueryService<E>,
    port: Option<&str>,
    state: StateFilter,
) -> portscope_core::Result<Vec<PortRecord>> {
    let input = port.unwrap_or_default();
    let port = validate_port(input)?;

    let mut records = match state {
        StateFilter::Any => service.query(input).await?,
        StateFilter::Listening => service.listening_ports().await?,
        StateFilter::Established => service.established_ports().await?,
    };

    if let Some(port) = port {
        records.retain(|r| r.port_number() == Some(port));
    }
    Ok(records)
}

fn print_records(ctx: &Context, records: &[PortRecord]) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No ports found.");
        return Ok(());
    }

    let rows = port_rows(records, ctx.config.command_line_display_width);
    print!("{}", render_ports_table(&rows));
    println!("\nTotal: {} ports", records.len());
    Ok(())
}
