//! Table view models and plain-text rendering.
//!
//! Rows carry the record's PID as `id`, so a selection made on a table can
//! be handed straight to [`KillService`](crate::application::KillService).

use serde::Serialize;

use crate::domain::{PortRecord, ProcessRecord, UNKNOWN_PROCESS};
use crate::parser::normalize::truncate;

/// Default width of the command line column.
pub const COMMAND_LINE_WIDTH: usize = 50;

/// Column definition for a table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub key: &'static str,
    pub title: &'static str,
}

const fn column(key: &'static str, title: &'static str) -> Column {
    Column { key, title }
}

/// Columns of the port table. The first is the selection checkbox.
pub fn port_columns() -> Vec<Column> {
    vec![
        column("checkbox", ""),
        column("port", "Port"),
        column("pid", "PID"),
        column("protocol", "Protocol"),
        column("localAddress", "Local Address"),
        column("remoteAddress", "Remote Address"),
        column("state", "State"),
        column("processName", "Process"),
        column("commandLine", "Command"),
    ]
}

/// Columns of the process table. The first is the selection checkbox.
pub fn process_columns() -> Vec<Column> {
    vec![
        column("checkbox", ""),
        column("pid", "PID"),
        column("name", "Name"),
        column("user", "User"),
        column("cpuUsage", "CPU"),
        column("memoryUsage", "Memory"),
        column("commandLine", "Command"),
        column("status", "Status"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRow {
    pub id: String,
    pub port: String,
    pub pid: String,
    pub protocol: String,
    pub local_address: String,
    pub remote_address: String,
    pub state: String,
    pub process_name: String,
    pub command_line: String,
}

impl PortRow {
    pub fn from_record(record: &PortRecord, command_width: usize) -> Self {
        Self {
            id: record.pid.clone(),
            port: record.port.clone(),
            pid: record.pid.clone(),
            protocol: record.protocol.clone(),
            local_address: record.local_address.clone(),
            remote_address: or_dash(&record.remote_address),
            state: or_dash(&record.state),
            process_name: or_unknown(&record.process_name),
            command_line: truncate(&record.command_line, command_width),
        }
    }

    fn cells(&self) -> Vec<&str> {
        vec![
            self.port.as_str(),
            self.pid.as_str(),
            self.protocol.as_str(),
            self.local_address.as_str(),
            self.remote_address.as_str(),
            self.state.as_str(),
            self.process_name.as_str(),
            self.command_line.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRow {
    pub id: String,
    pub pid: String,
    pub name: String,
    pub user: String,
    pub cpu_usage: String,
    pub memory_usage: String,
    pub command_line: String,
    pub status: String,
}

impl ProcessRow {
    pub fn from_record(record: &ProcessRecord, command_width: usize) -> Self {
        Self {
            id: record.pid.clone(),
            pid: record.pid.clone(),
            name: record.name.clone(),
            user: or_dash(&record.user),
            cpu_usage: or_dash(&record.cpu_usage),
            memory_usage: or_dash(&record.memory_usage),
            command_line: truncate(&record.command_line, command_width),
            status: or_unknown(&record.status),
        }
    }

    fn cells(&self) -> Vec<&str> {
        vec![
            self.pid.as_str(),
            self.name.as_str(),
            self.user.as_str(),
            self.cpu_usage.as_str(),
            self.memory_usage.as_str(),
            self.command_line.as_str(),
            self.status.as_str(),
        ]
    }
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

fn or_unknown(value: &str) -> String {
    if value.trim().is_empty() {
        UNKNOWN_PROCESS.to_string()
    } else {
        value.to_string()
    }
}

pub fn port_rows(records: &[PortRecord], command_width: usize) -> Vec<PortRow> {
    records
        .iter()
        .map(|r| PortRow::from_record(r, command_width))
        .collect()
}

pub fn process_rows(records: &[ProcessRecord], command_width: usize) -> Vec<ProcessRow> {
    records
        .iter()
        .map(|r| ProcessRow::from_record(r, command_width))
        .collect()
}

/// Render port rows as a fixed-width text table.
pub fn render_ports_table(rows: &[PortRow]) -> String {
    let rows: Vec<Vec<&str>> = rows.iter().map(PortRow::cells).collect();
    render(&port_columns(), &rows)
}

/// Render process rows as a fixed-width text table.
pub fn render_processes_table(rows: &[ProcessRow]) -> String {
    let rows: Vec<Vec<&str>> = rows.iter().map(ProcessRow::cells).collect();
    render(&process_columns(), &rows)
}

/// Lay out cells under their headers, skipping the checkbox column.
fn render(columns: &[Column], rows: &[Vec<&str>]) -> String {
    let headers: Vec<&str> = columns
        .iter()
        .filter(|c| c.key != "checkbox")
        .map(|c| c.title)
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &headers, &widths);
    for row in rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
