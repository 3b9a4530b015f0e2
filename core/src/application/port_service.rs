//! Port query application service.

use std::collections::HashMap;

use tracing::debug;

use super::QueryOption;
use crate::command::{CommandBuilder, QueryIntent};
use crate::domain::{validate_port, OperatingSystem, PortRecord, ProcessRecord};
use crate::error::Result;
use crate::parser::{self, normalize, posix, windows};
use crate::ports::{CommandExecutor, OutputMode};

/// Application service for listing socket bindings.
///
/// Runs `netstat` or `lsof` for the current OS, then resolves the owning
/// process name and command line for each PID unless detail resolution is
/// turned off.
pub struct PortQueryService<E: CommandExecutor> {
    executor: E,
    builder: CommandBuilder,
    resolve_details: bool,
}

/// Owner details resolved once per PID.
#[derive(Debug, Clone)]
struct Owner {
    name: Option<String>,
    command_line: Option<String>,
}

impl<E: CommandExecutor> PortQueryService<E> {
    /// Create a new port service for the given OS.
    pub fn new(executor: E, os: OperatingSystem) -> Self {
        Self {
            executor,
            builder: CommandBuilder::new(os),
            resolve_details: true,
        }
    }

    /// Turn the per-PID name and command line lookups on or off.
    pub fn with_details(mut self, resolve: bool) -> Self {
        self.resolve_details = resolve;
        self
    }

    pub fn os(&self) -> OperatingSystem {
        self.builder.os()
    }

    /// Query ports. An empty identifier lists every binding; otherwise it
    /// must be a port number and only bindings on that local port are kept.
    pub async fn query(&self, identifier: &str) -> Result<Vec<PortRecord>> {
        let port = validate_port(identifier)?;
        let intent = match port {
            Some(port) => QueryIntent::PortsByNumber(port),
            None => QueryIntent::ListPorts,
        };

        let command = self.builder.build(&intent);
        let output = self.executor.run(&command, OutputMode::Merged).await?;

        let mut records = match self.os() {
            OperatingSystem::Windows => windows::parse_netstat_output(&output.lines),
            OperatingSystem::MacOs | OperatingSystem::Linux => {
                posix::parse_lsof_output(&output.lines)
            }
        };

        // findstr matches substrings, so ":80" also hits ":8080" and remote ports.
        if let Some(port) = port {
            records.retain(|record| record.port_number() == Some(port));
        }

        debug!(count = records.len(), "Parsed port records");

        if self.resolve_details {
            records = self.resolve_owners(records).await;
        }

        records.sort_by_key(|record| (record.port_number(), record.pid.parse::<u32>().ok()));
        Ok(records)
    }

    /// Bindings in the LISTEN state.
    pub async fn listening_ports(&self) -> Result<Vec<PortRecord>> {
        let records = self.query("").await?;
        Ok(records.into_iter().filter(|r| r.state == "LISTEN").collect())
    }

    /// Bindings with an established connection.
    pub async fn established_ports(&self) -> Result<Vec<PortRecord>> {
        let records = self.query("").await?;
        Ok(records.into_iter().filter(|r| r.state == "ESTAB").collect())
    }

    /// The kinds of port query this service answers.
    pub fn query_options(&self) -> Vec<QueryOption> {
        vec![
            ("all_ports", "Query all active ports"),
            ("specific_port", "Query specific port number"),
            ("listening_only", "Query listening ports only"),
            ("established_only", "Query established connections only"),
        ]
    }

    async fn resolve_owners(&self, records: Vec<PortRecord>) -> Vec<PortRecord> {
        let mut owners: HashMap<String, Owner> = HashMap::new();
        let mut resolved = Vec::with_capacity(records.len());

        for record in records {
            let owner = match owners.get(&record.pid) {
                Some(owner) => owner.clone(),
                None => {
                    let owner = self.lookup_owner(&record.pid).await;
                    owners.insert(record.pid.clone(), owner.clone());
                    owner
                }
            };
            resolved.push(self.apply_owner(record, owner));
        }

        resolved
    }

    async fn lookup_owner(&self, pid: &str) -> Owner {
        let Ok(pid) = pid.parse::<u32>() else {
            return Owner {
                name: None,
                command_line: None,
            };
        };

        let name = match self.os() {
            OperatingSystem::Windows => self.lookup_tasklist_name(pid).await,
            OperatingSystem::MacOs | OperatingSystem::Linux => None,
        };

        Owner {
            name,
            command_line: self.lookup_command_line(pid).await,
        }
    }

    async fn lookup_tasklist_name(&self, pid: u32) -> Option<String> {
        let command = self.builder.build(&QueryIntent::ProcessByPid(pid));
        match self.executor.run(&command, OutputMode::Merged).await {
            Ok(output) => windows::parse_tasklist_output(&output.lines)
                .into_iter()
                .next()
                .map(|process: ProcessRecord| process.name),
            Err(e) => {
                debug!(pid = pid, error = %e, "Process name lookup failed");
                None
            }
        }
    }

    async fn lookup_command_line(&self, pid: u32) -> Option<String> {
        let command = self.builder.build(&QueryIntent::CommandLine(pid));
        match self.executor.run(&command, OutputMode::StderrOnly).await {
            Ok(output) if output.success() => parser::command_line_from_output(&output.lines),
            Ok(output) => {
                debug!(pid = pid, exit_code = output.exit_code, "Command line lookup failed");
                None
            }
            Err(e) => {
                debug!(pid = pid, error = %e, "Command line lookup failed");
                None
            }
        }
    }

    /// Fill in owner details, falling back to what the listing itself showed.
    fn apply_owner(&self, record: PortRecord, owner: Owner) -> PortRecord {
        let record = match (self.os(), owner.name) {
            (_, Some(name)) => record.with_process_name(name),
            (OperatingSystem::Windows, None) => {
                debug!(pid = %record.pid, "Falling back to local address as process name");
                let fallback = record.local_address.clone();
                record.with_process_name(fallback)
            }
            (_, None) => record,
        };

        let command_line = owner
            .command_line
            .unwrap_or_else(|| record.process_name.clone());
        record.with_command_line(normalize::command_line(&command_line))
    }
}
