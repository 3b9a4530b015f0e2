//! Host capability report.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::command::CommandBuilder;
use crate::domain::OperatingSystem;

/// What this host can do: its OS, the commands that will be run, and
/// whether every tool those commands need is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub operating_system: OperatingSystem,
    pub supported_operating_systems: Vec<OperatingSystem>,
    /// Command templates keyed by purpose.
    pub available_commands: BTreeMap<String, String>,
    pub required_tools: Vec<String>,
    pub missing_tools: Vec<String>,
    /// True when no required tool is missing.
    pub service_ready: bool,
}

impl SystemInfo {
    /// Build the report, asking `is_installed` about each required tool.
    pub fn collect(os: OperatingSystem, is_installed: impl Fn(&str) -> bool) -> Self {
        let builder = CommandBuilder::new(os);

        let required_tools: Vec<String> = builder
            .required_tools()
            .iter()
            .map(|tool| tool.to_string())
            .collect();

        let missing_tools: Vec<String> = required_tools
            .iter()
            .filter(|tool| !is_installed(tool))
            .cloned()
            .collect();

        if !missing_tools.is_empty() {
            debug!(missing = ?missing_tools, "Some system tools are missing");
        }

        Self {
            operating_system: os,
            supported_operating_systems: OperatingSystem::ALL.to_vec(),
            available_commands: builder
                .catalog()
                .into_iter()
                .map(|(key, command)| (key.to_string(), command))
                .collect(),
            service_ready: missing_tools.is_empty(),
            required_tools,
            missing_tools,
        }
    }
}
