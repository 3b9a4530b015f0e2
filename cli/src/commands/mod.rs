//! Subcommand implementations.

pub mod config;
pub mod info;
pub mod kill;
pub mod ports;
pub mod processes;

use std::sync::Arc;

use anyhow::Result;
use portscope_core::{Config, ConfigStore, OperatingSystem, ShellExecutor};
use tracing::{debug, warn};

/// Settings and the shared executor every subcommand runs with.
pub struct Context {
    pub os: OperatingSystem,
    pub config: Config,
    pub store: Option<ConfigStore>,
    pub executor: Arc<ShellExecutor>,
    pub json: bool,
}

impl Context {
    /// Load the configuration file and apply command-line overrides.
    ///
    /// A missing home directory or unreadable file falls back to defaults.
    pub async fn load(timeout_override: Option<u64>, json: bool) -> Result<Self> {
        let os = OperatingSystem::detect();

        let store = match ConfigStore::new() {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(error = %e, "No configuration directory, using defaults");
                None
            }
        };

        let mut config = match &store {
            Some(store) => store.load().await.unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring configuration file");
                Config::default()
            }),
            None => Config::default(),
        };

        if let Some(secs) = timeout_override {
            config.command_timeout_secs = secs;
        }

        debug!(os = os.as_str(), ?config, "Loaded settings");

        let executor = Arc::new(ShellExecutor::from_config(os, &config));

        Ok(Self {
            os,
            config,
            store,
            executor,
            json,
        })
    }
}
