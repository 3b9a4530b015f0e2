//! Portscope CLI - Find and terminate processes by port, name or PID
//!
//! A command-line front end over `portscope-core` that lists socket
//! bindings and processes using the host's own tools and kills batches
//! of PIDs.

mod commands;

use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use portscope_core::Error;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use commands::Context;

/// Exit code when a required system tool is missing.
const EXIT_TOOL_MISSING: u8 = 2;

#[derive(Parser)]
#[command(name = "portscope")]
#[command(author, version, about = "Find and terminate processes by port, name or PID")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Time limit for each system command, in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// List socket bindings and their owning processes
    #[command(alias = "ports")]
    QueryPorts {
        /// Only bindings on this local port
        #[arg(short, long)]
        port: Option<String>,

        /// Only ports in the LISTEN state
        #[arg(long, conflicts_with = "established")]
        listening: bool,

        /// Only established connections
        #[arg(long)]
        established: bool,
    },

    /// List running processes
    #[command(alias = "ps")]
    QueryProcesses {
        /// Match processes whose name contains this text
        #[arg(short, long, conflicts_with = "pid")]
        name: Option<String>,

        /// Show a single process
        #[arg(short, long)]
        pid: Option<String>,

        /// Only processes owned by this user
        #[arg(short, long)]
        user: Option<String>,

        /// Only processes using at least this much CPU (percent)
        #[arg(long, value_name = "PCT")]
        min_cpu: Option<f64>,

        /// Only processes using at least this much memory, e.g. 100MB
        #[arg(long, value_name = "SIZE")]
        min_memory: Option<String>,
    },

    /// Force-kill one or more processes
    Kill {
        /// Comma-separated PIDs to kill
        #[arg(long, value_delimiter = ',', num_args = 0.., allow_hyphen_values = true)]
        pids: Vec<String>,
    },

    /// Show the detected OS, the commands in use and missing tools
    Info,

    /// Show the configuration file
    Config {
        /// Write the current settings to the configuration file
        #[arg(long)]
        init: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(atty::is(atty::Stream::Stderr)),
        )
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let ctx = Context::load(cli.timeout, cli.json).await?;

    match cli.command {
        Some(Commands::QueryPorts {
            port,
            listening,
            established,
        }) => {
            let state = commands::ports::StateFilter::from_flags(listening, established);
            commands::ports::run(&ctx, port.as_deref(), state).await?;
        }
        Some(Commands::QueryProcesses {
            name,
            pid,
            user,
            min_cpu,
            min_memory,
        }) => {
            let query = commands::processes::Query {
                pid,
                name,
                user,
                min_cpu,
                min_memory,
            };
            commands::processes::run(&ctx, query).await?;
        }
        Some(Commands::Kill { pids }) => {
            return commands::kill::run(&ctx, &pids).await;
        }
        Some(Commands::Info) => {
            commands::info::run(&ctx)?;
        }
        Some(Commands::Config { init }) => {
            commands::config::run(&ctx, init).await?;
        }
        None => {
            commands::ports::run(&ctx, None, commands::ports::StateFilter::Any).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => match err.downcast_ref::<Error>() {
            Some(missing @ Error::ToolNotFound(_)) => {
                eprintln!("{}", missing);
                ExitCode::from(EXIT_TOOL_MISSING)
            }
            _ => {
                eprintln!("Error: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}
