//! Info command - report the OS, the commands in use and missing tools.

use anyhow::Result;
use portscope_core::{find_executable, SystemInfo};

use super::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let info = SystemInfo::collect(ctx.os, |tool| find_executable(tool).is_some());

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Operating system: {}", info.operating_system.as_str());
    println!(
        "Supported:        {}",
        info.supported_operating_systems
            .iter()
            .map(|os| os.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Command timeout:  {}s", ctx.executor.timeout().as_secs());
    println!();

    println!("Commands:");
    let width = info
        .available_commands
        .keys()
        .map(|k| k.len())
        .max()
        .unwrap_or(0);
    for (purpose, command) in &info.available_commands {
        println!("  {:<width$}  {}", purpose, command, width = width);
    }
    println!();

    println!("Required tools:   {}", info.required_tools.join(", "));
    if info.service_ready {
        println!("Status:           ready");
    } else {
        println!("Missing tools:    {}", info.missing_tools.join(", "));
        println!("Status:           not ready");
    }
    Ok(())
}
