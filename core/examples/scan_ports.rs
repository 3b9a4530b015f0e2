//! List socket bindings on this machine, optionally for one port.
//!
//! Run with: cargo run -p portscope-core --example scan_ports -- 8080

use portscope_core::table::{port_rows, render_ports_table, COMMAND_LINE_WIDTH};
use portscope_core::{OperatingSystem, PortQueryService, ShellExecutor};

#[tokio::main(flavor = "current_thread")]
async fn main() -> portscope_core::Result<()> {
    let port = std::env::args().nth(1).unwrap_or_default();
    let os = OperatingSystem::detect();

    println!("Querying ports on {}...\n", os.as_str());

    let service = PortQueryService::new(ShellExecutor::new(os), os);
    let records = service.query(&port).await?;

    if records.is_empty() {
        println!("No ports found.");
        return Ok(());
    }

    print!("{}", render_ports_table(&port_rows(&records, COMMAND_LINE_WIDTH)));
    println!("\nFound {} bindings", records.len());
    Ok(())
}
