//! Processes command - list processes with optional filters.

use anyhow::{bail, Result};
use portscope_core::domain::{
    filter_processes, parse_memory_size, validate_pid, validate_process_name, ProcessSelector,
};
use portscope_core::table::{process_rows, render_processes_table};
use portscope_core::{ProcessFilter, ProcessQueryService, ProcessRecord};

use super::Context;

/// Process listing options from the command line.
#[derive(Debug, Default)]
pub struct Query {
    /// Show this PID only.
    pub pid: Option<String>,
    /// Match processes whose name contains this text.
    pub name: Option<String>,
    pub user: Option<String>,
    pub min_cpu: Option<f64>,
    pub min_memory: Option<String>,
}

impl Query {
    /// `--pid` must be a positive integer and `--name` a valid name; neither
    /// is reinterpreted as the other.
    fn selector(&self) -> portscope_core::Result<ProcessSelector> {
        match (&self.pid, &self.name) {
            (Some(pid), _) => validate_pid(pid).map(ProcessSelector::Pid),
            (None, Some(name)) => {
                validate_process_name(name).map(|name| ProcessSelector::Name(name.to_string()))
            }
            (None, None) => Ok(ProcessSelector::All),
        }
    }

    fn filter(&self) -> Result<ProcessFilter> {
        let mut filter = ProcessFilter::new();
        if let Some(ref user) = self.user {
            filter = filter.with_user(user.clone());
        }
        if let Some(cpu) = self.min_cpu {
            filter = filter.with_min_cpu(cpu);
        }
        if let Some(ref memory) = self.min_memory {
            let Some(bytes) = parse_memory_size(memory) else {
                bail!("Invalid memory threshold: {}", memory);
            };
            filter = filter.with_min_memory(bytes);
        }
        Ok(filter)
    }
}

pub async fn run(ctx: &Context, query: Query) -> Result<()> {
    let selector = query.selector()?;
    let filter = query.filter()?;
    let service = ProcessQueryService::new(ctx.executor.clone(), ctx.os)
        .with_details(ctx.config.resolve_command_lines);

    let mut records = service.query_selector(&selector).await?;
    if filter.is_active() {
        records = filter_processes(&records, &filter);
    }

    print_records(ctx, &records)
}

fn print_records(ctx: &Context, records: &[ProcessRecord]) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No processes found.");
        return Ok(());
    }

    let rows = process_rows(records, ctx.config.command_line_display_width);
    print!("{}", render_processes_table(&rows));
    println!("\nTotal: {} processes", records.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_query() {
        let query = Query {
            user: Some("root".into()),
            min_cpu: Some(5.0),
            min_memory: Some("100MB".into()),
            ..Default::default()
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.user.as_deref(), Some("root"));
        assert_eq!(filter.min_cpu, Some(5.0));
        assert_eq!(filter.min_memory, Some(100 * 1024 * 1024));
    }

    #[test]
    fn test_empty_query_has_inactive_filter() {
        assert!(!Query::default().filter().unwrap().is_active());
    }

    #[test]
    fn test_bad_memory_threshold() {
        let query = Query {
            min_memory: Some("lots".into()),
            ..Default::default()
        };
        let err = query.filter().unwrap_err();
        assert_eq!(err.to_string(), "Invalid memory threshold: lots");
    }

    #[test]
    fn test_selector_from_flags() {
        let query = Query {
            pid: Some("1234".into()),
            ..Default::default()
        };
        assert_eq!(query.selector().unwrap(), ProcessSelector::Pid(1234));

        let query = Query {
            name: Some("1234".into()),
            ..Default::default()
        };
        assert_eq!(query.selector().unwrap(), ProcessSelector::Name("1234".into()));

        assert_eq!(Query::default().selector().unwrap(), ProcessSelector::All);
    }

    #[test]
    fn test_pid_flag_rejects_non_numbers() {
        for pid in ["abc", "nginx", "0", "-3"] {
            let query = Query {
                pid: Some(pid.into()),
                ..Default::default()
            };
            assert!(query.selector().unwrap_err().is_validation(), "{}", pid);
        }
    }
}
