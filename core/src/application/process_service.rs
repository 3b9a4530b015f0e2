//! Process query application service.

use tracing::debug;

use super::QueryOption;
use crate::command::{CommandBuilder, QueryIntent};
use crate::domain::{
    filter_processes, parse_memory_size, validate_process_identifier,
    validate_process_name, OperatingSystem, ProcessFilter, ProcessRecord, ProcessSelector,
};
use crate::error::{Error, Result};
use crate::parser::{self, posix, windows};
use crate::ports::{CommandExecutor, OutputMode};

/// Application service for listing processes.
pub struct ProcessQueryService<E: CommandExecutor> {
    executor: E,
    builder: CommandBuilder,
    resolve_details: bool,
}

impl<E: CommandExecutor> ProcessQueryService<E> {
    pub fn new(executor: E, os: OperatingSystem) -> Self {
        Self {
            executor,
            builder: CommandBuilder::new(os),
            resolve_details: true,
        }
    }

    /// Turn the per-PID command line lookups on or off.
    pub fn with_details(mut self, resolve: bool) -> Self {
        self.resolve_details = resolve;
        self
    }

    pub fn os(&self) -> OperatingSystem {
        self.builder.os()
    }

    /// Query processes.
    ///
    /// An empty identifier lists every process, an all-digit identifier
    /// selects one PID, and anything else is matched as a process name.
    pub async fn query(&self, identifier: &str) -> Result<Vec<ProcessRecord>> {
        let selector = validate_process_identifier(identifier)?;
        self.query_selector(&selector).await
    }

    /// Query processes for an explicit selector.
    ///
    /// A name is searched for even when it is all digits, and a PID is never
    /// treated as a name. Both are validated before any command runs.
    pub async fn query_selector(&self, selector: &ProcessSelector) -> Result<Vec<ProcessRecord>> {
        let intent = match selector {
            ProcessSelector::All => QueryIntent::ListProcesses,
            ProcessSelector::Pid(0) => return Err(Error::Validation("Invalid PID: 0".to_string())),
            ProcessSelector::Pid(pid) => QueryIntent::ProcessByPid(*pid),
            ProcessSelector::Name(name) => {
                QueryIntent::ProcessByName(validate_process_name(name)?.to_string())
            }
        };

        let command = self.builder.build(&intent);
        let output = self.executor.run(&command, OutputMode::Merged).await?;

        let os = self.os();
        let mut records = match (os, selector) {
            (OperatingSystem::Windows, _) => windows::parse_tasklist_output(&output.lines),
            (_, ProcessSelector::Pid(_)) => posix::parse_ps_pid_output(&output.lines, os),
            (_, _) => posix::parse_ps_aux_output(&output.lines, os),
        };

        debug!(count = records.len(), "Parsed process records");

        if self.resolve_details {
            for record in records.iter_mut() {
                self.resolve_command_line(record).await;
            }
        }

        records.sort_by_key(|record| record.pid_number());
        Ok(records)
    }

    /// Processes owned by `user`.
    pub async fn processes_by_user(&self, user: &str) -> Result<Vec<ProcessRecord>> {
        self.query_filtered(&ProcessFilter::new().with_user(user)).await
    }

    /// Processes using at least `threshold` percent CPU.
    pub async fn high_cpu_processes(&self, threshold: f64) -> Result<Vec<ProcessRecord>> {
        self.query_filtered(&ProcessFilter::new().with_min_cpu(threshold))
            .await
    }

    /// Processes using at least `threshold` memory, e.g. "100MB" or "1.5GB".
    ///
    /// Only absolute sizes are compared; percentage readings never match.
    pub async fn high_memory_processes(&self, threshold: &str) -> Result<Vec<ProcessRecord>> {
        let bytes = parse_memory_size(threshold).ok_or_else(|| {
            Error::Validation(format!("Invalid memory threshold: {}", threshold))
        })?;
        self.query_filtered(&ProcessFilter::new().with_min_memory(bytes))
            .await
    }

    /// List every process and keep those matching `filter`.
    pub async fn query_filtered(&self, filter: &ProcessFilter) -> Result<Vec<ProcessRecord>> {
        let records = self.query("").await?;
        Ok(filter_processes(&records, filter))
    }

    /// The kinds of process query this service answers.
    pub fn query_options(&self) -> Vec<QueryOption> {
        vec![
            ("all_processes", "Query all running processes"),
            ("specific_process", "Query specific process by name"),
            ("specific_pid", "Query specific process by PID"),
            ("user_processes", "Query processes for one user only"),
        ]
    }

    /// Replace the listed command line with the full one when it resolves.
    async fn resolve_command_line(&self, record: &mut ProcessRecord) {
        let Some(pid) = record.pid_number() else {
            return;
        };

        let command = self.builder.build(&QueryIntent::CommandLine(pid));
        match self.executor.run(&command, OutputMode::StderrOnly).await {
            Ok(output) if output.success() => {
                if let Some(line) = parser::command_line_from_output(&output.lines) {
                    record.command_line = line;
                }
            }
            Ok(output) => {
                debug!(pid = pid, exit_code = output.exit_code, "Command line lookup failed");
            }
            Err(e) => {
                debug!(pid = pid, error = %e, "Command line lookup failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MockExecutor;
    use std::sync::Arc;

    const PS_AUX: &[&str] = &[
        "USER       PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND",
        "www-data  4321  1.5  0.8 123456  7890 ?        S    10:00   0:01 nginx: worker process",
        "root         1  0.0  0.1 169584 13100 ?        Ss   Oct01   0:09 /sbin/init splash",
        "alice     5555 42.0  3.2 999999 88888 pts/0    R+   10:05   1:30 /usr/bin/python3 train.py",
    ];

    const TASKLIST: &[&str] = &[
        "\"svchost.exe\",\"1020\",\"Services\",\"0\",\"12,345 K\"",
        "\"node.exe\",\"5432\",\"Console\",\"1\",\"204,800 K\"",
        "\"chrome.exe\",\"8000\",\"Console\",\"1\",\"2,097,152 K\"",
    ];

    fn linux(executor: MockExecutor) -> ProcessQueryService<MockExecutor> {
        ProcessQueryService::new(executor, OperatingSystem::Linux).with_details(false)
    }

    #[tokio::test]
    async fn test_query_all_sorted_by_pid() {
        let service = linux(MockExecutor::new().on("ps aux", PS_AUX));

        let records = service.query("").await.unwrap();
        let pids: Vec<&str> = records.iter().map(|r| r.pid.as_str()).collect();
        assert_eq!(pids, vec!["1", "4321", "5555"]);
    }

    #[tokio::test]
    async fn test_query_by_pid_posix_resolves_command_line() {
        let executor = Arc::new(
            MockExecutor::new()
                .on(
                    "ps -p 1234 -o pid,user,comm,%mem",
                    &["  PID USER     COMM             %MEM", " 1234 alice    node              1.2"],
                )
                .on("ps -p 1234 -o command=", &["node /srv/app/server.js --port 3000"]),
        );
        let service = ProcessQueryService::new(executor.clone(), OperatingSystem::MacOs);

        let records = service.query(" 1234 ").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "node");
        assert_eq!(records[0].user, "alice");
        assert_eq!(records[0].command_line, "node /srv/app/server.js --port 3000");
        assert_eq!(executor.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_query_by_name_uses_grep_pipeline() {
        let executor = Arc::new(MockExecutor::new().on("grep -i -e nginx", &PS_AUX[1..2]));
        let service = ProcessQueryService::new(executor.clone(), OperatingSystem::Linux)
            .with_details(false);

        let records = service.query("nginx").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user, "www-data");
        assert_eq!(
            executor.calls(),
            vec!["ps aux | grep -i -e nginx | grep -v grep".to_string()]
        );
    }

    #[tokio::test]
    async fn test_windows_command_line_fallback_keeps_image_name() {
        let executor = MockExecutor::new()
            .on("tasklist /FO CSV /NH", TASKLIST)
            .on("ProcessId=5432", &["CommandLine", "-----------", "node.exe server.js"])
            .on_timeout("ProcessId=1020");
        let service = ProcessQueryService::new(executor, OperatingSystem::Windows);

        let records = service.query("").await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].pid, "1020");
        assert_eq!(records[0].command_line, "svchost.exe");
        assert_eq!(records[1].command_line, "node.exe server.js");
        assert_eq!(records[2].command_line, "chrome.exe");
    }

    #[tokio::test]
    async fn test_invalid_identifiers_rejected() {
        let executor = Arc::new(MockExecutor::new());
        let service = ProcessQueryService::new(executor.clone(), OperatingSystem::Linux);

        let too_long = "x".repeat(256);
        for input in ["0", "-5", "bad;name", "a|b", too_long.as_str()] {
            let err = service.query(input).await.unwrap_err();
            assert!(err.is_validation(), "{input} should be rejected");
        }
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_processes_by_user() {
        let service = linux(MockExecutor::new().on("ps aux", PS_AUX));

        let records = service.processes_by_user("root").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pid, "1");
    }

    #[tokio::test]
    async fn test_high_cpu_processes() {
        let service = linux(MockExecutor::new().on("ps aux", PS_AUX));

        let records = service.high_cpu_processes(10.0).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pid, "5555");
    }

    #[tokio::test]
    async fn test_high_memory_processes() {
        let service = ProcessQueryService::new(
            MockExecutor::new().on("tasklist", TASKLIST),
            OperatingSystem::Windows,
        )
        .with_details(false);

        let records = service.high_memory_processes("100MB").await.unwrap();
        let pids: Vec<&str> = records.iter().map(|r| r.pid.as_str()).collect();
        assert_eq!(pids, vec!["5432", "8000"]);

        let records = service.high_memory_processes("1.5GB").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "chrome");

        assert!(service
            .high_memory_processes("lots")
            .await
            .unwrap_err()
            .is_validation());
    }

    #[tokio::test]
    async fn test_spawn_failure_propagates() {
        let service = linux(MockExecutor::new().on_spawn_failure("ps aux"));
        let err = service.query("").await.unwrap_err();
        assert!(err.is_system_command());
    }

    #[tokio::test]
    async fn test_query_selector_keeps_name_and_pid_apart() {
        let executor = Arc::new(MockExecutor::new().on("grep -i -e 1234", &PS_AUX[1..2]));
        let service = ProcessQueryService::new(executor.clone(), OperatingSystem::Linux)
            .with_details(false);

        let records = service
            .query_selector(&ProcessSelector::Name("1234".into()))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            executor.calls(),
            vec!["ps aux | grep -i -e 1234 | grep -v grep".to_string()]
        );
    }

    #[tokio::test]
    async fn test_query_selector_validates_before_running() {
        let executor = Arc::new(MockExecutor::new());
        let service = ProcessQueryService::new(executor.clone(), OperatingSystem::Linux);

        for selector in [
            ProcessSelector::Pid(0),
            ProcessSelector::Name("a;b".into()),
            ProcessSelector::Name("  ".into()),
        ] {
            let err = service.query_selector(&selector).await.unwrap_err();
            assert!(err.is_validation(), "{:?} should be rejected", selector);
        }
        assert!(executor.calls().is_empty());
    }
}
