//! MQ 관리 명령 실행기
//!
//! Runs `dspmq` and `runmqsc` as child processes with a bounded timeout.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::config::MqConfig;
use crate::error::TransportError;

/// Query issued against the MQ installation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MqTask {
    /// `dspmq`: one `QMNAME(..) STATUS(..)` line per manager
    ListManagers,
    /// `dspmq -m <mqm> -o all`
    ManagerStatus,
    /// Current and maximum depth of local queues
    QueueDepth,
    /// `DISPLAY QSTATUS MONITOR` output
    QueueMonitor,
}

impl MqTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            MqTask::ListManagers => "list_managers",
            MqTask::ManagerStatus => "manager_status",
            MqTask::QueueDepth => "queue_depth",
            MqTask::QueueMonitor => "queue_monitor",
        }
    }
}

impl std::fmt::Display for MqTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source of raw command output
///
/// `manager` is ignored by [`MqTask::ListManagers`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, task: MqTask, manager: &str) -> Result<String, TransportError>;
}

/// Program invocation for one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// MQSC script written to stdin
    pub stdin: Option<String>,
}

/// [`CommandRunner`] backed by the local MQ binaries
#[derive(Debug, Clone)]
pub struct MqCommand {
    dspmq_path: String,
    runmqsc_path: String,
    queue_pattern: String,
    timeout: Duration,
}

impl MqCommand {
    /// 새 실행기 생성
    pub fn new(config: &MqConfig) -> Self {
        Self {
            dspmq_path: config.dspmq_path.clone(),
            runmqsc_path: config.runmqsc_path.clone(),
            queue_pattern: config.queue_pattern.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Build the program, arguments and stdin for a task
    pub fn invocation(&self, task: MqTask, manager: &str) -> Invocation {
        match task {
            MqTask::ListManagers => Invocation {
                program: self.dspmq_path.clone(),
                args: vec![],
                stdin: None,
            },
            MqTask::ManagerStatus => Invocation {
                program: self.dspmq_path.clone(),
                args: vec![
                    "-m".to_string(),
                    manager.to_string(),
                    "-o".to_string(),
                    "all".to_string(),
                ],
                stdin: None,
            },
            MqTask::QueueDepth => self.mqsc(
                manager,
                format!(
                    "DISPLAY QUEUE({}) TYPE(QLOCAL) CURDEPTH MAXDEPTH\n",
                    self.queue_pattern
                ),
            ),
            MqTask::QueueMonitor => self.mqsc(
                manager,
                format!("DISPLAY QSTATUS({}) MONITOR\n", self.queue_pattern),
            ),
        }
    }

    // `-e` keeps runmqsc from echoing the script, which would look like a QUEUE(..) token
    fn mqsc(&self, manager: &str, script: String) -> Invocation {
        Invocation {
            program: self.runmqsc_path.clone(),
            args: vec!["-e".to_string(), manager.to_string()],
            stdin: Some(script),
        }
    }

    async fn execute(&self, invocation: &Invocation) -> Result<String, TransportError> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .env("LC_ALL", "C")
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| TransportError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        if let (Some(script), Some(mut stdin)) = (&invocation.stdin, child.stdin.take()) {
            stdin
                .write_all(script.as_bytes())
                .await
                .map_err(|source| TransportError::Io {
                    program: invocation.program.clone(),
                    source,
                })?;
            // closing stdin ends the runmqsc session
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| TransportError::Io {
                program: invocation.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(TransportError::NonZeroExit {
                program: invocation.program.clone(),
                code: output.status.code().unwrap_or(-1),
                // runmqsc reports failures on stdout
                stderr: if stderr.is_empty() {
                    stdout.trim().to_string()
                } else {
                    stderr
                },
            });
        }

        Ok(stdout)
    }
}

#[async_trait]
impl CommandRunner for MqCommand {
    #[instrument(skip(self), fields(task = %task, manager = %manager))]
    async fn run(&self, task: MqTask, manager: &str) -> Result<String, TransportError> {
        let invocation = self.invocation(task, manager);
        debug!(program = %invocation.program, args = ?invocation.args, "Running MQ command");

        let output = tokio::time::timeout(self.timeout, self.execute(&invocation))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout.as_millis() as u64))??;

        debug!(bytes = output.len(), "MQ command finished");
        Ok(output)
    }
}
