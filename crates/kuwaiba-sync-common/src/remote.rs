//! Remote command execution over SSH.
//!
//! Each call opens one session, runs exactly one command and tears the
//! session down. The OpenSSH client is driven as a child process; password
//! authentication goes through `sshpass -e`, which reads the password from
//! the `SSHPASS` environment variable so it never shows up in the process
//! list.
//!
//! # Example
//!
//! ```ignore
//! use kuwaiba_sync_common::remote::{self, SshCommandRunner, SshOptions, SshTarget};
//!
//! let runner = SshCommandRunner::new(SshOptions::default());
//! let target = SshTarget::new("10.0.0.1", 22, "admin", "secret");
//! let output = remote::exec_or_fail(&runner, &target, "show bridge-domain").await?;
//! ```

use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::{Result, SyncError};

/// Path to the OpenSSH client.
pub const SSH_CMD: &str = "/usr/bin/ssh";

/// Path to `sshpass`, used for password authentication.
pub const SSHPASS_CMD: &str = "/usr/bin/sshpass";

/// Exit status the OpenSSH client uses for its own failures (connection
/// refused, authentication failed, ...), as opposed to remote command errors.
pub const SSH_CLIENT_ERROR_EXIT: i32 = 255;

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection endpoint and credentials of a device.
#[derive(Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl SshTarget {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for SshTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// SSH client settings shared by every session of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshOptions {
    /// OpenSSH client binary.
    pub ssh_path: String,
    /// sshpass binary, used when the target has a password.
    pub sshpass_path: String,
    /// Only timeout enforced; command execution and output reads are unbounded.
    pub connect_timeout: Duration,
    /// Extra `-o` options (legacy key exchange algorithms and the like).
    pub extra_options: Vec<String>,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            ssh_path: SSH_CMD.to_string(),
            sshpass_path: SSHPASS_CMD.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            extra_options: Vec::new(),
        }
    }
}

/// Result of a remote command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// The exit code of the command (0 = success).
    pub exit_code: i32,
    /// The stdout output.
    pub stdout: String,
    /// The stderr output.
    pub stderr: String,
}

impl ExecResult {
    /// Builds a successful result with the given output.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the combined output (stdout + stderr) for error messages.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Runs one command on a remote device per call.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Opens a session, runs `command`, closes the session.
    ///
    /// Only spawn failures are errors here; non-zero exit statuses come back
    /// in the [`ExecResult`].
    async fn run(&self, target: &SshTarget, command: &str) -> Result<ExecResult>;
}

/// [`CommandRunner`] backed by the OpenSSH client.
#[derive(Debug, Clone, Default)]
pub struct SshCommandRunner {
    options: SshOptions,
}

impl SshCommandRunner {
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SshOptions {
        &self.options
    }

    /// Program and arguments used to reach `target`.
    pub fn command_line(&self, target: &SshTarget, command: &str) -> (String, Vec<String>) {
        let mut args = Vec::new();
        let program = if target.password.is_empty() {
            self.options.ssh_path.clone()
        } else {
            args.push("-e".to_string());
            args.push(self.options.ssh_path.clone());
            self.options.sshpass_path.clone()
        };

        let mut ssh_options = vec![
            "StrictHostKeyChecking=no".to_string(),
            "UserKnownHostsFile=/dev/null".to_string(),
            "LogLevel=ERROR".to_string(),
            format!("ConnectTimeout={}", self.options.connect_timeout.as_secs().max(1)),
        ];
        if !target.password.is_empty() {
            ssh_options.push("PreferredAuthentications=password,keyboard-interactive".to_string());
            ssh_options.push("NumberOfPasswordPrompts=1".to_string());
        }
        ssh_options.extend(self.options.extra_options.iter().cloned());

        for opt in ssh_options {
            args.push("-o".to_string());
            args.push(opt);
        }
        args.push("-p".to_string());
        args.push(target.port.to_string());
        args.push(format!("{}@{}", target.user, target.host));
        args.push(command.to_string());

        (program, args)
    }
}

#[async_trait]
impl CommandRunner for SshCommandRunner {
    async fn run(&self, target: &SshTarget, command: &str) -> Result<ExecResult> {
        tracing::debug!(host = %target.host, port = target.port, command = %command, "Executing remote command");

        let (program, args) = self.command_line(target, command);
        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // the session dies with the future on every exit path
            .kill_on_drop(true);
        if !target.password.is_empty() {
            cmd.env("SSHPASS", &target.password);
        }

        let output = cmd.output().await.map_err(|e| SyncError::RemoteExec {
            command: command.to_string(),
            source: e,
        })?;

        let exit_code = output.status.code().unwrap_or(-1);
        let result = ExecResult {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        };

        if result.success() {
            tracing::trace!(host = %target.host, command = %command, "Remote command succeeded");
        } else {
            tracing::warn!(
                host = %target.host,
                command = %command,
                exit_code = exit_code,
                stderr = %result.stderr,
                "Remote command failed"
            );
        }

        Ok(result)
    }
}

/// Runs a remote command and turns a non-zero exit status into an error.
///
/// Exit status 255 is reported by the SSH client itself and maps to
/// [`SyncError::ConnectionFailed`]; anything else non-zero maps to
/// [`SyncError::CommandFailed`].
pub async fn exec_or_fail(
    runner: &dyn CommandRunner,
    target: &SshTarget,
    command: &str,
) -> Result<String> {
    let result = runner.run(target, command).await?;
    if result.success() {
        return Ok(result.stdout);
    }
    if result.exit_code == SSH_CLIENT_ERROR_EXIT {
        Err(SyncError::ConnectionFailed {
            host: target.host.clone(),
            port: target.port,
            output: result.combined_output(),
        })
    } else {
        Err(SyncError::CommandFailed {
            host: target.host.clone(),
            command: command.to_string(),
            exit_code: result.exit_code,
            output: result.combined_output(),
        })
    }
}
