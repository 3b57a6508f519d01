//! Scripted stand-in for the SSH command runner

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use kuwaiba_sync_common::{CommandRunner, ExecResult, Result, SshTarget};

/// One command received by [`ScriptedRunner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub command: String,
}

/// Answers commands from a script keyed by (host, command)
///
/// Unscripted commands answer like an SSH client that could not reach the
/// host (exit status 255).
#[derive(Default)]
pub struct ScriptedRunner {
    script: Mutex<HashMap<(String, String), ExecResult>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command` on `host` with `stdout` and exit status 0
    pub fn respond(self, host: &str, command: &str, stdout: impl Into<String>) -> Self {
        self.respond_with(host, command, ExecResult::ok(stdout))
    }

    /// Answer `command` on `host` with an arbitrary result
    pub fn respond_with(self, host: &str, command: &str, result: ExecResult) -> Self {
        self.set(host, command, result);
        self
    }

    /// Replace the answer of `command` on `host` between runs
    pub fn set(&self, host: &str, command: &str, result: ExecResult) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((host.to_string(), command.to_string()), result);
    }

    /// Every command received, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, target: &SshTarget, command: &str) -> Result<ExecResult> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                host: target.host.clone(),
                port: target.port,
                user: target.user.clone(),
                command: command.to_string(),
            });

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(target.host.clone(), command.to_string()))
            .cloned();
        Ok(scripted.unwrap_or_else(|| ExecResult {
            exit_code: 255,
            stdout: String::new(),
            stderr: format!("ssh: connect to host {} port {}: Connection refused", target.host, target.port),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(host: &str) -> SshTarget {
        SshTarget::new(host, 22, "admin", "cisco")
    }

    #[tokio::test]
    async fn test_scripted_answer_and_recording() {
        let runner = ScriptedRunner::new().respond("192.0.2.1", "show version", "IOS XE");

        let result = runner.run(&target("192.0.2.1"), "show version").await.unwrap();
        assert_eq!(result.stdout, "IOS XE");
        assert_eq!(runner.calls()[0].command, "show version");
        assert_eq!(runner.calls()[0].user, "admin");
    }

    #[tokio::test]
    async fn test_unscripted_host_is_unreachable() {
        let runner = ScriptedRunner::new();
        let result = runner.run(&target("192.0.2.9"), "show version").await.unwrap();
        assert_eq!(result.exit_code, 255);
        assert_eq!(runner.call_count(), 1);
    }
}
