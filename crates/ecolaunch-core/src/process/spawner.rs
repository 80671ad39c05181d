//! Process spawning utilities.
//!
//! Starts a resolved [`LaunchCommand`] as a child process. Output is
//! inherited; capturing and rotating logs belongs to the supervisor.

use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tracing::info;

use super::{LaunchCommand, ProcessError};

/// A spawned process with its child handle and PID.
pub struct SpawnedProcess {
    /// The child process handle.
    pub child: Child,
    /// The OS process ID.
    pub pid: u32,
}

/// Spawn a process from its resolved command.
///
/// The child sees the parent's environment with the command's overrides
/// applied on top.
///
/// # Errors
///
/// Returns `ProcessError::SpawnFailed` if the process cannot be spawned,
/// or if the PID cannot be obtained.
pub fn spawn(command: &LaunchCommand) -> Result<SpawnedProcess, ProcessError> {
    let mut cmd = Command::new(&command.program);

    cmd.args(&command.args)
        .envs(&command.env)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(false);

    if let Some(cwd) = &command.cwd {
        cmd.current_dir(cwd);
    }

    let child = cmd
        .spawn()
        .map_err(|e| ProcessError::SpawnFailed(format!("{}: {e}", command.program.display())))?;

    let pid = child
        .id()
        .ok_or_else(|| ProcessError::SpawnFailed("failed to get process ID".to_string()))?;

    info!(app = %command.name, pid, "spawned process");
    Ok(SpawnedProcess { child, pid })
}

/// Spawn `command` and wait for it to exit.
///
/// # Errors
///
/// Returns `ProcessError::SpawnFailed` if the process cannot be started and
/// `ProcessError::WaitFailed` if its exit status cannot be collected.
pub async fn run(command: &LaunchCommand) -> Result<ExitStatus, ProcessError> {
    let mut spawned = spawn(command)?;
    let status = spawned
        .child
        .wait()
        .await
        .map_err(|e| ProcessError::WaitFailed(e.to_string()))?;

    info!(app = %command.name, pid = spawned.pid, %status, "process exited");
    Ok(status)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::*;

    fn shell(name: &str, script: &str) -> LaunchCommand {
        LaunchCommand {
            name: name.to_string(),
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), script.to_string()],
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    #[cfg_attr(miri, ignore)] // Miri can't spawn processes
    #[tokio::test]
    async fn test_spawn_simple_process() {
        let result = spawn(&shell("test-true", "exit 0"));
        assert!(result.is_ok());

        let mut spawned = result.unwrap();
        assert!(spawned.pid > 0);

        let status = spawned.child.wait().await.unwrap();
        assert!(status.success());
    }

    #[cfg_attr(miri, ignore)] // Miri can't spawn processes
    #[tokio::test]
    async fn test_run_applies_env() {
        let mut command = shell("test-env", r#"test "$TEST_VAR" = test_value"#);
        command
            .env
            .insert("TEST_VAR".to_string(), "test_value".to_string());

        let status = run(&command).await.unwrap();
        assert!(status.success());
    }

    #[cfg_attr(miri, ignore)] // Miri can't spawn processes
    #[tokio::test]
    async fn test_run_keeps_parent_env() {
        let status = run(&shell("test-path", r#"test -n "$PATH""#)).await.unwrap();
        assert!(status.success());
    }

    #[cfg_attr(miri, ignore)] // Miri can't spawn processes
    #[tokio::test]
    async fn test_run_applies_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker"), "").unwrap();

        let mut command = shell("test-cwd", "test -f marker");
        command.cwd = Some(dir.path().to_path_buf());

        let status = run(&command).await.unwrap();
        assert!(status.success());
    }

    #[cfg_attr(miri, ignore)] // Miri can't spawn processes
    #[tokio::test]
    async fn test_run_reports_exit_code() {
        let status = run(&shell("test-exit", "exit 3")).await.unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[cfg_attr(miri, ignore)] // Miri can't spawn processes
    #[tokio::test]
    async fn test_spawn_invalid_command() {
        let command = LaunchCommand {
            name: "test-invalid".to_string(),
            program: PathBuf::from("nonexistent_command_12345"),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
        };

        let result = spawn(&command);
        assert!(matches!(result, Err(ProcessError::SpawnFailed(_))));
    }
}
