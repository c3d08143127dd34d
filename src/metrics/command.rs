//! Subprocess execution with a deadline

use crate::error::MetricsError;
use std::time::Duration;
use tokio::process::Command;

/// Run a program and return its stdout
///
/// The child is killed if the deadline passes. A non-zero exit status is an
/// error carrying the trimmed stderr.
pub async fn run_command(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, MetricsError> {
    let child = Command::new(program).args(args).kill_on_drop(true).output();

    let output = tokio::time::timeout(timeout, child)
        .await
        .map_err(|_| MetricsError::Timeout {
            what: program.to_string(),
            secs: timeout.as_secs(),
        })?
        .map_err(|e| MetricsError::Command {
            program: program.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(MetricsError::Command {
            program: program.to_string(),
            message: if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            },
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
