//! External command helpers

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::Stdio;
use stint_alert_api::{AlertError, AlertResult};
use tokio::process::Command;
use tracing::debug;

/// External commands used by the local dispatcher, in argv form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCommands {
    pub early_warning: Option<Vec<String>>,
    pub session_end: Option<Vec<String>>,
    /// Receives the notification title and body as two extra arguments
    pub notify: Option<Vec<String>>,
}

/// Run a command to completion with output discarded
pub async fn run_command(argv: &[String], extra_args: &[&str]) -> AlertResult<()> {
    let Some((program, args)) = argv.split_first() else {
        return Err(AlertError::PlaybackFailed("Empty argv".into()));
    };

    debug!(program = %program, args = ?args, extra = ?extra_args, "Running alert command");

    let status = Command::new(program)
        .args(args)
        .args(extra_args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await?;

    if status.success() {
        Ok(())
    } else {
        Err(AlertError::PlaybackFailed(format!("{} exited with {}", program, status)))
    }
}

/// Ring the terminal bell on stderr
pub fn ring_bell() {
    let mut stderr = std::io::stderr();
    let _ = stderr.write_all(b"\x07");
    let _ = stderr.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_success() {
        run_command(&["true".into()], &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_run_failure_status() {
        let err = run_command(&["false".into()], &[]).await.unwrap_err();
        assert!(matches!(err, AlertError::PlaybackFailed(_)));
    }

    #[tokio::test]
    async fn test_missing_program_is_io_error() {
        let err = run_command(&["/nonexistent/stint-sound".into()], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AlertError::Io(_)));
    }

    #[tokio::test]
    async fn test_empty_argv() {
        let err = run_command(&[], &[]).await.unwrap_err();
        assert!(matches!(err, AlertError::PlaybackFailed(_)));
    }

    #[tokio::test]
    async fn test_extra_args_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("args");
        let script = format!("printf '%s|%s' \"$0\" \"$1\" > {}", out.display());
        run_command(&["sh".into(), "-c".into(), script], &["Title", "Body text"])
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(out).unwrap(), "Title|Body text");
    }
}
