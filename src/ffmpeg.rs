use crate::config::ToolOptions;
use crate::error::PreviewError;
use log::debug;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Spawns `program` with a structured argument list and waits for it, bounded
/// by the configured timeout. The child is killed if the timeout elapses.
pub(crate) async fn run_tool<S: AsRef<OsStr>>(
    program: &Path,
    args: &[S],
    tools: &ToolOptions,
) -> Result<Output, PreviewError> {
    let name = program.display().to_string();
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(tools.timeout(), output).await {
        Ok(result) => result.map_err(|e| PreviewError::io(format!("failed to run {name}"), e)),
        Err(_) => Err(PreviewError::Timeout {
            program: name,
            secs: tools.timeout_secs,
        }),
    }
}

/// Runs ffmpeg to completion. A non-zero exit carries both output streams.
pub async fn run_ffmpeg<S: AsRef<OsStr>>(args: &[S], tools: &ToolOptions) -> Result<(), PreviewError> {
    let command = command_line(&tools.ffmpeg, args);
    debug!("running {command}");

    let output = run_tool(&tools.ffmpeg, args, tools).await?;
    if output.status.success() {
        Ok(())
    } else {
        Err(encode_failure(command, &output))
    }
}

/// Runs ffmpeg and returns whatever it wrote to stdout.
pub async fn ffmpeg_stdout<S: AsRef<OsStr>>(
    args: &[S],
    tools: &ToolOptions,
) -> Result<Vec<u8>, PreviewError> {
    let output = run_tool(&tools.ffmpeg, args, tools).await?;
    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(encode_failure(command_line(&tools.ffmpeg, args), &output))
    }
}

fn encode_failure(command: String, output: &Output) -> PreviewError {
    PreviewError::Encode {
        command,
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
    }
}

/// Human readable rendering of an invocation for logs and error messages.
/// Never fed back to a shell.
pub(crate) fn command_line<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        let arg = arg.as_ref().to_string_lossy();
        line.push(' ');
        if arg.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(&arg);
            line.push('"');
        } else {
            line.push_str(&arg);
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn command_line_quotes_spaces() {
        let line = command_line(Path::new("ffmpeg"), &["-i", "my clip.mov", "-y"]);
        assert_eq!(line, "ffmpeg -i \"my clip.mov\" -y");
    }

    #[tokio::test]
    async fn missing_binary_is_io_error() {
        let tools = ToolOptions {
            ffmpeg: PathBuf::from("/nonexistent/bin/ffmpeg-missing"),
            ..ToolOptions::default()
        };
        let err = run_ffmpeg(&["-version"], &tools).await.unwrap_err();
        assert!(matches!(err, PreviewError::Io { .. }), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_run_keeps_both_streams_and_status() {
        let tools = ToolOptions {
            ffmpeg: PathBuf::from("sh"),
            ..ToolOptions::default()
        };
        let err = run_ffmpeg(&["-c", "echo out; echo boom >&2; exit 3"], &tools)
            .await
            .unwrap_err();

        match err {
            PreviewError::Encode {
                command,
                status,
                stderr,
                stdout,
            } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "boom");
                assert_eq!(stdout, "out");
                assert!(command.starts_with("sh -c"), "{command}");
            }
            other => panic!("expected an encode failure, got {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdout_is_returned_on_success() {
        let tools = ToolOptions {
            ffmpeg: PathBuf::from("sh"),
            ..ToolOptions::default()
        };
        let out = ffmpeg_stdout(&["-c", "printf frame"], &tools).await.unwrap();
        assert_eq!(out, b"frame");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_process_times_out() {
        let tools = ToolOptions {
            ffmpeg: PathBuf::from("sleep"),
            timeout_secs: 1,
            ..ToolOptions::default()
        };
        let started = std::time::Instant::now();
        let err = run_ffmpeg(&["10"], &tools).await.unwrap_err();

        assert!(
            matches!(err, PreviewError::Timeout { secs: 1, ref program } if program == "sleep"),
            "{err}"
        );
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }
}
