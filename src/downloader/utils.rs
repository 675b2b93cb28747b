// Helper functions for running yt-dlp

use std::process::Stdio;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};

use crate::downloader::models::NetworkConfig;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("Timed out after {0}s")]
    Timeout(u64),
    #[error("Process I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Reader task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn spawn_piped(program: &str, args: &[String]) -> Result<tokio::process::Child, ProcessError> {
    TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program.to_string(),
            source,
        })
}

/// Run command with timeout, collecting stdout and stderr
pub async fn run_output_with_timeout(
    program: &str,
    args: Vec<String>,
    timeout_secs: u64,
) -> Result<std::process::Output, ProcessError> {
    let mut child = spawn_piped(program, &args)?;

    let mut stdout_pipe = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
    let mut stderr_pipe = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    match timeout(Duration::from_secs(timeout_secs), child.wait()).await {
        Ok(status) => {
            let status = status?;
            let stdout = stdout_task.await??;
            let stderr = stderr_task.await??;
            Ok(std::process::Output { status, stdout, stderr })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(ProcessError::Timeout(timeout_secs))
        }
    }
}

/// Outcome of a streamed run: exit status and collected stderr.
#[derive(Debug)]
pub struct StreamedRun {
    pub success: bool,
    pub stderr: String,
}

/// Run command with timeout, handing every stdout line to `on_line` as it arrives.
pub async fn run_streaming_with_timeout<F>(
    program: &str,
    args: Vec<String>,
    timeout_secs: u64,
    mut on_line: F,
) -> Result<StreamedRun, ProcessError>
where
    F: FnMut(&str) + Send,
{
    let mut child = spawn_piped(program, &args)?;

    let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
    let mut stderr_pipe = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    let pump = async {
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            on_line(&line);
        }
        child.wait().await
    };

    match timeout(Duration::from_secs(timeout_secs), pump).await {
        Ok(status) => {
            let status = status?;
            let stderr = stderr_task.await??;
            Ok(StreamedRun {
                success: status.success(),
                stderr: String::from_utf8_lossy(&stderr).to_string(),
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            stderr_task.abort();
            Err(ProcessError::Timeout(timeout_secs))
        }
    }
}

fn missing_pipe(name: &str) -> ProcessError {
    ProcessError::Io(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        format!("Failed to capture {}", name),
    ))
}

/// Build proxy, cookie, certificate and timeout arguments for yt-dlp
pub fn network_args(config: &NetworkConfig) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(timeout) = config.socket_timeout {
        args.push("--socket-timeout".to_string());
        args.push(timeout.to_string());
    }

    if config.skip_cert_check {
        args.push("--no-check-certificates".to_string());
    }

    if let Some(proxy) = &config.proxy {
        args.push("--proxy".to_string());
        args.push(proxy.clone());
    }

    // A cookies file beats browser cookies
    if let Some(path) = &config.cookies_path {
        args.push("--cookies".to_string());
        args.push(path.clone());
    } else if let Some(browser) = &config.cookies_from_browser {
        args.push("--cookies-from-browser".to_string());
        args.push(browser.clone());
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_args_prefer_cookie_file() {
        let config = NetworkConfig {
            proxy: Some("socks5://127.0.0.1:1080".to_string()),
            cookies_path: Some("/tmp/cookies.txt".to_string()),
            cookies_from_browser: Some("chrome".to_string()),
            skip_cert_check: true,
            socket_timeout: Some(15),
        };
        assert_eq!(
            network_args(&config),
            vec![
                "--socket-timeout",
                "15",
                "--no-check-certificates",
                "--proxy",
                "socks5://127.0.0.1:1080",
                "--cookies",
                "/tmp/cookies.txt",
            ]
        );
    }

    #[test]
    fn default_network_config_adds_nothing() {
        assert!(network_args(&NetworkConfig::default()).is_empty());
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = run_output_with_timeout("/no/such/yt-dlp", vec![], 5).await.unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn streaming_delivers_each_line() {
        let mut seen = Vec::new();
        let run = run_streaming_with_timeout(
            "sh",
            vec!["-c".to_string(), "echo one; echo two; echo oops >&2".to_string()],
            10,
            |line| seen.push(line.to_string()),
        )
        .await
        .unwrap();
        assert!(run.success);
        assert_eq!(seen, vec!["one", "two"]);
        assert_eq!(run.stderr.trim(), "oops");
    }
}
