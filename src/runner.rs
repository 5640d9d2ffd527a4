use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::GitConfig;
use crate::error::GitError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run the configured git binary and capture its stdout.
///
/// The child runs with the given working directory and a hard deadline: if
/// it has not exited within `timeout` it is killed and `GitError::Timeout`
/// is returned. A non-zero exit becomes `GitError::Process` carrying the
/// exit code and captured stderr. Stdout must decode as UTF-8.
pub(crate) fn run_git(
    config: &GitConfig,
    directory: &Path,
    timeout: Duration,
    args: &[&str],
) -> Result<String, GitError> {
    let config_args = config.config_args();
    let command_line = render_command_line(config.binary(), &config_args, args);
    debug!(command = %command_line, directory = %directory.display(), "running git");

    let mut child = Command::new(config.binary())
        .args(&config_args)
        .args(args)
        .current_dir(directory)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| GitError::Io {
            command: command_line.clone(),
            source,
        })?;

    // Drain both pipes off-thread; a child that fills a pipe buffer would
    // otherwise never exit and turn every large output into a timeout.
    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let status = wait_with_deadline(&mut child, timeout, &command_line)?;

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    if !status.success() {
        return Err(GitError::Process {
            command: command_line,
            exit_code: status.code(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        });
    }

    String::from_utf8(stdout).map_err(|source| GitError::Output {
        command: command_line,
        source,
    })
}

fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
    command_line: &str,
) -> Result<std::process::ExitStatus, GitError> {
    let deadline = Instant::now() + timeout;

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(GitError::Timeout {
                        command: command_line.to_string(),
                        timeout,
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                return Err(GitError::Io {
                    command: command_line.to_string(),
                    source,
                })
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// The command line as attempted, for error messages and logs.
fn render_command_line(binary: &str, config_args: &[String], args: &[&str]) -> String {
    let mut rendered = String::from(binary);
    for arg in config_args.iter().map(String::as_str).chain(args.iter().copied()) {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}
