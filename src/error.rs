use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by git invocations.
///
/// `Process` is the interesting one for callers: it carries the rendered
/// command line, the exit code, and whatever git wrote to stderr, so the
/// failure can be shown to a user verbatim.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GitError {
    #[error("failed to run `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}: {stderr}", display_exit_code(.exit_code))]
    Process {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("`{command}` did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("output of `{command}` is not valid UTF-8")]
    Output {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error(transparent)]
    Blame(#[from] BlameParseError),
}

/// Errors raised while decoding `git blame --line-porcelain` output.
///
/// `line` is the 1-based index into the captured output at which decoding
/// failed. A malformed block invalidates the whole parse; no partial record
/// sequence is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BlameParseError {
    #[error("line {line}: content line reached before `{field}` was seen")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: blame output ended inside an unfinished block")]
    UnexpectedEof { line: usize },

    #[error("line {line}: expected a block header, got an empty line")]
    BadHeader { line: usize },

    #[error("line {line}: invalid author timestamp {value:?}")]
    BadTimestamp { line: usize, value: String },

    #[error("line {line}: invalid timezone offset {value:?}")]
    BadOffset { line: usize, value: String },
}

fn display_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status".to_string(),
    }
}
