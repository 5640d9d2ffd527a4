//! Run `git blame` and decode its line-porcelain output into per-line
//! attribution records.
//!
//! The crate wraps the git binary rather than reimplementing blame: [`Git`]
//! spawns `git blame --line-porcelain` in a repository directory, enforces a
//! timeout, and hands the captured output to the decoder in [`blame`], which
//! turns it into one [`BlameRecord`] per source line. The decoder is also
//! usable on its own via [`parse_blame_output`] when the output text has
//! already been captured elsewhere.
//!
//! ```no_run
//! use blameline::Git;
//!
//! # fn main() -> Result<(), blameline::GitError> {
//! let mut git = Git::new();
//! git.set_repository("/path/to/repo");
//! for record in git.blame("src/main.rs", None)? {
//!     println!(
//!         "{:>4} {} {} {}",
//!         record.line_number, record.commit_hash, record.author_name, record.line_content
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod blame;
pub mod config;
pub mod error;
mod runner;

pub use blame::parser::parse_blame_output;
pub use blame::types::BlameRecord;
pub use config::GitConfig;
pub use error::{BlameParseError, GitError};

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Entry point for invoking git against a repository.
///
/// Holds the pieces every invocation needs: the binary/config pair, the
/// repository directory, and the execution timeout. Defaults are the `git`
/// on `PATH`, the current directory, and 60 seconds.
#[derive(Debug, Clone)]
pub struct Git {
    config: GitConfig,
    directory: PathBuf,
    timeout: Duration,
}

impl Default for Git {
    fn default() -> Self {
        Git::with_config(GitConfig::new())
    }
}

impl Git {
    pub fn new() -> Self {
        Git::default()
    }

    pub fn with_config(config: GitConfig) -> Self {
        Git {
            config,
            directory: PathBuf::from("."),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the repository directory invocations run in.
    pub fn set_repository(&mut self, directory: impl Into<PathBuf>) -> &mut Self {
        self.directory = directory.into();
        self
    }

    /// Set the execution timeout for a single invocation.
    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Attribute every line of `file` to the commit and author that last
    /// changed it, optionally as of `revision` instead of the working tree.
    ///
    /// Runs `git blame --line-porcelain [<revision>] -- <file>` and decodes
    /// the output. Records come back in file order, numbered from 1.
    pub fn blame(
        &self,
        file: impl AsRef<Path>,
        revision: Option<&str>,
    ) -> Result<Vec<BlameRecord>, GitError> {
        let file = file.as_ref();
        let file_arg = file.to_string_lossy();

        let mut args = vec!["blame", "--line-porcelain"];
        if let Some(revision) = revision {
            args.push(revision);
        }
        args.push("--");
        args.push(file_arg.as_ref());

        let output = runner::run_git(&self.config, &self.directory, self.timeout, &args)?;
        let records = parse_blame_output(&output)?;
        debug!(
            file = %file.display(),
            records = records.len(),
            "blamed file"
        );
        Ok(records)
    }

    /// The installed git version, e.g. `git version 2.43.0`.
    pub fn version(&self) -> Result<String, GitError> {
        let output = runner::run_git(&self.config, &self.directory, self.timeout, &["--version"])?;
        Ok(output.trim_end().to_string())
    }
}
