use std::collections::BTreeMap;

/// Configuration applied to every git invocation.
///
/// Mirrors what `git -c key=value` accepts on the command line, plus an
/// override for the binary itself. Entries are rendered in sorted key order
/// so the assembled command line is deterministic.
///
/// ```
/// use blameline::GitConfig;
///
/// let mut config = GitConfig::new();
/// config
///     .set_binary("/usr/local/bin/git")
///     .set("user.name", "CI Bot")
///     .set("user.email", "ci@example.com");
/// ```
#[derive(Debug, Clone)]
pub struct GitConfig {
    binary: String,
    entries: BTreeMap<String, String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            binary: "git".to_string(),
            entries: BTreeMap::new(),
        }
    }
}

impl GitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the git binary (name or path). Defaults to `git`.
    pub fn set_binary(&mut self, binary: impl Into<String>) -> &mut Self {
        self.binary = binary.into();
        self
    }

    /// Set a `section.key=value` pair passed as `-c` on every invocation.
    /// Setting the same key again replaces the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// The `-c key=value` argument pairs, in sorted key order.
    pub(crate) fn config_args(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(key, value)| ["-c".to_string(), format!("{key}={value}")])
            .collect()
    }
}
