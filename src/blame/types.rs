use serde::{Deserialize, Serialize};

/// Attribution for a single line of a blamed file, decoded from one
/// `git blame --line-porcelain` block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlameRecord {
    /// 1-based line number in the blamed revision of the file.
    pub line_number: u32,
    /// Hash of the commit that last touched this line. Usually 40 hex
    /// characters, but may be abbreviated depending on git configuration.
    pub commit_hash: String,
    /// Author name recorded on that commit.
    pub author_name: String,
    /// Author time as `YYYY-MM-DD HH:MM:SS ±HHMM`: the author's local wall
    /// clock, with the recorded UTC offset appended as a label.
    pub author_timestamp: String,
    /// The line's text, without the leading tab. Empty for blank lines.
    pub line_content: String,
}
