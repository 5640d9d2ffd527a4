use std::sync::OnceLock;

use chrono::DateTime;
use regex::Regex;
use tracing::debug;

use super::types::BlameRecord;
use crate::error::BlameParseError;

/// Decoder states. The decoder is either positioned on a block header or
/// inside a block's metadata; the record under construction travels with the
/// metadata state, and nothing survives past one [`parse_blame_output`]
/// call.
#[derive(Debug)]
enum ParserState {
    ExpectingCommitHeader,
    ExpectingMetadata(PendingRecord),
}

/// The record under construction for the current block. Opened when the
/// header line is consumed, emitted as a [`BlameRecord`] when the content
/// line closes the block.
#[derive(Debug)]
struct PendingRecord {
    line_number: u32,
    commit_hash: String,
    author_name: Option<String>,
    author_time: Option<i64>,
    author_tz: Option<String>,
}

impl PendingRecord {
    fn open(line_number: u32, commit_hash: String) -> Self {
        PendingRecord {
            line_number,
            commit_hash,
            author_name: None,
            author_time: None,
            author_tz: None,
        }
    }
}

/// Parse `git blame --line-porcelain` output into blame records.
///
/// The line-porcelain format repeats the full commit metadata for every
/// source line. Each block looks like:
///
/// ```text
/// <40-char sha> <orig_line> <final_line> [<num_lines>]
/// author <name>
/// author-mail <<email>>
/// author-time <epoch>
/// author-tz <±HHMM>
/// committer <name>
/// committer-mail <<email>>
/// committer-time <epoch>
/// committer-tz <±HHMM>
/// summary <text>
/// previous <sha> <filename>     (only for some blocks)
/// filename <path>
/// \t<line content>
/// ```
///
/// Blocks vary in length (`previous`, `boundary` and friends are optional),
/// so lines are classified by prefix rather than counted. The tab-prefixed
/// content line closes a block; a block that closes before `author`,
/// `author-time` and `author-tz` have all been seen is malformed, as is
/// input that ends mid-block. Unrecognized metadata prefixes are ignored so
/// newer git versions can add fields without breaking the decoder.
///
/// Empty input produces an empty record list.
pub fn parse_blame_output(raw: &str) -> Result<Vec<BlameRecord>, BlameParseError> {
    let lines = split_lines(raw);

    let mut records: Vec<BlameRecord> = Vec::new();
    let mut state = ParserState::ExpectingCommitHeader;

    for (index, line) in lines.iter().enumerate() {
        let position = index + 1;

        state = match state {
            ParserState::ExpectingCommitHeader => {
                let hash = extract_hash(line);
                if hash.is_empty() {
                    return Err(BlameParseError::BadHeader { line: position });
                }
                ParserState::ExpectingMetadata(PendingRecord::open(
                    records.len() as u32 + 1,
                    hash.to_string(),
                ))
            }
            ParserState::ExpectingMetadata(mut block) => {
                if let Some(content) = line.strip_prefix('\t') {
                    records.push(close_block(block, content, position)?);
                    ParserState::ExpectingCommitHeader
                } else {
                    if let Some(rest) = line.strip_prefix("author-time ") {
                        let value = rest.trim();
                        let epoch = value.parse::<i64>().map_err(|_| {
                            BlameParseError::BadTimestamp {
                                line: position,
                                value: value.to_string(),
                            }
                        })?;
                        block.author_time = Some(epoch);
                    } else if let Some(rest) = line.strip_prefix("author-tz ") {
                        let value = rest.trim();
                        if parse_tz_offset(value).is_none() {
                            return Err(BlameParseError::BadOffset {
                                line: position,
                                value: value.to_string(),
                            });
                        }
                        block.author_tz = Some(value.to_string());
                    } else if line.starts_with("author ") {
                        block.author_name = Some(extract_author(line).to_string());
                    }
                    // Everything else (committer*, summary, previous,
                    // filename, boundary, author-mail, future fields) is
                    // consumed and ignored.
                    ParserState::ExpectingMetadata(block)
                }
            }
        };
    }

    if let ParserState::ExpectingMetadata(_) = state {
        return Err(BlameParseError::UnexpectedEof { line: lines.len() });
    }

    debug!(records = records.len(), "decoded blame output");
    Ok(records)
}

/// Finalize a block into an immutable record once its content line is seen.
fn close_block(
    block: PendingRecord,
    content: &str,
    position: usize,
) -> Result<BlameRecord, BlameParseError> {
    let missing = |field| BlameParseError::MissingField {
        line: position,
        field,
    };

    let author_name = block.author_name.ok_or(missing("author"))?;
    let author_time = block.author_time.ok_or(missing("author-time"))?;
    let author_tz = block.author_tz.ok_or(missing("author-tz"))?;

    let author_timestamp = extract_timestamp(author_time, &author_tz).ok_or_else(|| {
        BlameParseError::BadTimestamp {
            line: position,
            value: author_time.to_string(),
        }
    })?;

    Ok(BlameRecord {
        line_number: block.line_number,
        commit_hash: block.commit_hash,
        author_name,
        author_timestamp,
        line_content: content.to_string(),
    })
}

/// Split captured output into lines. Splits on `\n`; when the text ends with
/// a terminator, the resulting empty final entry is an artifact of the
/// terminator, not a data line, and is dropped. No other normalization.
fn split_lines(raw: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = raw.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

/// Extract the commit hash from a block header line: the first
/// whitespace-delimited token. Returns an empty string when the line holds
/// no token at all.
pub fn extract_hash(header_line: &str) -> &str {
    header_line.split_whitespace().next().unwrap_or("")
}

/// Extract the author name from an `author <name>` line: strip the literal
/// `author` prefix and trim the remainder.
pub fn extract_author(author_line: &str) -> &str {
    author_line.strip_prefix("author").unwrap_or(author_line).trim()
}

/// Render an author timestamp from epoch seconds and a `±HHMM` offset.
///
/// The epoch is shifted by the offset and the result is formatted as a
/// calendar date/time in the UTC calendar, with the raw offset appended as a
/// label: epoch `1435738804` with `+1000` becomes
/// `2015-07-01 18:20:04 +1000`. This reproduces the author's local wall
/// clock, not a true timezone conversion.
///
/// Returns `None` when the offset is not `±HHMM` or the shifted epoch is
/// unrepresentable.
pub fn extract_timestamp(epoch_seconds: i64, tz_offset: &str) -> Option<String> {
    let offset_seconds = parse_tz_offset(tz_offset)?;
    let adjusted = epoch_seconds.checked_add(offset_seconds)?;
    let wall_clock = DateTime::from_timestamp(adjusted, 0)?;
    Some(format!(
        "{} {}",
        wall_clock.format("%Y-%m-%d %H:%M:%S"),
        tz_offset
    ))
}

/// Parse a `±HHMM` offset into seconds east of UTC. `+1000` is 36000,
/// `-0230` is -9000.
fn parse_tz_offset(offset: &str) -> Option<i64> {
    static OFFSET_RE: OnceLock<Regex> = OnceLock::new();
    let re = OFFSET_RE
        .get_or_init(|| Regex::new(r"^([+-])(\d{2})(\d{2})$").expect("offset pattern compiles"));

    let caps = re.captures(offset)?;
    let sign = if &caps[1] == "-" { -1 } else { 1 };
    let hours: i64 = caps[2].parse().ok()?;
    let minutes: i64 = caps[3].parse().ok()?;

    Some(sign * (hours * 3600 + minutes * 60))
}
