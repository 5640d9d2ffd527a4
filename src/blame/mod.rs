pub mod parser;
pub mod types;

pub use parser::{extract_author, extract_hash, extract_timestamp, parse_blame_output};
pub use types::BlameRecord;
