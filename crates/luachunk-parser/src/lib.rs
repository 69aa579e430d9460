//! Lua Statement Recognizer and Chunker
//!
//! Parses a token stream against a statement-level Lua grammar without
//! building a syntax tree: the only output of a successful parse is one
//! position marker per top-level statement. The chunker then slices the
//! original source along those markers into statement-aligned chunks
//! whose untrimmed spans concatenate back to the source byte-for-byte.
//!
//! # Example
//!
//! ```
//! use luachunk_parser::chunk_source;
//!
//! let chunks = chunk_source("local x = 1\nreturn x", "demo.lua").unwrap();
//! assert_eq!(chunks.len(), 2);
//! assert_eq!(chunks[0].text, "local x = 1");
//! assert_eq!(chunks[1].text, "return x");
//! ```

pub mod chunker;
pub mod parser;

pub use chunker::{chunks, Chunk};
pub use parser::{Marker, Parser};

/// Fatal grammar error with the offending token's position.
///
/// `line` is `None` when the parse failed with no token left to blame,
/// i.e. at end of input. The first such error aborts chunk production;
/// there is no partial result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{filename}: syntax error {}", location(.line))]
pub struct SyntaxError {
    pub filename: String,
    pub line: Option<usize>,
}

fn location(line: &Option<usize>) -> String {
    match line {
        Some(l) => format!("at line {l}"),
        None => "at end of input".to_string(),
    }
}

/// Tokenize, parse, and chunk a Lua source string in one step.
///
/// This is the primary entry point: on success every byte of `source`
/// is accounted for by exactly one chunk's untrimmed span. Lexical
/// diagnostics do not abort; the first grammar failure does.
pub fn chunk_source(source: &str, filename: &str) -> Result<Vec<Chunk>, SyntaxError> {
    let markers = Parser::parse(source, filename)?;
    Ok(chunker::chunks(source, &markers))
}
