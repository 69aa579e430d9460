//! Lua Lexer
//!
//! Tokenizes Lua source text into a stream of tokens: identifiers,
//! numbers, strings, keywords, operators, and punctuation, each carrying
//! its byte span and line/column. Whitespace and `--` line comments are
//! skipped. Scanning never fails: characters that cannot start a token
//! are reported as diagnostics and skipped.
//!
//! # Example
//!
//! ```
//! use luachunk_lexer::Scanner;
//!
//! let out = Scanner::tokenize("-- nothing but a comment\n");
//! assert_eq!(out.tokens.len(), 1); // just Eof
//! assert!(out.diagnostics.is_empty());
//! ```

pub mod scanner;
pub mod token;

pub use scanner::{ScanOutput, Scanner};
pub use token::{Span, Token, TokenKind};

/// Non-fatal report for a character that cannot start any token.
///
/// The scanner skips the character and keeps going; the diagnostic is
/// printed to stderr and collected into [`ScanOutput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal character '{ch}' at line {line}, column {column}")]
pub struct LexDiagnostic {
    pub ch: char,
    pub line: usize,
    pub column: usize,
}
