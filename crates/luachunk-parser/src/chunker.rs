//! Splits source text along statement markers.
//!
//! Boundaries are the statement start offsets: each chunk runs from its
//! statement's first byte to the next statement's first byte, so the
//! whitespace and comments that follow a statement travel with it. The
//! stored text is right-trimmed; the raw span is kept so the original
//! source can be reassembled exactly.

use crate::parser::Marker;

/// A contiguous slice of the original source covering one top-level
/// statement. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Statement text with trailing whitespace removed.
    pub text: String,
    /// First line of the chunk, 1-based.
    pub start_line: usize,
    /// Last line covered by the trimmed text, inclusive.
    pub end_line: usize,
    /// Byte offset where the untrimmed span begins.
    pub start: usize,
    /// Byte offset one past the untrimmed span: the next chunk's
    /// `start`, or the source length for the final chunk.
    pub end: usize,
}

/// Split `source` into one chunk per marker.
///
/// The first chunk is anchored at offset 0 / line 1 so leading blank
/// lines and comments are never dropped; the final chunk runs to end of
/// input and absorbs any dangling trailing content. Concatenating
/// `source[chunk.start..chunk.end]` over all chunks reproduces `source`
/// exactly.
pub fn chunks(source: &str, markers: &[Marker]) -> Vec<Chunk> {
    let mut out = Vec::with_capacity(markers.len());
    for (i, marker) in markers.iter().enumerate() {
        let (start, start_line) = if i == 0 {
            (0, 1)
        } else {
            (marker.offset, marker.line)
        };
        let end = markers.get(i + 1).map_or(source.len(), |next| next.offset);
        out.push(make_chunk(source, start, end, start_line));
    }
    out
}

fn make_chunk(source: &str, start: usize, end: usize, start_line: usize) -> Chunk {
    let text = source[start..end].trim_end();
    let end_line = start_line + text.bytes().filter(|&b| b == b'\n').count();
    Chunk {
        text: text.to_string(),
        start_line,
        end_line,
        start,
        end,
    }
}

#[cfg(test)]
mod tests {
    use crate::chunk_source;
    use pretty_assertions::assert_eq;

    /// Helper: chunk a source string that must parse.
    fn chunks_of(source: &str) -> Vec<crate::Chunk> {
        chunk_source(source, "test.lua").expect("chunking failed")
    }

    /// Helper: assert the untrimmed spans tile the source exactly.
    fn assert_reconstructs(source: &str) {
        let chunks = chunks_of(source);
        let rebuilt: String = chunks
            .iter()
            .map(|c| &source[c.start..c.end])
            .collect();
        assert_eq!(
            rebuilt, source,
            "untrimmed spans must reproduce the source"
        );
    }

    // =========================================================================
    // Statement counts and texts
    // =========================================================================

    #[test]
    fn test_three_statement_example() {
        let chunks = chunks_of("local x = 1\nlocal y = 2\nreturn x+y");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "local x = 1");
        assert_eq!(chunks[1].text, "local y = 2");
        assert_eq!(chunks[2].text, "return x+y");
    }

    #[test]
    fn test_return_only_program() {
        let chunks = chunks_of("return");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "return");
    }

    #[test]
    fn test_single_statement() {
        let chunks = chunks_of("x = 1");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "x = 1");
        assert_eq!((chunks[0].start, chunks[0].end), (0, 5));
    }

    #[test]
    fn test_multiline_statement_stays_one_chunk() {
        let source = "local f = function()\n  return 1\nend\nx = 2";
        let chunks = chunks_of(source);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "local f = function()\n  return 1\nend");
        assert_eq!(chunks[1].text, "x = 2");
    }

    #[test]
    fn test_trailing_comment_stays_in_preceding_chunk() {
        let chunks = chunks_of("x = 1 -- set x\ny = 2");
        assert_eq!(chunks[0].text, "x = 1 -- set x");
        assert_eq!(chunks[1].text, "y = 2");
    }

    // =========================================================================
    // Line ranges
    // =========================================================================

    #[test]
    fn test_line_ranges() {
        let chunks = chunks_of("local x = 1\nlocal y = 2\nreturn x+y");
        assert_eq!((chunks[0].start_line, chunks[0].end_line), (1, 1));
        assert_eq!((chunks[1].start_line, chunks[1].end_line), (2, 2));
        assert_eq!((chunks[2].start_line, chunks[2].end_line), (3, 3));
    }

    #[test]
    fn test_multiline_chunk_line_range() {
        let chunks = chunks_of("while x do\n  x = x - 1\nend\ny = 2");
        assert_eq!((chunks[0].start_line, chunks[0].end_line), (1, 3));
        assert_eq!((chunks[1].start_line, chunks[1].end_line), (4, 4));
    }

    #[test]
    fn test_blank_lines_between_statements() {
        let chunks = chunks_of("x = 1\n\n\ny = 2");
        // The blank lines live in the first chunk's raw span but not in
        // its trimmed text or line range.
        assert_eq!(chunks[0].text, "x = 1");
        assert_eq!((chunks[0].start_line, chunks[0].end_line), (1, 1));
        assert_eq!((chunks[1].start_line, chunks[1].end_line), (4, 4));
    }

    #[test]
    fn test_leading_comment_joins_first_chunk() {
        let source = "-- header\nx = 1";
        let chunks = chunks_of(source);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "-- header\nx = 1");
        assert_eq!((chunks[0].start_line, chunks[0].end_line), (1, 2));
    }

    // =========================================================================
    // Span arithmetic
    // =========================================================================

    #[test]
    fn test_spans_are_adjacent() {
        let source = "a = 1\nb = 2\nc = 3\nreturn a + b + c\n";
        let chunks = chunks_of(source);
        assert_eq!(chunks[0].start, 0);
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(chunks.last().unwrap().end, source.len());
    }

    #[test]
    fn test_trimmed_text_matches_span_prefix() {
        let source = "x = 1\ny = 2\n";
        for chunk in chunks_of(source) {
            assert_eq!(chunk.text, source[chunk.start..chunk.end].trim_end());
        }
    }

    #[test]
    fn test_trailing_whitespace_absorbed_by_final_chunk() {
        let source = "x = 1\n\n   \n";
        let chunks = chunks_of(source);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "x = 1");
        assert_eq!(chunks[0].end, source.len());
    }

    // =========================================================================
    // Reconstruction law
    // =========================================================================

    #[test]
    fn test_reconstruction() {
        assert_reconstructs("x = 1");
        assert_reconstructs("local x = 1\nlocal y = 2\nreturn x+y");
        assert_reconstructs("x = 1\n\n\ny = 2\n\n");
        assert_reconstructs("-- header\nx = 1 -- trailer\ny = 2\n-- footer\n");
        assert_reconstructs("return");
        assert_reconstructs(
            "local function fib(n)\n  if n < 2 then return n end\n  \
             return fib(n-1) + fib(n-2)\nend\nprint(fib(10))\n",
        );
        assert_reconstructs("for i = 1, 10 do\n\tprint(i)\nend\t\n");
        assert_reconstructs("t = { 1, 2; x = 3 }; u = t\nreturn u");
    }

    // =========================================================================
    // Failure is all-or-nothing
    // =========================================================================

    #[test]
    fn test_syntax_error_yields_no_chunks() {
        let err = chunk_source("local x = ", "bad.lua").unwrap_err();
        assert_eq!(err.filename, "bad.lua");
        assert_eq!(err.line, None);
    }

    #[test]
    fn test_error_after_valid_statements_yields_no_chunks() {
        assert!(chunk_source("x = 1\ny = ", "bad.lua").is_err());
    }
}
