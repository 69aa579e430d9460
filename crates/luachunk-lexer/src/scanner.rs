use crate::token::{Span, Token, TokenKind};
use crate::LexDiagnostic;

/// Result of scanning a source string: the full token stream plus any
/// non-fatal diagnostics encountered along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutput {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<LexDiagnostic>,
}

/// Lua source scanner.
///
/// Walks the raw bytes of the source in a single pass, skipping
/// whitespace and `--` line comments, and produces tokens with byte
/// spans suitable for slicing the original text. The scanner is
/// lenient: it never aborts, reporting unrecognized characters as
/// diagnostics and stepping past them.
pub struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    diagnostics: Vec<LexDiagnostic>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the entire source.
    ///
    /// The returned token vector always ends with exactly one
    /// [`TokenKind::Eof`] token.
    pub fn tokenize(source: &str) -> ScanOutput {
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens();
        ScanOutput {
            tokens: scanner.tokens,
            diagnostics: scanner.diagnostics,
        }
    }

    /// Scan all tokens from the source.
    fn scan_tokens(&mut self) {
        while !self.is_at_end() {
            self.scan_token();
        }

        let span = Span::new(self.pos, self.pos, self.line, self.column);
        self.tokens.push(Token::new(TokenKind::Eof, span));
    }

    /// Scan the next token. Multi-character operators are matched before
    /// their single-character prefixes.
    fn scan_token(&mut self) {
        let ch = self.peek();

        match ch {
            // Whitespace (skip)
            b' ' | b'\t' => self.advance(),

            // Newlines advance the line counter without emitting tokens.
            b'\n' | b'\r' => self.scan_newline(),

            // Comments: `--` through end of line, discarded entirely.
            b'-' if self.peek_next() == b'-' => self.scan_comment(),

            // Strings
            b'\'' | b'"' => self.scan_string(),

            // Numbers, including the leading-dot form `.5`
            b'0'..=b'9' => self.scan_number(),
            b'.' if self.peek_next().is_ascii_digit() => self.scan_number(),

            // Multi-character operators
            b'.' if self.peek_next() == b'.' => {
                if self.peek_at(2) == b'.' {
                    self.emit_op(TokenKind::Ellipsis, 3);
                } else {
                    self.emit_op(TokenKind::Concat, 2);
                }
            }
            b'<' if self.peek_next() == b'=' => self.emit_op(TokenKind::LessEq, 2),
            b'>' if self.peek_next() == b'=' => self.emit_op(TokenKind::GreaterEq, 2),
            b'~' if self.peek_next() == b'=' => self.emit_op(TokenKind::NotEq, 2),
            b'=' if self.peek_next() == b'=' => self.emit_op(TokenKind::EqEq, 2),

            // Single-character operators
            b'+' => self.emit_op(TokenKind::Plus, 1),
            b'-' => self.emit_op(TokenKind::Minus, 1),
            b'*' => self.emit_op(TokenKind::Star, 1),
            b'/' => self.emit_op(TokenKind::Slash, 1),
            b'%' => self.emit_op(TokenKind::Percent, 1),
            b'^' => self.emit_op(TokenKind::Caret, 1),
            b'#' => self.emit_op(TokenKind::Hash, 1),
            b'<' => self.emit_op(TokenKind::Less, 1),
            b'>' => self.emit_op(TokenKind::Greater, 1),
            b'=' => self.emit_op(TokenKind::Assign, 1),

            // Punctuation
            b'{' => self.emit_op(TokenKind::LBrace, 1),
            b'}' => self.emit_op(TokenKind::RBrace, 1),
            b'[' => self.emit_op(TokenKind::LBracket, 1),
            b']' => self.emit_op(TokenKind::RBracket, 1),
            b'(' => self.emit_op(TokenKind::LParen, 1),
            b')' => self.emit_op(TokenKind::RParen, 1),
            b';' => self.emit_op(TokenKind::Semi, 1),
            b':' => self.emit_op(TokenKind::Colon, 1),
            b',' => self.emit_op(TokenKind::Comma, 1),
            b'.' => self.emit_op(TokenKind::Dot, 1),

            // Identifiers and keywords
            c if c == b'_' || c.is_ascii_alphabetic() => self.scan_identifier(),

            // A lone `~` lands here too.
            _ => self.illegal_character(),
        }
    }

    // --- Scanners ---

    /// Fold `\n`, `\r`, and `\r\n` into one line advance.
    fn scan_newline(&mut self) {
        if self.peek() == b'\r' {
            self.pos += 1;
            if self.peek() == b'\n' {
                self.pos += 1;
            }
        } else {
            self.pos += 1;
        }
        self.line += 1;
        self.column = 1;
    }

    /// Skip a `--` comment up to (not including) the line break.
    fn scan_comment(&mut self) {
        self.advance();
        self.advance();
        while !self.is_at_end() && self.peek() != b'\n' && self.peek() != b'\r' {
            self.pos += 1;
        }
    }

    /// Scan a quoted string literal. The token keeps the raw matched
    /// text, quotes included. A backslash escapes the following
    /// character, whatever it is.
    ///
    /// When no closing quote exists, the opening quote itself becomes a
    /// punctuation token and scanning resumes right after it.
    fn scan_string(&mut self) {
        let quote = self.peek();
        let start = self.pos;
        let (line, column) = (self.line, self.column);

        let mut i = self.pos + 1;
        loop {
            match self.bytes.get(i).copied() {
                None => {
                    let kind = if quote == b'\'' {
                        TokenKind::SingleQuote
                    } else {
                        TokenKind::DoubleQuote
                    };
                    self.emit_op(kind, 1);
                    return;
                }
                Some(b'\\') => i += 2,
                Some(b) if b == quote => {
                    i += 1;
                    break;
                }
                Some(_) => i += 1,
            }
        }

        let text = self.source[start..i].to_string();
        let newlines = text.bytes().filter(|&b| b == b'\n').count();
        self.pos = i;
        if newlines > 0 {
            self.line += newlines;
            // Column restarts after the literal's last line break.
            let after_break = text.rfind('\n').map_or(0, |idx| text.len() - idx - 1);
            self.column = after_break + 1;
        } else {
            self.column += text.len();
        }

        let span = Span::new(start, i, line, column);
        self.tokens.push(Token::new(TokenKind::Str(text), span));
    }

    /// Scan a number literal. A fractional part requires at least one
    /// digit after the dot, so `4.` is the integer `4` followed by `.`,
    /// while `.5` is a float.
    fn scan_number(&mut self) {
        let start = self.pos;
        let (line, column) = (self.line, self.column);

        while self.peek().is_ascii_digit() {
            self.advance();
        }
        let mut is_float = false;
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
            is_float = true;
        }

        let text = &self.source[start..self.pos];
        let kind = if is_float {
            TokenKind::Float(text.parse().unwrap_or(f64::NAN))
        } else {
            match text.parse::<i64>() {
                Ok(value) => TokenKind::Int(value),
                // Digit runs past the i64 range still have to lex.
                Err(_) => TokenKind::Float(text.parse().unwrap_or(f64::INFINITY)),
            }
        };
        self.push_token(kind, start, line, column);
    }

    /// Scan an identifier, retagging reserved words to their keyword kind.
    fn scan_identifier(&mut self) {
        let start = self.pos;
        let (line, column) = (self.line, self.column);

        self.advance();
        while self.peek() == b'_' || self.peek().is_ascii_alphanumeric() {
            self.advance();
        }

        let kind = Self::keyword_or_ident(&self.source[start..self.pos]);
        self.push_token(kind, start, line, column);
    }

    /// Report a character no token can start with, then step past it and
    /// keep scanning.
    fn illegal_character(&mut self) {
        let ch = self.source[self.pos..].chars().next().unwrap_or('\u{FFFD}');
        let diag = LexDiagnostic {
            ch,
            line: self.line,
            column: self.column,
        };
        eprintln!("{diag}");
        self.diagnostics.push(diag);
        self.pos += ch.len_utf8();
        self.column += 1;
    }

    // --- Keyword detection ---

    /// Determine if an identifier is a reserved word or remains an
    /// identifier.
    fn keyword_or_ident(ident: &str) -> TokenKind {
        match ident {
            "nil" => TokenKind::Nil,
            "return" => TokenKind::Return,
            "do" => TokenKind::Do,
            "end" => TokenKind::End,
            "false" => TokenKind::False,
            "true" => TokenKind::True,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "while" => TokenKind::While,
            "break" => TokenKind::Break,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "elseif" => TokenKind::ElseIf,
            "local" => TokenKind::Local,
            "function" => TokenKind::Function,
            "repeat" => TokenKind::Repeat,
            "until" => TokenKind::Until,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            _ => TokenKind::Identifier(ident.to_string()),
        }
    }

    // --- Helpers ---

    /// Emit an operator/punctuation token of `len` ASCII bytes starting
    /// at the cursor.
    fn emit_op(&mut self, kind: TokenKind, len: usize) {
        let span = Span::new(self.pos, self.pos + len, self.line, self.column);
        self.tokens.push(Token::new(kind, span));
        self.pos += len;
        self.column += len;
    }

    fn push_token(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) {
        let span = Span::new(start, self.pos, line, column);
        self.tokens.push(Token::new(kind, span));
    }

    fn peek(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    fn peek_next(&self) -> u8 {
        self.bytes.get(self.pos + 1).copied().unwrap_or(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
            self.column += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}
