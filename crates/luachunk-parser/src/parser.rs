//! Statement-level grammar recognizer for Lua.
//!
//! Recursive descent over the scanner's token stream. Every production
//! discards its children; the only thing recorded is a [`Marker`] per
//! completed top-level statement (plus one for a trailing `return` or
//! `break`). Expression structure is recognized just far enough to find
//! statement boundaries.

use crate::SyntaxError;
use luachunk_lexer::{Scanner, Span, Token, TokenKind};

/// Position of a top-level statement's first token, recorded when the
/// statement production completes. Markers come out in source order
/// with strictly increasing offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    /// 1-based line of the statement's first token.
    pub line: usize,
    /// Byte offset of the statement's first token.
    pub offset: usize,
}

/// What a suffixed prefix-expression turned out to be. Decides whether
/// it can stand as a statement (call) or be assigned to (var).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    Var,
    Call,
    Paren,
}

/// Lua statement parser.
///
/// Single-use: one token stream in, one marker list or one error out.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    filename: String,
}

impl Parser {
    /// Create a new parser for the given tokens.
    pub fn new(tokens: Vec<Token>, filename: &str) -> Self {
        Self {
            tokens,
            pos: 0,
            filename: filename.to_string(),
        }
    }

    /// Tokenize and parse a source string into top-level statement
    /// markers. Lexical diagnostics are reported by the scanner and do
    /// not abort; the first grammar failure does.
    pub fn parse(source: &str, filename: &str) -> Result<Vec<Marker>, SyntaxError> {
        let output = Scanner::tokenize(source);
        let mut parser = Parser::new(output.tokens, filename);
        parser.parse_program()
    }

    /// Parse one whole source: a block followed by end of input.
    fn parse_program(&mut self) -> Result<Vec<Marker>, SyntaxError> {
        let markers = self.block()?;
        if self.peek().kind != TokenKind::Eof {
            return Err(self.unexpected());
        }
        Ok(markers)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// block ::= stat [';'] {stat [';']} [laststat [';']]
    ///         | laststat [';']
    ///
    /// A block with no statement at all is rejected, so `do end` and the
    /// empty source are syntax errors. Nested callers drop the returned
    /// markers; only the top-level list survives.
    fn block(&mut self) -> Result<Vec<Marker>, SyntaxError> {
        let mut markers = Vec::new();
        loop {
            match &self.peek().kind {
                TokenKind::Return => {
                    markers.push(self.marker());
                    self.advance();
                    if Self::starts_expression(&self.peek().kind) {
                        self.explist()?;
                    }
                    self.eat(&TokenKind::Semi);
                    break;
                }
                TokenKind::Break => {
                    markers.push(self.marker());
                    self.advance();
                    self.eat(&TokenKind::Semi);
                    break;
                }
                TokenKind::End
                | TokenKind::Until
                | TokenKind::Else
                | TokenKind::ElseIf
                | TokenKind::Eof => break,
                _ => {
                    markers.push(self.statement()?);
                    self.eat(&TokenKind::Semi);
                }
            }
        }
        if markers.is_empty() {
            return Err(self.unexpected());
        }
        Ok(markers)
    }

    /// stat ::= varlist '=' explist | functioncall | do block end
    ///        | while exp do block end | repeat block until exp
    ///        | if exp then block {elseif exp then block} [else block] end
    ///        | for Name '=' exp ',' exp [',' exp] do block end
    ///        | for namelist in explist do block end
    ///        | function funcname funcbody | local function Name funcbody
    ///        | local namelist ['=' explist]
    fn statement(&mut self) -> Result<Marker, SyntaxError> {
        let marker = self.marker();
        match &self.peek().kind {
            TokenKind::Do => {
                self.advance();
                self.block()?;
                self.expect(&TokenKind::End)?;
            }
            TokenKind::While => {
                self.advance();
                self.expression()?;
                self.expect(&TokenKind::Do)?;
                self.block()?;
                self.expect(&TokenKind::End)?;
            }
            TokenKind::Repeat => {
                self.advance();
                self.block()?;
                self.expect(&TokenKind::Until)?;
                self.expression()?;
            }
            TokenKind::If => self.if_statement()?,
            TokenKind::For => self.for_statement()?,
            TokenKind::Function => {
                self.advance();
                self.funcname()?;
                self.funcbody()?;
            }
            TokenKind::Local => self.local_statement()?,
            _ => self.expr_statement()?,
        }
        Ok(marker)
    }

    fn if_statement(&mut self) -> Result<(), SyntaxError> {
        self.advance();
        self.expression()?;
        self.expect(&TokenKind::Then)?;
        self.block()?;
        while self.eat(&TokenKind::ElseIf) {
            self.expression()?;
            self.expect(&TokenKind::Then)?;
            self.block()?;
        }
        if self.eat(&TokenKind::Else) {
            self.block()?;
        }
        self.expect(&TokenKind::End)
    }

    fn for_statement(&mut self) -> Result<(), SyntaxError> {
        self.advance();
        self.name()?;
        if self.eat(&TokenKind::Assign) {
            // Numeric: for Name = start, limit [, step]
            self.expression()?;
            self.expect(&TokenKind::Comma)?;
            self.expression()?;
            if self.eat(&TokenKind::Comma) {
                self.expression()?;
            }
        } else {
            // Generic: for namelist in explist
            while self.eat(&TokenKind::Comma) {
                self.name()?;
            }
            self.expect(&TokenKind::In)?;
            self.explist()?;
        }
        self.expect(&TokenKind::Do)?;
        self.block()?;
        self.expect(&TokenKind::End)
    }

    fn local_statement(&mut self) -> Result<(), SyntaxError> {
        self.advance();
        if self.eat(&TokenKind::Function) {
            self.name()?;
            return self.funcbody();
        }
        self.name()?;
        while self.eat(&TokenKind::Comma) {
            self.name()?;
        }
        if self.eat(&TokenKind::Assign) {
            self.explist()?;
        }
        Ok(())
    }

    /// Assignment or bare call, decided by what the leading suffixed
    /// expression turned out to be: a var list continues with ',' or
    /// '=', anything else must have ended as a call.
    fn expr_statement(&mut self) -> Result<(), SyntaxError> {
        let first = self.suffixed_expression()?;
        match &self.peek().kind {
            TokenKind::Assign | TokenKind::Comma => {
                if first != Prefix::Var {
                    return Err(self.unexpected());
                }
                while self.eat(&TokenKind::Comma) {
                    if self.suffixed_expression()? != Prefix::Var {
                        return Err(self.unexpected());
                    }
                }
                self.expect(&TokenKind::Assign)?;
                self.explist()
            }
            _ => {
                if first != Prefix::Call {
                    return Err(self.unexpected());
                }
                Ok(())
            }
        }
    }

    /// funcname ::= Name {'.' Name} [':' Name]
    fn funcname(&mut self) -> Result<(), SyntaxError> {
        self.name()?;
        while self.eat(&TokenKind::Dot) {
            self.name()?;
        }
        if self.eat(&TokenKind::Colon) {
            self.name()?;
        }
        Ok(())
    }

    /// funcbody ::= '(' [parlist] ')' block end
    fn funcbody(&mut self) -> Result<(), SyntaxError> {
        self.expect(&TokenKind::LParen)?;
        if self.peek().kind != TokenKind::RParen {
            self.parlist()?;
        }
        self.expect(&TokenKind::RParen)?;
        self.block()?;
        self.expect(&TokenKind::End)
    }

    /// parlist ::= namelist [',' '...'] | '...'
    fn parlist(&mut self) -> Result<(), SyntaxError> {
        if self.eat(&TokenKind::Ellipsis) {
            return Ok(());
        }
        self.name()?;
        while self.eat(&TokenKind::Comma) {
            if self.eat(&TokenKind::Ellipsis) {
                return Ok(());
            }
            self.name()?;
        }
        Ok(())
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn explist(&mut self) -> Result<(), SyntaxError> {
        self.expression()?;
        while self.eat(&TokenKind::Comma) {
            self.expression()?;
        }
        Ok(())
    }

    /// Precedence ladder, loosest binding first: or, and, comparison,
    /// concat, additive, multiplicative, unary, power. No values are
    /// built, so every binary level simply chains left to right.
    fn expression(&mut self) -> Result<(), SyntaxError> {
        self.or_expression()
    }

    fn or_expression(&mut self) -> Result<(), SyntaxError> {
        self.and_expression()?;
        while self.eat(&TokenKind::Or) {
            self.and_expression()?;
        }
        Ok(())
    }

    fn and_expression(&mut self) -> Result<(), SyntaxError> {
        self.comparison()?;
        while self.eat(&TokenKind::And) {
            self.comparison()?;
        }
        Ok(())
    }

    fn comparison(&mut self) -> Result<(), SyntaxError> {
        self.concat_expression()?;
        while matches!(
            self.peek().kind,
            TokenKind::Less
                | TokenKind::LessEq
                | TokenKind::Greater
                | TokenKind::GreaterEq
                | TokenKind::NotEq
                | TokenKind::EqEq
        ) {
            self.advance();
            self.concat_expression()?;
        }
        Ok(())
    }

    fn concat_expression(&mut self) -> Result<(), SyntaxError> {
        self.additive()?;
        while self.eat(&TokenKind::Concat) {
            self.additive()?;
        }
        Ok(())
    }

    fn additive(&mut self) -> Result<(), SyntaxError> {
        self.multiplicative()?;
        while matches!(self.peek().kind, TokenKind::Plus | TokenKind::Minus) {
            self.advance();
            self.multiplicative()?;
        }
        Ok(())
    }

    fn multiplicative(&mut self) -> Result<(), SyntaxError> {
        self.unary()?;
        while matches!(
            self.peek().kind,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent
        ) {
            self.advance();
            self.unary()?;
        }
        Ok(())
    }

    fn unary(&mut self) -> Result<(), SyntaxError> {
        if matches!(
            self.peek().kind,
            TokenKind::Not | TokenKind::Hash | TokenKind::Minus
        ) {
            self.advance();
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<(), SyntaxError> {
        self.primary()?;
        while self.eat(&TokenKind::Caret) {
            // The right side may itself be unary: `2 ^ -3`.
            self.unary()?;
        }
        Ok(())
    }

    /// exp ::= nil | false | true | Number | String | '...'
    ///       | function funcbody | prefixexp | tableconstructor
    fn primary(&mut self) -> Result<(), SyntaxError> {
        match &self.peek().kind {
            TokenKind::Nil
            | TokenKind::False
            | TokenKind::True
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::Ellipsis => {
                self.advance();
                Ok(())
            }
            TokenKind::Function => {
                self.advance();
                self.funcbody()
            }
            TokenKind::LBrace => self.table_constructor(),
            TokenKind::Identifier(_) | TokenKind::LParen => {
                self.suffixed_expression()?;
                Ok(())
            }
            _ => Err(self.unexpected()),
        }
    }

    /// prefixexp ::= var | functioncall | '(' exp ')'
    ///
    /// Parsed as a base (name or parenthesized expression) followed by a
    /// chain of index, field, call, and method-call suffixes.
    fn suffixed_expression(&mut self) -> Result<Prefix, SyntaxError> {
        let mut prefix = match &self.peek().kind {
            TokenKind::Identifier(_) => {
                self.advance();
                Prefix::Var
            }
            TokenKind::LParen => {
                self.advance();
                self.expression()?;
                self.expect(&TokenKind::RParen)?;
                Prefix::Paren
            }
            _ => return Err(self.unexpected()),
        };
        loop {
            match &self.peek().kind {
                TokenKind::LBracket => {
                    self.advance();
                    self.expression()?;
                    self.expect(&TokenKind::RBracket)?;
                    prefix = Prefix::Var;
                }
                TokenKind::Dot => {
                    self.advance();
                    self.name()?;
                    prefix = Prefix::Var;
                }
                TokenKind::Colon => {
                    self.advance();
                    self.name()?;
                    self.call_args()?;
                    prefix = Prefix::Call;
                }
                TokenKind::LParen | TokenKind::LBrace | TokenKind::Str(_) => {
                    self.call_args()?;
                    prefix = Prefix::Call;
                }
                _ => break,
            }
        }
        Ok(prefix)
    }

    /// args ::= '(' [explist] ')' | tableconstructor | String
    fn call_args(&mut self) -> Result<(), SyntaxError> {
        match &self.peek().kind {
            TokenKind::LParen => {
                self.advance();
                if self.peek().kind != TokenKind::RParen {
                    self.explist()?;
                }
                self.expect(&TokenKind::RParen)
            }
            TokenKind::LBrace => self.table_constructor(),
            TokenKind::Str(_) => {
                self.advance();
                Ok(())
            }
            _ => Err(self.unexpected()),
        }
    }

    /// tableconstructor ::= '{' [fieldlist] '}'
    ///
    /// Fields separated by ',' or ';', optional trailing separator.
    fn table_constructor(&mut self) -> Result<(), SyntaxError> {
        self.expect(&TokenKind::LBrace)?;
        if self.eat(&TokenKind::RBrace) {
            return Ok(());
        }
        self.field()?;
        while matches!(self.peek().kind, TokenKind::Comma | TokenKind::Semi) {
            self.advance();
            if self.peek().kind == TokenKind::RBrace {
                break;
            }
            self.field()?;
        }
        self.expect(&TokenKind::RBrace)
    }

    /// field ::= '[' exp ']' '=' exp | Name '=' exp | exp
    fn field(&mut self) -> Result<(), SyntaxError> {
        match &self.peek().kind {
            TokenKind::LBracket => {
                self.advance();
                self.expression()?;
                self.expect(&TokenKind::RBracket)?;
                self.expect(&TokenKind::Assign)?;
                self.expression()
            }
            TokenKind::Identifier(_) if self.peek_next_is(&TokenKind::Assign) => {
                self.advance();
                self.advance();
                self.expression()
            }
            _ => self.expression(),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Tokens that can begin an expression; used to decide whether a
    /// `return` carries a value list.
    fn starts_expression(kind: &TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Nil
                | TokenKind::False
                | TokenKind::True
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Str(_)
                | TokenKind::Ellipsis
                | TokenKind::Function
                | TokenKind::Identifier(_)
                | TokenKind::LParen
                | TokenKind::LBrace
                | TokenKind::Not
                | TokenKind::Hash
                | TokenKind::Minus
        )
    }

    fn marker(&self) -> Marker {
        let token = self.peek();
        Marker {
            line: token.span.line,
            offset: token.span.start,
        }
    }

    fn peek(&self) -> &Token {
        static EOF: std::sync::LazyLock<Token> =
            std::sync::LazyLock::new(|| Token::new(TokenKind::Eof, Span::new(0, 0, 0, 0)));
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    fn peek_next_is(&self, kind: &TokenKind) -> bool {
        self.tokens.get(self.pos + 1).is_some_and(|t| t.kind == *kind)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().kind == *kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), SyntaxError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn name(&mut self) -> Result<(), SyntaxError> {
        if matches!(self.peek().kind, TokenKind::Identifier(_)) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> SyntaxError {
        let token = self.peek();
        SyntaxError {
            filename: self.filename.clone(),
            line: if token.kind == TokenKind::Eof {
                None
            } else {
                Some(token.span.line)
            },
        }
    }
}
