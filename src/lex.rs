use std::fmt::Display;

use log::trace;
use miette::{NamedSource, SourceSpan};

use crate::error::{
    self, BadTokenError, BufferFullError, CalcError, ExpectedError, MalformedNumberError,
};

/// Default statement terminator.
pub const PRINT: char = ';';

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    Minus,
    Plus,
    Star,
    Slash,
    Percent,
    Print,
    Number(f64),
}

impl Token<'_> {
    pub fn span(&self) -> SourceSpan {
        SourceSpan::from(self.offset..self.offset + self.literal.len())
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit} null"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit} null"),
            TokenKind::Minus => write!(f, "MINUS {lit} null"),
            TokenKind::Plus => write!(f, "PLUS {lit} null"),
            TokenKind::Star => write!(f, "STAR {lit} null"),
            TokenKind::Slash => write!(f, "SLASH {lit} null"),
            TokenKind::Percent => write!(f, "PERCENT {lit} null"),
            TokenKind::Print => write!(f, "PRINT {lit} null"),
            TokenKind::Number(n) => {
                if n == n.trunc() {
                    write!(f, "NUMBER {lit} {n}.0")
                } else {
                    write!(f, "NUMBER {lit} {n}")
                }
            }
        }
    }
}

/// Pull-based token source over one input string, with a single slot of
/// pushback.
pub struct Lexer<'de> {
    filename: Option<&'de str>,
    whole: &'de str,
    rest: &'de str,
    pub byte: usize,
    terminator: char,
    buffer: Option<Token<'de>>,
}

impl<'de> Lexer<'de> {
    pub fn new(filename: Option<&'de str>, input: &'de str) -> Self {
        Self::with_terminator(filename, input, PRINT)
    }

    pub fn with_terminator(filename: Option<&'de str>, input: &'de str, terminator: char) -> Self {
        Lexer {
            filename,
            whole: input,
            rest: input,
            byte: 0,
            terminator,
            buffer: None,
        }
    }

    pub fn whole(&self) -> &'de str {
        self.whole
    }

    pub fn buffered(&self) -> Option<&Token<'de>> {
        self.buffer.as_ref()
    }

    /// Returns the buffered token if there is one, otherwise lexes the next
    /// one. `Ok(None)` means the input is exhausted.
    pub fn get(&mut self) -> Result<Option<Token<'de>>, CalcError> {
        if let Some(token) = self.buffer.take() {
            return Ok(Some(token));
        }
        self.lex()
    }

    /// Stores `token` so the next [`get`](Self::get) returns it again.
    ///
    /// Only one token fits. A second push before the slot is drained is an
    /// evaluator bug and is reported as [`CalcError::BufferFull`].
    pub fn put_back(&mut self, token: Token<'de>) -> Result<(), CalcError> {
        if let Some(held) = &self.buffer {
            return Err(BufferFullError {
                held: held.to_string(),
                rejected: token.to_string(),
            }
            .into());
        }
        trace!("put back {token}");
        self.buffer = Some(token);
        Ok(())
    }

    pub fn expect(
        &mut self,
        expected: TokenKind,
        error: &'static str,
    ) -> Result<Token<'de>, CalcError> {
        self.expect_where(|token| token.kind == expected, error)
    }

    pub fn expect_where(
        &mut self,
        check: impl FnOnce(&Token<'de>) -> bool,
        error: &'static str,
    ) -> Result<Token<'de>, CalcError> {
        match self.get()? {
            Some(token) if check(&token) => Ok(token),
            found => Err(self.expected(error, found.as_ref())),
        }
    }

    pub(crate) fn expected(&self, expected: &'static str, found: Option<&Token<'de>>) -> CalcError {
        let (span, found) = match found {
            Some(token) => (token.span(), format!("`{}`", token.literal)),
            None => (self.end_span(), "end of input".to_string()),
        };
        ExpectedError {
            src: self.source(),
            span,
            expected,
            found,
        }
        .into()
    }

    pub(crate) fn source(&self) -> NamedSource<String> {
        error::source(self.filename, self.whole)
    }

    /// The last character of the input, where end-of-input errors point.
    fn end_span(&self) -> SourceSpan {
        let start = self
            .whole
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i);
        SourceSpan::from(start..self.whole.len())
    }

    fn lex(&mut self) -> Result<Option<Token<'de>>, CalcError> {
        loop {
            let mut chars = self.rest.chars();
            let Some(c) = chars.next() else {
                return Ok(None);
            };
            let cur = self.rest;
            let offset = self.byte;
            let literal = &cur[..c.len_utf8()];
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            let process = |kind: TokenKind| -> Result<Option<Token<'de>>, CalcError> {
                let token = Token {
                    kind,
                    literal,
                    offset,
                };
                trace!("lexed {token}");
                Ok(Some(token))
            };

            return match c {
                c if c == self.terminator => process(TokenKind::Print),
                '(' => process(TokenKind::LeftParen),
                ')' => process(TokenKind::RightParen),
                '+' => process(TokenKind::Plus),
                '-' => process(TokenKind::Minus),
                '*' => process(TokenKind::Star),
                '/' => process(TokenKind::Slash),
                '%' => process(TokenKind::Percent),
                '0'..='9' | '.' => self.number(cur, offset).map(Some),
                c if c.is_whitespace() => continue,
                c => Err(BadTokenError {
                    src: self.source(),
                    bad_bit: SourceSpan::from(offset..self.byte),
                    token: c,
                }
                .into()),
            };
        }
    }

    /// Reads a decimal literal starting at `cur`: digits, an optional
    /// fraction, and an exponent only when at least one exponent digit
    /// follows the `e`.
    fn number(&mut self, cur: &'de str, offset: usize) -> Result<Token<'de>, CalcError> {
        let bytes = cur.as_bytes();
        let digits = |from: usize| {
            from + bytes
                .get(from..)
                .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
        };

        let mut end = digits(0);
        if bytes.get(end) == Some(&b'.') {
            end = digits(end + 1);
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exponent = end + 1;
            if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
                exponent += 1;
            }
            let exponent_end = digits(exponent);
            if exponent_end > exponent {
                end = exponent_end;
            }
        }

        let literal = &cur[..end];
        self.rest = &cur[end..];
        self.byte = offset + end;

        match literal.parse() {
            Ok(n) => {
                let token = Token {
                    kind: TokenKind::Number(n),
                    literal,
                    offset,
                };
                trace!("lexed {token}");
                Ok(token)
            }
            Err(_) => Err(MalformedNumberError {
                src: self.source(),
                span: SourceSpan::from(offset..self.byte),
                literal: literal.to_string(),
            }
            .into()),
        }
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, CalcError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.get().transpose()
    }
}
