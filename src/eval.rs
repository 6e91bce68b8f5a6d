use log::trace;
use miette::SourceSpan;

use crate::{
    calc::{ModuloOperand, Options, Trailing},
    error::{CalcError, DivideByZeroError, ModuloByZeroError, TooDeepError, TrailingInputError},
    lex::{Lexer, Token, TokenKind},
};

type Level<'de> = fn(&mut Evaluator<'de>) -> Result<f64, CalcError>;

/// Recursive-descent evaluator over one input. Each grammar level pulls the
/// tokens it needs and pushes back the first one it cannot use.
///
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := primary (('*' | '/') primary | '%' term)*
/// primary    := '(' expression ')' | number | '-' primary | '+' primary
/// ```
pub struct Evaluator<'de> {
    lexer: Lexer<'de>,
    options: Options,
    depth: usize,
}

impl<'de> Evaluator<'de> {
    pub fn new(filename: Option<&'de str>, input: &'de str, options: Options) -> Self {
        Self {
            lexer: Lexer::with_terminator(filename, input, options.terminator),
            options,
            depth: 0,
        }
    }

    pub fn lexer(&self) -> &Lexer<'de> {
        &self.lexer
    }

    /// Drops any statement terminators in front of the expression.
    pub fn skip_terminators(&mut self) -> Result<(), CalcError> {
        while let Some(token) = self.lexer.get()? {
            if token.kind != TokenKind::Print {
                return self.lexer.put_back(token);
            }
        }
        Ok(())
    }

    /// Checks what is left once the expression is complete. Terminators are
    /// allowed; anything else is rejected unless trailing input is ignored.
    pub fn finish(&mut self) -> Result<(), CalcError> {
        if self.options.trailing == Trailing::Ignore {
            return Ok(());
        }
        while let Some(token) = self.lexer.get()? {
            if token.kind != TokenKind::Print {
                return Err(TrailingInputError {
                    src: self.lexer.source(),
                    span: token.span(),
                    found: format!("`{}`", token.literal),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn expression(&mut self) -> Result<f64, CalcError> {
        let mut left = self.term()?;

        loop {
            let Some(token) = self.lexer.get()? else {
                break;
            };
            match token.kind {
                TokenKind::Plus => left += self.term()?,
                TokenKind::Minus => left -= self.term()?,
                _ => {
                    self.lexer.put_back(token)?;
                    break;
                }
            }
        }

        trace!("expression = {left}");
        Ok(left)
    }

    pub fn term(&mut self) -> Result<f64, CalcError> {
        let mut left = self.primary()?;

        loop {
            let Some(token) = self.lexer.get()? else {
                break;
            };
            match token.kind {
                TokenKind::Star => left *= self.primary()?,
                TokenKind::Slash => {
                    let (d, span) = self.operand(&token, Self::primary)?;
                    if d == 0.0 {
                        return Err(DivideByZeroError {
                            src: self.lexer.source(),
                            span,
                        }
                        .into());
                    }
                    left /= d;
                }
                TokenKind::Percent => {
                    let level: Level<'de> = match self.options.modulo_operand {
                        ModuloOperand::Term => Self::term,
                        ModuloOperand::Primary => Self::primary,
                    };
                    let (right, span) = self.operand(&token, level)?;
                    // `as` truncates toward zero and saturates
                    let divisor = right as i64;
                    if divisor == 0 {
                        return Err(ModuloByZeroError {
                            src: self.lexer.source(),
                            span,
                        }
                        .into());
                    }
                    left = (left as i64).wrapping_rem(divisor) as f64;
                }
                _ => {
                    self.lexer.put_back(token)?;
                    break;
                }
            }
        }

        trace!("term = {left}");
        Ok(left)
    }

    pub fn primary(&mut self) -> Result<f64, CalcError> {
        let Some(token) = self.lexer.get()? else {
            return Err(self.lexer.expected("primary", None));
        };

        match token.kind {
            TokenKind::LeftParen => {
                let value = self.nested(&token, Self::expression)?;
                self.lexer.expect(TokenKind::RightParen, "')'")?;
                Ok(value)
            }
            TokenKind::Number(n) => Ok(n),
            TokenKind::Minus => Ok(-self.nested(&token, Self::primary)?),
            TokenKind::Plus => self.nested(&token, Self::primary),
            _ => Err(self.lexer.expected("primary", Some(&token))),
        }
    }

    fn nested(&mut self, at: &Token<'de>, level: Level<'de>) -> Result<f64, CalcError> {
        if self.depth >= self.options.max_depth {
            return Err(TooDeepError {
                src: self.lexer.source(),
                span: at.span(),
                limit: self.options.max_depth,
            }
            .into());
        }
        self.depth += 1;
        let value = level(self);
        self.depth -= 1;
        value
    }

    /// Evaluates the right-hand operand of `op` and returns it with the span
    /// it was read from. Counts toward the nesting limit like parentheses.
    fn operand(
        &mut self,
        op: &Token<'de>,
        level: Level<'de>,
    ) -> Result<(f64, SourceSpan), CalcError> {
        let start = match self.lexer.get()? {
            Some(token) => {
                let offset = token.offset;
                self.lexer.put_back(token)?;
                offset
            }
            None => self.lexer.byte,
        };

        let value = self.nested(op, level)?;

        let end = self
            .lexer
            .buffered()
            .map_or(self.lexer.byte, |token| token.offset);
        let len = self.lexer.whole()[start..end].trim_end().len();
        Ok((value, SourceSpan::from(start..start + len)))
    }
}
