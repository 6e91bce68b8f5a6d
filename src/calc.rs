use log::{debug, warn};

use crate::{
    error::{CalcError, InvalidTerminatorError},
    eval::Evaluator,
    lex::PRINT,
};

/// Precedence at which the right operand of `%` is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ModuloOperand {
    /// `7 % 2 * 3` is `7 % (2 * 3)`.
    #[default]
    Term,
    /// `7 % 2 * 3` is `(7 % 2) * 3`.
    Primary,
}

/// What to do with tokens left over after a complete expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trailing {
    #[default]
    Reject,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub terminator: char,
    pub modulo_operand: ModuloOperand,
    pub trailing: Trailing,
    /// Maximum nesting of parentheses and unary signs.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            terminator: PRINT,
            modulo_operand: ModuloOperand::default(),
            trailing: Trailing::default(),
            max_depth: 256,
        }
    }
}

impl Options {
    /// Rejects terminators that the lexer would otherwise read as part of
    /// an expression.
    pub fn validate(&self) -> Result<(), InvalidTerminatorError> {
        check_terminator(self.terminator).map(|_| ())
    }
}

pub fn check_terminator(terminator: char) -> Result<char, InvalidTerminatorError> {
    match terminator {
        '0'..='9' | '.' | '(' | ')' | '+' | '-' | '*' | '/' | '%' => {
            Err(InvalidTerminatorError { terminator })
        }
        c if c.is_whitespace() => Err(InvalidTerminatorError { terminator }),
        c => Ok(c),
    }
}

#[derive(Debug, Clone, Default)]
pub struct Calculator {
    options: Options,
    name: Option<String>,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Result<Self, InvalidTerminatorError> {
        options.validate()?;
        Ok(Calculator {
            options,
            name: None,
        })
    }

    /// Name shown for the input in diagnostics, `<input>` when unset.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Evaluates one expression. Leading terminators are skipped, and every
    /// failure is returned as an error rather than a number.
    pub fn evaluate(&self, input: &str) -> Result<f64, CalcError> {
        debug!("evaluating {input:?}");

        let mut evaluator = Evaluator::new(self.name.as_deref(), input, self.options);
        evaluator.skip_terminators()?;
        let value = evaluator.expression()?;
        evaluator.finish()?;

        debug!("{input:?} = {value}");
        Ok(value)
    }

    /// Like [`evaluate`](Self::evaluate), but logs the failure and returns
    /// `None` instead.
    pub fn calculate(&self, input: &str) -> Option<f64> {
        match self.evaluate(input) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("failed to evaluate {input:?}: {e}");
                None
            }
        }
    }
}
