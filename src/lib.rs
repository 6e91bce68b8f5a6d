//! Evaluates arithmetic expressions such as `-(2 + 3) * 4 % 3` to an `f64`.
//!
//! ```
//! assert_eq!(calculator::evaluate("(2+3)*4").unwrap(), 20.0);
//! assert!(calculator::evaluate("1/0").is_err());
//! ```

pub mod calc;
pub mod error;
pub mod eval;
pub mod lex;

pub use calc::{Calculator, ModuloOperand, Options, Trailing, check_terminator};
pub use error::{CalcError, ErrorKind, InvalidTerminatorError};
pub use eval::Evaluator;
pub use lex::{Lexer, Token, TokenKind};

/// Evaluates `input` with default [`Options`].
pub fn evaluate(input: &str) -> Result<f64, CalcError> {
    Calculator::new().evaluate(input)
}
