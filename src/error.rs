use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Coarse classification of a [`CalcError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Arithmetic,
    Internal,
}

#[derive(Error, Debug, Diagnostic)]
pub enum CalcError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    BadToken(#[from] BadTokenError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    MalformedNumber(#[from] MalformedNumberError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Expected(#[from] ExpectedError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    TrailingInput(#[from] TrailingInputError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    TooDeep(#[from] TooDeepError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    DivideByZero(#[from] DivideByZeroError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    ModuloByZero(#[from] ModuloByZeroError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    BufferFull(#[from] BufferFullError),
}

impl CalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::BadToken(_) => ErrorKind::Lexical,
            CalcError::MalformedNumber(_)
            | CalcError::Expected(_)
            | CalcError::TrailingInput(_)
            | CalcError::TooDeep(_) => ErrorKind::Syntax,
            CalcError::DivideByZero(_) | CalcError::ModuloByZero(_) => ErrorKind::Arithmetic,
            CalcError::BufferFull(_) => ErrorKind::Internal,
        }
    }
}

pub(crate) fn source(name: Option<&str>, whole: &str) -> NamedSource<String> {
    NamedSource::new(name.unwrap_or("<input>"), whole.to_string())
}

#[derive(Error, Debug, Diagnostic)]
#[error("Bad token '{token}'")]
#[diagnostic(
    code(calc::bad_token),
    help("only digits, `.`, `+ - * / %`, parentheses and whitespace are allowed")
)]
pub struct BadTokenError {
    #[source_code]
    pub(crate) src: NamedSource<String>,

    #[label("this character")]
    pub(crate) bad_bit: SourceSpan,

    pub token: char,
}

impl BadTokenError {
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

#[derive(Error, Debug, Diagnostic)]
#[error("malformed number `{literal}`")]
#[diagnostic(code(calc::malformed_number))]
pub struct MalformedNumberError {
    #[source_code]
    pub(crate) src: NamedSource<String>,

    #[label("this numeric literal")]
    pub(crate) span: SourceSpan,

    pub literal: String,
}

#[derive(Error, Debug, Diagnostic)]
#[error("{expected} expected")]
#[diagnostic(code(calc::expected))]
pub struct ExpectedError {
    #[source_code]
    pub(crate) src: NamedSource<String>,

    #[label("found {found}")]
    pub(crate) span: SourceSpan,

    pub expected: &'static str,
    pub found: String,
}

#[derive(Error, Debug, Diagnostic)]
#[error("unexpected {found} after expression")]
#[diagnostic(
    code(calc::trailing_input),
    help("remove everything after the complete expression")
)]
pub struct TrailingInputError {
    #[source_code]
    pub(crate) src: NamedSource<String>,

    #[label("expression ends before this")]
    pub(crate) span: SourceSpan,

    pub found: String,
}

#[derive(Error, Debug, Diagnostic)]
#[error("expression nested deeper than {limit} levels")]
#[diagnostic(code(calc::too_deep))]
pub struct TooDeepError {
    #[source_code]
    pub(crate) src: NamedSource<String>,

    #[label("limit reached here")]
    pub(crate) span: SourceSpan,

    pub limit: usize,
}

#[derive(Error, Debug, Diagnostic)]
#[error("divide by zero")]
#[diagnostic(code(calc::divide_by_zero))]
pub struct DivideByZeroError {
    #[source_code]
    pub(crate) src: NamedSource<String>,

    #[label("this divisor is zero")]
    pub(crate) span: SourceSpan,
}

#[derive(Error, Debug, Diagnostic)]
#[error("modulo by zero")]
#[diagnostic(
    code(calc::modulo_by_zero),
    help("`%` truncates both operands to integers first, so divisors in (-1, 1) become 0")
)]
pub struct ModuloByZeroError {
    #[source_code]
    pub(crate) src: NamedSource<String>,

    #[label("this operand truncates to 0")]
    pub(crate) span: SourceSpan,
}

#[derive(Error, Debug, Diagnostic)]
#[error("put_back() into a full buffer")]
#[diagnostic(
    code(calc::internal::buffer_full),
    help("this is a bug in the evaluator, not in the input")
)]
pub struct BufferFullError {
    pub held: String,
    pub rejected: String,
}

#[derive(Error, Debug, Diagnostic, PartialEq, Eq)]
#[error("{terminator:?} cannot be used as the statement terminator")]
#[diagnostic(
    code(calc::invalid_terminator),
    help("digits, `.`, operators, parentheses and whitespace already mean something in an expression")
)]
pub struct InvalidTerminatorError {
    pub terminator: char,
}
