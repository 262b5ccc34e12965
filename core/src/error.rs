use itertools::Itertools as _;
use thiserror::Error;

use crate::lr::table::ActCode;
use crate::span::Cursor;
use crate::token::SymCode;

#[derive(Debug, Clone, Copy)]
pub struct NoCustomError;

impl std::fmt::Display for NoCustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unspecified error")
    }
}

#[derive(Debug, Clone)]
pub struct ExpectedTokens(Vec<&'static str>);

impl ExpectedTokens {
    pub fn new<I>(expecting: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self(expecting.into_iter().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().copied()
    }
}

impl std::fmt::Display for ExpectedTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.iter().join(", ").fmt(f)
    }
}

/// A structural defect in the generated tables. Always fatal.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableDefect {
    #[error("no action encoded for state {0}")]
    NoAction(ActCode),

    #[error("fallback chain for token {0} does not terminate")]
    FallbackLoop(SymCode),

    #[error("missing goto entry for state {0}, symbol {1}")]
    MissingGoto(ActCode, SymCode),

    #[error("goto entry for state {0}, symbol {1} routes to shift-reduce or error")]
    GotoNotShift(ActCode, SymCode),

    #[error("rule {0} is out of range")]
    UnknownRule(usize),
}

#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct PatternError(#[from] regex::Error);

#[derive(Error, Debug, Clone)]
pub enum ErrorKind<C> {
    #[error("no lexing rule matches the remaining input")]
    NoMatchingRule { remaining: String },

    #[error("unexpected token {got}, expecting {expecting}")]
    UnexpectedToken {
        got: &'static str,
        expecting: ExpectedTokens,
    },

    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("parse stack overflow")]
    StackOverflow,

    #[error("malformed parse table: {0}")]
    TableMalformed(#[from] TableDefect),

    #[error("invalid token pattern: {0}")]
    InvalidPattern(#[from] PatternError),

    #[error("{0}")]
    Other(C),
}

impl<C> ErrorKind<C> {
    pub fn unexpected_token<I>(got: &'static str, expecting: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self::UnexpectedToken {
            got,
            expecting: ExpectedTokens::new(expecting),
        }
    }

    pub fn other(error: C) -> Self {
        Self::Other(error)
    }
}

#[derive(Debug, Clone)]
pub struct ZestError<C> {
    /// Kind of error
    kind: ErrorKind<C>,
    /// Location of the error in the input, when known.
    pub(crate) position: Option<Cursor>,
}

impl<C> ZestError<C> {
    pub fn new(kind: impl Into<ErrorKind<C>>, position: Option<Cursor>) -> Self {
        Self {
            kind: kind.into(),
            position,
        }
    }

    pub fn kind(&self) -> &ErrorKind<C> {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind<C> {
        self.kind
    }

    pub fn position(&self) -> Option<Cursor> {
        self.position
    }
}

impl<C> From<ErrorKind<C>> for ZestError<C> {
    fn from(kind: ErrorKind<C>) -> Self {
        Self {
            kind,
            position: None,
        }
    }
}

impl<C> From<TableDefect> for ZestError<C> {
    fn from(defect: TableDefect) -> Self {
        ErrorKind::TableMalformed(defect).into()
    }
}

impl<C> From<PatternError> for ZestError<C> {
    fn from(error: PatternError) -> Self {
        ErrorKind::InvalidPattern(error).into()
    }
}

impl<C: std::fmt::Display> std::fmt::Display for ZestError<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.position {
            Some(position) => write!(f, "{} at {}", self.kind, position),
            None => self.kind.fmt(f),
        }
    }
}

impl<C: std::fmt::Debug + std::fmt::Display> std::error::Error for ZestError<C> {}
