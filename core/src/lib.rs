pub mod error;
pub mod lexer;
pub mod lr;
pub mod span;
pub mod token;

pub use error::{ErrorKind, ExpectedTokens, NoCustomError, PatternError, TableDefect, ZestError};
pub use lexer::{Lexer, Rule};
pub use lr::{overview, ActCode, Action, Capture, ErrorCapture, Parser, RuleInfo};
pub use span::{Cursor, Span};
pub use token::{SymCode, Token, EOS, INVALID_SYMBOL};

pub mod traits {
    pub use crate::lr::table::traits::LrTables;
    pub use crate::lr::traits::Grammar;
    pub use crate::token::traits::TokenCode;
}

pub type ZestResult<T, E> = Result<T, ZestError<E>>;
