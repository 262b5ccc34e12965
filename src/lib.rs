pub use zest_core::{
    overview, ActCode, Action, Capture, Cursor, ErrorCapture, ErrorKind, ExpectedTokens, Lexer,
    NoCustomError, Parser, PatternError, Rule, RuleInfo, Span, SymCode, TableDefect, Token,
    ZestError, ZestResult, EOS, INVALID_SYMBOL,
};

pub use zest_core::traits;

pub use zest_core::{error, lexer, lr, span, token};
