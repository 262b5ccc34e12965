use tracing::debug;

use crate::error::{ErrorKind, TableDefect};
use crate::token::{traits::TokenCode, SymCode, EOS};
use crate::ZestResult;

pub mod action;
pub mod stack;
pub mod table;

pub use action::{reduce_action, shift_action, Action, Via};
pub use stack::{Frame, ParseStack};
pub use table::{overview, ActCode, RuleInfo};

/// Outcome of an error-capture delegate.
pub enum Capture<V> {
    /// Inject the value as the capturing non-terminal and resume parsing.
    CaptureAs(V),
    /// Fall through to ordinary error reporting.
    Propagate,
}

/// Context handed to an error-capture delegate.
pub struct ErrorCapture<'a, G: traits::Grammar> {
    /// The capturing non-terminal.
    pub symbol: SymCode,
    /// Sub-symbols already resolved under that non-terminal, leftmost
    /// first. They are discarded if the error is captured, and stay on the
    /// stack otherwise.
    pub resolved: Vec<&'a G::Value>,
    /// The offending token; `None` when the error arose at end of input.
    pub token: Option<&'a G::Token>,
}

pub mod traits {
    use super::{Capture, ErrorCapture};
    use crate::lr::table::traits::LrTables;
    use crate::token::{traits::TokenCode, SymCode};
    use crate::ZestResult;

    /// The generated, stateful side of a parser: semantic values, reduce
    /// actions and error hooks, layered over the generated tables.
    pub trait Grammar: LrTables {
        type Token;
        type TokenCode: TokenCode;
        type Value;
        type Error: Clone;

        /// Turn a consumed token into the semantic value of its terminal.
        fn token_value(&mut self, token: Self::Token) -> Self::Value;

        /// Run rule `rule`'s semantic action over the right-hand side
        /// values, leftmost first, and return the left-hand side value.
        fn reduce(
            &mut self,
            rule: usize,
            rhs: Vec<Self::Value>,
        ) -> ZestResult<Self::Value, Self::Error>;

        fn on_syntax_error(&mut self, _code: SymCode, _token: Option<&Self::Token>) {}

        fn on_stack_overflow(&mut self) {}

        /// Decide whether an error under a capturing non-terminal becomes a
        /// placeholder value. A delegate should propagate at end of input
        /// unless the capture actually advances the parse.
        fn capture_error(&mut self, _capture: ErrorCapture<'_, Self>) -> Capture<Self::Value>
        where
            Self: Sized,
        {
            Capture::Propagate
        }
    }
}

enum Status<V> {
    Active,
    Accepted(Option<V>),
    Dead,
}

/// A parser instance: the grammar, the stack and the dispatch loop. Feed it
/// tokens in lexical order with [`Parser::consume`], then call
/// [`Parser::end_parsing`] to run the automaton to acceptance.
pub struct Parser<G: traits::Grammar> {
    grammar: G,
    stack: ParseStack<G::Value>,
    status: Status<G::Value>,
    tracing: bool,
}

impl<G: traits::Grammar> Parser<G> {
    pub fn new(grammar: G) -> Self {
        Self {
            grammar,
            stack: ParseStack::new(None),
            status: Status::Active,
            tracing: false,
        }
    }

    pub fn grammar(&self) -> &G {
        &self.grammar
    }

    pub fn grammar_mut(&mut self) -> &mut G {
        &mut self.grammar
    }

    pub fn into_grammar(self) -> G {
        self.grammar
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn set_max_stack_size(&mut self, max: Option<usize>) {
        self.stack.set_max_depth(max);
    }

    pub fn is_tracing_enabled(&self) -> bool {
        self.tracing
    }

    pub fn set_tracing(&mut self, enabled: bool) {
        self.tracing = enabled;
    }

    /// Discard all progress and return to the initial state.
    pub fn reset(&mut self) {
        self.stack.reset();
        self.status = Status::Active;
    }

    /// Feed the next token. Semantic actions for any triggered reduces run
    /// before this returns.
    pub fn consume(&mut self, token: G::Token, code: G::TokenCode) -> ZestResult<(), G::Error> {
        match self.status {
            Status::Dead => return Err(ErrorKind::StackOverflow.into()),
            Status::Accepted(_) => {
                return Err(ErrorKind::unexpected_token(
                    G::symbol_name(code.code()),
                    std::iter::empty(),
                )
                .into())
            }
            Status::Active => {}
        }

        let la = code.code();
        debug_assert!(la > EOS && la < G::NUM_TERMINALS);
        self.advance(la, Some(token))
    }

    /// Signal end of input and run the automaton to acceptance, returning
    /// the accepted semantic value.
    pub fn end_parsing(&mut self) -> ZestResult<G::Value, G::Error> {
        loop {
            match &mut self.status {
                Status::Dead => return Err(ErrorKind::StackOverflow.into()),
                Status::Accepted(value) => {
                    return value
                        .take()
                        .ok_or_else(|| ErrorKind::UnexpectedEndOfInput.into());
                }
                Status::Active => {}
            }

            self.advance(EOS, None).map_err(|error| {
                if matches!(error.kind(), ErrorKind::UnexpectedToken { .. }) {
                    ErrorKind::UnexpectedEndOfInput.into()
                } else {
                    error
                }
            })?;
        }
    }

    fn advance(&mut self, la: SymCode, mut token: Option<G::Token>) -> ZestResult<(), G::Error> {
        loop {
            let state = self.stack.state();
            let (code, via) = shift_action::<G>(state, la)?;
            self.trace_resolution(la, via);

            match Action::decode::<G>(code) {
                Action::Shift(_) => {
                    let value = token.take().map(|token| self.grammar.token_value(token));
                    self.shift(code, la, value)?;
                    return Ok(());
                }
                Action::ShiftReduce(rule) => {
                    let value = token.take().map(|token| self.grammar.token_value(token));
                    self.shift(code, la, value)?;
                    self.reduce_by(rule)?;
                    return Ok(());
                }
                Action::Reduce(rule) => {
                    self.reduce_by(rule)?;

                    // Drain encoded pending reduces, then re-dispatch the
                    // still-unconsumed lookahead.
                    while matches!(self.status, Status::Active)
                        && self.stack.state() >= G::MIN_REDUCE
                    {
                        let pending = (self.stack.state() - G::MIN_REDUCE) as usize;
                        self.reduce_by(pending)?;
                    }
                    if !matches!(self.status, Status::Active) {
                        debug_assert!(token.is_none());
                        return Ok(());
                    }
                }
                Action::Error => return self.handle_error(la, token),
                Action::Accept => {
                    let value = self.stack.pop().and_then(|frame| frame.value);
                    self.accept(value);
                    return Ok(());
                }
                Action::None => return Err(TableDefect::NoAction(state).into()),
            }
        }
    }

    fn shift(
        &mut self,
        code: ActCode,
        symbol: SymCode,
        value: Option<G::Value>,
    ) -> ZestResult<(), G::Error> {
        if self.stack.is_full() {
            return self.overflow();
        }

        let state = if code > G::MAX_SHIFT {
            // Shift-reduce compresses into the pending-reduce state range.
            code + (G::MIN_REDUCE - G::MIN_SHIFT_REDUCE)
        } else {
            code
        };

        if self.tracing {
            debug!(state, symbol = G::symbol_name(symbol), "shift");
        }
        self.stack.push(Frame {
            state,
            symbol,
            value,
        });
        Ok(())
    }

    fn reduce_by(&mut self, rule: usize) -> ZestResult<(), G::Error> {
        let info = G::RULE_INFO
            .get(rule)
            .copied()
            .ok_or(TableDefect::UnknownRule(rule))?;

        if self.tracing {
            debug!(rule = G::rule_name(rule), "reduce");
        }

        debug_assert!(self.stack.depth() > info.rhs_len);
        let base = self.stack.depth().saturating_sub(info.rhs_len + 1);
        let previous = self.stack.get(base).map(|frame| frame.state).unwrap_or(0);

        let rhs = self.stack.pop_values(info.rhs_len);
        let value = self.grammar.reduce(rule, rhs)?;

        let code = reduce_action::<G>(previous, info.lhs)?;
        if code == G::ACCEPT_ACTION {
            self.accept(Some(value));
            return Ok(());
        }

        // A goto lands on a plain shift state or on a single-reduce state
        // compacted into the pending-reduce range; it never routes to
        // shift-reduce or error.
        if code == G::ERROR_ACTION
            || (G::MIN_SHIFT_REDUCE..=G::MAX_SHIFT_REDUCE).contains(&code)
        {
            return Err(TableDefect::GotoNotShift(previous, info.lhs).into());
        }

        if self.stack.is_full() {
            return self.overflow();
        }
        if self.tracing {
            debug!(state = code, symbol = G::symbol_name(info.lhs), "goto");
        }
        self.stack.push(Frame {
            state: code,
            symbol: info.lhs,
            value: Some(value),
        });
        Ok(())
    }

    fn accept(&mut self, value: Option<G::Value>) {
        if self.tracing {
            debug!("accept");
        }
        self.stack.clear();
        self.status = Status::Accepted(value);
    }

    fn overflow(&mut self) -> ZestResult<(), G::Error> {
        if self.tracing {
            debug!("stack overflow");
        }
        self.stack.clear();
        self.grammar.on_stack_overflow();
        self.status = Status::Dead;
        Err(ErrorKind::StackOverflow.into())
    }

    fn handle_error(&mut self, la: SymCode, token: Option<G::Token>) -> ZestResult<(), G::Error> {
        if let Some((index, symbol, code)) = self.find_capture_point() {
            let stack = &self.stack;
            let resolved: Vec<&G::Value> = (index + 1..stack.depth())
                .filter_map(|at| stack.get(at).and_then(|frame| frame.value.as_ref()))
                .collect();

            let capture = ErrorCapture {
                symbol,
                resolved,
                token: token.as_ref(),
            };
            if let Capture::CaptureAs(value) = self.grammar.capture_error(capture) {
                if self.tracing {
                    debug!(symbol = G::symbol_name(symbol), "error captured");
                }
                // Unwind to the capture point only now that the capture is
                // confirmed; the offending token is claimed by it.
                while self.stack.depth() > index + 1 {
                    if self.stack.pop().is_none() {
                        break;
                    }
                }
                return self.shift(code, symbol, Some(value));
            }
        }

        if self.tracing {
            debug!(token = G::symbol_name(la), "syntax error");
        }
        self.grammar.on_syntax_error(la, token.as_ref());
        Err(ErrorKind::unexpected_token(G::symbol_name(la), self.expected_lookaheads()).into())
    }

    /// Innermost stack frame whose state has a goto for a capturing
    /// non-terminal.
    fn find_capture_point(&self) -> Option<(usize, SymCode, ActCode)> {
        if G::ERROR_CAPTURES.is_empty() {
            return None;
        }

        for index in (0..self.stack.depth()).rev() {
            let state = self.stack.get(index)?.state;
            if state >= G::MIN_REDUCE {
                continue;
            }
            for &symbol in G::ERROR_CAPTURES {
                if let Ok(code) = reduce_action::<G>(state, symbol) {
                    if let Action::Shift(_) = Action::decode::<G>(code) {
                        return Some((index, symbol, code));
                    }
                }
            }
        }

        None
    }

    fn expected_lookaheads(&self) -> Vec<&'static str> {
        let state = self.stack.state();
        (0..G::NUM_TERMINALS)
            .filter(|&terminal| {
                shift_action::<G>(state, terminal)
                    .map(|(code, _)| {
                        !matches!(Action::decode::<G>(code), Action::Error | Action::None)
                    })
                    .unwrap_or(false)
            })
            .map(G::symbol_name)
            .collect()
    }

    fn trace_resolution(&self, la: SymCode, via: Via) {
        if !self.tracing {
            return;
        }
        match via {
            Via::Fallback(to) => {
                debug!(from = G::symbol_name(la), to = G::symbol_name(to), "fallback");
            }
            Via::Wildcard => debug!(token = G::symbol_name(la), "wildcard"),
            _ => {}
        }
    }
}
