use prettytable::Table as PtTable;

use super::action::{reduce_action, shift_action, Action};
use crate::token::SymCode;

/// Action code. The code space is partitioned into shift, shift-reduce and
/// reduce ranges followed by the error/accept/no-action markers.
pub type ActCode = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleInfo {
    /// Left-hand side non-terminal.
    pub lhs: SymCode,
    /// Number of right-hand side symbols popped by the reduce.
    pub rhs_len: usize,
}

impl RuleInfo {
    pub const fn new(lhs: SymCode, rhs_len: usize) -> Self {
        Self { lhs, rhs_len }
    }
}

pub mod traits {
    use super::{ActCode, RuleInfo};
    use crate::token::SymCode;

    /// The generated, immutable side of a parser: control constants and the
    /// compressed action/goto tables. Implementations are emitted by the
    /// table generator and carry no state.
    pub trait LrTables {
        const NUM_STATES: usize;
        const NUM_TERMINALS: SymCode;

        const MAX_SHIFT: ActCode;
        const MIN_SHIFT_REDUCE: ActCode;
        const MAX_SHIFT_REDUCE: ActCode;
        const MIN_REDUCE: ActCode;
        const MAX_REDUCE: ActCode;
        const ERROR_ACTION: ActCode;
        const ACCEPT_ACTION: ActCode;
        const NO_ACTION: ActCode;

        /// Compressed action table, parallel to `LOOKAHEAD`.
        const ACTION: &'static [ActCode];
        const LOOKAHEAD: &'static [SymCode];

        const SHIFT_OFFSET: &'static [i32];
        const SHIFT_USE_DEFAULT: i32;
        const SHIFT_OFFSET_MIN: i32;
        const SHIFT_OFFSET_MAX: i32;

        const REDUCE_OFFSET: &'static [i32];
        const REDUCE_USE_DEFAULT: i32;
        const REDUCE_OFFSET_MIN: i32;
        const REDUCE_OFFSET_MAX: i32;

        /// Fallback action per state when the lookup misses.
        const DEFAULT: &'static [ActCode];

        /// Fallback terminal per terminal; 0 means none.
        const FALLBACK: &'static [SymCode];
        const WILDCARD: Option<SymCode>;

        /// Non-terminals declared as error-capture points.
        const ERROR_CAPTURES: &'static [SymCode];

        const RULE_INFO: &'static [RuleInfo];

        /// Names for every symbol, terminals first.
        const SYMBOL_NAME: &'static [&'static str];
        const RULE_NAME: &'static [&'static str];

        fn has_fallback() -> bool {
            !Self::FALLBACK.is_empty()
        }

        fn num_rules() -> usize {
            Self::RULE_INFO.len()
        }

        fn num_action_codes() -> usize {
            Self::ACTION.len()
        }

        fn symbol_name(symbol: SymCode) -> &'static str {
            Self::SYMBOL_NAME.get(symbol as usize).copied().unwrap_or("?")
        }

        fn rule_name(rule: usize) -> &'static str {
            Self::RULE_NAME.get(rule).copied().unwrap_or("?")
        }
    }
}

/// Render the decoded tables, one row per state, one column per symbol.
pub fn overview<T: traits::LrTables>() -> PtTable {
    let mut table = PtTable::new();

    table.add_row(
        ["#".to_string()]
            .into_iter()
            .chain(T::SYMBOL_NAME.iter().map(|name| name.to_string()))
            .collect(),
    );

    for state in 0..T::NUM_STATES {
        let state = state as ActCode;
        table.add_row(
            [state.to_string()]
                .into_iter()
                .chain((0..T::NUM_TERMINALS).map(|terminal| {
                    shift_action::<T>(state, terminal)
                        .ok()
                        .map(|(action, _)| Action::decode::<T>(action))
                        .filter(|action| !matches!(action, Action::Error | Action::None))
                        .map(|action| action.to_string())
                        .unwrap_or_default()
                }))
                .chain((T::NUM_TERMINALS as usize..T::SYMBOL_NAME.len()).map(|symbol| {
                    reduce_action::<T>(state, symbol as SymCode)
                        .ok()
                        .map(|action| Action::decode::<T>(action).to_string())
                        .unwrap_or_default()
                }))
                .collect(),
        );
    }

    table
}
