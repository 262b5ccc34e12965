use super::table::{traits::LrTables, ActCode};
use crate::error::TableDefect;
use crate::token::SymCode;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Action {
    Shift(ActCode),
    ShiftReduce(usize),
    Reduce(usize),
    Accept,
    Error,
    None,
}

impl Action {
    /// Decode a raw action code against the table's code ranges.
    pub fn decode<T: LrTables>(code: ActCode) -> Self {
        if code <= T::MAX_SHIFT {
            Action::Shift(code)
        } else if (T::MIN_SHIFT_REDUCE..=T::MAX_SHIFT_REDUCE).contains(&code) {
            Action::ShiftReduce((code - T::MIN_SHIFT_REDUCE) as usize)
        } else if (T::MIN_REDUCE..=T::MAX_REDUCE).contains(&code) {
            Action::Reduce((code - T::MIN_REDUCE) as usize)
        } else if code == T::ERROR_ACTION {
            Action::Error
        } else if code == T::ACCEPT_ACTION {
            Action::Accept
        } else {
            Action::None
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Shift(to) => write!(f, "s{}", to),
            Action::ShiftReduce(rule) => write!(f, "sr{}", rule),
            Action::Reduce(rule) => write!(f, "r{}", rule),
            Action::Accept => write!(f, "acc"),
            Action::Error => write!(f, "err"),
            Action::None => write!(f, "-"),
        }
    }
}

/// How a shift lookup resolved, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Via {
    Table,
    Fallback(SymCode),
    Wildcard,
    Default,
    Pending,
}

/// Look up the action for terminal `lookahead` in `state`.
///
/// Misses retry through the lookahead's fallback terminal, then the
/// grammar's wildcard terminal, then the state's default action. States in
/// the reduce range are encoded pending reduces and are returned verbatim.
pub fn shift_action<T: LrTables>(
    state: ActCode,
    lookahead: SymCode,
) -> Result<(ActCode, Via), TableDefect> {
    if state >= T::MIN_REDUCE {
        return Ok((state, Via::Pending));
    }

    let stateno = state as usize;
    debug_assert!(stateno < T::NUM_STATES);

    let mut la = lookahead;
    let mut substitutions = 0;

    loop {
        let offset = match T::SHIFT_OFFSET.get(stateno) {
            Some(&offset) if offset != T::SHIFT_USE_DEFAULT => offset,
            _ => return Ok((default_action::<T>(stateno)?, Via::Default)),
        };
        debug_assert!((T::SHIFT_OFFSET_MIN..=T::SHIFT_OFFSET_MAX).contains(&offset));

        let index = offset + la as i32;
        if (0..T::ACTION.len() as i32).contains(&index) && T::LOOKAHEAD[index as usize] == la {
            let via = if la == lookahead {
                Via::Table
            } else {
                Via::Fallback(la)
            };
            return Ok((T::ACTION[index as usize], via));
        }

        // Fallback terminal. Chains are a single hop; anything longer is a
        // defect in the tables.
        if let Some(&fallback) = T::FALLBACK.get(la as usize) {
            if fallback != 0 {
                substitutions += 1;
                if substitutions > 1 {
                    return Err(TableDefect::FallbackLoop(lookahead));
                }
                la = fallback;
                continue;
            }
        }

        // Wildcard terminal. Never stands in for end-of-input.
        if let Some(wildcard) = T::WILDCARD {
            if la > 0 {
                let index = offset + wildcard as i32;
                if (0..T::ACTION.len() as i32).contains(&index)
                    && T::LOOKAHEAD[index as usize] == wildcard
                {
                    return Ok((T::ACTION[index as usize], Via::Wildcard));
                }
            }
        }

        return Ok((default_action::<T>(stateno)?, Via::Default));
    }
}

/// Look up the goto for non-terminal `lhs` after a reduce under `state`.
/// The tables guarantee a hit; a miss is a defect.
pub fn reduce_action<T: LrTables>(state: ActCode, lhs: SymCode) -> Result<ActCode, TableDefect> {
    let stateno = state as usize;

    let offset = match T::REDUCE_OFFSET.get(stateno) {
        Some(&offset) if offset != T::REDUCE_USE_DEFAULT => offset,
        _ => return Err(TableDefect::MissingGoto(state, lhs)),
    };
    debug_assert!((T::REDUCE_OFFSET_MIN..=T::REDUCE_OFFSET_MAX).contains(&offset));

    let index = offset + lhs as i32;
    if !(0..T::ACTION.len() as i32).contains(&index) || T::LOOKAHEAD[index as usize] != lhs {
        return Err(TableDefect::MissingGoto(state, lhs));
    }

    Ok(T::ACTION[index as usize])
}

fn default_action<T: LrTables>(stateno: usize) -> Result<ActCode, TableDefect> {
    T::DEFAULT
        .get(stateno)
        .copied()
        .ok_or(TableDefect::NoAction(stateno as ActCode))
}
