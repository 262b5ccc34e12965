use regex::Regex;

use crate::error::{ErrorKind, PatternError, ZestError};
use crate::span::{Cursor, Span};
use crate::ZestResult;

/// A single tokenization rule. Rules are tried in order; the first rule
/// matching at least one character wins, regardless of match length.
pub enum Rule<T> {
    /// Matches the exact text. `data: None` consumes the match silently.
    Literal { text: String, data: Option<T> },
    /// Matches the anchored pattern at the cursor. The action produces the
    /// token data; `None` consumes the match silently.
    Regex {
        pattern: Regex,
        action: Box<dyn Fn(&str) -> Option<T>>,
    },
}

impl<T> Rule<T> {
    pub fn literal(text: impl Into<String>, data: T) -> Self {
        Self::Literal {
            text: text.into(),
            data: Some(data),
        }
    }

    pub fn regex<F>(pattern: &str, action: F) -> Result<Self, PatternError>
    where
        F: Fn(&str) -> Option<T> + 'static,
    {
        let pattern = Regex::new(&format!(r"\A(?:{pattern})"))?;
        Ok(Self::Regex {
            pattern,
            action: Box::new(action),
        })
    }
}

pub struct Lexer<T> {
    rules: Vec<Rule<T>>,
    position: Cursor,
}

impl<T: Clone> Lexer<T> {
    pub fn new(rules: Vec<Rule<T>>) -> Self {
        Self {
            rules,
            position: Cursor::default(),
        }
    }

    /// Start of the most recent token, or the end of the consumed input.
    pub fn current_position(&self) -> Cursor {
        self.position
    }

    /// Tokenize `input`, aborting on the first position where no rule
    /// matches.
    pub fn tokenize<E, F>(&mut self, input: &str, mut on_token: F) -> ZestResult<(), E>
    where
        F: FnMut(T, Span) -> ZestResult<(), E>,
    {
        self.scan(input, &mut on_token, None)
    }

    /// Tokenize `input`, reporting each unmatched region through `on_error`
    /// and resuming at the next offset where some rule matches.
    pub fn tokenize_with_recovery<E, F, H>(
        &mut self,
        input: &str,
        mut on_token: F,
        mut on_error: H,
    ) -> ZestResult<(), E>
    where
        F: FnMut(T, Span) -> ZestResult<(), E>,
        H: FnMut(Cursor) -> ZestResult<(), E>,
    {
        self.scan(input, &mut on_token, Some(&mut on_error))
    }

    fn scan<E>(
        &mut self,
        input: &str,
        on_token: &mut dyn FnMut(T, Span) -> ZestResult<(), E>,
        mut on_error: Option<&mut dyn FnMut(Cursor) -> ZestResult<(), E>>,
    ) -> ZestResult<(), E> {
        let mut cursor = Cursor::default();
        self.position = cursor;

        while cursor.offset < input.len() {
            self.position = cursor;

            match self.match_at(input, cursor.offset) {
                Some((len, data)) => {
                    let from = cursor;
                    cursor.advance(&input[cursor.offset..cursor.offset + len]);
                    if let Some(data) = data {
                        on_token(data, Span::new(from, cursor))?;
                    }
                }
                None => {
                    let Some(on_error) = on_error.as_deref_mut() else {
                        return Err(ZestError::new(
                            ErrorKind::NoMatchingRule {
                                remaining: input[cursor.offset..].to_string(),
                            },
                            Some(cursor),
                        ));
                    };

                    on_error(cursor)?;

                    // Resume at the next offset where some rule matches.
                    while cursor.offset < input.len()
                        && self.match_at(input, cursor.offset).is_none()
                    {
                        let Some(ch) = input[cursor.offset..].chars().next() else {
                            break;
                        };
                        cursor += ch;
                    }
                }
            }
        }

        self.position = cursor;
        Ok(())
    }

    fn match_at(&self, input: &str, offset: usize) -> Option<(usize, Option<T>)> {
        let rest = &input[offset..];

        for rule in &self.rules {
            match rule {
                Rule::Literal { text, data } => {
                    if !text.is_empty() && rest.starts_with(text.as_str()) {
                        return Some((text.len(), data.clone()));
                    }
                }
                Rule::Regex { pattern, action } => {
                    if let Some(found) = pattern.find(rest) {
                        if found.end() > 0 {
                            return Some((found.end(), action(found.as_str())));
                        }
                    }
                }
            }
        }

        None
    }
}
