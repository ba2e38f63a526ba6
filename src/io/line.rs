//! Single-line decoding for driver files.
//!
//! Every driver line is one of three things:
//!
//! - `VALUE a b ...` - numeric literals, decoded positionally
//! - `DEFAULT` / `null` - "use the default for this field"
//! - anything else - a file path (first token only)
//!
//! Everything from `!` onward is a comment.

use std::path::Path;

use crate::error::AppError;

pub const COMMENT: char = '!';

pub const KEYWORD_VALUE: &str = "VALUE";
pub const SENTINELS: [&str; 2] = ["DEFAULT", "null"];

/// The classified content of one driver line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineValue {
    /// Numeric literals following `VALUE`, exactly as many as requested.
    Values(Vec<f64>),
    /// `DEFAULT` or `null`.
    Sentinel,
    /// First token of the line, verbatim.
    Path(String),
}

/// One raw line plus where it came from, for error messages.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub source: &'a Path,
    /// 1-based.
    pub number: usize,
    pub text: &'a str,
}

impl<'a> Line<'a> {
    pub fn new(source: &'a Path, number: usize, text: &'a str) -> Self {
        Self { source, number, text }
    }

    /// Whitespace-separated tokens before the comment delimiter.
    pub fn tokens(&self) -> Vec<&'a str> {
        let body = match self.text.find(COMMENT) {
            Some(idx) => &self.text[..idx],
            None => self.text,
        };
        body.split_whitespace().collect()
    }

    pub fn error(&self, message: impl Into<String>) -> AppError {
        AppError::format(self.source, self.number, message)
    }

    /// Classify the line; `count` is how many literals a `VALUE` line must carry.
    pub fn decode(&self, count: usize) -> Result<LineValue, AppError> {
        let tokens = self.tokens();
        let Some((&head, rest)) = tokens.split_first() else {
            return Err(self.error("Expected a value, path or keyword but the line is empty."));
        };

        if head == KEYWORD_VALUE {
            return self.parse_numbers(rest, count).map(LineValue::Values);
        }
        if SENTINELS.contains(&head) {
            return Ok(LineValue::Sentinel);
        }
        Ok(LineValue::Path(head.to_string()))
    }

    /// Decode a line of bare numbers. A leading `VALUE` keyword is tolerated.
    pub fn numbers(&self, count: usize) -> Result<Vec<f64>, AppError> {
        let tokens = self.tokens();
        let rest = match tokens.split_first() {
            Some((&head, rest)) if head == KEYWORD_VALUE => rest,
            _ => &tokens[..],
        };
        self.parse_numbers(rest, count)
    }

    fn parse_numbers(&self, tokens: &[&str], count: usize) -> Result<Vec<f64>, AppError> {
        if tokens.len() < count {
            return Err(self.error(format!(
                "Expected {count} numeric value(s), found {}.",
                tokens.len()
            )));
        }
        if tokens.len() > count {
            tracing::debug!(
                line = self.number,
                ignored = tokens.len() - count,
                "ignoring trailing tokens"
            );
        }

        tokens[..count]
            .iter()
            .map(|tok| parse_f64(tok).ok_or_else(|| self.error(format!("Invalid number '{tok}'."))))
            .collect()
    }
}

/// Parse a finite float. `NaN`/`inf` are rejected.
pub fn parse_f64(token: &str) -> Option<f64> {
    let v = token.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
