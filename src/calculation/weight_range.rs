//! Weight range expressions.
//!
//! Rate tables describe the weights a row applies to as free text such as
//! `"<=20"`, `"(3,20]磅"` or `"≤ 1,000 g"`. Unit text and whitespace are
//! ignored. Accepted forms:
//!
//! - comparisons: `<=N`, `<N`, `>=N`, `>N` (and `≤`, `≥`)
//! - intervals: `(A,B]`, `[A,B]`, `(A,B)`, `[A,B)`; a missing opening
//!   bracket is exclusive, so `3,20]` reads as `(3,20]`
//!
//! Thousands separators are allowed in comparisons only, since a comma
//! separates the two ends of an interval.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// A weight range text that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeParseError {
    /// Nothing left after removing units and whitespace.
    #[error("empty weight range")]
    Empty,
    /// The text matches none of the accepted forms.
    #[error("unrecognized weight range '{0}'")]
    Unrecognized(String),
    /// A bound is not a number.
    #[error("invalid bound '{bound}' in weight range '{text}'")]
    InvalidBound {
        /// The original range text.
        text: String,
        /// The offending bound.
        bound: String,
    },
    /// The lower bound is above the upper bound.
    #[error("weight range '{0}' has its lower bound above its upper bound")]
    Inverted(String),
}

/// One end of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    /// The bound value.
    pub value: Decimal,
    /// Whether the value itself is inside the range.
    pub inclusive: bool,
}

/// A parsed weight range predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightRange {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl WeightRange {
    /// Parses a range from rate table text.
    ///
    /// # Examples
    ///
    /// ```
    /// use fba_fee_engine::calculation::WeightRange;
    /// use rust_decimal::Decimal;
    ///
    /// let range = WeightRange::parse("(3,20]磅").unwrap();
    /// assert!(!range.accepts(Decimal::from(3)));
    /// assert!(range.accepts(Decimal::from(20)));
    /// ```
    pub fn parse(text: &str) -> Result<Self, RangeParseError> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Err(RangeParseError::Empty);
        }

        let comparison = [
            ("<=", false, true),
            (">=", true, true),
            ("<", false, false),
            (">", true, false),
        ]
        .into_iter()
        .find(|(op, _, _)| normalized.starts_with(op));

        if let Some((op, is_lower, inclusive)) = comparison {
            let number = normalized[op.len()..].replace(',', "");
            let bound = Bound {
                value: parse_bound(text, &number)?,
                inclusive,
            };
            return Ok(if is_lower {
                Self { lower: Some(bound), upper: None }
            } else {
                Self { lower: None, upper: Some(bound) }
            });
        }

        parse_interval(text, &normalized)
    }

    /// Returns true if the weight lies inside the range.
    pub fn accepts(&self, weight: Decimal) -> bool {
        let above_lower = self.lower.is_none_or(|b| {
            if b.inclusive { weight >= b.value } else { weight > b.value }
        });
        let below_upper = self.upper.is_none_or(|b| {
            if b.inclusive { weight <= b.value } else { weight < b.value }
        });
        above_lower && below_upper
    }

    /// The lower bound, if any.
    pub fn lower(&self) -> Option<Bound> {
        self.lower
    }

    /// The upper bound, if any.
    pub fn upper(&self) -> Option<Bound> {
        self.upper
    }
}

impl FromStr for WeightRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WeightRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lower, self.upper) {
            (Some(lo), Some(hi)) => write!(
                f,
                "{}{},{}{}",
                if lo.inclusive { '[' } else { '(' },
                lo.value,
                hi.value,
                if hi.inclusive { ']' } else { ')' }
            ),
            (Some(lo), None) => write!(f, "{}{}", if lo.inclusive { ">=" } else { ">" }, lo.value),
            (None, Some(hi)) => write!(f, "{}{}", if hi.inclusive { "<=" } else { "<" }, hi.value),
            (None, None) => f.write_str("*"),
        }
    }
}

/// Parses `text` and tests `weight` against it.
///
/// # Errors
///
/// Returns the parse error for malformed text; callers treat that as a
/// non-match.
pub fn match_weight(text: &str, weight: Decimal) -> Result<bool, RangeParseError> {
    Ok(WeightRange::parse(text)?.accepts(weight))
}

/// Drops unit text and whitespace and folds `≤`/`≥` to ASCII.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '≤' => out.push_str("<="),
            '≥' => out.push_str(">="),
            '0'..='9' | '.' | ',' | '-' | '<' | '>' | '=' | '(' | ')' | '[' | ']' => out.push(ch),
            _ => {}
        }
    }
    out
}

fn parse_bound(text: &str, number: &str) -> Result<Decimal, RangeParseError> {
    Decimal::from_str(number).map_err(|_| RangeParseError::InvalidBound {
        text: text.to_string(),
        bound: number.to_string(),
    })
}

fn parse_interval(text: &str, normalized: &str) -> Result<WeightRange, RangeParseError> {
    let unrecognized = || RangeParseError::Unrecognized(text.to_string());

    let (lower_inclusive, rest) = match normalized.as_bytes().first() {
        Some(b'[') => (true, &normalized[1..]),
        Some(b'(') => (false, &normalized[1..]),
        _ => (false, normalized),
    };
    let (upper_inclusive, body) = match rest.as_bytes().last() {
        Some(b']') => (true, &rest[..rest.len() - 1]),
        Some(b')') => (false, &rest[..rest.len() - 1]),
        _ => return Err(unrecognized()),
    };

    let (lo, hi) = body.split_once(',').ok_or_else(unrecognized)?;
    if hi.contains(',') {
        return Err(unrecognized());
    }

    let lower = Bound {
        value: parse_bound(text, lo)?,
        inclusive: lower_inclusive,
    };
    let upper = Bound {
        value: parse_bound(text, hi)?,
        inclusive: upper_inclusive,
    };
    if lower.value > upper.value {
        return Err(RangeParseError::Inverted(text.to_string()));
    }

    Ok(WeightRange {
        lower: Some(lower),
        upper: Some(upper),
    })
}
