//! Fee expression evaluation.
//!
//! A rate table fee cell is either a plain amount such as `"$12.50"` or a
//! small arithmetic formula over the matched weight, e.g.
//! `"6.92+0.08*(发货重量-3)*2"`. Commas are thousands separators.
//!
//! Formulas are evaluated by a restricted recursive-descent evaluator that
//! knows numbers, the weight placeholder, `+ - * /`, unary minus and
//! parentheses. Nothing else is accepted.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Currency symbols removed before parsing.
pub const CURRENCY_SYMBOLS: [char; 5] = ['$', '£', '€', '¥', '￥'];

/// Decimal places fee formulas are rounded to.
pub const FEE_DECIMAL_PLACES: u32 = 2;

const MAX_NESTING: usize = 32;

/// Why a fee cell could not be turned into an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeExpressionError {
    /// The cell is blank after cleanup.
    #[error("empty fee text")]
    Empty,
    /// A character outside the formula alphabet.
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar {
        /// The character.
        ch: char,
        /// Byte offset in the cleaned text.
        offset: usize,
    },
    /// A numeric literal that does not parse.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    /// The formula ends before it is complete.
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    /// A token where it is not allowed.
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    /// Parentheses nested too deeply.
    #[error("formula nested too deeply")]
    TooDeep,
    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// An intermediate value left the decimal range.
    #[error("arithmetic overflow")]
    Overflow,
    /// The amount is below zero.
    #[error("negative fee {0}")]
    NegativeFee(Decimal),
}

/// A parsed fee cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeExpression {
    /// A fixed amount, used verbatim.
    Literal(Decimal),
    /// A formula over the weight placeholder, cleaned of currency symbols
    /// and thousands separators.
    Formula(String),
}

impl FeeExpression {
    /// Parses a fee cell.
    ///
    /// # Errors
    ///
    /// Returns [`FeeExpressionError::Empty`] for a blank cell and
    /// [`FeeExpressionError::NegativeFee`] for a negative plain amount.
    /// Formula syntax is only checked by [`FeeExpression::evaluate`].
    pub fn parse(text: &str) -> Result<Self, FeeExpressionError> {
        let cleaned: String = text
            .chars()
            .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',')
            .collect();
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Err(FeeExpressionError::Empty);
        }

        match Decimal::from_str(cleaned) {
            Ok(amount) if amount.is_sign_negative() && !amount.is_zero() => {
                Err(FeeExpressionError::NegativeFee(amount))
            }
            Ok(amount) => Ok(FeeExpression::Literal(amount)),
            Err(_) => Ok(FeeExpression::Formula(cleaned.to_string())),
        }
    }

    /// Evaluates the fee for a matched weight.
    ///
    /// Literals are returned as written. Formula results are rounded to two
    /// decimal places, half away from zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use fba_fee_engine::calculation::FeeExpression;
    /// use rust_decimal::Decimal;
    ///
    /// let placeholders = vec!["发货重量".to_string()];
    /// let fee = FeeExpression::parse("0.40+0.10*发货重量").unwrap();
    /// assert_eq!(fee.evaluate(Decimal::from(5), &placeholders).unwrap(), Decimal::new(90, 2));
    /// ```
    pub fn evaluate(&self, weight: Decimal, placeholders: &[String]) -> Result<Decimal, FeeExpressionError> {
        match self {
            FeeExpression::Literal(amount) => Ok(*amount),
            FeeExpression::Formula(formula) => {
                let tokens = tokenize(formula, placeholders)?;
                let value = Parser::new(&tokens, weight).parse()?;
                let rounded =
                    value.round_dp_with_strategy(FEE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
                if rounded.is_zero() {
                    Ok(Decimal::ZERO)
                } else if rounded.is_sign_negative() {
                    Err(FeeExpressionError::NegativeFee(rounded))
                } else {
                    Ok(rounded)
                }
            }
        }
    }
}

/// Parses and evaluates a fee cell in one step.
pub fn evaluate_fee(text: &str, weight: Decimal, placeholders: &[String]) -> Result<Decimal, FeeExpressionError> {
    FeeExpression::parse(text)?.evaluate(weight, placeholders)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Number(Decimal),
    Weight,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn describe(self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Weight => "<weight>".to_string(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        }
    }
}

fn tokenize(formula: &str, placeholders: &[String]) -> Result<Vec<Token>, FeeExpressionError> {
    // Longest placeholder first so a placeholder containing another wins.
    let mut placeholders: Vec<&str> = placeholders
        .iter()
        .map(|p| p.as_str())
        .filter(|p| !p.is_empty())
        .collect();
    placeholders.sort_by_key(|p| std::cmp::Reverse(p.len()));

    let mut tokens = Vec::new();
    let mut offset = 0;

    while offset < formula.len() {
        let rest = &formula[offset..];

        if let Some(placeholder) = placeholders.iter().find(|p| rest.starts_with(**p)) {
            tokens.push(Token::Weight);
            offset += placeholder.len();
            continue;
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };

        if ch.is_ascii_digit() || ch == '.' {
            let len = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(rest.len());
            let literal = &rest[..len];
            let value = Decimal::from_str(literal)
                .map_err(|_| FeeExpressionError::InvalidNumber(literal.to_string()))?;
            tokens.push(Token::Number(value));
            offset += len;
            continue;
        }

        let token = match ch {
            c if c.is_whitespace() => None,
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' | '×' => Some(Token::Star),
            '/' | '÷' => Some(Token::Slash),
            '(' | '（' => Some(Token::LParen),
            ')' | '）' => Some(Token::RParen),
            _ => return Err(FeeExpressionError::UnexpectedChar { ch, offset }),
        };
        tokens.extend(token);
        offset += ch.len_utf8();
    }

    Ok(tokens)
}

/// Recursive-descent evaluator:
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := unary (('*' | '/') unary)*
/// unary  := ('-' | '+') unary | primary
/// primary:= number | weight | '(' expr ')'
/// ```
struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    weight: Decimal,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], weight: Decimal) -> Self {
        Self {
            tokens,
            position: 0,
            weight,
            depth: 0,
        }
    }

    fn parse(mut self) -> Result<Decimal, FeeExpressionError> {
        if self.tokens.is_empty() {
            return Err(FeeExpressionError::Empty);
        }
        let value = self.expr()?;
        match self.peek() {
            None => Ok(value),
            Some(token) => Err(FeeExpressionError::UnexpectedToken(token.describe())),
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.position).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<Decimal, FeeExpressionError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.position += 1;
            let rhs = self.term()?;
            value = match op {
                Token::Plus => value.checked_add(rhs),
                _ => value.checked_sub(rhs),
            }
            .ok_or(FeeExpressionError::Overflow)?;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<Decimal, FeeExpressionError> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.position += 1;
            let rhs = self.unary()?;
            value = match op {
                Token::Star => value.checked_mul(rhs).ok_or(FeeExpressionError::Overflow)?,
                _ => {
                    if rhs.is_zero() {
                        return Err(FeeExpressionError::DivisionByZero);
                    }
                    value.checked_div(rhs).ok_or(FeeExpressionError::Overflow)?
                }
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<Decimal, FeeExpressionError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.position += 1;
                let value = self.nested(Self::unary)?;
                Ok(-value)
            }
            Some(Token::Plus) => {
                self.position += 1;
                self.nested(Self::unary)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Decimal, FeeExpressionError> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Weight) => Ok(self.weight),
            Some(Token::LParen) => {
                let value = self.nested(Self::expr)?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(token) => Err(FeeExpressionError::UnexpectedToken(token.describe())),
                    None => Err(FeeExpressionError::UnexpectedEnd),
                }
            }
            Some(token) => Err(FeeExpressionError::UnexpectedToken(token.describe())),
            None => Err(FeeExpressionError::UnexpectedEnd),
        }
    }

    fn nested(
        &mut self,
        rule: fn(&mut Self) -> Result<Decimal, FeeExpressionError>,
    ) -> Result<Decimal, FeeExpressionError> {
        if self.depth >= MAX_NESTING {
            return Err(FeeExpressionError::TooDeep);
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }
}
