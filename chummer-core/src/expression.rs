//! Rule expression evaluation.
//!
//! Rule data stores costs, availabilities and attribute ranges as short
//! arithmetic strings such as `Rating*2`, `(Rating * 500) + 100` or `F+1`.
//! Named tokens are substituted textually, then the result is evaluated with a
//! small four-operator grammar:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/' | 'div') factor)*
//! factor := ('+' | '-') factor | number | '(' expr ')'
//! ```

use crate::language::Translator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Token replaced by an item's rating.
pub const RATING: &str = "Rating";
/// Token replaced by the cost of the weapon an accessory is mounted on.
pub const WEAPON_COST: &str = "Weapon Cost";
/// Token replaced by a spirit's or critter's force.
pub const FORCE: &str = "Force";

/// Tokens that stand in for force in critter attribute ranges.
const FORCE_ALIASES: [&str; 3] = ["F", "1D6", "2D6"];

/// Error type for expression parsing and evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("Empty expression")]
    Empty,
    #[error("Unexpected '{found}' at position {position} in {expression:?}")]
    UnexpectedChar {
        found: char,
        position: usize,
        expression: String,
    },
    #[error("Unexpected end of expression: {0:?}")]
    UnexpectedEnd(String),
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),
    #[error("Division by zero in {0:?}")]
    DivisionByZero(String),
    #[error("Result of {0:?} is not a finite number")]
    NotFinite(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

#[derive(Debug, Clone, Copy)]
struct Spanned {
    token: Token,
    position: usize,
}

fn tokenize(expression: &str) -> Result<Vec<Spanned>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = expression.char_indices().peekable();

    while let Some(&(position, ch)) = chars.peek() {
        let token = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value: f64 = literal
                    .parse()
                    .map_err(|_| ExpressionError::InvalidNumber(literal.clone()))?;
                tokens.push(Spanned {
                    token: Token::Number(value),
                    position,
                });
                continue;
            }
            c if c.is_alphabetic() => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphabetic() {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if word == "div" {
                    tokens.push(Spanned {
                        token: Token::Slash,
                        position,
                    });
                    continue;
                }
                return Err(ExpressionError::UnexpectedChar {
                    found: ch,
                    position,
                    expression: expression.to_string(),
                });
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::Open,
            ')' => Token::Close,
            _ => {
                return Err(ExpressionError::UnexpectedChar {
                    found: ch,
                    position,
                    expression: expression.to_string(),
                })
            }
        };
        tokens.push(Spanned { token, position });
        chars.next();
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|s| s.token)
    }

    fn expr(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.term()?;
        while let Some(token) = self.peek() {
            match token {
                Token::Plus => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Token::Minus => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.factor()?;
        while let Some(token) = self.peek() {
            match token {
                Token::Star => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.pos += 1;
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(ExpressionError::DivisionByZero(self.source.to_string()));
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, ExpressionError> {
        let spanned = self
            .tokens
            .get(self.pos)
            .copied()
            .ok_or_else(|| ExpressionError::UnexpectedEnd(self.source.to_string()))?;
        self.pos += 1;

        match spanned.token {
            Token::Number(value) => Ok(value),
            Token::Minus => Ok(-self.factor()?),
            Token::Plus => self.factor(),
            Token::Open => {
                let value = self.expr()?;
                match self.peek() {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(_) => Err(self.unexpected(self.pos)),
                    None => Err(ExpressionError::UnexpectedEnd(self.source.to_string())),
                }
            }
            _ => Err(self.unexpected(self.pos - 1)),
        }
    }

    fn unexpected(&self, index: usize) -> ExpressionError {
        let position = self.tokens[index].position;
        ExpressionError::UnexpectedChar {
            found: self.source[position..].chars().next().unwrap_or(' '),
            position,
            expression: self.source.to_string(),
        }
    }
}

/// Evaluate an arithmetic expression with no substitutions.
pub fn evaluate(expression: &str) -> Result<f64, ExpressionError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        source: expression,
    };
    let value = parser.expr()?;

    if parser.pos < tokens.len() {
        return Err(parser.unexpected(parser.pos));
    }
    if !value.is_finite() {
        return Err(ExpressionError::NotFinite(expression.to_string()));
    }
    Ok(value)
}

/// A raw rule string together with the values substituted into it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleExpression {
    raw: String,
    substitutions: Vec<(String, String)>,
}

impl RuleExpression {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            substitutions: Vec::new(),
        }
    }

    /// Replace every occurrence of `token` with `value` before evaluating.
    pub fn with(mut self, token: impl Into<String>, value: impl fmt::Display) -> Self {
        self.substitutions.push((token.into(), value.to_string()));
        self
    }

    pub fn with_rating(self, rating: i32) -> Self {
        self.with(RATING, rating)
    }

    /// Substitute `Force` and its dice aliases with a force value.
    pub fn with_force(self, force: i32) -> Self {
        FORCE_ALIASES
            .iter()
            .fold(self.with(FORCE, force), |expr, alias| expr.with(*alias, force))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The expression text after substitution.
    ///
    /// Longer tokens are replaced first so `Force` is never clobbered by `F`.
    pub fn substituted(&self) -> String {
        let mut ordered: Vec<&(String, String)> = self.substitutions.iter().collect();
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        ordered
            .into_iter()
            .filter(|(token, _)| !token.is_empty())
            .fold(self.raw.clone(), |text, (token, value)| {
                text.replace(token.as_str(), value)
            })
    }

    pub fn mentions(&self, token: &str) -> bool {
        self.raw.contains(token)
    }

    pub fn evaluate(&self) -> Result<f64, ExpressionError> {
        evaluate(&self.substituted())
    }

    /// Evaluate, treating any failure as zero.
    pub fn evaluate_or_zero(&self) -> f64 {
        match self.evaluate() {
            Ok(value) => value,
            Err(error) => {
                tracing::debug!(expression = %self.raw, %error, "rule expression evaluated as 0");
                0.0
            }
        }
    }

    /// Evaluate and round up, treating any failure as zero.
    pub fn ceiling_or_zero(&self) -> i32 {
        self.evaluate_or_zero().ceil() as i32
    }
}

impl FromStr for RuleExpression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = RuleExpression::new(s);
        expr.evaluate()?;
        Ok(expr)
    }
}

impl fmt::Display for RuleExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Legal category carried by an availability suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Restriction {
    #[default]
    Legal,
    Restricted,
    Forbidden,
}

impl Restriction {
    pub fn from_suffix(suffix: char) -> Option<Restriction> {
        match suffix {
            'R' => Some(Restriction::Restricted),
            'F' => Some(Restriction::Forbidden),
            _ => None,
        }
    }

    pub fn suffix(&self) -> Option<char> {
        match self {
            Restriction::Legal => None,
            Restriction::Restricted => Some('R'),
            Restriction::Forbidden => Some('F'),
        }
    }

    /// Language key for the localized suffix.
    pub fn string_key(&self) -> Option<&'static str> {
        match self {
            Restriction::Legal => None,
            Restriction::Restricted => Some("String_AvailRestricted"),
            Restriction::Forbidden => Some("String_AvailForbidden"),
        }
    }
}

/// Strip a trailing `F`/`R` flag from a raw availability string.
pub fn split_restriction(raw: &str) -> (&str, Restriction) {
    let trimmed = raw.trim();
    match trimmed.chars().last().and_then(Restriction::from_suffix) {
        Some(restriction) => (&trimmed[..trimmed.len() - 1], restriction),
        None => (trimmed, Restriction::Legal),
    }
}

/// An evaluated availability value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Availability {
    pub value: i32,
    pub restriction: Restriction,
}

impl Availability {
    /// Evaluate a raw availability string against a rating.
    ///
    /// Malformed values evaluate to 0 and keep their restriction flag.
    pub fn evaluate(raw: &str, rating: i32) -> Availability {
        let (body, restriction) = split_restriction(raw);
        let value = RuleExpression::new(body)
            .with_rating(rating)
            .ceiling_or_zero();
        Availability { value, restriction }
    }

    /// Display text with the localized restriction suffix.
    pub fn display(&self, translator: &dyn Translator) -> String {
        match self.restriction.string_key() {
            Some(key) => format!("{}{}", self.value, translator.get_string(key)),
            None => self.value.to_string(),
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.restriction.suffix() {
            Some(suffix) => write!(f, "{}{}", self.value, suffix),
            None => write!(f, "{}", self.value),
        }
    }
}

/// Evaluate a critter attribute range expression for a given force.
///
/// The result is shifted by `offset` and clamped to at least 1 for a
/// positive force, at least 0 otherwise.
pub fn attribute_value(raw: &str, force: i32, offset: i32) -> i32 {
    let value = RuleExpression::new(raw).with_force(force).ceiling_or_zero() + offset;
    let floor = if force > 0 { 1 } else { 0 };
    value.max(floor)
}
