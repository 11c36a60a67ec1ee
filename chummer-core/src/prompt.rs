//! Interactive choices the caller supplies.
//!
//! The core never shows dialogs. Anything that needs a user decision takes one
//! of these traits; returning `None` (or `false`) means the user cancelled.

use crate::language::Translator;
use std::path::PathBuf;

/// Largest cost a variable-cost item may be given.
pub const MAX_VARIABLE_COST: f64 = 1_000_000.0;

/// A request for a number within bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberRequest {
    pub description: String,
    pub minimum: f64,
    pub maximum: f64,
    /// Decimal places the answer is rounded to.
    pub decimals: usize,
    pub allow_cancel: bool,
}

impl NumberRequest {
    /// Clamp and round an answer to this request's bounds.
    pub fn normalize(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.decimals as i32);
        let rounded = (value * scale).round() / scale;
        rounded.clamp(self.minimum, self.maximum)
    }
}

/// Asks the user for a number.
pub trait NumberPrompt {
    fn pick_number(&mut self, request: &NumberRequest) -> Option<f64>;
}

/// Asks the user where to save a file.
pub trait SavePrompt {
    /// `suggested` is a bare file name such as `Spirit of Fire (Force 4).chum5`.
    fn pick_save_path(&mut self, suggested: &str) -> Option<PathBuf>;
}

/// Asks the user a yes/no question.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str, title: &str) -> bool;
}

/// Bounds parsed from a `Variable(...)` cost string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableCost {
    pub minimum: f64,
    /// `None` for an open range such as `Variable(+100)`.
    pub maximum: Option<f64>,
}

impl VariableCost {
    /// Parse `Variable(100-500)` or `Variable(+100)`. Anything else is `None`.
    pub fn parse(cost: &str) -> Option<VariableCost> {
        let inner = cost
            .trim()
            .strip_prefix("Variable")?
            .trim_matches(|c| c == '(' || c == ')');

        match inner.split_once('-') {
            Some((min, max)) => Some(VariableCost {
                minimum: min.trim().parse().ok()?,
                maximum: Some(max.trim().parse().ok()?),
            }),
            None => Some(VariableCost {
                minimum: inner.trim().trim_start_matches('+').parse().ok()?,
                maximum: None,
            }),
        }
    }

    /// A range with no lower bound and no upper bound has nothing to ask.
    pub fn needs_prompt(&self) -> bool {
        self.minimum != 0.0 || self.maximum.is_some()
    }

    /// The upper bound offered to the user.
    pub fn clamped_maximum(&self) -> f64 {
        self.maximum
            .unwrap_or(MAX_VARIABLE_COST)
            .min(MAX_VARIABLE_COST)
    }
}

/// Ask for the cost of an item whose template cost is `Variable(...)`.
///
/// Returns `None` when the cost is not variable, the range has nothing to
/// choose, or the user cancelled. The caller passes the result to
/// `CreateOptions::variable_cost`.
pub fn resolve_variable_cost(
    template_cost: &str,
    display_name: &str,
    prompt: &mut dyn NumberPrompt,
    translator: &dyn Translator,
    decimals: usize,
) -> Option<f64> {
    let range = VariableCost::parse(template_cost)?;
    if !range.needs_prompt() {
        return None;
    }

    let request = NumberRequest {
        description: translator
            .get_string("String_SelectVariableCost")
            .replace("{0}", display_name),
        minimum: range.minimum,
        maximum: range.clamped_maximum().max(range.minimum),
        decimals,
        allow_cancel: false,
    };
    let value = prompt.pick_number(&request)?;
    Some(request.normalize(value))
}
