//! Runtime equipment created from rule-data templates.
//!
//! Entities are created from a template plus [`CreateOptions`], edited through
//! setters, and written to / read from XML save fragments. Identifiers are
//! fixed at creation; only a copy-load gives an entity a new one.

mod accessory;
mod gear;
mod weapon;

pub use accessory::{ParentWeapon, WeaponAccessory};
pub use gear::{Gear, GearKind, GearList};
pub use weapon::{AccessoryList, Weapon};

use crate::prompt::VariableCost;

/// Multiplier applied to discounted costs.
pub const DISCOUNT: f64 = 0.9;

/// Per-instance choices made when creating an entity from a template.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOptions {
    pub rating: i32,
    pub mount: String,
    pub extra_mount: String,
    /// Force the cost to `"0"`, e.g. for bundled items.
    pub skip_cost: bool,
    /// Instantiate bundled child gear.
    pub create_children: bool,
    /// Cost chosen for a `Variable(...)` template, see
    /// [`resolve_variable_cost`](crate::prompt::resolve_variable_cost).
    pub variable_cost: Option<f64>,
    /// Value fixed by the template that bundles this one (`select` attribute).
    pub forced_value: Option<String>,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            rating: 0,
            mount: String::new(),
            extra_mount: String::new(),
            skip_cost: false,
            create_children: true,
            variable_cost: None,
            forced_value: None,
        }
    }
}

impl CreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rating(mut self, rating: i32) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_mount(mut self, mount: impl Into<String>, extra_mount: impl Into<String>) -> Self {
        self.mount = mount.into();
        self.extra_mount = extra_mount.into();
        self
    }

    pub fn with_skip_cost(mut self, skip_cost: bool) -> Self {
        self.skip_cost = skip_cost;
        self
    }

    pub fn with_create_children(mut self, create_children: bool) -> Self {
        self.create_children = create_children;
        self
    }

    pub fn with_variable_cost(mut self, cost: f64) -> Self {
        self.variable_cost = Some(cost);
        self
    }

    pub fn with_forced_value(mut self, value: impl Into<String>) -> Self {
        self.forced_value = Some(value.into());
        self
    }
}

/// The cost string an entity starts with.
///
/// `Variable(...)` costs become the resolved value, or the range minimum when
/// nothing was resolved.
pub(crate) fn initial_cost(template_cost: &str, options: &CreateOptions) -> String {
    if options.skip_cost {
        return "0".to_string();
    }
    match VariableCost::parse(template_cost) {
        Some(range) => options
            .variable_cost
            .unwrap_or(range.minimum)
            .to_string(),
        None => template_cost.to_string(),
    }
}
