//! Shadowrun rule-data engine.
//!
//! This crate provides:
//! - A rule-expression evaluator for costs, availabilities and ratings
//! - Typed rule-data documents loaded from Chummer XML files
//! - Weapons, weapon accessories and gear created from those templates
//! - Spirits, sprites and critter characters
//! - XML save files and print views
//!
//! # Quick Start
//!
//! ```ignore
//! use chummer_core::{CreateOptions, RulesContext, Settings, Weapon, WeaponAccessory};
//!
//! let ctx = RulesContext::from_settings(Settings::from_env());
//! let mut pistol = Weapon::create_named("Ares Predator V", &CreateOptions::new(), &ctx)?;
//! let grip = WeaponAccessory::create_named("Bipod", &CreateOptions::new(), &ctx)?;
//! pistol.add_accessory(grip);
//! println!("{}", pistol.total_cost());
//! ```

pub mod config;
pub mod context;
pub mod critter;
pub mod equipment;
pub mod expression;
pub mod id;
pub mod language;
pub mod persist;
pub mod print;
pub mod prompt;
pub mod spirit;
pub mod templates;
pub mod testing;

// Primary public API
pub use config::{CritterLimitRules, Settings};
pub use context::RulesContext;
pub use critter::{Attribute, Critter, CritterError, CritterFactory, CritterRequest};
pub use equipment::{CreateOptions, Gear, GearKind, ParentWeapon, Weapon, WeaponAccessory};
pub use expression::{evaluate, Availability, ExpressionError, Restriction, RuleExpression};
pub use id::EntityId;
pub use language::{LanguageManager, Translator};
pub use persist::{PersistError, SavedCritter};
pub use print::{AccessoryPrint, GearPrint};
pub use prompt::{resolve_variable_cost, ConfirmPrompt, NumberPrompt, SavePrompt};
pub use spirit::{spirit_options, Spirit, SpiritListOptions, SpiritRoster, SpiritType};
pub use templates::{TemplateError, TemplateRegistry};
