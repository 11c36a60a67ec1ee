//! Runtime settings for rule evaluation and output.

use crate::language::DEFAULT_LANGUAGE;
use std::path::PathBuf;

/// Offsets used when deriving critter attribute limits from a metatype.
///
/// Ordinary spirits only define a minimum per attribute; the maximum and
/// augmented maximum are derived from that minimum with these offsets.
/// Metatypes named `ally_spirit` use their own min/max/aug expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CritterLimitRules {
    pub min_offset: i32,
    pub max_offset: i32,
    pub aug_offset: i32,
    pub ally_spirit: String,
    /// Force needed per optional power slot.
    pub force_per_optional_power: i32,
}

impl Default for CritterLimitRules {
    fn default() -> Self {
        Self {
            min_offset: -3,
            max_offset: 3,
            aug_offset: 3,
            ally_spirit: "Ally Spirit".to_string(),
            force_per_optional_power: 3,
        }
    }
}

/// Settings shared by every rules operation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Active display language.
    pub language: String,

    /// Directory holding the rule-data XML files.
    pub data_dir: PathBuf,

    /// Re-read rule data on every access instead of caching it.
    pub live_custom_data: bool,

    /// Decimal places shown for nuyen amounts.
    pub nuyen_decimals: usize,

    /// Include notes in printed output.
    pub print_notes: bool,

    /// Rules for critter attribute limits.
    pub critter_rules: CritterLimitRules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            data_dir: PathBuf::from("data"),
            live_custom_data: false,
            nuyen_decimals: 0,
            print_notes: false,
            critter_rules: CritterLimitRules::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from `CHUMMER_*` environment variables.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(language) = std::env::var("CHUMMER_LANGUAGE") {
            settings.language = language;
        }
        if let Ok(dir) = std::env::var("CHUMMER_DATA_DIR") {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Ok(value) = std::env::var("CHUMMER_LIVE_DATA") {
            settings.live_custom_data = parse_flag(&value);
        }
        if let Ok(value) = std::env::var("CHUMMER_PRINT_NOTES") {
            settings.print_notes = parse_flag(&value);
        }
        if let Some(decimals) = std::env::var("CHUMMER_NUYEN_DECIMALS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            settings.nuyen_decimals = decimals;
        }

        settings
    }

    /// Set the display language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the rule-data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Re-read rule data on every access.
    pub fn with_live_custom_data(mut self, live: bool) -> Self {
        self.live_custom_data = live;
        self
    }

    /// Set the number of decimals shown for nuyen.
    pub fn with_nuyen_decimals(mut self, decimals: usize) -> Self {
        self.nuyen_decimals = decimals;
        self
    }

    /// Include notes in printed output.
    pub fn with_print_notes(mut self, print_notes: bool) -> Self {
        self.print_notes = print_notes;
        self
    }

    /// Replace the critter attribute limit rules.
    pub fn with_critter_rules(mut self, rules: CritterLimitRules) -> Self {
        self.critter_rules = rules;
        self
    }

    pub fn is_default_language(&self) -> bool {
        self.language.eq_ignore_ascii_case(DEFAULT_LANGUAGE)
    }

    /// Format a nuyen amount with the configured decimals.
    pub fn format_nuyen(&self, amount: f64) -> String {
        format!("{:.*}", self.nuyen_decimals, amount)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
