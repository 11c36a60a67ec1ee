//! `gear.xml`: general gear, plus the `usegear` references other templates
//! use to bundle gear.

use super::lenient;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GearDocument {
    #[serde(default)]
    gears: GearList,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GearList {
    #[serde(rename = "gear", default)]
    items: Vec<GearTemplate>,
}

impl GearDocument {
    /// Find gear by name, and by category when one is given.
    pub fn find(&self, name: &str, category: Option<&str>) -> Option<&GearTemplate> {
        self.gears
            .items
            .iter()
            .find(|g| g.name == name && category.map_or(true, |c| g.category == c))
    }

    pub fn all(&self) -> &[GearTemplate] {
        &self.gears.items
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GearTemplate {
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Maximum rating.
    #[serde(default, deserialize_with = "lenient::int")]
    pub rating: i32,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub minrating: Option<i32>,
    #[serde(default)]
    pub devicerating: Option<String>,
    #[serde(default)]
    pub capacity: String,
    #[serde(default)]
    pub avail: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub gears: Option<UseGearList>,
    #[serde(default)]
    pub translate: Option<String>,
    #[serde(default)]
    pub altpage: Option<String>,
}

impl GearTemplate {
    /// Templates with a device rating become commlink-like devices.
    pub fn is_device(&self) -> bool {
        self.devicerating
            .as_deref()
            .map_or(false, |r| !r.trim().is_empty())
    }
}

/// A `<gears>` block of `<usegear>` references.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UseGearList {
    #[serde(rename = "usegear", default)]
    pub items: Vec<UseGear>,
}

/// Reference to a gear template bundled inside another template.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UseGear {
    pub name: UseGearName,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub rating: Option<i32>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub capacity: Option<String>,
}

/// The `<name>` element of a `usegear`, with its instantiation attributes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UseGearName {
    #[serde(rename = "@qty", default)]
    pub qty: Option<String>,
    #[serde(rename = "@select", default)]
    pub select: Option<String>,
    #[serde(rename = "@startcollapsed", default)]
    pub startcollapsed: Option<String>,
    #[serde(rename = "@createchildren", default)]
    pub createchildren: Option<String>,
    #[serde(rename = "@addimprovements", default)]
    pub addimprovements: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

impl UseGearName {
    pub fn quantity(&self) -> f64 {
        self.qty
            .as_deref()
            .and_then(|q| q.trim().parse().ok())
            .unwrap_or(1.0)
    }

    pub fn creates_children(&self) -> bool {
        self.createchildren.as_deref() != Some("no")
    }

    pub fn starts_collapsed(&self) -> bool {
        self.startcollapsed.as_deref() == Some("yes")
    }
}
