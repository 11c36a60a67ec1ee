//! `weapons.xml`: weapons and weapon accessories.

use super::gear::UseGearList;
use super::lenient;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeaponsDocument {
    #[serde(default)]
    weapons: WeaponList,
    #[serde(default)]
    accessories: AccessoryList,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WeaponList {
    #[serde(rename = "weapon", default)]
    items: Vec<WeaponTemplate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AccessoryList {
    #[serde(rename = "accessory", default)]
    items: Vec<AccessoryTemplate>,
}

impl WeaponsDocument {
    pub fn weapon(&self, name: &str) -> Option<&WeaponTemplate> {
        self.weapons.items.iter().find(|w| w.name == name)
    }

    pub fn accessory(&self, name: &str) -> Option<&AccessoryTemplate> {
        self.accessories.items.iter().find(|a| a.name == name)
    }

    pub fn weapons(&self) -> &[WeaponTemplate] {
        &self.weapons.items
    }

    pub fn accessories(&self) -> &[AccessoryTemplate] {
        &self.accessories.items
    }
}

/// Gear categories an accessory can hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowGear {
    #[serde(rename = "gearcategory", default)]
    pub categories: Vec<String>,
}

impl AllowGear {
    pub fn allows(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// An accessory bundled with a weapon template.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludedAccessory {
    pub name: String,
    #[serde(default)]
    pub mount: String,
    #[serde(default)]
    pub extramount: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub rating: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct IncludedAccessoryList {
    #[serde(rename = "accessory", default)]
    items: Vec<IncludedAccessory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeaponTemplate {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub weapon_type: String,
    #[serde(default)]
    pub conceal: String,
    #[serde(default)]
    pub accuracy: String,
    #[serde(default)]
    pub reach: String,
    #[serde(default)]
    pub damage: String,
    #[serde(default)]
    pub ap: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub rc: String,
    #[serde(default)]
    pub ammo: String,
    #[serde(default)]
    pub avail: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    accessories: Option<IncludedAccessoryList>,
    #[serde(default)]
    pub translate: Option<String>,
    #[serde(default)]
    pub altpage: Option<String>,
}

impl WeaponTemplate {
    pub fn included_accessories(&self) -> &[IncludedAccessory] {
        self.accessories
            .as_ref()
            .map(|list| list.items.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessoryTemplate {
    pub name: String,
    #[serde(default)]
    pub mount: String,
    #[serde(default)]
    pub extramount: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub rating: i32,
    #[serde(default)]
    pub rc: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub rcdeployable: bool,
    #[serde(default, deserialize_with = "lenient::int")]
    pub rcgroup: i32,
    #[serde(default)]
    pub conceal: String,
    #[serde(default)]
    pub avail: String,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub allowgear: Option<AllowGear>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub ammoslots: i32,
    #[serde(default)]
    pub ammoreplace: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub accuracy: i32,
    #[serde(default)]
    pub dicepool: String,
    #[serde(default)]
    pub damagetype: String,
    #[serde(default)]
    pub damage: String,
    #[serde(default)]
    pub damagereplace: String,
    #[serde(default)]
    pub firemode: String,
    #[serde(default)]
    pub firemodereplace: String,
    #[serde(default)]
    pub ap: String,
    #[serde(default)]
    pub apreplace: String,
    #[serde(default)]
    pub addmode: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub fullburst: i32,
    #[serde(default, deserialize_with = "lenient::int")]
    pub suppressive: i32,
    #[serde(default, deserialize_with = "lenient::int")]
    pub rangebonus: i32,
    #[serde(default)]
    pub extra: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub ammobonus: i32,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub accessorycostmultiplier: Option<i32>,
    #[serde(default)]
    pub gears: Option<UseGearList>,
    #[serde(default)]
    pub translate: Option<String>,
    #[serde(default)]
    pub altpage: Option<String>,
}

#[cfg(test)]
mod tests {
    use crate::testing::sample_registry;

    #[test]
    fn test_parse_accessories() {
        let weapons = sample_registry().weapons().unwrap();

        let smartgun = weapons.accessory("Smartgun System, Internal").unwrap();
        assert_eq!(smartgun.mount, "Internal");
        assert_eq!(smartgun.avail, "2R");
        assert_eq!(smartgun.cost.as_deref(), Some("Weapon Cost * 0.1"));
        assert_eq!(smartgun.accuracy, 2);

        let bipod = weapons.accessory("Bipod").unwrap();
        assert_eq!(bipod.rc, "2");
        assert!(bipod.rcdeployable);
        assert_eq!(bipod.rcgroup, 1);

        assert!(weapons.accessory("Does Not Exist").is_none());
    }

    #[test]
    fn test_parse_use_gear() {
        let weapons = sample_registry().weapons().unwrap();
        let scope = weapons.accessory("Imaging Scope").unwrap();
        let gears = scope.gears.as_ref().unwrap();
        assert_eq!(gears.items.len(), 1);

        let vision = &gears.items[0];
        assert_eq!(vision.name.value, "Vision Magnification");
        assert_eq!(vision.category, "Vision Enhancements");
        assert_eq!(vision.rating, None);
        assert!(scope.allowgear.as_ref().unwrap().allows("Vision Enhancements"));
    }

    #[test]
    fn test_included_accessories() {
        let weapons = sample_registry().weapons().unwrap();
        let rifle = weapons.weapon("Ares Desert Strike").unwrap();
        let included = rifle.included_accessories();
        assert_eq!(included.len(), 1);
        assert_eq!(included[0].name, "Imaging Scope");
        assert_eq!(included[0].mount, "Top");

        let unarmed = weapons.weapon("Unarmed Attack").unwrap();
        assert!(unarmed.included_accessories().is_empty());
    }
}
