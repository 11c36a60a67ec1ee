//! Printable views of equipment.
//!
//! Print fragments are denormalized: every value is already computed and
//! formatted for the active language and settings.

use crate::context::RulesContext;
use crate::equipment::{Gear, ParentWeapon, WeaponAccessory};
use crate::persist::{to_xml, PersistError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessoryPrint {
    pub name: String,
    pub mount: String,
    pub extramount: String,
    pub rc: String,
    pub conceal: i32,
    pub avail: String,
    pub cost: String,
    pub owncost: String,
    pub included: bool,
    pub source: String,
    pub page: String,
    pub accuracy: i32,
    #[serde(skip_serializing_if = "PrintGears::is_empty")]
    pub gears: PrintGears,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrintGears {
    #[serde(rename = "gear")]
    pub items: Vec<GearPrint>,
}

impl PrintGears {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GearPrint {
    pub name: String,
    pub category: String,
    pub rating: i32,
    pub qty: f64,
    pub avail: String,
    pub cost: String,
    pub owncost: String,
    pub source: String,
    pub page: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub extra: String,
    #[serde(skip_serializing_if = "PrintGears::is_empty")]
    pub gears: PrintGears,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AccessoryPrint {
    pub fn new(accessory: &WeaponAccessory, weapon: &ParentWeapon, ctx: &RulesContext) -> Self {
        let settings = ctx.settings();
        let translator = ctx.translator();
        Self {
            name: accessory.display_name().to_string(),
            mount: accessory.mount().to_string(),
            extramount: accessory.extra_mount().to_string(),
            rc: accessory.rc().to_string(),
            conceal: accessory.concealability(),
            avail: accessory.total_avail().display(translator),
            cost: settings.format_nuyen(accessory.total_cost(weapon)),
            owncost: settings.format_nuyen(accessory.own_cost(weapon)),
            included: accessory.included_in_weapon(),
            source: translator.book_code(accessory.source()),
            page: accessory.page().to_string(),
            accuracy: accessory.accuracy(),
            gears: PrintGears {
                items: accessory.gear().iter().map(|g| GearPrint::new(g, ctx)).collect(),
            },
            notes: settings
                .print_notes
                .then(|| accessory.notes().to_string())
                .filter(|n| !n.is_empty()),
        }
    }

    pub fn to_xml(&self) -> Result<String, PersistError> {
        to_xml("accessory", self)
    }
}

impl GearPrint {
    pub fn new(gear: &Gear, ctx: &RulesContext) -> Self {
        let settings = ctx.settings();
        let translator = ctx.translator();
        Self {
            name: gear.display_name(translator),
            category: gear.category().to_string(),
            rating: gear.rating(),
            qty: gear.quantity(),
            avail: gear.total_avail().display(translator),
            cost: settings.format_nuyen(gear.total_cost()),
            owncost: settings.format_nuyen(gear.own_cost()),
            source: translator.book_code(gear.source()),
            page: gear.page().to_string(),
            extra: gear.extra().to_string(),
            gears: PrintGears {
                items: gear.children().iter().map(|g| GearPrint::new(g, ctx)).collect(),
            },
            notes: settings
                .print_notes
                .then(|| gear.notes().to_string())
                .filter(|n| !n.is_empty()),
        }
    }

    pub fn to_xml(&self) -> Result<String, PersistError> {
        to_xml("gear", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::equipment::{CreateOptions, Weapon};
    use crate::language::LanguageManager;
    use crate::testing::{sample_context, sample_registry};
    use std::sync::Arc;

    #[test]
    fn test_accessory_print() {
        let ctx = sample_context();
        let predator = Weapon::create_named("Ares Predator V", &CreateOptions::new(), &ctx).unwrap();
        let mut components = WeaponAccessory::create_named(
            "Ceramic/Plasteel Components",
            &CreateOptions::new().with_rating(2),
            &ctx,
        )
        .unwrap();
        components.set_notes("Ordered from Hardy's");

        let print = AccessoryPrint::new(&components, &predator.as_parent(), &ctx);
        assert_eq!(print.name, "Ceramic/Plasteel Components");
        assert_eq!(print.conceal, -2);
        assert_eq!(print.avail, "4F");
        assert_eq!(print.cost, "145");
        assert_eq!(print.owncost, "145");
        assert!(!print.included);
        assert_eq!(print.notes, None);

        let xml = print.to_xml().unwrap();
        assert!(xml.contains("<avail>4F</avail>"));
        assert!(!xml.contains("<notes>"));
    }

    #[test]
    fn test_notes_printed_when_enabled() {
        let ctx = RulesContext::new(
            Arc::new(sample_registry()),
            Settings::new().with_print_notes(true).with_nuyen_decimals(2),
            LanguageManager::english(),
        );
        let mut flashlight =
            Gear::create_named("Flashlight", Some("Survival Gear"), &CreateOptions::new(), &ctx).unwrap();
        flashlight.set_notes("Red lens");

        let print = GearPrint::new(&flashlight, &ctx);
        assert_eq!(print.cost, "25.00");
        assert_eq!(print.notes.as_deref(), Some("Red lens"));
        assert!(print.to_xml().unwrap().contains("<notes>Red lens</notes>"));
    }

    #[test]
    fn test_bundled_gear_printed() {
        let ctx = sample_context();
        let kit = Gear::create_named("Survival Kit", Some("Survival Gear"), &CreateOptions::new(), &ctx).unwrap();

        let print = GearPrint::new(&kit, &ctx);
        let children: Vec<_> = print.gears.items.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(children, vec!["Flashlight", "Food Ration (Rating 1) (Rations)"]);
        assert_eq!(print.gears.items[0].qty, 2.0);
        assert_eq!(print.gears.items[0].owncost, "0");
        assert_eq!(print.cost, "200");
    }
}
