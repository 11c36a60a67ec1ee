//! Integration tests for creating, pricing, saving and printing equipment.
//!
//! Run with: `cargo test -p chummer-core --test equipment_flow`

use chummer_core::equipment::{CreateOptions, Gear, ParentWeapon, Weapon, WeaponAccessory};
use chummer_core::language::LanguageManager;
use chummer_core::print::AccessoryPrint;
use chummer_core::prompt::resolve_variable_cost;
use chummer_core::testing::{sample_context, ScriptedPrompt};
use chummer_core::{Availability, Settings};

#[test]
fn test_variable_cost_accessory_on_weapon() {
    let ctx = sample_context();
    let template = {
        let weapons = ctx.registry().weapons().expect("weapons.xml");
        weapons.accessory("Customized Grip").expect("grip").clone()
    };

    let mut prompt = ScriptedPrompt::new().with_numbers([300.0]);
    let chosen = resolve_variable_cost(
        template.cost.as_deref().unwrap_or_default(),
        &template.name,
        &mut prompt,
        ctx.translator(),
        ctx.settings().nuyen_decimals,
    )
    .expect("a cost was chosen");

    let options = CreateOptions::new().with_variable_cost(chosen);
    let grip = WeaponAccessory::create(&template, &options, &ctx).expect("grip");
    assert_eq!(grip.cost(), "300");

    let mut pistol = Weapon::create_named("Ares Predator V", &CreateOptions::new(), &ctx).expect("pistol");
    pistol.add_accessory(grip);
    assert_eq!(pistol.total_cost(), 1025.0);
}

#[test]
fn test_restricted_availability_is_localized() {
    let english = LanguageManager::english();
    let mut german = LanguageManager::new("de-de");
    german.insert("String_AvailRestricted", "E");

    let avail = Availability::evaluate("6R", 0);
    assert_eq!(avail.value, 6);
    assert_eq!(avail.display(&english), "6R");
    assert_eq!(avail.display(&german), "6E");
}

#[test]
fn test_discounted_accessory() {
    let ctx = sample_context();
    let mut bipod = WeaponAccessory::create_named("Bipod", &CreateOptions::new(), &ctx).expect("bipod");
    bipod.set_cost("1000");
    bipod.set_discounted_cost(true);
    assert_eq!(bipod.own_cost(&ParentWeapon::default()), 900.0);
}

#[test]
fn test_accessory_total_includes_child_gear() {
    let ctx = sample_context();
    let mut scope =
        WeaponAccessory::create_named("Imaging Scope", &CreateOptions::new().with_create_children(false), &ctx)
            .expect("scope");
    scope.set_cost("50");

    let mut lens = Gear::create_named(
        "Vision Magnification",
        Some("Vision Enhancements"),
        &CreateOptions::new(),
        &ctx,
    )
    .expect("lens");
    lens.set_cost("20");
    scope.add_gear(lens);

    assert_eq!(scope.total_cost(&ParentWeapon::default()), 70.0);
}

#[test]
fn test_weapon_save_and_copy() {
    let ctx = sample_context();
    let mut rifle = Weapon::create_named("Ares Desert Strike", &CreateOptions::new(), &ctx).expect("rifle");
    let bipod = WeaponAccessory::create_named("Bipod", &CreateOptions::new().with_mount("Under", ""), &ctx)
        .expect("bipod");
    rifle.add_accessory(bipod);
    rifle.set_notes("Zeroed for 800m");

    let xml = rifle.to_xml().expect("serialize");
    let loaded = Weapon::from_xml(&xml, false).expect("load");
    assert_eq!(loaded, rifle);
    assert_eq!(loaded.total_cost(), rifle.total_cost());

    let copy = Weapon::from_xml(&xml, true).expect("copy");
    let ids: Vec<_> = rifle.accessories().iter().map(|a| a.id()).collect();
    assert!(copy.accessories().iter().all(|a| !ids.contains(&a.id())));
    let scope_gear = &copy.accessories()[0].gear()[0];
    assert_eq!(scope_gear.parent_id(), Some(copy.accessories()[0].id()));
}

#[test]
fn test_print_uses_settings() {
    let ctx = chummer_core::RulesContext::new(
        std::sync::Arc::new(chummer_core::testing::sample_registry()),
        Settings::new().with_nuyen_decimals(2),
        LanguageManager::english(),
    );
    let rifle = Weapon::create_named("Ares Desert Strike", &CreateOptions::new(), &ctx).expect("rifle");
    let scope = &rifle.accessories()[0];

    let print = AccessoryPrint::new(scope, &rifle.as_parent(), &ctx);
    assert!(print.included);
    assert_eq!(print.cost, "0.00");
    assert_eq!(print.gears.items.len(), 1);
    assert_eq!(print.gears.items[0].name, "Vision Magnification");
}

#[test]
fn test_german_display_names() {
    let ctx = chummer_core::RulesContext::new(
        std::sync::Arc::new(chummer_core::testing::sample_registry()),
        Settings::new().with_language("de-de"),
        LanguageManager::new("de-de"),
    );

    let bipod = WeaponAccessory::create_named("Bipod", &CreateOptions::new(), &ctx).expect("bipod");
    assert_eq!(bipod.name(), "Bipod");
    assert_eq!(bipod.display_name(), "Zweibein");
    assert_eq!(bipod.page(), "181");

    // No translation in the rule data; the original name and page stay.
    let scope = WeaponAccessory::create_named("Imaging Scope", &CreateOptions::new(), &ctx).expect("scope");
    assert_eq!(scope.display_name(), "Imaging Scope");
    assert_eq!(scope.page(), "432");

    // Loaded entities are translated only once localized.
    let mut loaded = WeaponAccessory::from_xml(&bipod.to_xml().expect("serialize"), false).expect("load");
    assert_eq!(loaded.display_name(), "Bipod");
    assert_eq!(loaded.page(), "431");
    loaded.localize(&ctx);
    assert_eq!(loaded.display_name(), "Zweibein");
    assert_eq!(loaded.page(), "181");
}
