use super::gear::{create_bundled_gear, Gear, GearList};
use super::{initial_cost, CreateOptions, DISCOUNT};
use crate::context::RulesContext;
use crate::expression::{Availability, RuleExpression, RATING, WEAPON_COST};
use crate::id::EntityId;
use crate::language::{TemplateKey, Translation};
use crate::persist::{from_xml, to_xml, PersistError};
use crate::templates::{lenient, AccessoryTemplate, AllowGear, TemplateError, WEAPONS_FILE};
use serde::{Deserialize, Serialize};

/// What an accessory needs to know about the weapon it is mounted on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentWeapon {
    /// Evaluated cost of the weapon, substituted for `Weapon Cost`.
    pub cost: f64,
    /// Product of the cost multipliers of the weapon's installed accessories.
    pub cost_multiplier: f64,
}

impl Default for ParentWeapon {
    fn default() -> Self {
        Self {
            cost: 0.0,
            cost_multiplier: 1.0,
        }
    }
}

fn one() -> i32 {
    1
}

fn yes() -> bool {
    true
}

/// An accessory mounted on a weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponAccessory {
    #[serde(rename = "guid", default = "EntityId::nil")]
    id: EntityId,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    mount: String,
    #[serde(rename = "extramount", default, skip_serializing_if = "String::is_empty")]
    extra_mount: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    rc: String,
    #[serde(default, deserialize_with = "lenient::int")]
    rating: i32,
    #[serde(rename = "rcgroup", default, deserialize_with = "lenient::int")]
    rc_group: i32,
    #[serde(rename = "rcdeployable", default, deserialize_with = "lenient::flag")]
    rc_deployable: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    conceal: String,
    #[serde(rename = "dicepool", default, skip_serializing_if = "String::is_empty")]
    dice_pool: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    avail: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    cost: String,
    #[serde(rename = "included", default, deserialize_with = "lenient::flag")]
    included_in_weapon: bool,
    #[serde(default = "yes", deserialize_with = "lenient::flag")]
    installed: bool,
    #[serde(rename = "allowgear", default, skip_serializing_if = "Option::is_none")]
    allow_gear: Option<AllowGear>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    page: String,
    #[serde(default, deserialize_with = "lenient::int")]
    accuracy: i32,
    #[serde(default, skip_serializing_if = "GearList::is_empty")]
    gears: GearList,
    #[serde(rename = "ammoslots", default, deserialize_with = "lenient::int")]
    ammo_slots: i32,
    #[serde(rename = "damagetype", default, skip_serializing_if = "String::is_empty")]
    damage_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    damage: String,
    #[serde(rename = "damagereplace", default, skip_serializing_if = "String::is_empty")]
    damage_replace: String,
    #[serde(rename = "firemode", default, skip_serializing_if = "String::is_empty")]
    fire_mode: String,
    #[serde(rename = "firemodereplace", default, skip_serializing_if = "String::is_empty")]
    fire_mode_replace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    ap: String,
    #[serde(rename = "apreplace", default, skip_serializing_if = "String::is_empty")]
    ap_replace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    notes: String,
    #[serde(rename = "discountedcost", default, deserialize_with = "lenient::flag")]
    discounted_cost: bool,
    #[serde(rename = "addmode", default, skip_serializing_if = "String::is_empty")]
    add_mode: String,
    #[serde(rename = "fullburst", default, deserialize_with = "lenient::int")]
    full_burst: i32,
    #[serde(default, deserialize_with = "lenient::int")]
    suppressive: i32,
    #[serde(rename = "rangebonus", default, deserialize_with = "lenient::int")]
    range_bonus: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    extra: String,
    #[serde(rename = "ammobonus", default, deserialize_with = "lenient::int")]
    ammo_bonus: i32,
    #[serde(rename = "ammoreplace", default, skip_serializing_if = "String::is_empty")]
    ammo_replace: String,
    #[serde(
        rename = "accessorycostmultiplier",
        default = "one",
        deserialize_with = "lenient::int"
    )]
    accessory_cost_multiplier: i32,
    #[serde(skip)]
    translation: Option<Translation>,
}

impl WeaponAccessory {
    /// Create an accessory from a `weapons.xml` template.
    ///
    /// Bundled gear is created from `gear.xml` when `options.create_children`
    /// is set.
    pub fn create(
        template: &AccessoryTemplate,
        options: &CreateOptions,
        ctx: &RulesContext,
    ) -> Result<WeaponAccessory, TemplateError> {
        let id = EntityId::new();
        let cost = template
            .cost
            .as_deref()
            .map(|cost| initial_cost(cost, options))
            .unwrap_or_default();

        let mut accessory = WeaponAccessory {
            id,
            name: template.name.clone(),
            mount: options.mount.clone(),
            extra_mount: options.extra_mount.clone(),
            rc: template.rc.clone(),
            rating: options.rating,
            rc_group: template.rcgroup,
            rc_deployable: template.rcdeployable,
            conceal: template.conceal.clone(),
            dice_pool: template.dicepool.clone(),
            avail: template.avail.clone(),
            cost,
            included_in_weapon: false,
            installed: true,
            allow_gear: template.allowgear.clone(),
            source: template.source.clone(),
            page: template.page.clone(),
            accuracy: template.accuracy,
            gears: GearList::default(),
            ammo_slots: template.ammoslots,
            damage_type: template.damagetype.clone(),
            damage: template.damage.clone(),
            damage_replace: template.damagereplace.clone(),
            fire_mode: template.firemode.clone(),
            fire_mode_replace: template.firemodereplace.clone(),
            ap: template.ap.clone(),
            ap_replace: template.apreplace.clone(),
            notes: String::new(),
            discounted_cost: false,
            add_mode: template.addmode.clone(),
            full_burst: template.fullburst,
            suppressive: template.suppressive,
            range_bonus: template.rangebonus,
            extra: template.extra.clone(),
            ammo_bonus: template.ammobonus,
            ammo_replace: template.ammoreplace.clone(),
            accessory_cost_multiplier: template.accessorycostmultiplier.unwrap_or(1),
            translation: ctx.translation(
                TemplateKey::new(WEAPONS_FILE, "accessory", &template.name, ""),
                template.translate.as_deref(),
                template.altpage.as_deref(),
            ),
        };
        if let Some(forced) = &options.forced_value {
            accessory.extra = forced.clone();
        }

        if options.create_children {
            if let Some(children) = &template.gears {
                accessory.gears.items = create_bundled_gear(children, id, ctx)?;
            }
        }

        tracing::debug!(
            accessory = %accessory.name,
            id = %accessory.id,
            children = accessory.gears.items.len(),
            "created weapon accessory"
        );
        Ok(accessory)
    }

    /// Create an accessory by name from `weapons.xml`.
    pub fn create_named(
        name: &str,
        options: &CreateOptions,
        ctx: &RulesContext,
    ) -> Result<WeaponAccessory, TemplateError> {
        let document = ctx.registry().weapons()?;
        let template = document
            .accessory(name)
            .ok_or_else(|| TemplateError::NotFound {
                file: WEAPONS_FILE,
                kind: "accessory",
                name: name.to_string(),
            })?;
        WeaponAccessory::create(template, options, ctx)
    }

    /// Serialize as an `<accessory>` save fragment.
    pub fn to_xml(&self) -> Result<String, PersistError> {
        to_xml("accessory", self)
    }

    /// Read an `<accessory>` save fragment.
    ///
    /// With `copy` set, the accessory and all of its gear get new identifiers.
    pub fn from_xml(xml: &str, copy: bool) -> Result<WeaponAccessory, PersistError> {
        let mut accessory: WeaponAccessory = from_xml(xml)?;
        accessory.after_load(copy);
        Ok(accessory)
    }

    pub(crate) fn after_load(&mut self, copy: bool) {
        for gear in &mut self.gears.items {
            gear.resolve_kinds();
        }
        if copy {
            self.regenerate_ids();
        }
    }

    pub(crate) fn regenerate_ids(&mut self) {
        self.id = EntityId::new();
        let id = self.id;
        for gear in &mut self.gears.items {
            gear.regenerate_ids(Some(id));
        }
    }

    /// Look up translations for this accessory and its gear.
    pub fn localize(&mut self, ctx: &RulesContext) {
        self.translation = ctx.registry().weapons().ok().and_then(|document| {
            let template = document.accessory(&self.name)?;
            ctx.translation(
                TemplateKey::new(WEAPONS_FILE, "accessory", &self.name, ""),
                template.translate.as_deref(),
                template.altpage.as_deref(),
            )
        });
        for gear in &mut self.gears.items {
            gear.localize(ctx);
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Translated name, or the name.
    pub fn display_name(&self) -> &str {
        match &self.translation {
            Some(t) => &t.name,
            None => &self.name,
        }
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub fn set_mount(&mut self, mount: impl Into<String>) {
        self.mount = mount.into();
    }

    pub fn extra_mount(&self) -> &str {
        &self.extra_mount
    }

    pub fn set_extra_mount(&mut self, extra_mount: impl Into<String>) {
        self.extra_mount = extra_mount.into();
    }

    pub fn rc(&self) -> &str {
        &self.rc
    }

    pub fn set_rc(&mut self, rc: impl Into<String>) {
        self.rc = rc.into();
    }

    pub fn rc_group(&self) -> i32 {
        self.rc_group
    }

    pub fn rc_deployable(&self) -> bool {
        self.rc_deployable
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    pub fn set_rating(&mut self, rating: i32) {
        self.rating = rating;
    }

    /// Raw concealability expression.
    pub fn conceal(&self) -> &str {
        &self.conceal
    }

    pub fn set_concealability(&mut self, value: i32) {
        self.conceal = value.to_string();
    }

    pub fn avail(&self) -> &str {
        &self.avail
    }

    pub fn set_avail(&mut self, avail: impl Into<String>) {
        self.avail = avail.into();
    }

    /// Cost expression as shown to the user; `"0"` for accessories included
    /// with the weapon.
    pub fn cost(&self) -> &str {
        if self.included_in_weapon {
            "0"
        } else {
            &self.cost
        }
    }

    pub fn set_cost(&mut self, cost: impl Into<String>) {
        self.cost = cost.into();
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    /// Page, translated when a translation applies.
    pub fn page(&self) -> &str {
        match &self.translation {
            Some(t) if !t.page.is_empty() => &t.page,
            _ => &self.page,
        }
    }

    pub fn set_page(&mut self, page: impl Into<String>) {
        self.page = page.into();
    }

    pub fn included_in_weapon(&self) -> bool {
        self.included_in_weapon
    }

    pub fn set_included_in_weapon(&mut self, included: bool) {
        self.included_in_weapon = included;
    }

    pub fn installed(&self) -> bool {
        self.installed
    }

    pub fn set_installed(&mut self, installed: bool) {
        self.installed = installed;
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn allow_gear(&self) -> Option<&AllowGear> {
        self.allow_gear.as_ref()
    }

    pub fn set_allow_gear(&mut self, allow_gear: Option<AllowGear>) {
        self.allow_gear = allow_gear;
    }

    /// Whether gear of `category` may be attached.
    pub fn accepts_gear(&self, category: &str) -> bool {
        self.allow_gear
            .as_ref()
            .map_or(false, |allowed| allowed.allows(category))
    }

    pub fn gear(&self) -> &[Gear] {
        &self.gears.items
    }

    /// Attach gear to this accessory.
    pub fn add_gear(&mut self, mut gear: Gear) {
        gear.set_parent_id(Some(self.id));
        self.gears.items.push(gear);
    }

    /// Detach gear by identifier.
    pub fn remove_gear(&mut self, id: EntityId) -> Option<Gear> {
        let index = self.gears.items.iter().position(|g| g.id() == id)?;
        Some(self.gears.items.remove(index))
    }

    pub fn discounted_cost(&self) -> bool {
        self.discounted_cost
    }

    pub fn set_discounted_cost(&mut self, discounted: bool) {
        self.discounted_cost = discounted;
    }

    pub fn ammo_slots(&self) -> i32 {
        self.ammo_slots
    }

    pub fn damage_type(&self) -> &str {
        &self.damage_type
    }

    pub fn damage(&self) -> &str {
        &self.damage
    }

    pub fn set_damage(&mut self, damage: impl Into<String>) {
        self.damage = damage.into();
    }

    pub fn damage_replacement(&self) -> &str {
        &self.damage_replace
    }

    pub fn fire_mode(&self) -> &str {
        &self.fire_mode
    }

    pub fn fire_mode_replacement(&self) -> &str {
        &self.fire_mode_replace
    }

    pub fn ap(&self) -> &str {
        &self.ap
    }

    pub fn ap_replacement(&self) -> &str {
        &self.ap_replace
    }

    pub fn add_mode(&self) -> &str {
        &self.add_mode
    }

    pub fn set_add_mode(&mut self, mode: impl Into<String>) {
        self.add_mode = mode.into();
    }

    pub fn full_burst(&self) -> i32 {
        self.full_burst
    }

    pub fn suppressive(&self) -> i32 {
        self.suppressive
    }

    pub fn range_bonus(&self) -> i32 {
        self.range_bonus
    }

    pub fn extra(&self) -> &str {
        &self.extra
    }

    pub fn set_extra(&mut self, extra: impl Into<String>) {
        self.extra = extra.into();
    }

    pub fn ammo_bonus(&self) -> i32 {
        self.ammo_bonus
    }

    pub fn set_ammo_bonus(&mut self, bonus: i32) {
        self.ammo_bonus = bonus;
    }

    pub fn ammo_replace(&self) -> &str {
        &self.ammo_replace
    }

    pub fn set_ammo_replace(&mut self, ammo: impl Into<String>) {
        self.ammo_replace = ammo.into();
    }

    pub fn accessory_cost_multiplier(&self) -> i32 {
        self.accessory_cost_multiplier
    }

    pub fn set_accessory_cost_multiplier(&mut self, multiplier: i32) {
        self.accessory_cost_multiplier = multiplier;
    }

    /// Concealability modifier; expressions using `Rating` are rounded up.
    pub fn concealability(&self) -> i32 {
        let expression = RuleExpression::new(&self.conceal);
        if expression.mentions(RATING) {
            expression.with_rating(self.rating).ceiling_or_zero()
        } else {
            self.conceal.trim().parse().unwrap_or_default()
        }
    }

    pub fn total_avail(&self) -> Availability {
        Availability::evaluate(&self.avail, self.rating)
    }

    /// Accuracy bonus; uninstalled accessories contribute nothing.
    pub fn accuracy(&self) -> i32 {
        if self.installed {
            self.accuracy
        } else {
            0
        }
    }

    pub fn dice_pool(&self) -> i32 {
        self.dice_pool.trim().parse().unwrap_or_default()
    }

    /// Cost of the accessory alone.
    pub fn own_cost(&self, weapon: &ParentWeapon) -> f64 {
        if self.included_in_weapon {
            return 0.0;
        }
        let cost = RuleExpression::new(&self.cost)
            .with(WEAPON_COST, weapon.cost)
            .with_rating(self.rating)
            .evaluate_or_zero()
            * weapon.cost_multiplier;
        if self.discounted_cost {
            cost * DISCOUNT
        } else {
            cost
        }
    }

    /// Cost of the accessory and all attached gear.
    pub fn total_cost(&self, weapon: &ParentWeapon) -> f64 {
        self.own_cost(weapon) + self.gears.items.iter().map(Gear::total_cost).sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::GearKind;
    use crate::expression::Restriction;
    use crate::language::LanguageManager;
    use crate::testing::sample_context;

    fn predator() -> ParentWeapon {
        ParentWeapon {
            cost: 725.0,
            cost_multiplier: 1.0,
        }
    }

    #[test]
    fn test_create_copies_template() {
        let ctx = sample_context();
        let options = CreateOptions::new().with_mount("Internal", "");
        let smartgun = WeaponAccessory::create_named("Smartgun System, Internal", &options, &ctx)
            .unwrap();

        assert_eq!(smartgun.mount(), "Internal");
        assert_eq!(smartgun.avail(), "2R");
        assert_eq!(smartgun.accuracy(), 2);
        assert!(smartgun.installed());
        assert!(!smartgun.included_in_weapon());
        assert_eq!(smartgun.accessory_cost_multiplier(), 1);
        assert_eq!(smartgun.own_cost(&predator()), 72.5);
    }

    #[test]
    fn test_create_bundles_gear() {
        let ctx = sample_context();
        let scope = WeaponAccessory::create_named("Imaging Scope", &CreateOptions::new(), &ctx)
            .unwrap();

        assert_eq!(scope.gear().len(), 1);
        let vision = &scope.gear()[0];
        assert_eq!(vision.name(), "Vision Magnification");
        assert_eq!(vision.parent_id(), Some(scope.id()));
        assert_eq!(vision.cost(), "0");
        assert!(scope.accepts_gear("Vision Enhancements"));
        assert!(!scope.accepts_gear("Commlinks"));
    }

    #[test]
    fn test_skip_children() {
        let ctx = sample_context();
        let options = CreateOptions::new().with_create_children(false);
        let scope = WeaponAccessory::create_named("Imaging Scope", &options, &ctx).unwrap();
        assert!(scope.gear().is_empty());
    }

    #[test]
    fn test_variable_cost() {
        let ctx = sample_context();
        let chosen = CreateOptions::new().with_variable_cost(300.0);
        let grip = WeaponAccessory::create_named("Customized Grip", &chosen, &ctx).unwrap();
        assert_eq!(grip.cost(), "300");
        assert_eq!(grip.own_cost(&ParentWeapon::default()), 300.0);

        let unresolved = WeaponAccessory::create_named("Customized Grip", &CreateOptions::new(), &ctx)
            .unwrap();
        assert_eq!(unresolved.cost(), "100");

        let skipped = CreateOptions::new().with_skip_cost(true);
        let free = WeaponAccessory::create_named("Customized Grip", &skipped, &ctx).unwrap();
        assert_eq!(free.cost(), "0");
    }

    #[test]
    fn test_unknown_accessory() {
        let ctx = sample_context();
        let result = WeaponAccessory::create_named("Laser Sight Mk IX", &CreateOptions::new(), &ctx);
        assert!(matches!(
            result,
            Err(TemplateError::NotFound {
                kind: "accessory",
                ..
            })
        ));
    }

    #[test]
    fn test_rating_expressions() {
        let ctx = sample_context();
        let options = CreateOptions::new().with_rating(3);
        let parts =
            WeaponAccessory::create_named("Ceramic/Plasteel Components", &options, &ctx).unwrap();

        assert_eq!(parts.concealability(), -3);
        let avail = parts.total_avail();
        assert_eq!(avail.value, 6);
        assert_eq!(avail.restriction, Restriction::Forbidden);
        assert_eq!(parts.own_cost(&predator()), 217.5);
    }

    #[test]
    fn test_concealability_literal_and_malformed() {
        let ctx = sample_context();
        let mut holster =
            WeaponAccessory::create_named("Concealable Holster", &CreateOptions::new(), &ctx)
                .unwrap();
        assert_eq!(holster.concealability(), -1);

        holster.set_concealability(4);
        assert_eq!(holster.conceal(), "4");
        assert_eq!(holster.concealability(), 4);

        holster.set_rating(2);
        let mut broken = holster.clone();
        broken.conceal = "Rating +".to_string();
        assert_eq!(broken.concealability(), 0);
        broken.conceal = "lots".to_string();
        assert_eq!(broken.concealability(), 0);
    }

    #[test]
    fn test_availability_display() {
        let ctx = sample_context();
        let smartgun = WeaponAccessory::create_named(
            "Smartgun System, Internal",
            &CreateOptions::new(),
            &ctx,
        )
        .unwrap();

        let mut german = LanguageManager::new("de-de");
        german.insert("String_AvailRestricted", "E");
        assert_eq!(smartgun.total_avail().display(&LanguageManager::english()), "2R");
        assert_eq!(smartgun.total_avail().display(&german), "2E");
    }

    #[test]
    fn test_included_accessory_is_free() {
        let ctx = sample_context();
        let mut scope =
            WeaponAccessory::create_named("Imaging Scope", &CreateOptions::new(), &ctx).unwrap();
        assert_eq!(scope.own_cost(&predator()), 350.0);

        scope.set_included_in_weapon(true);
        assert_eq!(scope.cost(), "0");
        assert_eq!(scope.own_cost(&predator()), 0.0);
    }

    #[test]
    fn test_discount_and_multiplier() {
        let ctx = sample_context();
        let mut bipod = WeaponAccessory::create_named("Bipod", &CreateOptions::new(), &ctx).unwrap();
        bipod.set_cost("1000");
        assert_eq!(bipod.own_cost(&ParentWeapon::default()), 1000.0);

        bipod.set_discounted_cost(true);
        assert_eq!(bipod.own_cost(&ParentWeapon::default()), 900.0);

        let doubled = ParentWeapon {
            cost: 0.0,
            cost_multiplier: 2.0,
        };
        assert_eq!(bipod.own_cost(&doubled), 1800.0);
    }

    #[test]
    fn test_total_cost_adds_gear() {
        let ctx = sample_context();
        let mut bipod = WeaponAccessory::create_named("Bipod", &CreateOptions::new(), &ctx).unwrap();
        bipod.set_cost("50");

        let mut light = Gear::create_named("Flashlight", None, &CreateOptions::new(), &ctx).unwrap();
        light.set_cost("20");
        bipod.add_gear(light);

        assert_eq!(bipod.own_cost(&ParentWeapon::default()), 50.0);
        assert_eq!(bipod.total_cost(&ParentWeapon::default()), 70.0);
        assert_eq!(bipod.gear()[0].parent_id(), Some(bipod.id()));
    }

    #[test]
    fn test_uninstalled_accuracy_and_dice_pool() {
        let ctx = sample_context();
        let mut smartgun = WeaponAccessory::create_named(
            "Smartgun System, Internal",
            &CreateOptions::new(),
            &ctx,
        )
        .unwrap();
        assert_eq!(smartgun.dice_pool(), 0);

        smartgun.set_installed(false);
        assert_eq!(smartgun.accuracy(), 0);

        smartgun.dice_pool = "2".to_string();
        assert_eq!(smartgun.dice_pool(), 2);
        smartgun.dice_pool = "x".to_string();
        assert_eq!(smartgun.dice_pool(), 0);
    }

    #[test]
    fn test_xml_round_trip() {
        let ctx = sample_context();
        let options = CreateOptions::new().with_mount("Top", "Side").with_rating(2);
        let mut scope = WeaponAccessory::create_named("Imaging Scope", &options, &ctx).unwrap();
        scope.set_notes("Zeroed at 100m");
        scope.set_discounted_cost(true);

        let xml = scope.to_xml().unwrap();
        assert!(xml.starts_with("<accessory>"));
        assert!(xml.contains("<guid>"));
        // Empty strings are omitted.
        assert!(!xml.contains("<damage>"));

        let loaded = WeaponAccessory::from_xml(&xml, false).unwrap();
        assert_eq!(loaded, scope);
    }

    #[test]
    fn test_copy_load_regenerates_ids() {
        let ctx = sample_context();
        let scope = WeaponAccessory::create_named("Imaging Scope", &CreateOptions::new(), &ctx)
            .unwrap();
        let xml = scope.to_xml().unwrap();

        let copy = WeaponAccessory::from_xml(&xml, true).unwrap();
        assert_ne!(copy.id(), scope.id());
        assert_ne!(copy.gear()[0].id(), scope.gear()[0].id());
        assert_eq!(copy.gear()[0].parent_id(), Some(copy.id()));
        assert_eq!(copy.name(), scope.name());
        assert_eq!(copy.gear()[0].name(), scope.gear()[0].name());
    }

    #[test]
    fn test_load_defaults_missing_elements() {
        let xml = "<accessory><name>Bipod</name></accessory>";
        let loaded = WeaponAccessory::from_xml(xml, false).unwrap();
        assert_eq!(loaded.name(), "Bipod");
        assert!(loaded.installed());
        assert_eq!(loaded.accessory_cost_multiplier(), 1);
        assert!(loaded.id().is_nil());
        assert!(loaded.gear().is_empty());
    }

    #[test]
    fn test_load_legacy_commlink_gear() {
        let xml = "<accessory><guid>7f6a1d44-9f0c-4e7a-9a53-0a5b6f0e2d11</guid>\
            <name>Imaging Scope</name><gears>\
            <gear><guid>2a1c0c58-8d55-45c6-a7d4-16c1b5d7f9a2</guid><name>Meta Link</name><category>Commlinks</category></gear>\
            <gear><guid>5b3e0c58-8d55-45c6-a7d4-16c1b5d7f9a2</guid><name>Odd Box</name><category>Misc</category><iscommlink>True</iscommlink></gear>\
            <gear><guid>6c4e0c58-8d55-45c6-a7d4-16c1b5d7f9a2</guid><name>Flashlight</name><category>Survival Gear</category></gear>\
            </gears></accessory>";
        let loaded = WeaponAccessory::from_xml(xml, false).unwrap();
        let kinds: Vec<_> = loaded.gear().iter().map(Gear::kind).collect();
        assert_eq!(
            kinds,
            vec![GearKind::Commlink, GearKind::Commlink, GearKind::Standard]
        );
        assert_eq!(loaded.gear()[0].quantity(), 1.0);

        // Saved again with explicit kinds, the record loads back unchanged.
        let resaved = WeaponAccessory::from_xml(&loaded.to_xml().unwrap(), false).unwrap();
        assert_eq!(resaved, loaded);
        assert_eq!(resaved.gear()[1].kind(), GearKind::Commlink);
    }
}
