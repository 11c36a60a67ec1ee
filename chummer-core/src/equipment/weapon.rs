use super::accessory::{ParentWeapon, WeaponAccessory};
use super::{initial_cost, CreateOptions};
use crate::context::RulesContext;
use crate::expression::{Availability, RuleExpression};
use crate::id::EntityId;
use crate::language::{TemplateKey, Translation};
use crate::persist::{from_xml, to_xml, PersistError};
use crate::templates::{TemplateError, WeaponTemplate, WEAPONS_FILE};
use serde::{Deserialize, Serialize};

/// An `<accessories>` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessoryList {
    #[serde(rename = "accessory", default)]
    pub items: Vec<WeaponAccessory>,
}

impl AccessoryList {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    #[serde(rename = "guid", default = "EntityId::nil")]
    id: EntityId,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    category: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    weapon_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    conceal: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    accuracy: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    reach: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    damage: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    ap: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    mode: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    rc: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    ammo: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    avail: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    cost: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    page: String,
    #[serde(rename = "parentid", default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    notes: String,
    #[serde(default, skip_serializing_if = "AccessoryList::is_empty")]
    accessories: AccessoryList,
    #[serde(skip)]
    translation: Option<Translation>,
}

impl Weapon {
    /// Create a weapon from a `weapons.xml` template, including the
    /// accessories the template comes with.
    pub fn create(
        template: &WeaponTemplate,
        options: &CreateOptions,
        ctx: &RulesContext,
    ) -> Result<Weapon, TemplateError> {
        let mut weapon = Weapon {
            id: EntityId::new(),
            name: template.name.clone(),
            category: template.category.clone(),
            weapon_type: template.weapon_type.clone(),
            conceal: template.conceal.clone(),
            accuracy: template.accuracy.clone(),
            reach: template.reach.clone(),
            damage: template.damage.clone(),
            ap: template.ap.clone(),
            mode: template.mode.clone(),
            rc: template.rc.clone(),
            ammo: template.ammo.clone(),
            avail: template.avail.clone(),
            cost: initial_cost(&template.cost, options),
            source: template.source.clone(),
            page: template.page.clone(),
            parent_id: None,
            notes: String::new(),
            accessories: AccessoryList::default(),
            translation: ctx.translation(
                TemplateKey::new(WEAPONS_FILE, "weapon", &template.name, &template.category),
                template.translate.as_deref(),
                template.altpage.as_deref(),
            ),
        };

        let included = template.included_accessories();
        if !included.is_empty() {
            let document = ctx.registry().weapons()?;
            for entry in included {
                let Some(accessory_template) = document.accessory(&entry.name) else {
                    tracing::warn!(
                        weapon = %weapon.name,
                        accessory = %entry.name,
                        "included accessory not found in rule data, skipping"
                    );
                    continue;
                };
                let accessory_options = CreateOptions::new()
                    .with_rating(entry.rating)
                    .with_mount(&entry.mount, &entry.extramount)
                    .with_create_children(options.create_children);
                let mut accessory = WeaponAccessory::create(accessory_template, &accessory_options, ctx)?;
                accessory.set_included_in_weapon(true);
                weapon.accessories.items.push(accessory);
            }
        }

        Ok(weapon)
    }

    /// Create a weapon by name from `weapons.xml`.
    pub fn create_named(
        name: &str,
        options: &CreateOptions,
        ctx: &RulesContext,
    ) -> Result<Weapon, TemplateError> {
        let document = ctx.registry().weapons()?;
        let template = document.weapon(name).ok_or_else(|| TemplateError::NotFound {
            file: WEAPONS_FILE,
            kind: "weapon",
            name: name.to_string(),
        })?;
        Weapon::create(template, options, ctx)
    }

    pub fn to_xml(&self) -> Result<String, PersistError> {
        to_xml("weapon", self)
    }

    /// Read a `<weapon>` save fragment; `copy` gives every entity a new id.
    pub fn from_xml(xml: &str, copy: bool) -> Result<Weapon, PersistError> {
        let mut weapon: Weapon = from_xml(xml)?;
        weapon.after_load(copy);
        Ok(weapon)
    }

    pub(crate) fn after_load(&mut self, copy: bool) {
        if copy {
            self.id = EntityId::new();
        }
        for accessory in &mut self.accessories.items {
            accessory.after_load(copy);
        }
    }

    pub fn localize(&mut self, ctx: &RulesContext) {
        self.translation = ctx.registry().weapons().ok().and_then(|document| {
            let template = document.weapon(&self.name)?;
            ctx.translation(
                TemplateKey::new(WEAPONS_FILE, "weapon", &self.name, &self.category),
                template.translate.as_deref(),
                template.altpage.as_deref(),
            )
        });
        for accessory in &mut self.accessories.items {
            accessory.localize(ctx);
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        match &self.translation {
            Some(t) => &t.name,
            None => &self.name,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn weapon_type(&self) -> &str {
        &self.weapon_type
    }

    pub fn damage(&self) -> &str {
        &self.damage
    }

    pub fn reach(&self) -> &str {
        &self.reach
    }

    pub fn avail(&self) -> &str {
        &self.avail
    }

    pub fn cost(&self) -> &str {
        &self.cost
    }

    pub fn set_cost(&mut self, cost: impl Into<String>) {
        self.cost = cost.into();
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn page(&self) -> &str {
        match &self.translation {
            Some(t) if !t.page.is_empty() => &t.page,
            _ => &self.page,
        }
    }

    /// Owner of a weapon that cannot be removed on its own.
    pub fn parent_id(&self) -> Option<EntityId> {
        self.parent_id
    }

    pub fn set_parent_id(&mut self, parent: Option<EntityId>) {
        self.parent_id = parent;
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn accessories(&self) -> &[WeaponAccessory] {
        &self.accessories.items
    }

    pub fn accessory_mut(&mut self, id: EntityId) -> Option<&mut WeaponAccessory> {
        self.accessories.items.iter_mut().find(|a| a.id() == id)
    }

    pub fn add_accessory(&mut self, accessory: WeaponAccessory) {
        self.accessories.items.push(accessory);
    }

    pub fn remove_accessory(&mut self, id: EntityId) -> Option<WeaponAccessory> {
        let index = self.accessories.items.iter().position(|a| a.id() == id)?;
        Some(self.accessories.items.remove(index))
    }

    /// Evaluated base cost of the weapon.
    pub fn base_cost(&self) -> f64 {
        RuleExpression::new(&self.cost).evaluate_or_zero()
    }

    pub fn total_avail(&self) -> Availability {
        Availability::evaluate(&self.avail, 0)
    }

    /// Product of the cost multipliers of installed accessories.
    pub fn cost_multiplier(&self) -> f64 {
        self.accessories
            .items
            .iter()
            .filter(|a| a.installed() && a.accessory_cost_multiplier() != 1)
            .map(|a| f64::from(a.accessory_cost_multiplier()))
            .product()
    }

    /// The view of this weapon that its accessories price against.
    pub fn as_parent(&self) -> ParentWeapon {
        ParentWeapon {
            cost: self.base_cost(),
            cost_multiplier: self.cost_multiplier(),
        }
    }

    /// Base cost plus every accessory's total cost.
    pub fn total_cost(&self) -> f64 {
        let parent = self.as_parent();
        self.base_cost()
            + self
                .accessories
                .items
                .iter()
                .map(|a| a.total_cost(&parent))
                .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_context;

    #[test]
    fn test_create_with_included_accessories() {
        let ctx = sample_context();
        let rifle = Weapon::create_named("Ares Desert Strike", &CreateOptions::new(), &ctx).unwrap();

        assert_eq!(rifle.accessories().len(), 1);
        let scope = &rifle.accessories()[0];
        assert_eq!(scope.name(), "Imaging Scope");
        assert_eq!(scope.mount(), "Top");
        assert!(scope.included_in_weapon());
        assert_eq!(scope.gear().len(), 1);

        // Included accessories are free.
        assert_eq!(rifle.total_cost(), 17500.0);
    }

    #[test]
    fn test_accessory_prices_against_weapon() {
        let ctx = sample_context();
        let mut pistol = Weapon::create_named("Ares Predator V", &CreateOptions::new(), &ctx).unwrap();
        assert_eq!(pistol.base_cost(), 725.0);

        let parts = WeaponAccessory::create_named(
            "Ceramic/Plasteel Components",
            &CreateOptions::new().with_rating(2),
            &ctx,
        )
        .unwrap();
        pistol.add_accessory(parts);
        assert_eq!(pistol.total_cost(), 725.0 + 145.0);
    }

    #[test]
    fn test_cost_multiplier() {
        let ctx = sample_context();
        let mut pistol = Weapon::create_named("Ares Predator V", &CreateOptions::new(), &ctx).unwrap();
        let bipod = WeaponAccessory::create_named("Bipod", &CreateOptions::new(), &ctx).unwrap();
        let look = WeaponAccessory::create_named("Custom Look", &CreateOptions::new(), &ctx).unwrap();
        let look_id = look.id();
        pistol.add_accessory(bipod);
        pistol.add_accessory(look);

        assert_eq!(pistol.cost_multiplier(), 2.0);
        // 725 + 2 * 200 (bipod) + 2 * 500 (custom look)
        assert_eq!(pistol.total_cost(), 2125.0);

        pistol.accessory_mut(look_id).unwrap().set_installed(false);
        assert_eq!(pistol.cost_multiplier(), 1.0);
    }

    #[test]
    fn test_unarmed_attack() {
        let ctx = sample_context();
        let unarmed = Weapon::create_named("Unarmed Attack", &CreateOptions::new(), &ctx).unwrap();
        assert!(unarmed.accessories().is_empty());
        assert_eq!(unarmed.base_cost(), 0.0);
        assert_eq!(unarmed.weapon_type(), "Melee");
    }

    #[test]
    fn test_xml_round_trip_and_copy() {
        let ctx = sample_context();
        let rifle = Weapon::create_named("Ares Desert Strike", &CreateOptions::new(), &ctx).unwrap();
        let xml = rifle.to_xml().unwrap();

        let loaded = Weapon::from_xml(&xml, false).unwrap();
        assert_eq!(loaded, rifle);

        let copy = Weapon::from_xml(&xml, true).unwrap();
        assert_ne!(copy.id(), rifle.id());
        assert_ne!(copy.accessories()[0].id(), rifle.accessories()[0].id());
        assert_eq!(copy.accessories()[0].name(), "Imaging Scope");
    }
}
