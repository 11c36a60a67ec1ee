//! Critters: spirits, sprites and other metatypes from `critters.xml`,
//! created as standalone characters.

use crate::config::CritterLimitRules;
use crate::context::RulesContext;
use crate::equipment::{CreateOptions, Gear, GearList, Weapon};
use crate::expression::attribute_value;
use crate::id::EntityId;
use crate::language::Translator;
use crate::persist::{PersistError, SavedCritter};
use crate::prompt::SavePrompt;
use crate::spirit::{suggested_file_name, Spirit};
use crate::templates::{is_sprite_category, lenient, MetatypeTemplate, TemplateError, TemplateRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Name of the weapon every critter gets.
pub const UNARMED_ATTACK: &str = "Unarmed Attack";

/// Errors from creating a critter.
#[derive(Debug, Error)]
pub enum CritterError {
    #[error("No critter type selected")]
    NoCritterSelected,

    #[error("Unknown critter type: {0}")]
    UnknownCritter(String),

    #[error("Critter creation cancelled")]
    Cancelled,

    #[error("Rule data error: {0}")]
    Template(#[from] TemplateError),

    #[error("Save error: {0}")]
    Persist(#[from] PersistError),
}

impl CritterError {
    /// Localized message for errors the user can act on.
    pub fn user_message(&self, translator: &dyn Translator) -> String {
        match self {
            CritterError::NoCritterSelected => translator.get_string("Message_SelectCritterType"),
            CritterError::UnknownCritter(name) => translator
                .get_string("Message_UnknownCritterType")
                .replace("{0}", name),
            other => other.to_string(),
        }
    }
}

/// Core attributes, in sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Attribute {
    Body,
    Agility,
    Reaction,
    Strength,
    Charisma,
    Intuition,
    Logic,
    Willpower,
    Magic,
    Resonance,
    Edge,
    Essence,
}

impl Attribute {
    pub const ALL: [Attribute; 12] = [
        Attribute::Body,
        Attribute::Agility,
        Attribute::Reaction,
        Attribute::Strength,
        Attribute::Charisma,
        Attribute::Intuition,
        Attribute::Logic,
        Attribute::Willpower,
        Attribute::Magic,
        Attribute::Resonance,
        Attribute::Edge,
        Attribute::Essence,
    ];

    pub fn abbrev(&self) -> &'static str {
        match self {
            Attribute::Body => "BOD",
            Attribute::Agility => "AGI",
            Attribute::Reaction => "REA",
            Attribute::Strength => "STR",
            Attribute::Charisma => "CHA",
            Attribute::Intuition => "INT",
            Attribute::Logic => "LOG",
            Attribute::Willpower => "WIL",
            Attribute::Magic => "MAG",
            Attribute::Resonance => "RES",
            Attribute::Edge => "EDG",
            Attribute::Essence => "ESS",
        }
    }

    pub fn from_abbrev(abbrev: &str) -> Option<Attribute> {
        Attribute::ALL
            .into_iter()
            .find(|a| a.abbrev().eq_ignore_ascii_case(abbrev.trim()))
    }

    /// Sprites have no physical body and no willpower.
    pub fn is_absent_for_sprites(&self) -> bool {
        matches!(
            self,
            Attribute::Body
                | Attribute::Agility
                | Attribute::Reaction
                | Attribute::Strength
                | Attribute::Willpower
        )
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

impl From<Attribute> for String {
    fn from(attribute: Attribute) -> Self {
        attribute.abbrev().to_string()
    }
}

impl TryFrom<String> for Attribute {
    type Error = String;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Attribute::from_abbrev(&text).ok_or_else(|| format!("unknown attribute {text:?}"))
    }
}

/// Limits for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeLimits {
    pub name: Attribute,
    #[serde(rename = "metatypemin", default, deserialize_with = "lenient::int")]
    pub metatype_minimum: i32,
    #[serde(default, deserialize_with = "lenient::int")]
    pub min: i32,
    #[serde(default, deserialize_with = "lenient::int")]
    pub max: i32,
    #[serde(default, deserialize_with = "lenient::int")]
    pub aug: i32,
}

impl AttributeLimits {
    fn zeroed(name: Attribute) -> Self {
        Self {
            name,
            metatype_minimum: 0,
            min: 0,
            max: 0,
            aug: 0,
        }
    }
}

/// How the character was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum BuildMethod {
    #[default]
    Karma,
    Priority,
}

impl From<BuildMethod> for String {
    fn from(method: BuildMethod) -> Self {
        match method {
            BuildMethod::Karma => "Karma".to_string(),
            BuildMethod::Priority => "Priority".to_string(),
        }
    }
}

impl From<String> for BuildMethod {
    fn from(text: String) -> Self {
        match text.trim() {
            "Priority" => BuildMethod::Priority,
            _ => BuildMethod::Karma,
        }
    }
}

/// Where a quality came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum QualitySource {
    #[default]
    Metatype,
    /// Granted by the metatype but may be bought off.
    MetatypeRemovable,
}

impl From<QualitySource> for String {
    fn from(source: QualitySource) -> Self {
        match source {
            QualitySource::Metatype => "Metatype".to_string(),
            QualitySource::MetatypeRemovable => "MetatypeRemovable".to_string(),
        }
    }
}

impl From<String> for QualitySource {
    fn from(text: String) -> Self {
        match text.trim() {
            "MetatypeRemovable" => QualitySource::MetatypeRemovable,
            _ => QualitySource::Metatype,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritterQuality {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extra: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub karma: i32,
    #[serde(rename = "qualitysource", default)]
    pub origin: QualitySource,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub page: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritterPower {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub power_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub range: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub rating: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extra: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub page: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexForm {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extra: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub duration: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fv: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub page: String,
}

macro_rules! xml_list {
    ($name:ident, $tag:literal, $item:ty) => {
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            #[serde(rename = $tag, default)]
            pub items: Vec<$item>,
        }

        impl $name {
            pub fn is_empty(&self) -> bool {
                self.items.is_empty()
            }
        }
    };
}

xml_list!(AttributeList, "attribute", AttributeLimits);
xml_list!(QualityList, "quality", CritterQuality);
xml_list!(PowerList, "critterpower", CritterPower);
xml_list!(OptionalPowerList, "optionalpower", String);
xml_list!(ComplexFormList, "complexform", ComplexForm);
xml_list!(WeaponList, "weapon", Weapon);

/// A critter character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Critter {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub metatype: String,
    #[serde(rename = "metatypecategory", default)]
    pub metatype_category: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub metavariant: String,
    #[serde(rename = "metatypebp", default, deserialize_with = "lenient::int")]
    pub metatype_bp: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub movement: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub force: i32,
    #[serde(rename = "buildmethod", default)]
    pub build_method: BuildMethod,
    #[serde(rename = "buildkarma", default, deserialize_with = "lenient::int")]
    pub build_points: i32,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub created: bool,
    #[serde(rename = "iscritter", default, deserialize_with = "lenient::flag")]
    pub is_critter: bool,
    #[serde(rename = "ignorerules", default, deserialize_with = "lenient::flag")]
    pub ignore_rules: bool,
    #[serde(default)]
    pub attributes: AttributeList,
    #[serde(default, skip_serializing_if = "QualityList::is_empty")]
    pub qualities: QualityList,
    #[serde(rename = "critterpowers", default, skip_serializing_if = "PowerList::is_empty")]
    pub powers: PowerList,
    #[serde(rename = "optionalpowerslots", default, deserialize_with = "lenient::int")]
    pub optional_power_slots: i32,
    #[serde(
        rename = "optionalpowers",
        default,
        skip_serializing_if = "OptionalPowerList::is_empty"
    )]
    pub optional_powers: OptionalPowerList,
    #[serde(
        rename = "complexforms",
        default,
        skip_serializing_if = "ComplexFormList::is_empty"
    )]
    pub complex_forms: ComplexFormList,
    #[serde(default, skip_serializing_if = "GearList::is_empty")]
    pub gears: GearList,
    #[serde(default, skip_serializing_if = "WeaponList::is_empty")]
    pub weapons: WeaponList,
}

impl Critter {
    pub fn attribute(&self, attribute: Attribute) -> Option<&AttributeLimits> {
        self.attributes.items.iter().find(|a| a.name == attribute)
    }

    pub fn is_sprite(&self) -> bool {
        is_sprite_category(&self.metatype_category)
    }

    /// Resolve gear kinds and, for a copy, give every entity a new id.
    pub(crate) fn after_load(&mut self, copy: bool) {
        for gear in &mut self.gears.items {
            gear.resolve_kinds();
            if copy {
                gear.regenerate_ids(None);
            }
        }
        for weapon in &mut self.weapons.items {
            weapon.after_load(copy);
        }
    }
}

/// What to create: a metatype from `critters.xml` at a given force.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CritterRequest {
    pub metatype: String,
    pub force: i32,
    /// Character name; the alias is always the metatype name.
    pub name: Option<String>,
}

impl CritterRequest {
    pub fn new(metatype: impl Into<String>, force: i32) -> Self {
        Self {
            metatype: metatype.into(),
            force,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Builds critter characters from rule data.
pub struct CritterFactory<'a> {
    ctx: &'a RulesContext,
}

impl<'a> CritterFactory<'a> {
    pub fn new(ctx: &'a RulesContext) -> Self {
        Self { ctx }
    }

    fn rules(&self) -> &CritterLimitRules {
        &self.ctx.settings().critter_rules
    }

    /// Create a critter character from its metatype.
    pub fn create(&self, request: &CritterRequest) -> Result<Critter, CritterError> {
        if request.metatype.trim().is_empty() {
            return Err(CritterError::NoCritterSelected);
        }
        let critters = self.ctx.registry().critters()?;
        let metatype = critters
            .metatype(&request.metatype)
            .ok_or_else(|| CritterError::UnknownCritter(request.metatype.clone()))?;
        let force = request.force;

        let mut critter = Critter {
            name: request.name.clone().unwrap_or_default(),
            alias: metatype.name.clone(),
            metatype: metatype.name.clone(),
            metatype_category: metatype.category.clone(),
            metavariant: String::new(),
            metatype_bp: 0,
            movement: metatype.movement.clone().unwrap_or_default(),
            force,
            build_method: BuildMethod::Karma,
            build_points: 0,
            created: true,
            is_critter: true,
            ignore_rules: true,
            attributes: AttributeList {
                items: self.attribute_limits(metatype, force),
            },
            qualities: QualityList::default(),
            powers: PowerList::default(),
            optional_power_slots: 0,
            optional_powers: OptionalPowerList::default(),
            complex_forms: ComplexFormList::default(),
            gears: GearList::default(),
            weapons: WeaponList::default(),
        };

        critter.qualities.items = self.qualities(metatype)?;
        critter.powers.items = self.powers(metatype.powers())?;

        if let Some(optional) = metatype.optional_powers() {
            let per_slot = self.rules().force_per_optional_power.max(1);
            critter.optional_power_slots = (force / per_slot).max(0);
            critter.optional_powers.items = optional.iter().map(|p| p.name.clone()).collect();
        }

        critter.complex_forms.items = self.complex_forms(metatype.complex_forms())?;
        critter.gears.items = self.gear(metatype.gears(), force)?;

        if let Some(unarmed) = self.unarmed_attack()? {
            critter.weapons.items.push(unarmed);
        }

        tracing::info!(
            metatype = %critter.metatype,
            force,
            powers = critter.powers.items.len(),
            "created critter"
        );
        Ok(critter)
    }

    /// Attribute limits for a metatype at a force.
    ///
    /// The configured ally spirit uses its own min/max/aug expressions. Other
    /// critters derive all three from the minimum expression with the
    /// configured offsets, except essence which always uses its own.
    pub fn attribute_limits(&self, metatype: &MetatypeTemplate, force: i32) -> Vec<AttributeLimits> {
        let rules = self.rules();
        let is_ally = metatype.name == rules.ally_spirit;
        let is_sprite = metatype.is_sprite();

        Attribute::ALL
            .into_iter()
            .map(|attribute| {
                if is_sprite && attribute.is_absent_for_sprites() {
                    return AttributeLimits::zeroed(attribute);
                }
                let exprs = metatype.attribute(attribute);
                let (min, max, aug) = if is_ally || attribute == Attribute::Essence {
                    (
                        attribute_value(exprs.min, force, 0),
                        attribute_value(exprs.max, force, 0),
                        attribute_value(exprs.aug, force, 0),
                    )
                } else {
                    (
                        attribute_value(exprs.min, force, rules.min_offset),
                        attribute_value(exprs.min, force, rules.max_offset),
                        attribute_value(exprs.min, force, rules.aug_offset),
                    )
                };
                let metatype_minimum = if attribute == Attribute::Essence {
                    attribute_value(exprs.max, force, 0)
                } else {
                    attribute_value(exprs.min, force, 0)
                };
                AttributeLimits {
                    name: attribute,
                    metatype_minimum,
                    min,
                    max,
                    aug,
                }
            })
            .collect()
    }

    fn qualities(&self, metatype: &MetatypeTemplate) -> Result<Vec<CritterQuality>, CritterError> {
        let refs: Vec<&TemplateRef> = metatype
            .positive_qualities()
            .iter()
            .chain(metatype.negative_qualities())
            .collect();
        if refs.is_empty() {
            return Ok(Vec::new());
        }
        let document = self.ctx.registry().qualities()?;

        Ok(refs
            .into_iter()
            .filter_map(|quality_ref| {
                let Some(template) = document.quality(quality_ref.name.trim()) else {
                    tracing::warn!(quality = %quality_ref.name, "metatype quality not found, skipping");
                    return None;
                };
                Some(CritterQuality {
                    name: template.name.clone(),
                    category: template.category.clone(),
                    extra: quality_ref.select.clone().unwrap_or_default(),
                    karma: template.karma,
                    origin: if quality_ref.is_removable() {
                        QualitySource::MetatypeRemovable
                    } else {
                        QualitySource::Metatype
                    },
                    source: template.source.clone(),
                    page: template.page.clone(),
                })
            })
            .collect())
    }

    fn powers(&self, refs: &[TemplateRef]) -> Result<Vec<CritterPower>, CritterError> {
        if refs.is_empty() {
            return Ok(Vec::new());
        }
        let document = self.ctx.registry().critter_powers()?;

        Ok(refs
            .iter()
            .filter_map(|power_ref| {
                let Some(template) = document.power(power_ref.name.trim()) else {
                    tracing::warn!(power = %power_ref.name, "critter power not found, skipping");
                    return None;
                };
                Some(CritterPower {
                    name: template.name.clone(),
                    category: template.category.clone(),
                    power_type: template.power_type.clone(),
                    action: template.action.clone(),
                    range: template.range.clone(),
                    duration: template.duration.clone(),
                    rating: power_ref
                        .rating
                        .as_deref()
                        .and_then(|r| r.trim().parse().ok())
                        .unwrap_or_default(),
                    extra: power_ref.select.clone().unwrap_or_default(),
                    source: template.source.clone(),
                    page: template.page.clone(),
                })
            })
            .collect())
    }

    fn complex_forms(&self, refs: &[TemplateRef]) -> Result<Vec<ComplexForm>, CritterError> {
        if refs.is_empty() {
            return Ok(Vec::new());
        }
        let document = self.ctx.registry().complex_forms()?;

        Ok(refs
            .iter()
            .filter_map(|form_ref| {
                let Some(template) = document.complex_form(form_ref.name.trim()) else {
                    tracing::warn!(complex_form = %form_ref.name, "complex form not found, skipping");
                    return None;
                };
                Some(ComplexForm {
                    name: template.name.clone(),
                    extra: form_ref.select.clone().unwrap_or_default(),
                    target: template.target.clone(),
                    duration: template.duration.clone(),
                    fv: template.fv.clone(),
                    source: template.source.clone(),
                    page: template.page.clone(),
                })
            })
            .collect())
    }

    /// Gear the metatype comes with. Ratings are force expressions; the gear
    /// itself is free.
    fn gear(&self, refs: &[TemplateRef], force: i32) -> Result<Vec<Gear>, CritterError> {
        if refs.is_empty() {
            return Ok(Vec::new());
        }
        let document = self.ctx.registry().gear()?;
        let mut created = Vec::with_capacity(refs.len());

        for gear_ref in refs {
            let Some(template) = document.find(gear_ref.name.trim(), None) else {
                tracing::warn!(gear = %gear_ref.name, "critter gear not found, skipping");
                continue;
            };
            let rating = gear_ref
                .rating
                .as_deref()
                .map(|r| attribute_value(r, force, 0))
                .unwrap_or_default();
            let mut options = CreateOptions::new().with_rating(rating);
            if let Some(select) = &gear_ref.select {
                options = options.with_forced_value(select.clone());
            }
            let mut gear = Gear::create(template, &options, self.ctx)?;
            gear.set_cost("0");
            created.push(gear);
        }
        Ok(created)
    }

    fn unarmed_attack(&self) -> Result<Option<Weapon>, CritterError> {
        let document = match self.ctx.registry().weapons() {
            Ok(document) => document,
            Err(TemplateError::MissingFile(file)) => {
                tracing::debug!(file, "no weapon data, critter gets no unarmed attack");
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        };
        let Some(template) = document.weapon(UNARMED_ATTACK) else {
            return Ok(None);
        };
        let mut weapon = Weapon::create(template, &CreateOptions::new(), self.ctx)?;
        // Owned by the character itself, so it can never be removed.
        weapon.set_parent_id(Some(EntityId::new()));
        Ok(Some(weapon))
    }

    /// Create the critter a spirit or sprite stands for, save it where the
    /// user chooses, and link the save file to the spirit.
    pub async fn create_for_spirit(
        &self,
        spirit: &mut Spirit,
        prompt: &mut dyn SavePrompt,
    ) -> Result<PathBuf, CritterError> {
        if spirit.name().trim().is_empty() {
            return Err(CritterError::NoCritterSelected);
        }

        let suggested = suggested_file_name(spirit, spirit.name(), self.ctx.translator());
        let path = prompt
            .pick_save_path(&suggested)
            .ok_or(CritterError::Cancelled)?;

        let mut request = CritterRequest::new(spirit.name(), spirit.force());
        if !spirit.critter_name().trim().is_empty() {
            request = request.with_name(spirit.critter_name());
        }
        let critter = self.create(&request)?;

        SavedCritter::new(critter).save_xml(&path).await?;
        spirit.link_critter(&path);
        tracing::info!(path = %path.display(), spirit = %spirit.name(), "linked critter save file");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::language::LanguageManager;
    use crate::testing::{sample_context, sample_registry};
    use std::sync::Arc;

    #[test]
    fn test_unknown_critter() {
        let ctx = sample_context();
        let factory = CritterFactory::new(&ctx);
        let error = factory
            .create(&CritterRequest::new("Spirit of Nothing", 4))
            .unwrap_err();
        assert!(matches!(error, CritterError::UnknownCritter(ref name) if name == "Spirit of Nothing"));
        assert_eq!(
            error.user_message(&LanguageManager::english()),
            "Unable to find the Critter type Spirit of Nothing."
        );
    }

    #[test]
    fn test_empty_request() {
        let ctx = sample_context();
        let error = CritterFactory::new(&ctx)
            .create(&CritterRequest::new("  ", 4))
            .unwrap_err();
        assert!(matches!(error, CritterError::NoCritterSelected));
    }

    #[test]
    fn test_spirit_limits_use_offsets() {
        let ctx = sample_context();
        let fire = CritterFactory::new(&ctx)
            .create(&CritterRequest::new("Spirit of Fire", 4))
            .unwrap();

        // bodmin "F+1" at force 4
        let body = fire.attribute(Attribute::Body).unwrap();
        assert_eq!(body.metatype_minimum, 5);
        assert_eq!((body.min, body.max, body.aug), (2, 8, 8));

        // strmin "F-2": min clamps to 1 for a positive force
        let strength = fire.attribute(Attribute::Strength).unwrap();
        assert_eq!((strength.min, strength.max), (1, 5));

        // Essence uses its own expressions without offsets.
        let essence = fire.attribute(Attribute::Essence).unwrap();
        assert_eq!((essence.min, essence.max, essence.aug), (4, 4, 4));
        assert_eq!(essence.metatype_minimum, 4);
    }

    #[test]
    fn test_ally_spirit_uses_own_ranges() {
        let ctx = sample_context();
        let ally = CritterFactory::new(&ctx)
            .create(&CritterRequest::new("Ally Spirit", 5))
            .unwrap();
        let body = ally.attribute(Attribute::Body).unwrap();
        // bodmin "F-2", bodmax "F", bodaug "F+2"
        assert_eq!((body.min, body.max, body.aug), (3, 5, 7));
    }

    #[test]
    fn test_custom_offsets() {
        let rules = CritterLimitRules {
            min_offset: -1,
            max_offset: 1,
            aug_offset: 2,
            ..CritterLimitRules::default()
        };
        let ctx = RulesContext::new(
            Arc::new(sample_registry()),
            Settings::new().with_critter_rules(rules),
            LanguageManager::english(),
        );
        let fire = CritterFactory::new(&ctx)
            .create(&CritterRequest::new("Spirit of Fire", 4))
            .unwrap();
        let body = fire.attribute(Attribute::Body).unwrap();
        assert_eq!((body.min, body.max, body.aug), (4, 6, 7));
    }

    #[test]
    fn test_metatype_details_are_copied() {
        let ctx = sample_context();
        let fire = CritterFactory::new(&ctx)
            .create(&CritterRequest::new("Spirit of Fire", 6).with_name("Ember"))
            .unwrap();

        assert_eq!(fire.name, "Ember");
        assert_eq!(fire.alias, "Spirit of Fire");
        assert_eq!(fire.metatype_category, "Spirits");
        assert_eq!(fire.movement, "x2/x4/+15");
        assert!(fire.created);
        assert!(fire.is_critter);
        assert_eq!(fire.build_method, BuildMethod::Karma);
        assert_eq!(fire.build_points, 0);

        let qualities: Vec<_> = fire.qualities.items.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(qualities, vec!["Dual Natured", "Allergy"]);
        assert_eq!(fire.qualities.items[0].origin, QualitySource::MetatypeRemovable);
        assert_eq!(fire.qualities.items[1].origin, QualitySource::Metatype);
        assert_eq!(fire.qualities.items[1].extra, "Water, Severe");

        let energy_aura = &fire.powers.items[1];
        assert_eq!(energy_aura.name, "Energy Aura");
        assert_eq!(energy_aura.extra, "Fire");

        // One optional power per full 3 force.
        assert_eq!(fire.optional_power_slots, 2);
        assert_eq!(fire.optional_powers.items, vec!["Fear", "Guard"]);

        let unarmed = &fire.weapons.items[0];
        assert_eq!(unarmed.name(), UNARMED_ATTACK);
        assert!(unarmed.parent_id().is_some());
    }

    #[test]
    fn test_optional_power_slots() {
        let ctx = sample_context();
        let factory = CritterFactory::new(&ctx);
        let slots = |force| {
            factory
                .create(&CritterRequest::new("Spirit of Fire", force))
                .unwrap()
                .optional_power_slots
        };
        assert_eq!(slots(2), 0);
        assert_eq!(slots(3), 1);
        assert_eq!(slots(5), 1);
        assert_eq!(slots(9), 3);
    }

    #[test]
    fn test_sprite() {
        let ctx = sample_context();
        let courier = CritterFactory::new(&ctx)
            .create(&CritterRequest::new("Courier Sprite", 4))
            .unwrap();

        assert!(courier.is_sprite());
        for attribute in [
            Attribute::Body,
            Attribute::Agility,
            Attribute::Reaction,
            Attribute::Strength,
            Attribute::Willpower,
        ] {
            let limits = courier.attribute(attribute).unwrap();
            assert_eq!((limits.min, limits.max, limits.aug), (0, 0, 0), "{attribute}");
            assert_eq!(limits.metatype_minimum, 0, "{attribute}");
        }
        assert!(courier.attribute(Attribute::Logic).unwrap().max > 0);

        assert_eq!(courier.complex_forms.items.len(), 1);
        assert_eq!(courier.complex_forms.items[0].name, "Cookie");
        assert_eq!(courier.optional_power_slots, 0);

        // Gear rating "F" at force 4, always free.
        let agent = &courier.gears.items[0];
        assert_eq!(agent.name(), "Agent");
        assert_eq!(agent.rating(), 4);
        assert_eq!(agent.cost(), "0");
        assert_eq!(agent.own_cost(), 0.0);
    }

    #[test]
    fn test_attribute_abbreviations() {
        assert_eq!(Attribute::from_abbrev("wil"), Some(Attribute::Willpower));
        assert_eq!(Attribute::from_abbrev("XYZ"), None);
        assert_eq!(Attribute::Essence.to_string(), "ESS");
        assert!(Attribute::try_from(String::from("LCK")).is_err());
    }
}
