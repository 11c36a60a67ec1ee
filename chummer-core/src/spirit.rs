//! Bound spirits and registered sprites, and the list of spirits a
//! character can summon.

use crate::context::RulesContext;
use crate::id::EntityId;
use crate::language::{TemplateKey, Translator};
use crate::prompt::ConfirmPrompt;
use crate::templates::{lenient, SpiritSlots, TemplateError, CRITTERS_FILE, STREAMS_FILE, TRADITIONS_FILE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Tradition name whose spirits come from the character's own slots.
pub const CUSTOM_TRADITION: &str = "Custom";

/// Spirits are summoned by magicians, sprites compiled by technomancers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SpiritType {
    #[default]
    Spirit,
    Sprite,
}

impl SpiritType {
    /// Label key for the force/rating of this kind of entity.
    pub fn force_key(&self) -> &'static str {
        match self {
            SpiritType::Spirit => "String_Force",
            SpiritType::Sprite => "String_Rating",
        }
    }
}

impl From<SpiritType> for String {
    fn from(kind: SpiritType) -> Self {
        match kind {
            SpiritType::Spirit => "Spirit".to_string(),
            SpiritType::Sprite => "Sprite".to_string(),
        }
    }
}

impl From<String> for SpiritType {
    fn from(text: String) -> Self {
        match text.trim() {
            "Sprite" => SpiritType::Sprite,
            _ => SpiritType::Spirit,
        }
    }
}

/// A spirit or sprite bound to a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spirit {
    #[serde(rename = "guid", default = "EntityId::nil")]
    id: EntityId,
    #[serde(rename = "type", default)]
    entity_type: SpiritType,
    #[serde(default)]
    name: String,
    #[serde(rename = "crittername", default, skip_serializing_if = "String::is_empty")]
    critter_name: String,
    #[serde(default, deserialize_with = "lenient::int")]
    force: i32,
    #[serde(rename = "services", default, deserialize_with = "lenient::int")]
    services_owed: i32,
    #[serde(default, deserialize_with = "lenient::flag")]
    bound: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    fettered: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    notes: String,
    #[serde(rename = "file", default, skip_serializing_if = "String::is_empty")]
    file_name: String,
    #[serde(rename = "relative", default, skip_serializing_if = "String::is_empty")]
    relative_file_name: String,
}

impl Spirit {
    pub fn new(entity_type: SpiritType, name: impl Into<String>, force: i32) -> Self {
        Self {
            id: EntityId::new(),
            entity_type,
            name: name.into(),
            critter_name: String::new(),
            force,
            services_owed: 0,
            bound: true,
            fettered: false,
            notes: String::new(),
            file_name: String::new(),
            relative_file_name: String::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn entity_type(&self) -> SpiritType {
        self.entity_type
    }

    /// Metatype name, e.g. `Spirit of Fire`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The player's own name for this spirit.
    pub fn critter_name(&self) -> &str {
        &self.critter_name
    }

    pub fn set_critter_name(&mut self, name: impl Into<String>) {
        self.critter_name = name.into();
    }

    pub fn force(&self) -> i32 {
        self.force
    }

    pub fn set_force(&mut self, force: i32) {
        self.force = force.max(0);
    }

    pub fn services_owed(&self) -> i32 {
        self.services_owed
    }

    pub fn set_services_owed(&mut self, services: i32) {
        self.services_owed = services.max(0);
    }

    /// Bound for spirits, registered for sprites.
    pub fn bound(&self) -> bool {
        self.bound
    }

    pub fn set_bound(&mut self, bound: bool) {
        self.bound = bound;
    }

    pub fn fettered(&self) -> bool {
        self.fettered
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn relative_file_name(&self) -> &str {
        &self.relative_file_name
    }

    pub fn has_linked_file(&self) -> bool {
        !self.file_name.is_empty()
    }

    /// Label for the force field, e.g. `Force:` or `Rating:`.
    pub fn force_label(&self, translator: &dyn Translator) -> String {
        match self.entity_type {
            SpiritType::Spirit => translator.get_string("Label_Spirit_Force"),
            SpiritType::Sprite => translator.get_string("Label_Sprite_Rating"),
        }
    }

    /// Label for the bound flag, e.g. `Bound` or `Registered`.
    pub fn bound_label(&self, translator: &dyn Translator) -> String {
        match self.entity_type {
            SpiritType::Spirit => translator.get_string("Checkbox_Spirit_Bound"),
            SpiritType::Sprite => translator.get_string("Label_Sprite_Registered"),
        }
    }

    /// Link a saved critter file to this spirit.
    ///
    /// The relative name is the bare file name, looked up next to the
    /// owning character's file when the absolute path no longer exists.
    pub fn link_critter(&mut self, path: &Path) {
        self.file_name = path.display().to_string();
        self.relative_file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
    }

    /// Ask the user whether to drop the link to the saved critter file.
    /// Returns whether the link was removed.
    pub fn remove_link(&mut self, prompt: &mut dyn ConfirmPrompt, translator: &dyn Translator) -> bool {
        if !self.has_linked_file() && self.relative_file_name.is_empty() {
            return false;
        }
        let confirmed = prompt.confirm(
            &translator.get_string("Message_RemoveCharacterAssociation"),
            &translator.get_string("MessageTitle_RemoveCharacterAssociation"),
        );
        if confirmed {
            self.file_name.clear();
            self.relative_file_name.clear();
        }
        confirmed
    }

    /// Find the linked save file: the stored path first, then the relative
    /// name under `base_dir`.
    pub fn resolve_linked_file(&self, base_dir: Option<&Path>) -> Option<PathBuf> {
        if !self.file_name.is_empty() {
            let path = PathBuf::from(&self.file_name);
            if path.exists() {
                return Some(path);
            }
        }
        let base_dir = base_dir?;
        if self.relative_file_name.is_empty() {
            return None;
        }
        let path = base_dir.join(&self.relative_file_name);
        if path.exists() {
            Some(path)
        } else {
            tracing::debug!(file = %self.file_name, "linked critter file not found");
            None
        }
    }

    /// Message shown when the linked file cannot be found.
    pub fn missing_file_message(&self, translator: &dyn Translator) -> String {
        translator
            .get_string("Message_FileNotFound")
            .replace("{0}", &self.file_name)
    }
}

/// File name offered when saving the critter behind a spirit,
/// e.g. `Spirit of Fire (Force 4).chum5`.
pub fn suggested_file_name(spirit: &Spirit, critter_name: &str, translator: &dyn Translator) -> String {
    format!(
        "{} ({} {}).chum5",
        critter_name,
        translator.get_string(spirit.entity_type.force_key()),
        spirit.force
    )
}

/// A character's spirits and sprites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpiritRoster {
    #[serde(rename = "spirit", default)]
    spirits: Vec<Spirit>,
}

impl SpiritRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, spirit: Spirit) -> EntityId {
        let id = spirit.id;
        self.spirits.push(spirit);
        id
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Spirit> {
        let index = self.spirits.iter().position(|s| s.id == id)?;
        Some(self.spirits.remove(index))
    }

    pub fn get(&self, id: EntityId) -> Option<&Spirit> {
        self.spirits.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Spirit> {
        self.spirits.iter_mut().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spirit> {
        self.spirits.iter()
    }

    pub fn len(&self) -> usize {
        self.spirits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spirits.is_empty()
    }

    pub fn fettered(&self) -> Option<&Spirit> {
        self.spirits.iter().find(|s| s.fettered)
    }

    /// Fetter or release a spirit. Only one spirit may be fettered at a
    /// time; fettering a second one is refused and returns `false`.
    pub fn set_fettered(&mut self, id: EntityId, fettered: bool) -> bool {
        if fettered && self.spirits.iter().any(|s| s.fettered && s.id != id) {
            return false;
        }
        match self.get_mut(id) {
            Some(spirit) if spirit.entity_type == SpiritType::Spirit || !fettered => {
                spirit.fettered = fettered;
                true
            }
            _ => false,
        }
    }
}

/// A selectable spirit: the metatype name and how to show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpiritOption {
    pub value: String,
    pub name: String,
}

/// What determines the spirits a character can choose from.
#[derive(Debug, Clone, Default)]
pub struct SpiritListOptions {
    pub tradition: String,
    pub entity_type: SpiritType,
    /// Spirits of a custom tradition.
    pub custom: SpiritSlots,
    /// When non-empty, only these spirits are offered.
    pub limit_categories: HashSet<String>,
    /// Sprites added by improvements.
    pub extra_sprites: Vec<String>,
    pub magic_enabled: bool,
    pub resonance_enabled: bool,
}

/// Spirits (or sprites) a character can choose from, in display order.
///
/// Sprites come from `streams.xml`, spirits from `traditions.xml`. Magic users
/// can always choose the configured ally spirit. Duplicates are dropped.
pub fn spirit_options(ctx: &RulesContext, options: &SpiritListOptions) -> Result<Vec<SpiritOption>, TemplateError> {
    let tradition = options.tradition.trim();
    if tradition.is_empty() {
        return Ok(Vec::new());
    }
    let streams = options.entity_type == SpiritType::Sprite;
    let file = if streams { STREAMS_FILE } else { TRADITIONS_FILE };
    let document = ctx.registry().traditions(streams)?;

    let mut names: Vec<String> = if tradition == CUSTOM_TRADITION {
        options.custom.names().into_iter().map(str::to_string).collect()
    } else {
        let template = document.tradition(tradition).ok_or_else(|| TemplateError::NotFound {
            file,
            kind: "tradition",
            name: tradition.to_string(),
        })?;
        template.spirits.names().into_iter().map(str::to_string).collect()
    };

    if !options.limit_categories.is_empty() {
        names.retain(|name| options.limit_categories.contains(name));
    }
    if streams && options.resonance_enabled {
        names.extend(options.extra_sprites.iter().cloned());
    }

    let mut seen = HashSet::new();
    let mut spirits: Vec<SpiritOption> = names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .map(|name| {
            let translate = document.spirit(&name).and_then(|s| s.translate.as_deref());
            let display = ctx
                .translation(TemplateKey::new(file, "spirit", name.as_str(), ""), translate, None)
                .map(|t| t.name)
                .unwrap_or_else(|| name.clone());
            SpiritOption { value: name, name: display }
        })
        .collect();

    if !streams && options.magic_enabled {
        let ally = ctx.settings().critter_rules.ally_spirit.clone();
        if seen.insert(ally.clone()) {
            let critters = ctx.registry().critters()?;
            let translate = critters.metatype(&ally).and_then(|m| m.translate.as_deref());
            let display = ctx
                .translation(TemplateKey::new(CRITTERS_FILE, "metatype", ally.as_str(), ""), translate, None)
                .map(|t| t.name)
                .unwrap_or_else(|| ally.clone());
            spirits.push(SpiritOption { value: ally, name: display });
        }
    }

    Ok(spirits)
}
