//! Critter rule data: `critters.xml`, `critterpowers.xml`, `qualities.xml`,
//! `complexforms.xml`, and the spirit lists in `traditions.xml`/`streams.xml`.

use crate::critter::Attribute;
use serde::Deserialize;

/// Reference to another template, e.g. `<power rating="3" select="Fire">Energy Aura</power>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplateRef {
    #[serde(rename = "@select", default)]
    pub select: Option<String>,
    #[serde(rename = "@rating", default)]
    pub rating: Option<String>,
    #[serde(rename = "@removable", default)]
    pub removable: Option<String>,
    #[serde(rename = "$text", default)]
    pub name: String,
}

impl TemplateRef {
    pub fn is_removable(&self) -> bool {
        self.removable
            .as_deref()
            .map_or(false, |r| r.eq_ignore_ascii_case("true"))
    }
}

/// Whether a metatype category holds sprites (`Sprites`, `Sprite`, ...).
pub fn is_sprite_category(category: &str) -> bool {
    category.trim_end_matches('s').ends_with("Sprite")
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrittersDocument {
    #[serde(default)]
    metatypes: MetatypeList,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MetatypeList {
    #[serde(rename = "metatype", default)]
    items: Vec<MetatypeTemplate>,
}

impl CrittersDocument {
    pub fn metatype(&self, name: &str) -> Option<&MetatypeTemplate> {
        self.metatypes.items.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct QualityRefs {
    #[serde(rename = "quality", default)]
    items: Vec<TemplateRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MetatypeQualities {
    #[serde(default)]
    positive: QualityRefs,
    #[serde(default)]
    negative: QualityRefs,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PowerRefs {
    #[serde(rename = "power", default)]
    items: Vec<TemplateRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OptionalPowerRefs {
    #[serde(rename = "optionalpower", default)]
    items: Vec<TemplateRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ComplexFormRefs {
    #[serde(rename = "complexform", default)]
    items: Vec<TemplateRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GearRefs {
    #[serde(rename = "gear", default)]
    items: Vec<TemplateRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetatypeTemplate {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub translate: Option<String>,
    #[serde(default)]
    pub movement: Option<String>,

    #[serde(default)]
    bodmin: String,
    #[serde(default)]
    bodmax: String,
    #[serde(default)]
    bodaug: String,
    #[serde(default)]
    agimin: String,
    #[serde(default)]
    agimax: String,
    #[serde(default)]
    agiaug: String,
    #[serde(default)]
    reamin: String,
    #[serde(default)]
    reamax: String,
    #[serde(default)]
    reaaug: String,
    #[serde(default)]
    strmin: String,
    #[serde(default)]
    strmax: String,
    #[serde(default)]
    straug: String,
    #[serde(default)]
    chamin: String,
    #[serde(default)]
    chamax: String,
    #[serde(default)]
    chaaug: String,
    #[serde(default)]
    intmin: String,
    #[serde(default)]
    intmax: String,
    #[serde(default)]
    intaug: String,
    #[serde(default)]
    logmin: String,
    #[serde(default)]
    logmax: String,
    #[serde(default)]
    logaug: String,
    #[serde(default)]
    wilmin: String,
    #[serde(default)]
    wilmax: String,
    #[serde(default)]
    wilaug: String,
    #[serde(default)]
    magmin: String,
    #[serde(default)]
    magmax: String,
    #[serde(default)]
    magaug: String,
    #[serde(default)]
    resmin: String,
    #[serde(default)]
    resmax: String,
    #[serde(default)]
    resaug: String,
    #[serde(default)]
    edgmin: String,
    #[serde(default)]
    edgmax: String,
    #[serde(default)]
    edgaug: String,
    #[serde(default)]
    essmin: String,
    #[serde(default)]
    essmax: String,
    #[serde(default)]
    essaug: String,

    #[serde(default)]
    qualities: MetatypeQualities,
    #[serde(default)]
    powers: PowerRefs,
    #[serde(default)]
    optionalpowers: Option<OptionalPowerRefs>,
    #[serde(default)]
    complexforms: ComplexFormRefs,
    #[serde(default)]
    gears: GearRefs,
}

/// Raw min/max/augmented expressions for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeExpressions<'a> {
    pub min: &'a str,
    pub max: &'a str,
    pub aug: &'a str,
}

impl MetatypeTemplate {
    pub fn attribute(&self, attribute: Attribute) -> AttributeExpressions<'_> {
        let (min, max, aug) = match attribute {
            Attribute::Body => (&self.bodmin, &self.bodmax, &self.bodaug),
            Attribute::Agility => (&self.agimin, &self.agimax, &self.agiaug),
            Attribute::Reaction => (&self.reamin, &self.reamax, &self.reaaug),
            Attribute::Strength => (&self.strmin, &self.strmax, &self.straug),
            Attribute::Charisma => (&self.chamin, &self.chamax, &self.chaaug),
            Attribute::Intuition => (&self.intmin, &self.intmax, &self.intaug),
            Attribute::Logic => (&self.logmin, &self.logmax, &self.logaug),
            Attribute::Willpower => (&self.wilmin, &self.wilmax, &self.wilaug),
            Attribute::Magic => (&self.magmin, &self.magmax, &self.magaug),
            Attribute::Resonance => (&self.resmin, &self.resmax, &self.resaug),
            Attribute::Edge => (&self.edgmin, &self.edgmax, &self.edgaug),
            Attribute::Essence => (&self.essmin, &self.essmax, &self.essaug),
        };
        AttributeExpressions { min, max, aug }
    }

    pub fn positive_qualities(&self) -> &[TemplateRef] {
        &self.qualities.positive.items
    }

    pub fn negative_qualities(&self) -> &[TemplateRef] {
        &self.qualities.negative.items
    }

    pub fn powers(&self) -> &[TemplateRef] {
        &self.powers.items
    }

    /// Optional powers, when the metatype offers any.
    pub fn optional_powers(&self) -> Option<&[TemplateRef]> {
        self.optionalpowers.as_ref().map(|o| o.items.as_slice())
    }

    pub fn complex_forms(&self) -> &[TemplateRef] {
        &self.complexforms.items
    }

    pub fn gears(&self) -> &[TemplateRef] {
        &self.gears.items
    }

    pub fn is_sprite(&self) -> bool {
        is_sprite_category(&self.category)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PowersDocument {
    #[serde(default)]
    powers: PowerList,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PowerList {
    #[serde(rename = "power", default)]
    items: Vec<PowerTemplate>,
}

impl PowersDocument {
    pub fn power(&self, name: &str) -> Option<&PowerTemplate> {
        self.powers.items.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PowerTemplate {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub power_type: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub translate: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QualitiesDocument {
    #[serde(default)]
    qualities: QualityList,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct QualityList {
    #[serde(rename = "quality", default)]
    items: Vec<QualityTemplate>,
}

impl QualitiesDocument {
    pub fn quality(&self, name: &str) -> Option<&QualityTemplate> {
        self.qualities.items.iter().find(|q| q.name == name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QualityTemplate {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "super::lenient::int")]
    pub karma: i32,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub translate: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplexFormsDocument {
    #[serde(default)]
    complexforms: ComplexFormList,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ComplexFormList {
    #[serde(rename = "complexform", default)]
    items: Vec<ComplexFormTemplate>,
}

impl ComplexFormsDocument {
    pub fn complex_form(&self, name: &str) -> Option<&ComplexFormTemplate> {
        self.complexforms.items.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplexFormTemplate {
    pub name: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub fv: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub translate: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraditionsDocument {
    #[serde(default)]
    traditions: TraditionList,
    #[serde(default)]
    spirits: SpiritList,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TraditionList {
    #[serde(rename = "tradition", default)]
    items: Vec<TraditionTemplate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SpiritList {
    #[serde(rename = "spirit", default)]
    items: Vec<SpiritTemplate>,
}

impl TraditionsDocument {
    pub fn tradition(&self, name: &str) -> Option<&TraditionTemplate> {
        self.traditions.items.iter().find(|t| t.name == name)
    }

    pub fn spirit(&self, name: &str) -> Option<&SpiritTemplate> {
        self.spirits.items.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraditionTemplate {
    pub name: String,
    #[serde(default)]
    pub spirits: SpiritSlots,
    #[serde(default)]
    pub translate: Option<String>,
}

/// Spirits a tradition (or stream) can summon.
///
/// Magical traditions name one spirit per category; streams list sprites
/// as plain `<spirit>` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SpiritSlots {
    #[serde(default)]
    pub spiritcombat: Option<String>,
    #[serde(default)]
    pub spiritdetection: Option<String>,
    #[serde(default)]
    pub spirithealth: Option<String>,
    #[serde(default)]
    pub spiritillusion: Option<String>,
    #[serde(default)]
    pub spiritmanipulation: Option<String>,
    #[serde(rename = "spirit", default)]
    pub others: Vec<String>,
}

impl SpiritSlots {
    /// All spirit names in document order: the five categories, then the rest.
    pub fn names(&self) -> Vec<&str> {
        [
            &self.spiritcombat,
            &self.spiritdetection,
            &self.spirithealth,
            &self.spiritillusion,
            &self.spiritmanipulation,
        ]
        .into_iter()
        .filter_map(|slot| slot.as_deref())
        .chain(self.others.iter().map(String::as_str))
        .filter(|name| !name.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpiritTemplate {
    pub name: String,
    #[serde(default)]
    pub translate: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_registry;

    #[test]
    fn test_metatype_attributes() {
        let critters = sample_registry().critters().unwrap();
        let fire = critters.metatype("Spirit of Fire").unwrap();

        assert_eq!(fire.category, "Spirits");
        assert_eq!(fire.attribute(Attribute::Body).min, "F+1");
        assert_eq!(fire.attribute(Attribute::Essence).max, "F");
        assert_eq!(fire.powers().len(), 2);
        assert_eq!(fire.powers()[1].select.as_deref(), Some("Fire"));
        assert!(fire.optional_powers().is_some());
        assert!(!fire.is_sprite());
    }

    #[test]
    fn test_sprite_category_names() {
        assert!(is_sprite_category("Sprites"));
        assert!(is_sprite_category("Sprite"));
        assert!(is_sprite_category("Free Sprites"));
        assert!(!is_sprite_category("Spirits"));
        assert!(!is_sprite_category(""));
    }

    #[test]
    fn test_sprite_category() {
        let critters = sample_registry().critters().unwrap();
        let courier = critters.metatype("Courier Sprite").unwrap();
        assert!(courier.is_sprite());
        assert_eq!(courier.complex_forms().len(), 1);
        assert!(courier.optional_powers().is_none());
    }

    #[test]
    fn test_tradition_spirit_slots() {
        let traditions = sample_registry().traditions(false).unwrap();
        let hermetic = traditions.tradition("Hermetic").unwrap();
        assert_eq!(
            hermetic.spirits.names(),
            vec![
                "Spirit of Fire",
                "Spirit of Air",
                "Spirit of Man",
                "Spirit of Air",
                "Spirit of Earth"
            ]
        );
        assert_eq!(
            traditions.spirit("Spirit of Fire").unwrap().translate.as_deref(),
            Some("Feuergeist")
        );
    }

    #[test]
    fn test_stream_spirit_list() {
        let streams = sample_registry().traditions(true).unwrap();
        let default = streams.tradition("Default").unwrap();
        assert_eq!(default.spirits.names(), vec!["Courier Sprite", "Data Sprite"]);
    }
}
