use super::{initial_cost, CreateOptions, DISCOUNT};
use crate::context::RulesContext;
use crate::expression::{Availability, RuleExpression};
use crate::id::EntityId;
use crate::language::{TemplateKey, Translation, Translator};
use crate::templates::{lenient, GearTemplate, TemplateError, UseGearList, GEAR_FILE};
use serde::{Deserialize, Serialize};

/// Categories that held commlink-like devices before the kind was saved.
const COMMLINK_CATEGORIES: [&str; 4] = [
    "Commlinks",
    "Commlink Accessories",
    "Cyberdecks",
    "Rigger Command Consoles",
];

/// What a piece of gear is, fixed when it is created or loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum GearKind {
    #[default]
    Standard,
    /// A device with a device rating (commlinks, decks, consoles).
    Commlink,
}

impl GearKind {
    pub fn for_template(template: &GearTemplate) -> GearKind {
        if template.is_device() {
            GearKind::Commlink
        } else {
            GearKind::Standard
        }
    }

    /// Kind of gear read from a save that predates the `kind` element.
    pub fn from_legacy(category: &str, is_commlink: bool) -> GearKind {
        if is_commlink || COMMLINK_CATEGORIES.contains(&category) {
            GearKind::Commlink
        } else {
            GearKind::Standard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GearKind::Standard => "Standard",
            GearKind::Commlink => "Commlink",
        }
    }
}

impl From<GearKind> for String {
    fn from(kind: GearKind) -> Self {
        kind.as_str().to_string()
    }
}

impl From<String> for GearKind {
    fn from(text: String) -> Self {
        match text.trim() {
            "Commlink" => GearKind::Commlink,
            _ => GearKind::Standard,
        }
    }
}

/// A `<gears>` block of child gear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GearList {
    #[serde(rename = "gear", default)]
    pub items: Vec<Gear>,
}

impl GearList {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn one() -> f64 {
    1.0
}

/// A piece of gear, possibly holding child gear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gear {
    #[serde(rename = "guid", default = "EntityId::nil")]
    id: EntityId,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<GearKind>,
    #[serde(
        rename = "iscommlink",
        default,
        skip_serializing,
        deserialize_with = "lenient::flag"
    )]
    legacy_commlink: bool,
    #[serde(default, deserialize_with = "lenient::int")]
    rating: i32,
    #[serde(rename = "minrating", default, deserialize_with = "lenient::int")]
    min_rating: i32,
    #[serde(rename = "maxrating", default, deserialize_with = "lenient::int")]
    max_rating: i32,
    #[serde(rename = "qty", default = "one", deserialize_with = "lenient::decimal")]
    quantity: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    capacity: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    avail: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    cost: String,
    #[serde(rename = "devicerating", default, skip_serializing_if = "String::is_empty")]
    device_rating: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    page: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    extra: String,
    #[serde(rename = "parentid", default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<EntityId>,
    #[serde(rename = "discountedcost", default, deserialize_with = "lenient::flag")]
    discounted_cost: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    notes: String,
    #[serde(default, skip_serializing_if = "GearList::is_empty")]
    gears: GearList,
    #[serde(skip)]
    translation: Option<Translation>,
}

impl Gear {
    /// Create gear from a `gear.xml` template.
    pub fn create(
        template: &GearTemplate,
        options: &CreateOptions,
        ctx: &RulesContext,
    ) -> Result<Gear, TemplateError> {
        let id = EntityId::new();
        let mut gear = Gear {
            id,
            name: template.name.clone(),
            category: template.category.clone(),
            kind: Some(GearKind::for_template(template)),
            legacy_commlink: false,
            rating: options.rating,
            min_rating: template.minrating.unwrap_or_default(),
            max_rating: template.rating,
            quantity: 1.0,
            capacity: template.capacity.clone(),
            avail: template.avail.clone(),
            cost: initial_cost(&template.cost, options),
            device_rating: template.devicerating.clone().unwrap_or_default(),
            source: template.source.clone(),
            page: template.page.clone(),
            extra: options.forced_value.clone().unwrap_or_default(),
            parent_id: None,
            discounted_cost: false,
            notes: String::new(),
            gears: GearList::default(),
            translation: ctx.translation(
                TemplateKey::new(GEAR_FILE, "gear", &template.name, &template.category),
                template.translate.as_deref(),
                template.altpage.as_deref(),
            ),
        };

        if options.create_children {
            if let Some(children) = &template.gears {
                gear.gears.items = create_bundled_gear(children, id, ctx)?;
            }
        }

        Ok(gear)
    }

    /// Create gear by name (and category, when given) from `gear.xml`.
    pub fn create_named(
        name: &str,
        category: Option<&str>,
        options: &CreateOptions,
        ctx: &RulesContext,
    ) -> Result<Gear, TemplateError> {
        let document = ctx.registry().gear()?;
        let template = document
            .find(name, category)
            .ok_or_else(|| TemplateError::NotFound {
                file: GEAR_FILE,
                kind: "gear",
                name: name.to_string(),
            })?;
        Gear::create(template, options, ctx)
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn kind(&self) -> GearKind {
        self.kind.unwrap_or_default()
    }

    pub fn is_commlink(&self) -> bool {
        self.kind() == GearKind::Commlink
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    pub fn set_rating(&mut self, rating: i32) {
        self.rating = rating;
    }

    pub fn min_rating(&self) -> i32 {
        self.min_rating
    }

    pub fn max_rating(&self) -> i32 {
        self.max_rating
    }

    pub fn set_rating_limits(&mut self, min_rating: i32, max_rating: i32) {
        self.min_rating = min_rating;
        self.max_rating = max_rating;
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: f64) {
        self.quantity = quantity;
    }

    pub fn capacity(&self) -> &str {
        &self.capacity
    }

    pub fn set_capacity(&mut self, capacity: impl Into<String>) {
        self.capacity = capacity.into();
    }

    pub fn avail(&self) -> &str {
        &self.avail
    }

    pub fn set_avail(&mut self, avail: impl Into<String>) {
        self.avail = avail.into();
    }

    /// Raw cost expression.
    pub fn cost(&self) -> &str {
        &self.cost
    }

    pub fn set_cost(&mut self, cost: impl Into<String>) {
        self.cost = cost.into();
    }

    pub fn device_rating(&self) -> &str {
        &self.device_rating
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

    pub fn extra(&self) -> &str {
        &self.extra
    }

    pub fn set_extra(&mut self, extra: impl Into<String>) {
        self.extra = extra.into();
    }

    pub fn parent_id(&self) -> Option<EntityId> {
        self.parent_id
    }

    pub fn set_parent_id(&mut self, parent: Option<EntityId>) {
        self.parent_id = parent;
    }

    pub fn discounted_cost(&self) -> bool {
        self.discounted_cost
    }

    pub fn set_discounted_cost(&mut self, discounted: bool) {
        self.discounted_cost = discounted;
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn children(&self) -> &[Gear] {
        &self.gears.items
    }

    pub fn add_child(&mut self, mut child: Gear) {
        child.parent_id = Some(self.id);
        self.gears.items.push(child);
    }

    /// Translated name, or the name.
    pub fn display_name_short(&self) -> &str {
        match &self.translation {
            Some(t) => &t.name,
            None => &self.name,
        }
    }

    /// Name with rating and extra, e.g. `Medkit (Rating 3)`.
    pub fn display_name(&self, translator: &dyn Translator) -> String {
        let mut text = self.display_name_short().to_string();
        if self.rating > 0 {
            text.push_str(&format!(
                " ({} {})",
                translator.get_string("String_Rating"),
                self.rating
            ));
        }
        if !self.extra.is_empty() {
            text.push_str(&format!(" ({})", self.extra));
        }
        text
    }

    pub fn total_avail(&self) -> Availability {
        Availability::evaluate(&self.avail, self.rating)
    }

    /// Cost of this gear alone, for its whole quantity.
    pub fn own_cost(&self) -> f64 {
        let each = RuleExpression::new(&self.cost)
            .with_rating(self.rating)
            .evaluate_or_zero();
        let cost = each * self.quantity;
        if self.discounted_cost {
            cost * DISCOUNT
        } else {
            cost
        }
    }

    /// Cost including all child gear.
    pub fn total_cost(&self) -> f64 {
        self.own_cost() + self.gears.items.iter().map(Gear::total_cost).sum::<f64>()
    }

    /// Look up translations for this gear and its children.
    pub fn localize(&mut self, ctx: &RulesContext) {
        let template_translation = ctx.registry().gear().ok().and_then(|document| {
            let template = document.find(&self.name, Some(&self.category))?;
            ctx.translation(
                TemplateKey::new(GEAR_FILE, "gear", &self.name, &self.category),
                template.translate.as_deref(),
                template.altpage.as_deref(),
            )
        });
        self.translation = template_translation;
        for child in &mut self.gears.items {
            child.localize(ctx);
        }
    }

    /// Give this gear and every descendant a new identifier.
    pub(crate) fn regenerate_ids(&mut self, parent: Option<EntityId>) {
        self.id = EntityId::new();
        if parent.is_some() {
            self.parent_id = parent;
        }
        let id = self.id;
        for child in &mut self.gears.items {
            child.regenerate_ids(Some(id));
        }
    }

    /// Fill in the kind of gear loaded from saves written without one.
    pub(crate) fn resolve_kinds(&mut self) {
        if self.kind.is_none() {
            self.kind = Some(GearKind::from_legacy(&self.category, self.legacy_commlink));
        }
        // Only read from old saves; the kind now carries it.
        self.legacy_commlink = false;
        for child in &mut self.gears.items {
            child.resolve_kinds();
        }
    }
}

/// Instantiate the `usegear` entries bundled with a template.
///
/// Bundled gear is free, fixed at the listed rating, and owned by `parent`.
/// Entries naming gear that `gear.xml` does not have are skipped.
pub(crate) fn create_bundled_gear(
    list: &UseGearList,
    parent: EntityId,
    ctx: &RulesContext,
) -> Result<Vec<Gear>, TemplateError> {
    if list.items.is_empty() {
        return Ok(Vec::new());
    }
    let document = ctx.registry().gear()?;
    let mut created = Vec::with_capacity(list.items.len());

    for entry in &list.items {
        let name = entry.name.value.trim();
        let Some(template) = document.find(name, Some(&entry.category)) else {
            tracing::warn!(
                gear = name,
                category = %entry.category,
                "bundled gear not found in rule data, skipping"
            );
            continue;
        };

        let rating = entry.rating.unwrap_or_default();
        let mut options = CreateOptions::new()
            .with_rating(rating)
            .with_skip_cost(true)
            .with_create_children(entry.name.creates_children());
        if let Some(select) = &entry.name.select {
            options = options.with_forced_value(select.clone());
        }

        let mut gear = Gear::create(template, &options, ctx)?;
        gear.quantity = entry.name.quantity();
        gear.cost = "0".to_string();
        gear.min_rating = rating;
        gear.max_rating = rating;
        gear.parent_id = Some(parent);
        if let Some(source) = entry.source.as_deref().filter(|s| !s.is_empty()) {
            gear.source = source.to_string();
        }
        if let Some(page) = entry.page.as_deref().filter(|p| !p.is_empty()) {
            gear.page = page.to_string();
        }
        if let Some(capacity) = &entry.capacity {
            gear.capacity = format!("[{capacity}]");
        }
        created.push(gear);
    }

    Ok(created)
}
