//! Read-only rule data loaded from XML documents.
//!
//! Each rule-data file (`weapons.xml`, `gear.xml`, ...) is parsed once into a
//! typed document and shared behind an [`Arc`]. The registry is passed to
//! whatever needs template data; there is no global document cache.

mod critters;
mod gear;
mod weapons;

pub use critters::{
    is_sprite_category, ComplexFormTemplate, ComplexFormsDocument, CrittersDocument,
    MetatypeTemplate, PowerTemplate, PowersDocument, QualitiesDocument, QualityTemplate,
    SpiritSlots, SpiritTemplate, TemplateRef, TraditionTemplate, TraditionsDocument,
};
pub use gear::{GearDocument, GearTemplate, UseGear, UseGearList, UseGearName};
pub use weapons::{AccessoryTemplate, AllowGear, IncludedAccessory, WeaponTemplate, WeaponsDocument};

use crate::config::Settings;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use thiserror::Error;

pub const WEAPONS_FILE: &str = "weapons.xml";
pub const GEAR_FILE: &str = "gear.xml";
pub const CRITTERS_FILE: &str = "critters.xml";
pub const CRITTER_POWERS_FILE: &str = "critterpowers.xml";
pub const QUALITIES_FILE: &str = "qualities.xml";
pub const COMPLEX_FORMS_FILE: &str = "complexforms.xml";
pub const TRADITIONS_FILE: &str = "traditions.xml";
pub const STREAMS_FILE: &str = "streams.xml";

/// Errors from loading or querying rule data.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("IO error reading {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("XML error in {file}: {message}")]
    Xml { file: String, message: String },

    #[error("Rule data file not available: {0}")]
    MissingFile(String),

    #[error("{0} was already loaded as a different document type")]
    TypeMismatch(String),

    #[error("No {kind} named {name:?} in {file}")]
    NotFound {
        file: &'static str,
        kind: &'static str,
        name: String,
    },
}

/// Registry of rule-data documents keyed by file name.
#[derive(Debug)]
pub struct TemplateRegistry {
    data_dir: Option<PathBuf>,
    inline: HashMap<String, String>,
    live_reload: bool,
    documents: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl TemplateRegistry {
    /// Registry reading files from a data directory.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(dir.into()),
            inline: HashMap::new(),
            live_reload: false,
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Registry with no backing directory; documents must be added inline.
    pub fn in_memory() -> Self {
        Self {
            data_dir: None,
            inline: HashMap::new(),
            live_reload: false,
            documents: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::from_dir(settings.data_dir.clone()).with_live_reload(settings.live_custom_data)
    }

    /// Supply the text of a rule-data file directly. Takes precedence over
    /// the data directory.
    pub fn with_document(mut self, file: impl Into<String>, xml: impl Into<String>) -> Self {
        self.inline.insert(file.into(), xml.into());
        self
    }

    /// Re-read and re-parse documents on every access.
    pub fn with_live_reload(mut self, live_reload: bool) -> Self {
        self.live_reload = live_reload;
        self
    }

    pub fn is_loaded(&self, file: &str) -> bool {
        self.documents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(file)
    }

    fn read_text(&self, file: &str) -> Result<String, TemplateError> {
        if let Some(xml) = self.inline.get(file) {
            return Ok(xml.clone());
        }
        let dir = self
            .data_dir
            .as_ref()
            .ok_or_else(|| TemplateError::MissingFile(file.to_string()))?;
        let path = dir.join(file);
        if !path.exists() {
            return Err(TemplateError::MissingFile(path.to_string_lossy().to_string()));
        }
        std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
            file: file.to_string(),
            source,
        })
    }

    /// Get a parsed document, loading it on first use.
    pub fn document<D>(&self, file: &str) -> Result<Arc<D>, TemplateError>
    where
        D: DeserializeOwned + Send + Sync + 'static,
    {
        if !self.live_reload {
            let cached = self
                .documents
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .get(file)
                .cloned();
            if let Some(any) = cached {
                return any
                    .downcast::<D>()
                    .map_err(|_| TemplateError::TypeMismatch(file.to_string()));
            }
        }

        let text = self.read_text(file)?;
        let parsed: D = quick_xml::de::from_str(&text).map_err(|e| TemplateError::Xml {
            file: file.to_string(),
            message: e.to_string(),
        })?;
        let document = Arc::new(parsed);
        tracing::debug!(file, live = self.live_reload, "loaded rule data");

        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(file.to_string(), document.clone());
        Ok(document)
    }

    pub fn weapons(&self) -> Result<Arc<WeaponsDocument>, TemplateError> {
        self.document(WEAPONS_FILE)
    }

    pub fn gear(&self) -> Result<Arc<GearDocument>, TemplateError> {
        self.document(GEAR_FILE)
    }

    pub fn critters(&self) -> Result<Arc<CrittersDocument>, TemplateError> {
        self.document(CRITTERS_FILE)
    }

    pub fn critter_powers(&self) -> Result<Arc<PowersDocument>, TemplateError> {
        self.document(CRITTER_POWERS_FILE)
    }

    pub fn qualities(&self) -> Result<Arc<QualitiesDocument>, TemplateError> {
        self.document(QUALITIES_FILE)
    }

    pub fn complex_forms(&self) -> Result<Arc<ComplexFormsDocument>, TemplateError> {
        self.document(COMPLEX_FORMS_FILE)
    }

    /// Traditions for magicians, or streams for technomancers.
    pub fn traditions(&self, streams: bool) -> Result<Arc<TraditionsDocument>, TemplateError> {
        self.document(if streams { STREAMS_FILE } else { TRADITIONS_FILE })
    }
}

/// Deserializers that never fail on malformed scalar text.
///
/// Rule data and older save files contain values like `{Rating}` or `True`
/// where a number or flag is expected; those read as the default instead.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};

    pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(text.trim().parse().unwrap_or_default())
    }

    pub fn opt_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(text.trim().parse().ok())
    }

    pub fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(text.trim().parse().unwrap_or_default())
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(parse_flag(&text))
    }

    pub fn parse_flag(text: &str) -> bool {
        matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1"
        )
    }
}
