//! Save files and XML fragments.
//!
//! Entities serialize to XML with fixed element names; a critter character
//! is written as a versioned `<character>` document (`*.chum5`).

use crate::critter::Critter;
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// File extension of character saves.
pub const SAVE_EXTENSION: &str = "chum5";

/// Current character save file version.
const CHARACTER_SAVE_VERSION: u32 = 1;

/// Serialize a value as an indented XML element named `root`.
pub fn to_xml<T: Serialize>(root: &str, value: &T) -> Result<String, PersistError> {
    let mut xml = String::new();
    let mut serializer = quick_xml::se::Serializer::with_root(&mut xml, Some(root))
        .map_err(|e| PersistError::Xml(e.to_string()))?;
    serializer.indent(' ', 2);
    value
        .serialize(serializer)
        .map_err(|e| PersistError::Xml(e.to_string()))?;
    Ok(xml)
}

/// Deserialize a value from an XML element. Missing elements take defaults.
pub fn from_xml<T: DeserializeOwned>(xml: &str) -> Result<T, PersistError> {
    quick_xml::de::from_str(xml).map_err(|e| PersistError::Xml(e.to_string()))
}

/// A saved critter character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCritter {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// When the character was saved.
    #[serde(rename = "savedat", default)]
    pub saved_at: String,

    /// Quick-access metadata about the character.
    pub metadata: CritterMetadata,

    /// The complete character data.
    pub critter: Critter,
}

/// Metadata about a saved character for quick display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritterMetadata {
    /// Character name, or the metatype when the critter has none.
    pub name: String,

    pub metatype: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub force: i32,
}

impl SavedCritter {
    pub fn new(critter: Critter) -> Self {
        let name = if critter.name.trim().is_empty() {
            critter.alias.clone()
        } else {
            critter.name.clone()
        };
        let metadata = CritterMetadata {
            name,
            metatype: critter.metatype.clone(),
            category: critter.metatype_category.clone(),
            force: critter.force,
        };

        Self {
            version: CHARACTER_SAVE_VERSION,
            saved_at: chrono_now(),
            metadata,
            critter,
        }
    }

    pub fn to_xml(&self) -> Result<String, PersistError> {
        to_xml("character", self)
    }

    /// Parse a save document. With `copy`, every entity gets a new id.
    pub fn from_xml(xml: &str, copy: bool) -> Result<Self, PersistError> {
        let mut saved: Self = from_xml(xml)?;
        if saved.version != CHARACTER_SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: CHARACTER_SAVE_VERSION,
                found: saved.version,
            });
        }
        saved.critter.after_load(copy);
        Ok(saved)
    }

    /// Save to an XML file.
    pub async fn save_xml(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = self.to_xml()?;
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, content).await?;
        tracing::debug!(path = %path.display(), "saved critter");
        Ok(())
    }

    /// Load from an XML file.
    pub async fn load_xml(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        Self::from_xml(&content, false)
    }

    /// Get metadata without loading the full character.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<CritterMetadata, PersistError> {
        let content = fs::read_to_string(path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: CritterMetadata,
        }

        let partial: Partial = from_xml(&content)?;

        if partial.version != CHARACTER_SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: CHARACTER_SAVE_VERSION,
                found: partial.version,
            });
        }

        Ok(partial.metadata)
    }
}

/// Information about a character save file.
#[derive(Debug, Clone)]
pub struct CritterSaveInfo {
    pub path: PathBuf,
    pub metadata: CritterMetadata,
}

/// List all character save files in a directory, sorted by name.
pub async fn list_character_saves(dir: impl AsRef<Path>) -> Result<Vec<CritterSaveInfo>, PersistError> {
    let mut saves = Vec::new();

    let dir_path = dir.as_ref();
    if !dir_path.exists() {
        fs::create_dir_all(dir_path).await?;
        return Ok(saves);
    }

    let mut entries = fs::read_dir(dir_path).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map(|e| e == SAVE_EXTENSION).unwrap_or(false) {
            match SavedCritter::peek_metadata(&path).await {
                Ok(metadata) => saves.push(CritterSaveInfo { path, metadata }),
                Err(error) => {
                    tracing::debug!(path = %path.display(), %error, "skipping unreadable save")
                }
            }
        }
    }

    saves.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
    Ok(saves)
}

/// Generate a save path for a character.
pub fn character_save_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    let sanitized = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();
    dir.as_ref().join(format!("{sanitized}.{SAVE_EXTENSION}"))
}

/// Current UTC time as an RFC 3339 string, to the second.
fn chrono_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critter::{CritterFactory, CritterRequest};
    use crate::testing::sample_context;

    fn fire_spirit(name: &str) -> Critter {
        let ctx = sample_context();
        CritterFactory::new(&ctx)
            .create(&CritterRequest::new("Spirit of Fire", 4).with_name(name))
            .expect("critter")
    }

    #[test]
    fn test_saved_critter_metadata() {
        let saved = SavedCritter::new(fire_spirit("Ember"));
        assert_eq!(saved.version, CHARACTER_SAVE_VERSION);
        assert_eq!(saved.metadata.name, "Ember");
        assert_eq!(saved.metadata.metatype, "Spirit of Fire");
        assert_eq!(saved.metadata.category, "Spirits");
        assert_eq!(saved.metadata.force, 4);

        let unnamed = SavedCritter::new(fire_spirit(""));
        assert_eq!(unnamed.metadata.name, "Spirit of Fire");
    }

    #[test]
    fn test_saved_at_is_rfc3339() {
        let saved = SavedCritter::new(fire_spirit("Ember"));
        let parsed = chrono::DateTime::parse_from_rfc3339(&saved.saved_at);
        assert!(parsed.is_ok(), "{}", saved.saved_at);
        assert!(saved.saved_at.ends_with('Z'));
    }

    #[test]
    fn test_document_round_trip() {
        let saved = SavedCritter::new(fire_spirit("Ember"));
        let xml = saved.to_xml().unwrap();
        assert!(xml.starts_with("<character>"));
        assert!(xml.contains("<iscritter>true</iscritter>"));

        let loaded = SavedCritter::from_xml(&xml, false).unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_copy_regenerates_ids() {
        let saved = SavedCritter::new(fire_spirit("Ember"));
        let xml = saved.to_xml().unwrap();
        let copy = SavedCritter::from_xml(&xml, true).unwrap();

        let original = &saved.critter.weapons.items[0];
        let copied = &copy.critter.weapons.items[0];
        assert_ne!(original.id(), copied.id());
        assert_eq!(original.name(), copied.name());
    }

    #[test]
    fn test_version_mismatch() {
        let mut saved = SavedCritter::new(fire_spirit("Ember"));
        saved.version = 99;
        let xml = saved.to_xml().unwrap();
        let error = SavedCritter::from_xml(&xml, false).unwrap_err();
        assert!(matches!(error, PersistError::VersionMismatch { expected: 1, found: 99 }));
    }

    #[test]
    fn test_malformed_xml() {
        let error = SavedCritter::from_xml("<character><version>", false).unwrap_err();
        assert!(matches!(error, PersistError::Xml(_)));
    }

    #[test]
    fn test_character_save_path() {
        let path = character_save_path("/saves/critters", "Spirit of Fire (Force 4)");
        assert!(path.to_string_lossy().contains("Spirit_of_Fire__Force_4_"));
        assert!(path.to_string_lossy().ends_with(".chum5"));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let save_path = temp_dir.path().join("nested").join("ember.chum5");

        let saved = SavedCritter::new(fire_spirit("Ember"));
        saved.save_xml(&save_path).await.expect("Save should succeed");
        assert!(save_path.exists());

        let loaded = SavedCritter::load_xml(&save_path)
            .await
            .expect("Load should succeed");
        assert_eq!(loaded.critter, saved.critter);

        let metadata = SavedCritter::peek_metadata(&save_path)
            .await
            .expect("Peek should succeed");
        assert_eq!(metadata.name, "Ember");
    }

    #[tokio::test]
    async fn test_list_character_saves() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path();

        for name in ["Charlie", "Alpha", "Beta"] {
            let saved = SavedCritter::new(fire_spirit(name));
            saved
                .save_xml(character_save_path(dir, name))
                .await
                .expect("Save should succeed");
        }
        std::fs::write(dir.join("notes.txt"), "not a save").expect("write");
        std::fs::write(dir.join("broken.chum5"), "<character>").expect("write");

        let saves = list_character_saves(dir).await.expect("List should succeed");
        let names: Vec<_> = saves.iter().map(|s| s.metadata.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Charlie"]);
    }

    #[tokio::test]
    async fn test_list_character_saves_empty_dir() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("critters");

        let saves = list_character_saves(&dir).await.expect("List should succeed");
        assert!(saves.is_empty());
        assert!(dir.exists());
    }
}
