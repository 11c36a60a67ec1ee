//! Localized strings and translated rule data.
//!
//! Strings are looked up by key (`String_AvailRestricted`, ...). English is
//! built in; other languages load Chummer-style string files and fall back to
//! English for anything they do not define.

use lazy_static::lazy_static;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// Language code of the built-in strings.
pub const DEFAULT_LANGUAGE: &str = "en-us";

lazy_static! {
    static ref ENGLISH: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("String_AvailRestricted", "R");
        m.insert("String_AvailForbidden", "F");
        m.insert("String_Force", "Force");
        m.insert("String_Rating", "Rating");
        m.insert("String_SelectVariableCost", "Select a cost for {0}.");
        m.insert("Message_SelectCritterType", "Please select a Critter type.");
        m.insert("MessageTitle_SelectCritterType", "Select a Critter Type");
        m.insert("Message_UnknownCritterType", "Unable to find the Critter type {0}.");
        m.insert("Message_FileNotFound", "The file {0} could not be found.");
        m.insert(
            "Message_RemoveCharacterAssociation",
            "Are you sure you want to remove the link to this character's save file?",
        );
        m.insert("MessageTitle_RemoveCharacterAssociation", "Remove Character Association");
        m.insert("Label_Spirit_Force", "Force:");
        m.insert("Label_Sprite_Rating", "Rating:");
        m.insert("Checkbox_Spirit_Bound", "Bound");
        m.insert("Label_Sprite_Registered", "Registered");
        m
    };
}

/// Key to localized string lookup.
pub trait Translator {
    /// Look up a string, falling back to the key itself when unknown.
    fn get_string(&self, key: &str) -> String;

    /// Short code for a source book in the active language.
    fn book_code(&self, code: &str) -> String {
        code.to_string()
    }

    fn language(&self) -> &str {
        DEFAULT_LANGUAGE
    }

    fn is_default_language(&self) -> bool {
        self.language().eq_ignore_ascii_case(DEFAULT_LANGUAGE)
    }
}

/// String table for one language.
#[derive(Debug, Clone)]
pub struct LanguageManager {
    language: String,
    strings: HashMap<String, String>,
    books: HashMap<String, String>,
}

#[derive(Deserialize)]
struct LanguageFile {
    #[serde(default)]
    strings: StringList,
}

#[derive(Default, Deserialize)]
struct StringList {
    #[serde(rename = "string", default)]
    items: Vec<StringEntry>,
}

#[derive(Deserialize)]
struct StringEntry {
    key: String,
    #[serde(default)]
    text: String,
}

impl LanguageManager {
    /// An empty table for `language`; every lookup falls back to English.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            strings: HashMap::new(),
            books: HashMap::new(),
        }
    }

    pub fn english() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }

    /// Parse a `<chummer><strings><string><key/><text/></string></strings></chummer>` file.
    pub fn from_xml(language: impl Into<String>, xml: &str) -> Result<Self, quick_xml::DeError> {
        let file: LanguageFile = quick_xml::de::from_str(xml)?;
        let mut manager = Self::new(language);
        for entry in file.strings.items {
            manager.strings.insert(entry.key, entry.text);
        }
        tracing::debug!(
            language = %manager.language,
            strings = manager.strings.len(),
            "loaded language strings"
        );
        Ok(manager)
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.strings.insert(key.into(), text.into());
    }

    /// Register the localized short code for a source book.
    pub fn insert_book(&mut self, code: impl Into<String>, alt_code: impl Into<String>) {
        self.books.insert(code.into(), alt_code.into());
    }
}

impl Default for LanguageManager {
    fn default() -> Self {
        Self::english()
    }
}

impl Translator for LanguageManager {
    fn get_string(&self, key: &str) -> String {
        if let Some(text) = self.strings.get(key) {
            return text.clone();
        }
        match ENGLISH.get(key) {
            Some(text) => (*text).to_string(),
            None => {
                tracing::debug!(key, language = %self.language, "missing language string");
                key.to_string()
            }
        }
    }

    fn book_code(&self, code: &str) -> String {
        self.books
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    fn language(&self) -> &str {
        &self.language
    }
}

/// Translated display name and page for one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    pub name: String,
    pub page: String,
}

/// Identifies a template record within the rule data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    pub file: &'static str,
    /// Record element within the file (`weapon`, `accessory`, ...).
    pub section: &'static str,
    pub name: String,
    pub category: String,
}

impl TemplateKey {
    pub fn new(
        file: &'static str,
        section: &'static str,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            file,
            section,
            name: name.into(),
            category: category.into(),
        }
    }
}

/// Cache of translation lookups, filled on first use of each template key.
///
/// Misses are cached too, so a template without a translation is only
/// searched once.
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: Mutex<HashMap<TemplateKey, Option<Translation>>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_fetch(
        &self,
        key: TemplateKey,
        fetch: impl FnOnce() -> Option<Translation>,
    ) -> Option<Translation> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.entry(key).or_insert_with(fetch).clone()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build a translation from a template's `translate`/`altpage` fields.
///
/// An empty translated name means there is no translation.
pub fn translation_from(translate: Option<&str>, alt_page: Option<&str>) -> Option<Translation> {
    let name = translate.map(str::trim).filter(|s| !s.is_empty())?;
    Some(Translation {
        name: name.to_string(),
        page: alt_page.unwrap_or_default().trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_defaults() {
        let english = LanguageManager::english();
        assert!(english.is_default_language());
        assert_eq!(english.get_string("String_AvailForbidden"), "F");
        assert_eq!(english.get_string("No_Such_Key"), "No_Such_Key");
    }

    #[test]
    fn test_load_language_file() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
            <chummer>
              <strings>
                <string><key>String_AvailRestricted</key><text>E</text></string>
                <string><key>String_Force</key><text>Kraftstufe</text></string>
              </strings>
            </chummer>"#;
        let german = LanguageManager::from_xml("de-de", xml).unwrap();
        assert!(!german.is_default_language());
        assert_eq!(german.get_string("String_AvailRestricted"), "E");
        assert_eq!(german.get_string("String_Force"), "Kraftstufe");
        // Falls back to English
        assert_eq!(german.get_string("String_AvailForbidden"), "F");
    }

    #[test]
    fn test_book_codes() {
        let mut german = LanguageManager::new("de-de");
        german.insert_book("SR5", "SR5-DE");
        assert_eq!(german.book_code("SR5"), "SR5-DE");
        assert_eq!(german.book_code("RG"), "RG");
    }

    #[test]
    fn test_translation_cache_fetches_once() {
        let cache = TranslationCache::new();
        let key = TemplateKey::new("weapons.xml", "accessory", "Bipod", "");
        let mut calls = 0;

        let first = cache.get_or_fetch(key.clone(), || {
            calls += 1;
            translation_from(Some("Zweibein"), Some("181"))
        });
        let second = cache.get_or_fetch(key, || {
            calls += 1;
            None
        });

        assert_eq!(calls, 1);
        assert_eq!(first, second);
        assert_eq!(first.unwrap().name, "Zweibein");
    }

    #[test]
    fn test_translation_cache_keys_by_section() {
        let cache = TranslationCache::new();
        let weapon = TemplateKey::new("weapons.xml", "weapon", "Bipod", "");
        let accessory = TemplateKey::new("weapons.xml", "accessory", "Bipod", "");

        cache.get_or_fetch(weapon, || None);
        let translated = cache.get_or_fetch(accessory, || translation_from(Some("Zweibein"), None));

        assert_eq!(cache.len(), 2);
        assert_eq!(translated.map(|t| t.name), Some("Zweibein".to_string()));
    }

    #[test]
    fn test_translation_from_empty() {
        assert_eq!(translation_from(Some("  "), Some("12")), None);
        assert_eq!(translation_from(None, None), None);
    }
}
