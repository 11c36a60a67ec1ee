//! Everything an instantiation or derived-value computation needs to read.

use crate::config::Settings;
use crate::language::{
    translation_from, LanguageManager, TemplateKey, Translation, TranslationCache, Translator,
};
use crate::templates::TemplateRegistry;
use std::sync::Arc;

/// Shared, read-only rules state: rule data, settings and the active language.
#[derive(Debug)]
pub struct RulesContext {
    registry: Arc<TemplateRegistry>,
    settings: Settings,
    language: LanguageManager,
    translations: TranslationCache,
}

impl RulesContext {
    pub fn new(registry: Arc<TemplateRegistry>, settings: Settings, language: LanguageManager) -> Self {
        Self {
            registry,
            settings,
            language,
            translations: TranslationCache::new(),
        }
    }

    /// Build a context from settings, reading rule data from the data directory
    /// and the language file from `<data_dir>/lang/<language>.xml`.
    ///
    /// A missing or unreadable language file falls back to English strings.
    pub fn from_settings(settings: Settings) -> Self {
        let registry = Arc::new(TemplateRegistry::from_settings(&settings));
        let language = if settings.is_default_language() {
            LanguageManager::english()
        } else {
            let path = settings
                .data_dir
                .join("lang")
                .join(format!("{}.xml", settings.language));
            match std::fs::read_to_string(&path) {
                Ok(xml) => LanguageManager::from_xml(settings.language.clone(), &xml)
                    .unwrap_or_else(|error| {
                        tracing::warn!(path = %path.display(), %error, "unreadable language file");
                        LanguageManager::new(settings.language.clone())
                    }),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "language file not found");
                    LanguageManager::new(settings.language.clone())
                }
            }
        };
        Self::new(registry, settings, language)
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn translator(&self) -> &dyn Translator {
        &self.language
    }

    pub fn translations(&self) -> &TranslationCache {
        &self.translations
    }

    /// Translated name and page for a template, when the active language is
    /// not the default one and the template carries a translation.
    pub fn translation(
        &self,
        key: TemplateKey,
        translate: Option<&str>,
        alt_page: Option<&str>,
    ) -> Option<Translation> {
        if self.language.is_default_language() {
            return None;
        }
        self.translations
            .get_or_fetch(key, || translation_from(translate, alt_page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_context;

    #[test]
    fn test_default_language_skips_translation() {
        let ctx = sample_context();
        let translation = ctx.translation(
            TemplateKey::new("weapons.xml", "accessory", "Bipod", ""),
            Some("Zweibein"),
            Some("181"),
        );
        assert!(translation.is_none());
        assert!(ctx.translations().is_empty());
    }

    #[test]
    fn test_translation_is_cached() {
        let ctx = RulesContext::new(
            Arc::new(TemplateRegistry::in_memory()),
            Settings::new().with_language("de-de"),
            LanguageManager::new("de-de"),
        );
        let key = TemplateKey::new("weapons.xml", "accessory", "Bipod", "");

        let first = ctx.translation(key.clone(), Some("Zweibein"), Some("181"));
        assert_eq!(first.as_ref().map(|t| t.name.as_str()), Some("Zweibein"));

        // Cached; later field values are not consulted again.
        let second = ctx.translation(key, None, None);
        assert_eq!(first, second);
        assert_eq!(ctx.translations().len(), 1);
    }

    #[test]
    fn test_missing_language_file_falls_back() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let ctx = RulesContext::from_settings(
            Settings::new()
                .with_data_dir(dir.path())
                .with_language("fr-fr"),
        );
        assert_eq!(ctx.translator().language(), "fr-fr");
        assert_eq!(ctx.translator().get_string("String_AvailRestricted"), "R");
    }
}
