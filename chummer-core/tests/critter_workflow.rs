//! Integration tests for spirits, critter creation and critter save files.
//!
//! Run with: `cargo test -p chummer-core --test critter_workflow`

use chummer_core::critter::{Attribute, CritterError, CritterFactory, CritterRequest};
use chummer_core::persist::{list_character_saves, SavedCritter};
use chummer_core::spirit::{spirit_options, Spirit, SpiritListOptions, SpiritType};
use chummer_core::testing::{sample_context, ScriptedPrompt};
use tempfile::TempDir;

#[tokio::test]
async fn test_create_and_link_spirit_critter() {
    let ctx = sample_context();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let save_path = temp_dir.path().join("Ember.chum5");

    let mut spirit = Spirit::new(SpiritType::Spirit, "Spirit of Fire", 5);
    spirit.set_critter_name("Ember");
    let mut prompt = ScriptedPrompt::new().with_save_paths([save_path.clone()]);

    let path = CritterFactory::new(&ctx)
        .create_for_spirit(&mut spirit, &mut prompt)
        .await
        .expect("critter should be created");

    assert_eq!(path, save_path);
    assert_eq!(prompt.suggested_names(), ["Spirit of Fire (Force 5).chum5"]);
    assert_eq!(spirit.file_name(), save_path.display().to_string());
    assert_eq!(spirit.relative_file_name(), "Ember.chum5");
    assert_eq!(spirit.resolve_linked_file(None), Some(save_path.clone()));

    let saved = SavedCritter::load_xml(&save_path)
        .await
        .expect("Load should succeed");
    assert_eq!(saved.critter.name, "Ember");
    assert_eq!(saved.critter.force, 5);
    assert_eq!(saved.critter.optional_power_slots, 1);
    assert_eq!(saved.critter.attribute(Attribute::Body).map(|a| a.max), Some(9));
}

#[tokio::test]
async fn test_cancelled_save_leaves_spirit_unlinked() {
    let ctx = sample_context();
    let mut spirit = Spirit::new(SpiritType::Sprite, "Courier Sprite", 3);
    let mut prompt = ScriptedPrompt::new();

    let result = CritterFactory::new(&ctx)
        .create_for_spirit(&mut spirit, &mut prompt)
        .await;

    assert!(matches!(result, Err(CritterError::Cancelled)));
    assert_eq!(prompt.suggested_names(), ["Courier Sprite (Rating 3).chum5"]);
    assert!(!spirit.has_linked_file());
}

#[tokio::test]
async fn test_unknown_and_missing_critter_types() {
    let ctx = sample_context();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let factory = CritterFactory::new(&ctx);

    let mut nameless = Spirit::new(SpiritType::Spirit, "", 3);
    let mut prompt = ScriptedPrompt::new();
    let result = factory.create_for_spirit(&mut nameless, &mut prompt).await;
    assert!(matches!(result, Err(CritterError::NoCritterSelected)));
    assert!(prompt.suggested_names().is_empty());

    let mut unknown = Spirit::new(SpiritType::Spirit, "Spirit of Beasts", 3);
    let mut prompt = ScriptedPrompt::new().with_save_paths([temp_dir.path().join("beast.chum5")]);
    let result = factory.create_for_spirit(&mut unknown, &mut prompt).await;
    assert!(matches!(result, Err(CritterError::UnknownCritter(_))));
    assert!(!temp_dir.path().join("beast.chum5").exists());
    assert!(!unknown.has_linked_file());
}

#[tokio::test]
async fn test_roster_of_saved_critters() {
    let ctx = sample_context();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let factory = CritterFactory::new(&ctx);

    let options = spirit_options(
        &ctx,
        &SpiritListOptions {
            tradition: "Hermetic".to_string(),
            magic_enabled: true,
            ..SpiritListOptions::default()
        },
    )
    .expect("spirit list");

    let mut saved = 0;
    for option in &options {
        let request = CritterRequest::new(option.value.as_str(), 4);
        match factory.create(&request) {
            Ok(critter) => {
                let path = temp_dir.path().join(format!("{}.chum5", option.value));
                SavedCritter::new(critter)
                    .save_xml(&path)
                    .await
                    .expect("Save should succeed");
                saved += 1;
            }
            // Only some of the tradition's spirits are in the sample data.
            Err(CritterError::UnknownCritter(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(saved, 2);

    let saves = list_character_saves(temp_dir.path())
        .await
        .expect("List should succeed");
    let names: Vec<_> = saves.iter().map(|s| s.metadata.name.as_str()).collect();
    assert_eq!(names, vec!["Ally Spirit", "Spirit of Fire"]);
}
