//! Command line front end for the Chummer rule-data engine.
//!
//! Reads rule data from `--data-dir` (or `CHUMMER_DATA_DIR`) and answers any
//! interactive choice on the terminal:
//!
//! ```bash
//! cargo run -p chummer -- accessory "Ceramic/Plasteel Components" --weapon "Ares Predator V" --rating 2
//! cargo run -p chummer -- critter "Spirit of Fire" --force 4 --out ember.chum5
//! ```

mod prompts;

use anyhow::{bail, Context, Result};
use chummer_core::critter::{CritterError, CritterFactory, CritterRequest};
use chummer_core::equipment::{CreateOptions, Gear, ParentWeapon, Weapon, WeaponAccessory};
use chummer_core::expression::RuleExpression;
use chummer_core::persist::{list_character_saves, SavedCritter};
use chummer_core::print::{AccessoryPrint, GearPrint};
use chummer_core::prompt::{resolve_variable_cost, SavePrompt};
use chummer_core::spirit::{spirit_options, suggested_file_name, Spirit, SpiritListOptions, SpiritType};
use chummer_core::{RulesContext, Settings};
use clap::{Parser, Subcommand};
use prompts::TerminalPrompt;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shadowrun rule-data engine
#[derive(Parser, Debug)]
#[command(name = "chummer")]
#[command(about = "Evaluate rule expressions and build equipment and critters from Chummer data")]
struct Args {
    /// Directory holding the rule-data XML files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Display language, e.g. en-us or de-de
    #[arg(long, global = true)]
    language: Option<String>,

    /// Print results as JSON instead of XML or text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a rule expression
    Eval {
        expression: String,
        #[arg(long, default_value_t = 0)]
        rating: i32,
        #[arg(long)]
        force: Option<i32>,
    },

    /// Create a weapon accessory and print it
    Accessory {
        name: String,
        /// Weapon the accessory is priced against
        #[arg(long)]
        weapon: Option<String>,
        #[arg(long, default_value_t = 0)]
        rating: i32,
        #[arg(long, default_value = "")]
        mount: String,
    },

    /// Create gear and print it
    Gear {
        name: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 0)]
        rating: i32,
    },

    /// Create a critter and save it
    Critter {
        metatype: String,
        #[arg(long, default_value_t = 1)]
        force: i32,
        #[arg(long)]
        name: Option<String>,
        /// Save file; asks when missing
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the spirits or sprites of a tradition
    Spirits {
        tradition: String,
        #[arg(long)]
        sprites: bool,
        #[arg(long)]
        magic: bool,
        #[arg(long)]
        resonance: bool,
    },

    /// List critter save files in a directory
    Saves { dir: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chummer=info,chummer_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut settings = Settings::from_env();
    if let Some(dir) = &args.data_dir {
        settings = settings.with_data_dir(dir.clone());
    }
    if let Some(language) = &args.language {
        settings = settings.with_language(language);
    }
    let ctx = RulesContext::from_settings(settings);

    match args.command {
        Command::Eval {
            expression,
            rating,
            force,
        } => {
            let mut expr = RuleExpression::new(expression).with_rating(rating);
            if let Some(force) = force {
                expr = expr.with_force(force);
            }
            let value = expr
                .evaluate()
                .with_context(|| format!("cannot evaluate {:?}", expr.substituted()))?;
            emit(args.json, &value, || Ok(value.to_string()))?;
        }

        Command::Accessory {
            name,
            weapon,
            rating,
            mount,
        } => {
            let parent = match &weapon {
                Some(weapon) => Weapon::create_named(weapon, &CreateOptions::new(), &ctx)?.as_parent(),
                None => ParentWeapon::default(),
            };
            let weapons = ctx.registry().weapons()?;
            let Some(template) = weapons.accessory(&name) else {
                bail!("no accessory named {name:?}");
            };

            let mut options = CreateOptions::new().with_rating(rating).with_mount(mount, "");
            let mut prompt = TerminalPrompt::stdin();
            if let Some(cost) = template.cost.as_deref() {
                if let Some(chosen) = resolve_variable_cost(
                    cost,
                    &template.name,
                    &mut prompt,
                    ctx.translator(),
                    ctx.settings().nuyen_decimals,
                ) {
                    options = options.with_variable_cost(chosen);
                }
            }

            let accessory = WeaponAccessory::create(template, &options, &ctx)?;
            let print = AccessoryPrint::new(&accessory, &parent, &ctx);
            emit(args.json, &print, || Ok(print.to_xml()?))?;
        }

        Command::Gear {
            name,
            category,
            rating,
        } => {
            let options = CreateOptions::new().with_rating(rating);
            let gear = Gear::create_named(&name, category.as_deref(), &options, &ctx)?;
            let print = GearPrint::new(&gear, &ctx);
            emit(args.json, &print, || Ok(print.to_xml()?))?;
        }

        Command::Critter {
            metatype,
            force,
            name,
            out,
        } => {
            let mut request = CritterRequest::new(metatype.as_str(), force);
            if let Some(name) = name {
                request = request.with_name(name);
            }
            let critter = match CritterFactory::new(&ctx).create(&request) {
                Ok(critter) => critter,
                Err(e @ (CritterError::UnknownCritter(_) | CritterError::NoCritterSelected)) => {
                    bail!(e.user_message(ctx.translator()))
                }
                Err(e) => return Err(e.into()),
            };

            let path = match out {
                Some(path) => path,
                None => {
                    let kind = if critter.is_sprite() {
                        SpiritType::Sprite
                    } else {
                        SpiritType::Spirit
                    };
                    let spirit = Spirit::new(kind, metatype.as_str(), force);
                    let suggested = suggested_file_name(&spirit, &metatype, ctx.translator());
                    match TerminalPrompt::stdin().pick_save_path(&suggested) {
                        Some(path) => path,
                        None => {
                            println!("Cancelled");
                            return Ok(());
                        }
                    }
                }
            };

            let saved = SavedCritter::new(critter);
            saved
                .save_xml(&path)
                .await
                .with_context(|| format!("cannot save {}", path.display()))?;
            tracing::info!(path = %path.display(), "critter saved");
            emit(args.json, &saved.metadata, || {
                Ok(format!("[SAVED] {} to {}", saved.metadata.name, path.display()))
            })?;
        }

        Command::Spirits {
            tradition,
            sprites,
            magic,
            resonance,
        } => {
            let options = SpiritListOptions {
                tradition,
                entity_type: if sprites { SpiritType::Sprite } else { SpiritType::Spirit },
                magic_enabled: magic,
                resonance_enabled: resonance,
                ..SpiritListOptions::default()
            };
            let spirits = spirit_options(&ctx, &options)?;
            emit(args.json, &spirits, || {
                Ok(spirits
                    .iter()
                    .map(|s| format!("{}\t{}", s.value, s.name))
                    .collect::<Vec<_>>()
                    .join("\n"))
            })?;
        }

        Command::Saves { dir } => {
            let saves = list_character_saves(&dir).await?;
            let metadata: Vec<_> = saves.iter().map(|s| &s.metadata).collect();
            emit(args.json, &metadata, || {
                Ok(saves
                    .iter()
                    .map(|s| {
                        format!(
                            "{}\t{} ({})\t{}",
                            s.metadata.name,
                            s.metadata.metatype,
                            s.metadata.force,
                            s.path.display()
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n"))
            })?;
        }
    }

    Ok(())
}

/// Print `value` as JSON, or the text form.
fn emit<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce() -> Result<String>) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text()?);
    }
    Ok(())
}
