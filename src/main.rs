use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use powermining::config::ConfigSchema;
use powermining::crafting::ShapedRecipe;
use powermining::world::{BlockPos, Face};
use powermining::PowerEngine;

#[derive(Parser, Debug)]
#[command(name = "powermining")]
#[command(about = "Inspect and migrate PowerMining configuration")]
struct Args {
    /// Path to configuration file; defaults apply when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upgrade the configuration to the current layout
    Migrate {
        /// Write the result back instead of printing it
        #[arg(short, long)]
        write: bool,
    },
    /// List active recipes
    Recipes {
        #[arg(long)]
        json: bool,
    },
    /// List every PowerTool with its permissions
    Tools {
        #[arg(long)]
        json: bool,
    },
    /// Print the blocks an action would affect
    Region {
        #[arg(short, long, value_parser = parse_face)]
        face: Face,
        #[arg(short, long, allow_negative_numbers = true)]
        x: i32,
        #[arg(short, long, allow_negative_numbers = true)]
        y: i32,
        #[arg(short, long, allow_negative_numbers = true)]
        z: i32,
        /// Overrides the configured radius
        #[arg(short, long)]
        radius: Option<u32>,
        /// Overrides the configured depth
        #[arg(short, long)]
        depth: Option<u32>,
        /// Single tilling layer instead of a break region
        #[arg(long)]
        farm: bool,
        #[arg(long)]
        json: bool,
    },
}

fn parse_face(s: &str) -> Result<Face, String> {
    Face::parse(s).ok_or_else(|| format!("unknown face `{}`", s))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = match args.verbose {
        0 => "powermining=info",
        1 => "powermining=debug",
        _ => "powermining=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("PowerMining v{}", env!("CARGO_PKG_VERSION"));

    let schema = match &args.config {
        Some(path) => ConfigSchema::load(path)?,
        None => ConfigSchema::default(),
    };
    let (engine, migrated, report) = PowerEngine::from_config(&schema);

    match args.command {
        Command::Migrate { write } => {
            for err in &report.skipped {
                warn!("Skipped: {}", err);
            }
            if write {
                let Some(path) = &args.config else {
                    bail!("--write needs --config");
                };
                migrated.save(path)?;
                info!("Wrote migrated config to {}", path.display());
            } else {
                print!("{}", migrated.to_toml_string()?);
            }
        }
        Command::Recipes { json } => {
            let recipes: Vec<(&str, ShapedRecipe)> = engine
                .recipes()
                .all_recipes()
                .map(|def| (def.tool.as_str(), def.to_shaped()))
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&recipes)?);
            } else {
                for (tool, shaped) in recipes {
                    println!("{}", tool);
                    for row in &shaped.shape {
                        println!("  [{}]", row);
                    }
                    for (letter, item) in &shaped.ingredients {
                        println!("  {} = {}", letter, item);
                    }
                }
            }
        }
        Command::Tools { json } => {
            let entries: Vec<_> = engine.catalog().entries().collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in entries {
                    println!(
                        "{:<20} {:<18} {:>5}  {}",
                        entry.name, entry.base_item, entry.max_durability, entry.permissions.use_
                    );
                }
            }
        }
        Command::Region {
            face,
            x,
            y,
            z,
            radius,
            depth,
            farm,
            json,
        } => {
            let settings = engine.settings();
            let origin = BlockPos::new(x, y, z);
            let radius = radius.unwrap_or(settings.radius);
            let blocks = if farm {
                engine.selector().select_farm(face, origin, radius)
            } else {
                let depth = depth.unwrap_or(settings.depth);
                engine.selector().select(face, origin, radius, depth)
            };
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&blocks).context("serializing region")?
                );
            } else {
                for pos in &blocks {
                    println!("{} {} {}", pos.x, pos.y, pos.z);
                }
                info!("{} blocks", blocks.len());
            }
        }
    }

    Ok(())
}
