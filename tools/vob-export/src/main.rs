//! vob-export - VOB embedded-object compiler
//!
//! Compiles scene-object descriptions (JSON) into relocatable `.vob`
//! blobs for the fixed-function mobile player.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use vob_common::VOB_EXT;
use vob_export::{compile_embedded_object, compile_object, ObjectModel};

#[derive(Parser)]
#[command(name = "vob-export")]
#[command(about = "VOB embedded-object compiler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an object description to a .vob blob
    Compile {
        /// Input object description (JSON)
        input: PathBuf,

        /// Output .vob file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile an object description without writing output
    Check {
        /// Input object description (JSON)
        input: PathBuf,
    },
}

fn load_object(path: &Path) -> Result<ObjectModel> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {:?}", path))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension(VOB_EXT));
            tracing::info!("Compiling {:?} -> {:?}", input, output);
            let obj = load_object(&input)?;
            compile_embedded_object(&output, &obj)
                .with_context(|| format!("compiling {:?}", input))?;
            tracing::info!("Done!");
        }

        Commands::Check { input } => {
            tracing::info!("Checking {:?}", input);
            let obj = load_object(&input)?;
            let compiled =
                compile_object(&obj).with_context(|| format!("compiling {:?}", input))?;
            tracing::info!(
                "Object is valid: {} command bytes, {} vertices, {} strings",
                compiled.commands.len(),
                compiled.vertices.len() / 10,
                compiled.strings.len()
            );
        }
    }

    Ok(())
}
