//! Header generator CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "header-gen")]
#[command(about = "Generate include/debug.h from the sexp-probe sources", long_about = None)]
struct Cli {
    /// Workspace root (default: nearest ancestor with a workspace Cargo.toml)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write include/debug.h
    Generate,

    /// Fail if include/debug.h is out of date
    Check,

    /// Print the parsed model as JSON
    Model,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => root,
        None => header_gen::find_workspace_root(&std::env::current_dir()?)?,
    };

    match cli.command {
        Commands::Generate => {
            let output = header_gen::generate(&root)?;
            println!("Generated C header: {}", output.display());
        }
        Commands::Check => {
            if header_gen::check(&root)? {
                println!("✓ {} is in sync", header_gen::HEADER_OUTPUT);
            } else {
                anyhow::bail!(
                    "{} is out of sync. Run 'header-gen generate' to regenerate.",
                    header_gen::HEADER_OUTPUT
                );
            }
        }
        Commands::Model => {
            let model = header_gen::build_model(&root)?;
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
    }

    Ok(())
}
