//! Homebrew Prebuild CLI
//!
//! Commands: icons, tokens, faction-sheets, tiles, decks, nsid-map, bundle, all, guid, image
//! Returns 2 when inputs fail validation, 1 on any other error

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use homebrew_prebuild::imaging::ImageOp;
use homebrew_prebuild::{template_guid, BuildError, BuildPipeline, MapFormat, Step};

#[derive(Parser)]
#[command(name = "homebrew-prebuild")]
#[command(about = "Build templates and textures for a TI4 homebrew mod")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root holding prebuild/ and assets/
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Homebrew definition, relative to the root
    #[arg(short, long, global = true, default_value = "homebrew.json")]
    config: PathBuf,

    /// Directory of base template overrides, relative to the root
    #[arg(short, long, global = true)]
    base_templates: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Faction icons and their outline-only variants
    Icons,

    /// Command and control tokens
    Tokens,

    /// Faction sheet templates
    FactionSheets,

    /// System tiles
    Tiles,

    /// Cardsheets and deck templates
    Decks {
        /// Card types, e.g. `action` or `technology/red`; defaults to all
        card_types: Vec<String>,
    },

    /// NSID to template GUID map
    NsidMap {
        #[arg(short, long, value_enum, default_value = "ts")]
        format: MapFormat,

        /// Output file, relative to the root
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Registry bundle for the load-time script
    Bundle {
        /// Output file, relative to the root
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Every step in order
    All,

    /// Print the GUID of a template path, e.g. `token/command/loxon.json`
    Guid { template_file: String },

    /// Apply one image operation to each file
    Image {
        #[arg(value_enum)]
        op: ImageOp,
        files: Vec<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("homebrew_prebuild=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), BuildError> {
    if let Commands::Guid { template_file } = &cli.command {
        let output = serde_json::json!({
            "templateFile": template_file,
            "guid": template_guid(template_file),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }
    if let Commands::Image { op, files } = &cli.command {
        for file in files {
            op.apply(&cli.root.join(file))?;
        }
        return Ok(());
    }

    let pipeline = BuildPipeline::open(&cli.root, &cli.config, cli.base_templates.as_deref())?;
    match cli.command {
        Commands::Icons => pipeline.run(Step::Icons),
        Commands::Tokens => pipeline.run(Step::Tokens),
        Commands::FactionSheets => pipeline.run(Step::FactionSheets),
        Commands::Tiles => pipeline.run(Step::Tiles),
        Commands::Decks { card_types } => pipeline.decks(&card_types).map(|_| ()),
        Commands::NsidMap { format, out } => {
            pipeline.write_nsid_map(out.as_deref(), format).map(|_| ())
        }
        Commands::Bundle { out } => pipeline.write_bundle(out.as_deref()).map(|_| ()),
        Commands::All => pipeline.all(),
        Commands::Guid { .. } | Commands::Image { .. } => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            match e {
                BuildError::ValidationFailed(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
