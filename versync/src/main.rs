mod commands;
mod formatting;
mod operations;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use versync_core::BumpType;

use commands::ExecutionArgs;

#[derive(Parser)]
#[command(name = "versync")]
#[command(about = "Keep component versions in sync across a monorepo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root to discover modules under.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, global = true, action)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List modules, manifests and version drift.
    Discover {
        #[arg(long, action)]
        json: bool,
        /// Override the module depth limit.
        #[arg(long)]
        depth: Option<usize>,
        #[arg(long, action, conflicts_with = "manifests_only")]
        modules_only: bool,
        #[arg(long, action)]
        manifests_only: bool,
    },
    /// Check that every source agrees on one version.
    Doctor {
        /// Version every source should carry. Defaults to the root module's.
        #[arg(long)]
        expected: Option<String>,
        #[arg(long, action)]
        json: bool,
    },
    /// Bump every module's version.
    Bump {
        #[arg(value_enum)]
        level: BumpArg,
        #[command(flatten)]
        exec: ExecutionArgs,
    },
    /// Move every module to the next pre-release under `label`.
    Pre {
        label: String,
        #[command(flatten)]
        exec: ExecutionArgs,
    },
    /// Set every module to an explicit version.
    Set {
        version: String,
        #[command(flatten)]
        exec: ExecutionArgs,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum BumpArg {
    Major,
    Minor,
    Patch,
}

impl From<BumpArg> for BumpType {
    fn from(arg: BumpArg) -> Self {
        match arg {
            BumpArg::Major => BumpType::Major,
            BumpArg::Minor => BumpType::Minor,
            BumpArg::Patch => BumpType::Patch,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cancel = commands::install_cancel_handler()?;

    match cli.command {
        Commands::Discover {
            json,
            depth,
            modules_only,
            manifests_only,
        } => commands::cmd_discover(&cli.root, &cancel, json, depth, modules_only, manifests_only)?,
        Commands::Doctor { expected, json } => {
            commands::cmd_doctor(&cli.root, &cancel, expected, json)?
        }
        Commands::Bump { level, exec } => {
            commands::cmd_bump(&cli.root, &cancel, level.into(), exec)?
        }
        Commands::Pre { label, exec } => commands::cmd_pre(&cli.root, &cancel, label, exec)?,
        Commands::Set { version, exec } => commands::cmd_set(&cli.root, &cancel, version, exec)?,
    }

    Ok(())
}
