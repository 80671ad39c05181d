//! ecolaunch - ecosystem file launcher
//!
//! Validates, inspects, converts and launches the apps declared in an
//! ecosystem file.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ecolaunch_core::config::ConfigFormat;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::app::OutputFormat;

/// ecolaunch - ecosystem file launcher
#[derive(Parser, Debug)]
#[command(name = "ecolaunch")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to ecosystem configuration file (.toml or .json)
    #[arg(short, long, default_value = "ecosystem.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse and validate the ecosystem file
    Validate,

    /// List configured apps
    #[command(alias = "ls")]
    List,

    /// Show how an app would be launched
    Show {
        /// App name
        name: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Environment profile to apply
        #[arg(long)]
        profile: Option<String>,

        /// Include the inherited process environment
        #[arg(long)]
        resolved_env: bool,
    },

    /// Re-serialize the ecosystem file in another format
    Convert {
        /// Target format (toml or json)
        #[arg(long)]
        to: ConfigFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that apps can be launched on this host
    Check {
        /// App name (all apps when omitted)
        name: Option<String>,
    },

    /// Launch an app in the foreground and wait for it to exit
    Run {
        /// App name
        name: String,

        /// Environment profile to apply
        #[arg(long)]
        profile: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Validate => commands::app::validate(&cli.config),
        Commands::List => commands::app::list(&cli.config),
        Commands::Show {
            name,
            format,
            profile,
            resolved_env,
        } => commands::app::show(&cli.config, &name, format, profile.as_deref(), resolved_env),
        Commands::Convert { to, output } => {
            commands::app::convert(&cli.config, to, output.as_deref())
        },
        Commands::Check { name } => {
            // Exit 1 when any finding is reported so deploy scripts can gate
            // on it.
            let clean = commands::app::check(&cli.config, name.as_deref())?;
            if !clean {
                std::process::exit(1);
            }
            Ok(())
        },
        Commands::Run { name, profile } => {
            // The child's exit code becomes ours.
            let exit_code = commands::app::run(&cli.config, &name, profile.as_deref())?;
            std::process::exit(exit_code);
        },
    }
}
