//! # Targzip Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the `targzip` CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the subcommand handlers in `targzip::commands`
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! targzip --help
//!
//! # Create, list and extract with increased verbosity
//! targzip -v create out.tar.gz ./project
//! targzip list out.tar.gz
//! targzip -vv extract out.tar.gz -C /tmp/restore
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging based on verbosity level (`RUST_LOG` wins when set)
//! 3. Route to the subcommand handler
//! 4. Log and print any error, exiting with status 1
//!
use clap::Parser;
use targzip::commands;
use tracing_subscriber::{fmt, EnvFilter};

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "targzip",
    about = "Create, list and extract tar and tar.gz archives",
    long_about = "Bundle any set of files and directory trees into a .tar or .tar.gz archive,\n\
                  each tree stored under its own name, and read such archives back.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// All available subcommands.
#[derive(Parser, Debug)]
enum Commands {
    #[command(alias = "c")]
    Create(commands::create::CreateArgs),
    #[command(alias = "t")]
    List(commands::list::ListArgs),
    #[command(alias = "x")]
    Extract(commands::extract::ExtractArgs),
    Gunzip(commands::gunzip::GunzipArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Create(args) => commands::create::handle_create(args),
        Commands::List(args) => commands::list::handle_list(args),
        Commands::Extract(args) => commands::extract::handle_extract(args),
        Commands::Gunzip(args) => commands::gunzip::handle_gunzip(args),
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
