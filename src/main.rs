mod cli;
mod commands;
mod config;
mod drive;
mod error;
mod page_range;
mod pdf;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::SplitConfig;
use drive::DriveClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Split(args) => {
            let json = args.json;
            let config = SplitConfig::from_args(args)?;
            let client = DriveClient::connect(&config.credentials).await?;
            let parts = commands::split::run(&client, &config).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&parts)?);
            } else {
                for part in &parts {
                    match &part.id {
                        Some(id) => println!("{}\t{}\t{}", part.range, part.name, id),
                        None => println!("{}\t{}\t(dry run)", part.range, part.name),
                    }
                }
            }
        }
        Commands::Local {
            path,
            start_pages,
            output_dir,
            prefix,
        } => {
            let written =
                commands::local::run(&path, &start_pages, &output_dir, prefix.as_deref())?;
            println!(
                "Split {} into {} file(s) in {}",
                path.display(),
                written.len(),
                output_dir.display()
            );
        }
        Commands::Plan {
            start_pages,
            total,
            path,
            json,
        } => {
            commands::plan::run(&start_pages, total, path.as_deref(), json)?;
        }
    }

    Ok(())
}
