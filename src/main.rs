//! Fixtures - interchange test fixture provisioning
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use fixtures::cli::{commands, Cli, Commands};
use fixtures::config::ConfigManager;
use fixtures::error::{FixturesError, FixturesResult};
use fixtures::lifecycle::LifecycleController;
use fixtures::ui::UiContext;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            eprintln!("{} {}", style("Stage:").dim(), e.stage());
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> FixturesResult<()> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("fixtures=warn"),
        1 => EnvFilter::new("fixtures=info"),
        _ => EnvFilter::new("fixtures=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Absolute: the generator also runs with the root as its working directory
    let root = match cli.root {
        Some(root) => std::path::absolute(&root)
            .map_err(|e| FixturesError::io(format!("resolving root {}", root.display()), e))?,
        None => std::env::current_dir()
            .map_err(|e| FixturesError::io("getting current directory", e))?,
    };
    debug!("Working root: {}", root.display());

    let config_manager = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    if let Some(path) = config_manager.path() {
        debug!("Loading config from {}", path.display());
    }
    let mut config = config_manager.load().await?;
    if let Some(tag) = cli.tag {
        debug!("Version tag overridden: {}", tag);
        config.fixtures.version_tag = tag;
    }

    let ctx = UiContext::detect();
    let lifecycle = LifecycleController::from_config(config, &root, ctx.use_fancy_output());

    match cli.command {
        Commands::AcquireFixtures => commands::acquire(&lifecycle, &ctx).await,
        Commands::Clean => commands::clean_all(&lifecycle, &ctx).await,
        Commands::CleanArchives => commands::clean_archives(&lifecycle, &ctx).await,
        Commands::CleanTestFiles => commands::clean_test_files(&lifecycle, &ctx).await,
        Commands::Generate => commands::generate(&lifecycle, &ctx).await,
        Commands::Status => commands::status(&lifecycle, &ctx).await,
    }
}
