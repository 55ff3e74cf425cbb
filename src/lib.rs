pub mod bootstrap;
pub mod cli;
pub mod commands;

use std::io::Write;

use anyhow::Result;
use ms_app::LibrarySettings;
use ms_core::config::AppConfig;

pub use cli::{Cli, Command};

/// Load the library described by `config`, run one command and write its
/// output to `out`.
///
/// Must be called from within a tokio runtime.
pub async fn run_with_config(
    config: &AppConfig,
    command: Command,
    out: &mut dyn Write,
) -> Result<()> {
    let settings = LibrarySettings::from_config(config);
    let mut library = bootstrap::build_library(config);
    library.load_all().await;
    commands::run(command, &mut library, &settings, out).await
}

/// Entry point used by the binary.
pub async fn run_cli(cli: Cli) -> Result<()> {
    let config = bootstrap::resolve_config(cli.config.clone())?;
    if let Err(err) = bootstrap::init_tracing_subscriber(&config.log_dir, cli.verbose) {
        eprintln!("Failed to initialize tracing: {err:#}");
    }
    tracing::debug!(data = %config.database_path.display(), "Configuration resolved");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with_config(&config, cli.command, &mut out).await?;
    out.flush()?;
    Ok(())
}
