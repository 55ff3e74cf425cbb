//! Tracing configuration for MediaShelf
//!
//! ## Behavior / 行为
//!
//! - **stderr layer**: warnings and errors only, everything with `--verbose`.
//!   stdout is reserved for command output.
//! - **file layer**: daily rolling file under the configured log directory,
//!   filtered by `RUST_LOG` or the default directives.
//! - **Environment-aware**: debug builds default to `debug`, release to `info`.

use std::{fs, io, path::Path, sync::OnceLock};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    filter::LevelFilter, fmt, fmt::writer::BoxMakeWriter, prelude::*, registry, EnvFilter,
};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "mediashelf.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Check if running in development environment
fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Build the default filter directives for tracing
///
/// ## Behavior / 行为
/// - **Development**: debug level for the workspace crates
/// - **Production**: info level
/// - **diesel / r2d2**: kept at warn, they are noisy at debug
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    vec![
        if is_dev { "debug" } else { "info" }.to_string(),
        "r2d2=warn".to_string(),
        "diesel=warn".to_string(),
        if is_dev { "ms_infra=debug" } else { "ms_infra=info" }.to_string(),
        if is_dev { "ms_app=debug" } else { "ms_app=info" }.to_string(),
    ]
}

/// Initialize the tracing subscriber with appropriate configuration
///
/// Call once from `main`, after configuration is resolved and before the
/// library is wired.
///
/// ## Errors / 错误
///
/// Returns `Err` if a subscriber is already registered.
pub fn init_tracing_subscriber(log_dir: &Path, verbose: bool) -> anyhow::Result<()> {
    let is_dev = is_development();

    // Step 1: Build environment filter
    // - Defaults to debug in dev, info in prod
    // - Can be overridden with RUST_LOG environment variable
    let filter_directives = build_filter_directives(is_dev);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives.join(",")));

    // Step 2: Create writers
    let stderr_writer: BoxMakeWriter = BoxMakeWriter::new(io::stderr);
    let file_writer = match build_file_writer(log_dir) {
        Ok(writer) => Some(writer),
        Err(err) => {
            eprintln!("Failed to initialize file logging, logging to stderr only: {err}");
            None
        }
    };

    // Step 3: Create fmt layers
    // "2025-01-15 10:30:45.123 INFO [file.rs:42] [target] message"
    let stderr_level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN
    };
    let stderr_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
        .with_level(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(stderr_writer)
        .with_filter(stderr_level);

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_ansi(false) // No ANSI colors in file logs
            .with_writer(writer)
    });

    // Step 4: Register the global subscriber
    registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

fn build_file_writer(log_dir: &Path) -> anyhow::Result<NonBlocking> {
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Tracing log guard already initialized"))?;

    Ok(non_blocking)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_directives() {
        let dev_directives = build_filter_directives(true);
        assert!(dev_directives.contains(&"debug".to_string()));
        assert!(dev_directives.contains(&"ms_infra=debug".to_string()));
        assert!(dev_directives.contains(&"ms_app=debug".to_string()));

        let prod_directives = build_filter_directives(false);
        assert!(prod_directives.contains(&"info".to_string()));
        assert!(prod_directives.contains(&"diesel=warn".to_string()));
        assert!(prod_directives.contains(&"ms_app=info".to_string()));
    }

    #[test]
    fn test_filter_directives_parse() {
        let directives = build_filter_directives(false).join(",");
        assert!(EnvFilter::try_new(directives).is_ok());
    }
}
