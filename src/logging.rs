use std::path::Path;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize file logging.
///
/// The terminal belongs to the UI, so events only go to `log_file`.
/// `RUST_LOG` overrides the level chosen by `verbose`.
pub fn init(verbose: bool, log_file: &Path) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("loan_wizard={}", default_level)));

    let directory = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let _ = std::fs::create_dir_all(directory);
    let file_appender = tracing_appender::rolling::never(
        directory,
        log_file
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("loan-wizard.log")),
    );

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_log_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("logs").join("wizard.log");

        init(true, &log_path);
        tracing::info!("logging smoke test");

        assert!(temp_dir.path().join("logs").exists());
    }
}
