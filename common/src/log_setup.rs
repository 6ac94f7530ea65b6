use std::sync::OnceLock;

use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Initializes the process-wide logger.
///
/// Records go to `logs/` with size-based rotation, every record is duplicated
/// to stdout and warnings and above to stderr. `RUST_LOG` overrides
/// `base_level` when set. Later calls are no-ops, so every test may call it.
pub fn setup_logging(base_level: &str) {
    LOGGER.get_or_init(|| {
        Logger::try_with_env_or_str(base_level)
            .unwrap_or_else(|e| panic!("Invalid log filter: {}", e))
            .log_to_file(FileSpec::default().directory("logs").basename("fanout"))
            .duplicate_to_stderr(Duplicate::Warn)
            .duplicate_to_stdout(Duplicate::All)
            .rotate(
                Criterion::Size(1024 * 1024), //1MB
                Naming::Timestamps,
                Cleanup::KeepLogFiles(5),
            )
            .start()
            .unwrap_or_else(|e| panic!("Logger initialization failed with {}", e))
    });
}
