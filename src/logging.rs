use crate::config::Config;
use flexi_logger::{
    Cleanup, Criterion, DeferredNow, Duplicate, FileSpec, FlexiLoggerError, Logger,
    LoggerHandle, Naming,
};
use log::Record;

pub const LOG_BASENAME: &str = "pictodex";
/// Rotate once the active log file reaches 5 MiB.
pub const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;
/// Rotated files kept next to the active one.
pub const LOG_BACKUPS: usize = 5;

/// Start logging to stderr and, unless disabled, to a size-rotated file in
/// `config.log_dir()`. Stdout is left to command output. Keep the returned
/// handle alive for the whole run.
pub fn init_logging(config: &Config) -> Result<LoggerHandle, FlexiLoggerError> {
    let logger = Logger::try_with_str(&config.log_level)?;

    let logger = if config.log_to_file {
        logger
            .log_to_file(
                FileSpec::default()
                    .directory(config.log_dir())
                    .basename(LOG_BASENAME)
                    .suppress_timestamp(),
            )
            .rotate(
                Criterion::Size(MAX_LOG_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(LOG_BACKUPS),
            )
            .format_for_files(file_format)
            .duplicate_to_stderr(Duplicate::All)
            .format_for_stderr(console_format)
    } else {
        logger.log_to_stderr().format(console_format)
    };

    logger.start()
}

// "[INFO] message"
fn console_format(
    w: &mut dyn std::io::Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(w, "[{}] {}", record.level(), record.args())
}

// "[INFO|pictodex::core::indexer|L97] 2024-05-01T12:00:00+0000: message"
fn file_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "[{}|{}|L{}] {}: {}",
        record.level(),
        record.module_path().unwrap_or("<unnamed>"),
        record.line().unwrap_or(0),
        now.format("%Y-%m-%dT%H:%M:%S%z"),
        record.args()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(
        format: fn(&mut dyn std::io::Write, &mut DeferredNow, &Record) -> Result<(), std::io::Error>,
    ) -> String {
        let mut buffer = Vec::new();
        let mut now = DeferredNow::new();
        let record = Record::builder()
            .level(log::Level::Warn)
            .target("pictodex::core::indexer")
            .module_path(Some("pictodex::core::indexer"))
            .line(Some(42))
            .args(format_args!("Skipping file"))
            .build();

        format(&mut buffer, &mut now, &record).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_console_format() {
        assert_eq!(render(console_format), "[WARN] Skipping file");
    }

    #[test]
    fn test_file_format() {
        let output = render(file_format);
        assert!(
            output.starts_with("[WARN|pictodex::core::indexer|L42] "),
            "unexpected prefix: {output}"
        );
        assert!(output.ends_with(": Skipping file"), "got: {output}");
    }

    #[test]
    fn test_rejects_bad_level_spec() {
        let mut config = Config::new("/photos", "/state");
        config.log_level = "pictodex=notalevel".to_string();
        config.log_to_file = false;
        assert!(init_logging(&config).is_err());
    }
}
