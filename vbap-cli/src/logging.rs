use log::{LevelFilter, Log, Metadata, Record};
use std::sync::OnceLock;

struct SharedLogger {
    level: LevelFilter,
}

impl Log for SharedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // stdout carries JSON output only.
        eprintln!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<SharedLogger> = OnceLock::new();

fn level_from_env() -> LevelFilter {
    match std::env::var("RUST_LOG") {
        Ok(level) => match level.to_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        },
        Err(_) => LevelFilter::Warn,
    }
}

/// Install the stderr logger. `quiet` limits output to errors.
pub fn init(quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else {
        level_from_env()
    };

    let logger_ref = LOGGER.get_or_init(|| SharedLogger { level });
    if log::set_logger(logger_ref).is_ok() {
        log::set_max_level(logger_ref.level);
    }
}
