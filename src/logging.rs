//! Minimal logging backend for the `log` facade
//!
//! The library itself only emits through `log` macros; this module gives
//! binaries a zero-setup stderr backend. Level defaults to `info` and can
//! be overridden with the `PLOTVIEW_LOG` environment variable.

use log::{LevelFilter, Log, Metadata, Record};

struct StderrLogger {
    max_level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] [{}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

fn level_from_env() -> LevelFilter {
    match std::env::var("PLOTVIEW_LOG").as_deref() {
        Ok("off") => LevelFilter::Off,
        Ok("error") => LevelFilter::Error,
        Ok("warn") => LevelFilter::Warn,
        Ok("debug") => LevelFilter::Debug,
        Ok("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Register the stderr logger as the global `log` backend.
///
/// Safe to call more than once; only the first registration wins.
pub fn initialize_logging() {
    let max_level = level_from_env();
    let logger = StderrLogger { max_level };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(max_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        initialize_logging();
        initialize_logging();
        log::info!("logger initialized twice without panicking");
    }

    #[test]
    fn test_default_level_is_info() {
        assert_eq!(level_from_env(), LevelFilter::Info);
    }
}
