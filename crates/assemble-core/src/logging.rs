//! Structured logging setup for hosts embedding this crate.
//!
//! This crate only emits `log` records (`trace!`/`debug!`/`warn!` at the sites documented on
//! each module); it never configures a logger itself outside of tests. `init_logging` is a
//! small `fern`-based helper for tests and for host binaries that want a sensible default.

use fern::Dispatch;
use log::LevelFilter;

/// Initialize a process-wide logger that writes to stderr with a `[level][target] message`
/// format. Intended for tests and simple host binaries; a real build-tool runtime is expected
/// to configure its own `fern::Dispatch` instead.
pub fn init_logging(level: LevelFilter) -> Result<(), fern::InitError> {
    Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .map_err(fern::InitError::SetLoggerError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_does_not_panic() {
        // Loggers are process-global; ignore the "already set" error other tests may trigger.
        let _ = init_logging(LevelFilter::Debug);
        debug!("logging initialized in test");
    }
}
