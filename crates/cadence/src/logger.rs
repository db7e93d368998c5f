//! `log` backend printing over semihosting.
//!
//! The maximum level is chosen at compile time with the `CADENCE_LOG` environment variable
//! (`error`, `warn`, `info`, `debug` or `trace`, default `info`).

use cortex_m_semihosting::hprintln;
use log::{Level, Log, Metadata, Record};

struct SemihostingLogger;

impl Log for SemihostingLogger {
    fn enabled(&self, p_metadata: &Metadata) -> bool {
        p_metadata.level() <= log_level()
    }

    fn log(&self, p_record: &Record) {
        if self.enabled(p_record.metadata()) {
            hprintln!("[{}] {}", p_record.level(), p_record.args());
        }
    }

    fn flush(&self) {}
}

static G_LOGGER: SemihostingLogger = SemihostingLogger;

fn log_level() -> Level {
    match option_env!("CADENCE_LOG") {
        Some("error") => Level::Error,
        Some("warn") => Level::Warn,
        Some("debug") => Level::Debug,
        Some("trace") => Level::Trace,
        _ => Level::Info,
    }
}

/// Installs the logger. Must be called once, before interrupts use `log`.
pub fn init() {
    cortex_m::interrupt::free(|_cs| {
        // SAFETY: interrupts are masked, so nothing logs while the logger is being set.
        unsafe {
            if log::set_logger_racy(&G_LOGGER).is_ok() {
                log::set_max_level_racy(log_level().to_level_filter());
            }
        }
    });
}
