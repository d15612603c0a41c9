//! Forwarding of log records to the host's logging system.
//!
//! The crate logs through the [`log`] facade. Hosts install a [`Logger`] once
//! at startup with [`set_logger`]; on Android this usually forwards to Logcat.
//!
//! ```kotlin
//! class KeyFileLogcat : Logger {
//!     override fun log(level: LogLevel, message: String) {
//!         when (level) {
//!             LogLevel.ERROR -> Log.e("KeyFile", message)
//!             LogLevel.WARN -> Log.w("KeyFile", message)
//!             else -> Log.d("KeyFile", message)
//!         }
//!     }
//! }
//!
//! setLogger(KeyFileLogcat()) // once, e.g. in Application.onCreate
//! ```

use std::sync::{Arc, OnceLock};

/// Receiver for log messages emitted by this crate.
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Logs `message` at `level`.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Very detailed tracing output.
    Trace,
    /// Debugging information, e.g. every file written or removed.
    Debug,
    /// Notable events, e.g. leftover temporary files cleaned up.
    Info,
    /// Recoverable problems, e.g. a stale file that could not be removed.
    Warn,
    /// Failures.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// `log::Log` implementation that hands records to the installed [`Logger`].
struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let from_this_crate = record
            .module_path()
            .is_some_and(|module_path| module_path.starts_with("keyfile"));
        let verbose = matches!(record.level(), log::Level::Debug | log::Level::Trace);

        // Other crates' debug output is noise to the host.
        if verbose && !from_this_crate {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(record.level().into(), record.args().to_string());
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Installs `logger` as the destination for this crate's log output.
///
/// Only the first call has an effect; later calls are ignored.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    static LOGGER: ForeignLogger = ForeignLogger;

    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("Logger already set");
        return;
    }

    if let Err(e) = log::set_logger(&LOGGER) {
        eprintln!("Failed to set logger: {e}");
        return;
    }
    log::set_max_level(log::LevelFilter::Trace);
}
