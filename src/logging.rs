//! Logging bootstrap for the `mt` binary.
//!
//! The library only talks to the `log` facade; the binary installs a
//! stderr logger once per process. Messages use `event=... key=value` pairs.

use std::sync::{Mutex, OnceLock};

use flexi_logger::{Logger, LoggerHandle};

/// Environment variable consulted when no level is passed explicitly
pub const LOG_ENV_VAR: &str = "MINDTREE_LOG";

const DEFAULT_LEVEL: &str = "warn";

static LOGGING_STATE: OnceLock<LoggingState> = OnceLock::new();
static INIT_GUARD: Mutex<()> = Mutex::new(());

struct LoggingState {
    level: &'static str,
    _logger: LoggerHandle,
}

/// Initialize stderr logging.
///
/// Level precedence: `level` argument, then `MINDTREE_LOG`, then `warn`.
/// Calling again with the same level is a no-op; a different level is
/// rejected. Never panics.
pub fn init_logging(level: Option<&str>) -> Result<(), String> {
    let env_level = std::env::var(LOG_ENV_VAR).ok();
    let requested = level
        .or(env_level.as_deref())
        .unwrap_or(DEFAULT_LEVEL);
    let normalized = normalize_level(requested)?;

    let _guard = INIT_GUARD.lock().map_err(|_| "logging init lock poisoned".to_string())?;
    if let Some(state) = LOGGING_STATE.get() {
        if state.level != normalized {
            return Err(format!(
                "logging already initialized with level `{}`; refusing to switch to `{}`",
                state.level, normalized
            ));
        }
        return Ok(());
    }

    let logger = Logger::try_with_str(normalized)
        .map_err(|err| format!("invalid log level `{normalized}`: {err}"))?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    log::debug!(
        "event=logging_init level={} version={}",
        normalized,
        env!("CARGO_PKG_VERSION")
    );

    let _ = LOGGING_STATE.set(LoggingState {
        level: normalized,
        _logger: logger,
    });
    Ok(())
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Ok("off"),
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected off|trace|debug|info|warn|error"
        )),
    }
}
