//! Leveled, timestamped log lines.
//!
//! Every message the pipeline reports goes through [`emit`], which prefixes it with a
//! Unix timestamp in milliseconds and the script name, then hands it to logwise.  The
//! `enable_debug_log` configuration flag silences all of it.
//!
//! ```
//! use localdev_internal::log::format_line_at;
//!
//! let line = format_line_at(1_700_000_000_000, "Initialization complete");
//! assert_eq!(line, "[1700000000000] ADO Extension Local Dev Helper: Initialization complete");
//! ```

use crate::sys::time::{SystemTime, UNIX_EPOCH};

/// Name printed in front of every log line.
pub const SCRIPT_NAME: &str = "ADO Extension Local Dev Helper";

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Formats a line with an explicit timestamp.
pub fn format_line_at(unix_millis: u128, message: &str) -> String {
    format!("[{unix_millis}] {SCRIPT_NAME}: {message}")
}

/// Formats a line stamped with the current time.
pub fn format_line(message: &str) -> String {
    format_line_at(unix_millis(), message)
}

/// Emits `message` at `level` when `enabled` is set.
pub fn emit(enabled: bool, level: Level, message: &str) {
    if !enabled {
        return;
    }
    let line = format_line(message);
    match level {
        Level::Info => {
            logwise::info_sync!("{line}", line = line.as_str());
        }
        Level::Warn => {
            logwise::warn_sync!("{line}", line = line.as_str());
        }
        Level::Error => {
            logwise::error_sync!("{line}", line = line.as_str());
        }
    }
}

fn unix_millis() -> u128 {
    // pre-epoch clocks stamp 0
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_carries_name_and_message() {
        let line = format_line("Added new URL mapping");
        assert!(line.starts_with('['));
        assert!(line.ends_with("ADO Extension Local Dev Helper: Added new URL mapping"));
    }
}
