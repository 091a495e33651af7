//! Logwise integration for log capture and retrieval.
//!
//! Installs a global `logwise` logger that keeps every record in memory, so the `logs`
//! command can return them from the page console.

use localdev_internal::command::{Command, Response};
use logwise::LogRecord;
use std::pin::Pin;
use std::sync::{Arc, LazyLock, Once};
use wasm_safe_mutex::Mutex;

#[derive(Debug)]
struct CaptureLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl CaptureLogger {
    const fn new() -> CaptureLogger {
        CaptureLogger {
            records: Mutex::new(Vec::new()),
        }
    }
}

static LOGGER: LazyLock<Arc<CaptureLogger>> = LazyLock::new(|| Arc::new(CaptureLogger::new()));

static INSTALL: Once = Once::new();

impl logwise::Logger for CaptureLogger {
    fn finish_log_record(&self, record: LogRecord) {
        self.records.with_mut_sync(|e| e.push(record));
    }

    fn finish_log_record_async<'s>(
        &'s self,
        record: LogRecord,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 's>> {
        Box::pin(self.records.with_mut_async(|e| e.push(record)))
    }

    fn prepare_to_die(&self) {}
}

/// Starts capturing logs from the `logwise` crate.
///
/// Adds a global logger that stores log records in memory.  Later calls do nothing.
pub fn begin_log_capture() {
    INSTALL.call_once(|| logwise::add_global_logger(LOGGER.clone()));
}

/// The `logs` command.
///
/// Retrieves captured log records.
pub struct LogwiseCapture;

impl Command for LogwiseCapture {
    fn name(&self) -> &'static str {
        "logs"
    }

    fn short_description(&self) -> &'static str {
        "Shows captured logwise logs.  Use this when the browser console has been cleared or filtered."
    }

    fn full_description(&self) -> &'static str {
        "Shows captured logwise logs.
Usage: logs [COUNT]

With COUNT, only the most recent COUNT records are shown.  Records logged before the helper started are not
captured.

For more information on using logwise, see https://docs.rs/logwise/latest/logwise/
"
    }

    fn execute(&self, args: Vec<String>) -> Result<Response, Response> {
        let limit = match args.first() {
            Some(count) => match count.parse::<usize>() {
                Ok(n) => Some(n),
                Err(_) => return Err(Response::usage(self.name(), "[COUNT]")),
            },
            None => None,
        };
        let all_logs = LOGGER.records.with_sync(|logs| logs.clone());
        let skip = limit.map_or(0, |n| all_logs.len().saturating_sub(n));
        let mut str = String::new();
        for log in all_logs.iter().skip(skip) {
            str.push_str(&log.to_string());
            str.push('\n');
        }
        Ok(Response::String(str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logs(args: &[&str]) -> Result<Response, Response> {
        LogwiseCapture.execute(args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn capture_installs_once() {
        begin_log_capture();
        begin_log_capture();
        ::logwise::warn_sync!("logs command capture marker 7f3a");

        let all = logs(&[]).unwrap().into_string();
        assert_eq!(all.matches("logs command capture marker 7f3a").count(), 1);
    }

    #[test]
    fn count_keeps_the_most_recent_records() {
        begin_log_capture();
        ::logwise::warn_sync!("logs command tail first");
        ::logwise::warn_sync!("logs command tail second");

        let tail = logs(&["1"]).unwrap().into_string();
        assert_eq!(tail.lines().count(), 1);
        assert_eq!(logs(&["0"]).unwrap().into_string(), "");
    }

    #[test]
    fn emitted_lines_are_recorded_verbatim() {
        begin_log_capture();
        localdev_internal::log::emit(true, localdev_internal::log::Level::Warn, "verbatim 51c0");

        let all = logs(&[]).unwrap().into_string();
        let line = all
            .lines()
            .find(|l| l.contains("verbatim 51c0"))
            .unwrap();
        assert!(line.ends_with("] ADO Extension Local Dev Helper: verbatim 51c0"));
        assert!(!line.contains("\"["));
    }

    #[test]
    fn bad_count_reports_usage() {
        let err = logs(&["many"]).unwrap_err();
        assert_eq!(err.into_string(), "usage: logs [COUNT]");
    }
}
