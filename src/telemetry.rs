use crate::config::AppConfig;
use crate::logging::logging_requested;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// JSON-lines trace file; `SPLMETER_TRACE_LOG` overrides the temp-dir default.
pub fn tracing_log_path() -> PathBuf {
    env::var("SPLMETER_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("splmeter_trace.jsonl"))
}

/// Install the global JSON subscriber once. Meter lifecycle events land here.
pub(crate) fn init_tracing(config: &AppConfig) {
    if !logging_requested(config) {
        return;
    }

    let _ = TRACING_INIT.get_or_init(|| {
        let path = tracing_log_path();
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => file,
            Err(err) => {
                crate::log_debug(&format!("trace log unavailable at {}: {err}", path.display()));
                return;
            }
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(file)
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
