//! Opt-in debug and crash logs in the system temp directory.
//!
//! Both files stay off unless `--logs` (or `SPLMETER_LOGS`) is given, and
//! `--no-logs` wins over everything. Each file has a byte cap; reaching it
//! truncates the file and starts over.

use crate::config::AppConfig;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::panic::{self, PanicHookInfo};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};


const DEBUG_LOG_CAP_BYTES: u64 = 5 * 1024 * 1024;
const CRASH_LOG_CAP_BYTES: u64 = 256 * 1024;

static ENABLED: AtomicBool = AtomicBool::new(false);
static DEBUG_LOG: Mutex<Option<CappedLog>> = Mutex::new(None);
static PANIC_HOOK: OnceLock<()> = OnceLock::new();

pub fn log_file_path() -> PathBuf {
    env::temp_dir().join("splmeter.log")
}

pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("splmeter_crash.log")
}

/// Whether the flags ask for file output at all.
pub(crate) fn logging_requested(config: &AppConfig) -> bool {
    (config.logs || config.log_timings) && !config.no_logs
}

/// Append-only text file that never grows past `cap` bytes.
struct CappedLog {
    path: PathBuf,
    cap: u64,
    file: File,
    len: u64,
}

impl CappedLog {
    fn open(path: &Path, cap: u64) -> Option<Self> {
        let existing = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
        let (file, len) = if existing > cap {
            (truncate(path)?, 0)
        } else {
            let file = OpenOptions::new().create(true).append(true).open(path).ok()?;
            (file, existing)
        };
        Some(Self {
            path: path.to_path_buf(),
            cap,
            file,
            len,
        })
    }

    fn append(&mut self, line: &str) {
        let bytes = line.len() as u64;
        if self.len.saturating_add(bytes) > self.cap {
            match truncate(&self.path) {
                Some(file) => {
                    self.file = file;
                    self.len = 0;
                }
                None => return,
            }
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.len = self.len.saturating_add(bytes);
        }
    }
}

fn truncate(path: &Path) -> Option<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .ok()
}

// Not `lock_or_recover`: that helper logs on poison and would re-enter this lock.
fn debug_log() -> MutexGuard<'static, Option<CappedLog>> {
    DEBUG_LOG
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
    *debug_log() = if enabled {
        CappedLog::open(&log_file_path(), DEBUG_LOG_CAP_BYTES)
    } else {
        None
    };
}

/// Configure the debug log and, when enabled, the JSON trace subscriber.
pub fn init_logging(config: &AppConfig) {
    set_enabled(logging_requested(config));
    crate::telemetry::init_tracing(config);
}

/// Append `[unix_secs] msg` to the debug log; a no-op while logging is off.
pub fn log_debug(msg: &str) {
    if !ENABLED.load(Ordering::Relaxed) {
        return;
    }
    if let Some(log) = debug_log().as_mut() {
        log.append(&format!("[{}] {msg}\n", timestamp()));
    }
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Record a panic location and message in the crash log.
pub fn log_panic(info: &PanicHookInfo<'_>) {
    if !ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let location = info.location().map_or_else(
        || "unknown".to_string(),
        |loc| format!("{}:{}", loc.file(), loc.line()),
    );
    let line = format!(
        "[{}] splmeter {} panicked at {location}: {}\n",
        timestamp(),
        env!("CARGO_PKG_VERSION"),
        panic_message(info)
    );
    if let Some(mut crash_log) = CappedLog::open(&crash_log_path(), CRASH_LOG_CAP_BYTES) {
        crash_log.append(&line);
    }
}

/// Chain [`log_panic`] in front of the current panic hook. Idempotent.
pub fn install_panic_hook() {
    PANIC_HOOK.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            log_panic(info);
            previous(info);
        }));
    });
}

#[cfg(test)]
pub(crate) fn set_logging_for_tests(enabled: bool) {
    set_enabled(enabled);
}
