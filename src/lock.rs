use std::sync::{Mutex, MutexGuard};

/// Lock `lock`, taking the data back from a poisoned mutex.
pub(crate) fn lock_or_recover<'a, T>(lock: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        crate::log_debug(&format!("{what}: mutex poisoned, recovering"));
        poisoned.into_inner()
    })
}
