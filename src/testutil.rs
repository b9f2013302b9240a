//! Helpers shared by tests that touch process-wide state.

use std::sync::{Mutex, MutexGuard, OnceLock};

/// Serializes tests that read or change the process working directory.
///
/// The working directory is process-wide and the test harness runs tests
/// on parallel threads, so every test that calls `set_current_dir`, or
/// that spawns children relative to the current directory, holds this.
pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX.get_or_init(|| Mutex::new(())).lock().unwrap()
}
