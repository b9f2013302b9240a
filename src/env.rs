use std::env as stdenv;
use std::ffi::OsString;
use std::path::PathBuf;

/// Mutable, shell-level view of the process state used by the interpreter.
///
/// krill performs no variable expansion and has no `export` builtin, so
/// children simply inherit the process environment; the only state the
/// shell itself tracks is the working directory (changed by `cd`, read by
/// the prompt) and the flag telling the loop to terminate.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The current working directory for command execution and the prompt.
    pub current_dir: PathBuf,
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment`.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            current_dir,
            should_exit: false,
        }
    }

    /// The PATH-style search string used to resolve external commands.
    pub fn search_path(&self) -> OsString {
        stdenv::var_os("PATH").unwrap_or_default()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
