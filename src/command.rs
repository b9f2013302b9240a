use crate::builtin::{Banner, Cd, Help, TextEdit, Usage};
use crate::external::ExternalJob;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line
/// tools.
pub type ExitCode = i32;

/// A fully parsed input line, ready for dispatch.
///
/// Replacing a chain of string comparisons with a tagged enum makes the
/// dispatch order explicit and keeps each command's arguments typed.
#[derive(Debug)]
pub enum Command {
    /// An empty or all-whitespace line; the loop re-prompts without error.
    Empty,
    /// The literal line `exit`. Only the entire raw line matches — a line
    /// like `exit now` is an [`Command::External`] invocation instead.
    Exit,
    /// One of the shell's built-in commands, executed in-process.
    Builtin(BuiltinCmd),
    /// Anything else: an external program to spawn.
    External(ExternalJob),
}

/// The fixed set of built-ins known to the shell at compile time.
#[derive(Debug)]
pub enum BuiltinCmd {
    /// `cd <dir>` — change the working directory.
    Cd(Cd),
    /// `help` — print the capability listing.
    Help(Help),
    /// `banner [<image>|set <image>|clear]` — ASCII-art banner management.
    Banner(Banner),
    /// `textedit <filename>` — delegate to the line-editor helper process.
    TextEdit(TextEdit),
    /// A recognized builtin invoked with arguments it could not parse; the
    /// stored usage text is reported and the loop continues.
    Usage(Usage),
}
