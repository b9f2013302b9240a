//! A small interactive shell with foreground/background job control.
//!
//! This crate provides the building blocks of `krill`, a minimal command
//! shell: a whitespace tokenizer, a typed command parser, a fixed set of
//! built-in commands, an external-program launcher, and a reaper that
//! reports terminated background children. It is intentionally small and
//! easy to read, suitable for experiments with process management.
//!
//! The main entry point is [`Interpreter`], which owns the environment and
//! the read-eval loop. The public modules expose the individual stages so
//! they can be exercised in isolation.

pub mod banner;
pub mod builtin;
pub mod command;
pub mod env;
pub mod external;
pub mod lexer;
pub mod parser;
pub mod reaper;

mod interpreter;

#[cfg(test)]
pub(crate) mod testutil;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;
