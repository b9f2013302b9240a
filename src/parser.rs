//! Turning a raw input line into a typed [`Command`].
//!
//! Dispatch used to be the classic chain of string comparisons; parsing
//! into an enum first makes the order and the one deliberate irregularity
//! (the `exit` full-line match) explicit, and gives every built-in typed
//! arguments.

use crate::builtin::{Banner, Cd, Help, TextEdit, Usage};
use crate::command::{BuiltinCmd, Command};
use crate::external::ExternalJob;
use crate::lexer::{self, LexError};
use argh::{EarlyExit, FromArgs};

/// Parse one raw input line.
///
/// The trailing background marker is not interpreted here; it stays in the
/// argument vector for the job launcher to strip.
pub fn parse(line: &str) -> Result<Command, LexError> {
    // `exit` matches the entire raw line, nothing less and nothing more:
    // `exit now` (or even ` exit`) falls through to external execution.
    // Deliberate quirk, kept from the shell this one replaces.
    if line == "exit" {
        return Ok(Command::Exit);
    }

    let argv = lexer::tokenize(line)?;
    let Some((name, args)) = argv.split_first() else {
        return Ok(Command::Empty);
    };

    let builtin = match name.as_str() {
        "cd" => from_args::<Cd>(name, args).map_or_else(BuiltinCmd::Usage, BuiltinCmd::Cd),
        "help" => from_args::<Help>(name, args).map_or_else(BuiltinCmd::Usage, BuiltinCmd::Help),
        "banner" => BuiltinCmd::Banner(Banner::parse(args)),
        "textedit" => {
            from_args::<TextEdit>(name, args).map_or_else(BuiltinCmd::Usage, BuiltinCmd::TextEdit)
        }
        _ => return Ok(Command::External(ExternalJob::new(argv))),
    };
    Ok(Command::Builtin(builtin))
}

/// Parse a built-in's arguments, turning `argh` failures into the
/// reportable [`Usage`] command instead of aborting the line.
fn from_args<T: FromArgs>(name: &str, args: &[String]) -> Result<T, Usage> {
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    T::from_args(&[name], &arg_refs).map_err(|EarlyExit { output, status }| Usage {
        output,
        is_error: status.is_err(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_matches_the_entire_line_only() {
        assert!(matches!(parse("exit").unwrap(), Command::Exit));

        // Extra tokens or even extra whitespace defeat the match.
        let Command::External(job) = parse("exit now").unwrap() else {
            panic!("expected external command");
        };
        assert_eq!(job.argv, vec!["exit".to_string(), "now".to_string()]);

        assert!(matches!(parse(" exit").unwrap(), Command::External(_)));
    }

    #[test]
    fn blank_lines_parse_to_empty() {
        assert!(matches!(parse("").unwrap(), Command::Empty));
        assert!(matches!(parse("   \t ").unwrap(), Command::Empty));
    }

    #[test]
    fn builtin_names_never_become_external_jobs() {
        assert!(matches!(
            parse("cd /tmp").unwrap(),
            Command::Builtin(BuiltinCmd::Cd(_))
        ));
        assert!(matches!(
            parse("help").unwrap(),
            Command::Builtin(BuiltinCmd::Help(_))
        ));
        assert!(matches!(
            parse("banner pic.png").unwrap(),
            Command::Builtin(BuiltinCmd::Banner(_))
        ));
        assert!(matches!(
            parse("textedit notes.txt").unwrap(),
            Command::Builtin(BuiltinCmd::TextEdit(_))
        ));
    }

    #[test]
    fn cd_arguments_are_typed() {
        let Command::Builtin(BuiltinCmd::Cd(cd)) = parse("cd /tmp").unwrap() else {
            panic!("expected cd");
        };
        assert_eq!(cd.target.as_deref(), Some("/tmp"));

        // A bare `cd` still parses; the missing operand is an execution
        // error, reported when the builtin runs.
        let Command::Builtin(BuiltinCmd::Cd(cd)) = parse("cd").unwrap() else {
            panic!("expected cd");
        };
        assert!(cd.target.is_none());
    }

    #[test]
    fn unparseable_builtin_arguments_become_usage() {
        assert!(matches!(
            parse("help me please").unwrap(),
            Command::Builtin(BuiltinCmd::Usage(Usage { is_error: true, .. }))
        ));
    }

    #[test]
    fn banner_modes_are_recognized() {
        assert!(matches!(
            parse("banner set pic.png").unwrap(),
            Command::Builtin(BuiltinCmd::Banner(Banner::Set { .. }))
        ));
        assert!(matches!(
            parse("banner clear").unwrap(),
            Command::Builtin(BuiltinCmd::Banner(Banner::Clear))
        ));
        assert!(matches!(
            parse("banner").unwrap(),
            Command::Builtin(BuiltinCmd::Banner(Banner::Usage))
        ));
    }

    #[test]
    fn background_marker_is_left_for_the_launcher() {
        let Command::External(job) = parse("sleep 5 &").unwrap() else {
            panic!("expected external command");
        };
        assert_eq!(job.argv.last().map(String::as_str), Some("&"));
    }

    #[test]
    fn oversized_input_is_rejected() {
        let line = vec!["x"; lexer::MAX_ARGS + 1].join(" ");
        assert!(parse(&line).is_err());
    }
}
