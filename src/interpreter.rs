use crate::banner;
use crate::builtin::Builtin;
use crate::command::{BuiltinCmd, Command, ExitCode};
use crate::env::Environment;
use crate::external::{self, ExternalJob};
use crate::parser;
use crate::reaper::{JobOutcome, Reaper};
use anyhow::Result;
use log::{debug, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Name of the persisted command history, kept in the home directory.
const HISTORY_FILE: &str = ".krill_history";

/// The interactive shell: environment, reaper, and the read-eval loop.
///
/// One foreground child at most is outstanding at any time — the loop does
/// not return to the prompt until the foreground wait finishes. Background
/// children are owned by the [`Reaper`] and their completion reports are
/// printed at the top of each loop iteration.
pub struct Interpreter {
    env: Environment,
    reaper: Reaper,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            reaper: Reaper::new(),
        }
    }

    /// Run the interactive loop until `exit` or end of input.
    ///
    /// Returns the shell's exit status. Per-command failures are reported
    /// and never end the loop; only a broken input stream does.
    pub fn repl(&mut self) -> Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;
        let history = history_path();
        if let Some(path) = &history {
            let _ = rl.load_history(path);
        }

        let mut stdout = io::stdout();
        if let Err(e) = banner::print_saved(Path::new(banner::BANNER_FILE), &mut stdout) {
            warn!("saved banner not shown: {:#}", e);
        }

        loop {
            self.reaper.report(&mut stdout)?;

            let prompt = format!("krill {}> ", self.env.current_dir.display());
            match rl.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.as_str());
                    }
                    self.dispatch(&line, &mut stdout);
                    if self.env.should_exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("krill: read error: {}", e);
                    break;
                }
            }
        }

        if let Some(path) = &history {
            let _ = rl.save_history(path);
        }
        writeln!(stdout, "goodbye")?;
        Ok(0)
    }

    /// Route one input line: parse it, then run a built-in in-process or
    /// hand the line to the job launcher. All errors are reported here;
    /// none of them ends the loop.
    pub fn dispatch(&mut self, line: &str, stdout: &mut dyn Write) {
        let command = match parser::parse(line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("krill: {}", e);
                return;
            }
        };
        debug!("dispatching {:?}", command);

        let result = match command {
            Command::Empty => Ok(0),
            Command::Exit => {
                self.env.should_exit = true;
                Ok(0)
            }
            Command::Builtin(builtin) => self.run_builtin(builtin, stdout),
            Command::External(job) => self.launch(job, stdout),
        };

        match result {
            Ok(0) => {}
            Ok(code) => debug!("command finished with status {}", code),
            Err(e) => eprintln!("krill: {:#}", e),
        }
    }

    fn run_builtin(&mut self, builtin: BuiltinCmd, stdout: &mut dyn Write) -> Result<ExitCode> {
        match builtin {
            BuiltinCmd::Cd(cmd) => cmd.execute(stdout, &mut self.env),
            BuiltinCmd::Help(cmd) => cmd.execute(stdout, &mut self.env),
            BuiltinCmd::Banner(cmd) => cmd.execute(stdout, &mut self.env),
            BuiltinCmd::TextEdit(cmd) => cmd.execute(stdout, &mut self.env),
            BuiltinCmd::Usage(cmd) => cmd.execute(stdout, &mut self.env),
        }
    }

    /// Launch an external job: foreground jobs are awaited right here,
    /// background jobs are announced and handed to the reaper.
    fn launch(&mut self, mut job: ExternalJob, stdout: &mut dyn Write) -> Result<ExitCode> {
        let background = job.take_background_marker();
        let child = job.spawn(&self.env)?;

        if background {
            writeln!(stdout, "[background] started pid {}", child.id())?;
            stdout.flush()?;
            self.reaper.watch(child);
            Ok(0)
        } else {
            let status = external::wait_foreground(child)?;
            Ok(JobOutcome::from(status).shell_code())
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HISTORY_FILE))
}
