use crate::banner;
use crate::command::ExitCode;
use crate::env::Environment;
use anyhow::{Context, Result, anyhow};
use argh::FromArgs;
use log::debug;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Built-in commands known to the shell at compile time.
///
/// Builtins execute in the shell's own process. Two of them delegate work
/// elsewhere — `textedit` spawns the editor helper and `banner` decodes an
/// image file — but both block until that work completes, so from the
/// loop's point of view every builtin is synchronous.
pub trait Builtin {
    /// Executes the command against the provided output stream and
    /// environment.
    ///
    /// Return value follows shell conventions: 0 for success, non-zero for
    /// error.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

/// A recognized builtin whose arguments could not be parsed. Carries the
/// parser's usage text; reporting it is the command's whole effect.
#[derive(Debug)]
pub struct Usage {
    pub output: String,
    pub is_error: bool,
}

impl Builtin for Usage {
    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        stdout.write_all(self.output.as_bytes())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

#[derive(FromArgs, Debug)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl Builtin for Cd {
    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let target = match self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => return Err(anyhow!("cd: missing operand")),
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: {}", new_dir.display()))?;
        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs, Debug)]
/// Print the shell's capability listing.
pub struct Help {}

impl Builtin for Help {
    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        writeln!(stdout, "Built-ins:")?;
        writeln!(stdout, "  cd <dir>             change the working directory")?;
        writeln!(stdout, "  help                 show this listing")?;
        writeln!(stdout, "  exit                 leave the shell")?;
        writeln!(stdout, "  textedit <filename>  create or edit a text file")?;
        writeln!(stdout, "  banner <image>       show an image file as ASCII art")?;
        writeln!(stdout, "  banner set <image>   save a banner shown at next startup")?;
        writeln!(stdout, "  banner clear         remove the saved banner")?;
        writeln!(stdout, "End a command with '&' to run it in the background.")?;
        writeln!(stdout, "Anything else runs as an external program.")?;
        Ok(0)
    }
}

/// The `banner` builtin's modes. The two-token grammar (`set <image>`,
/// `clear`) predates anything a flag parser models, so the modes are
/// matched by hand.
#[derive(Debug, PartialEq, Eq)]
pub enum Banner {
    /// `banner <image>` — render to the terminal.
    Show { image: PathBuf },
    /// `banner set <image>` — render and persist for the next startup.
    Set { image: PathBuf },
    /// `banner clear` — delete the persisted banner.
    Clear,
    /// `banner` with no or incomplete arguments — print usage only.
    Usage,
}

impl Banner {
    pub fn parse(args: &[String]) -> Banner {
        match args {
            [] => Banner::Usage,
            [mode, image, ..] if mode == "set" => Banner::Set {
                image: PathBuf::from(image),
            },
            [mode] if mode == "set" => Banner::Usage,
            [mode, ..] if mode == "clear" => Banner::Clear,
            [image, ..] => Banner::Show {
                image: PathBuf::from(image),
            },
        }
    }
}

impl Builtin for Banner {
    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        match self {
            Banner::Usage => {
                writeln!(stdout, "Usage:")?;
                writeln!(stdout, "  banner <image>       show image as ASCII")?;
                writeln!(stdout, "  banner set <image>   save image for next startup")?;
                writeln!(stdout, "  banner clear         remove saved banner")?;
                Ok(0)
            }
            Banner::Show { image } => {
                let art = banner::render(&image, banner::BANNER_WIDTH)?;
                stdout.write_all(art.as_bytes())?;
                Ok(0)
            }
            Banner::Set { image } => {
                banner::save(&image, banner::BANNER_WIDTH, Path::new(banner::BANNER_FILE))?;
                writeln!(stdout, "Saved banner for next startup.")?;
                Ok(0)
            }
            Banner::Clear => {
                banner::clear(Path::new(banner::BANNER_FILE))?;
                writeln!(stdout, "Banner cleared.")?;
                Ok(0)
            }
        }
    }
}

#[derive(FromArgs, Debug)]
/// Create or edit a text file in the line-editor helper.
pub struct TextEdit {
    #[argh(positional)]
    /// file to open in the editor.
    pub filename: Option<String>,
}

impl TextEdit {
    /// Locate the editor helper: the `textedit` binary installed next to
    /// the shell executable, falling back to a PATH lookup.
    fn helper_path() -> PathBuf {
        if let Ok(exe) = env::current_exe() {
            if let Some(dir) = exe.parent() {
                let candidate = dir.join("textedit");
                if candidate.exists() {
                    return candidate;
                }
            }
        }
        PathBuf::from("textedit")
    }
}

impl Builtin for TextEdit {
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        // Without a filename the whole shell terminates, not just the
        // command. Deliberate quirk, kept from the shell this one replaces.
        let Some(filename) = self.filename else {
            let _ = writeln!(stdout, "Usage: textedit <filename>");
            let _ = stdout.flush();
            std::process::exit(1);
        };

        let helper = Self::helper_path();
        let status = std::process::Command::new(&helper)
            .arg(&filename)
            .current_dir(&env.current_dir)
            .spawn()
            .with_context(|| format!("failed to start '{}'", helper.display()))?
            .wait()
            .context("wait for editor failed")?;
        debug!("editor finished: {}", status);
        Ok(status.code().unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::lock_current_dir;
    use std::env as stdenv;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_unique_temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let p = stdenv::temp_dir().join(format!("krill_test_{}_{}_{}", tag, std::process::id(), nanos));
        fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    #[test]
    fn cd_changes_both_process_and_tracked_dir() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("cd_ok");
        let canonical = fs::canonicalize(&temp).unwrap();
        let orig = stdenv::current_dir().unwrap();

        let mut env = Environment::new();
        let cmd = Cd {
            target: Some(canonical.to_string_lossy().to_string()),
        };
        let res = cmd.execute(&mut Vec::new(), &mut env);

        assert_eq!(res.unwrap(), 0);
        assert_eq!(stdenv::current_dir().unwrap(), canonical);
        assert_eq!(env.current_dir, canonical);

        stdenv::set_current_dir(orig).expect("restore cwd");
        let _ = fs::remove_dir_all(temp);
    }

    #[test]
    fn cd_nonexistent_leaves_directory_unchanged() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();

        let mut env = Environment::new();
        let cmd = Cd {
            target: Some(format!("no_such_dir_{}", std::process::id())),
        };
        let res = cmd.execute(&mut Vec::new(), &mut env);

        assert!(res.is_err());
        assert_eq!(stdenv::current_dir().unwrap(), orig);
        assert_eq!(env.current_dir, orig);
    }

    #[test]
    fn cd_without_operand_is_an_error() {
        let mut env = Environment::new();
        let err = Cd { target: None }
            .execute(&mut Vec::new(), &mut env)
            .unwrap_err();
        assert!(err.to_string().contains("missing operand"));
    }

    #[test]
    fn help_lists_every_builtin() {
        let mut out = Vec::new();
        let code = Help {}.execute(&mut out, &mut Environment::new()).unwrap();
        assert_eq!(code, 0);

        let text = String::from_utf8(out).unwrap();
        for name in ["cd", "help", "exit", "textedit", "banner"] {
            assert!(text.contains(name), "help is missing '{}'", name);
        }
    }

    #[test]
    fn banner_mode_parsing() {
        assert_eq!(Banner::parse(&[]), Banner::Usage);
        assert_eq!(Banner::parse(&["set".into()]), Banner::Usage);
        assert_eq!(
            Banner::parse(&["set".into(), "pic.png".into()]),
            Banner::Set {
                image: PathBuf::from("pic.png")
            }
        );
        assert_eq!(Banner::parse(&["clear".into()]), Banner::Clear);
        assert_eq!(
            Banner::parse(&["pic.png".into()]),
            Banner::Show {
                image: PathBuf::from("pic.png")
            }
        );
    }

    #[test]
    fn banner_usage_prints_without_side_effects() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("banner_usage");
        let orig = stdenv::current_dir().unwrap();
        stdenv::set_current_dir(&temp).unwrap();

        let mut out = Vec::new();
        let code = Banner::Usage
            .execute(&mut out, &mut Environment::new())
            .unwrap();
        assert_eq!(code, 0);
        assert!(String::from_utf8(out).unwrap().contains("banner set"));
        assert!(!Path::new(banner::BANNER_FILE).exists());

        stdenv::set_current_dir(orig).unwrap();
        let _ = fs::remove_dir_all(temp);
    }

    #[test]
    fn banner_show_failure_has_no_side_effects() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("banner_fail");
        let orig = stdenv::current_dir().unwrap();
        stdenv::set_current_dir(&temp).unwrap();

        let mut out = Vec::new();
        let res = Banner::Show {
            image: PathBuf::from("missing.png"),
        }
        .execute(&mut out, &mut Environment::new());

        assert!(res.is_err());
        assert!(out.is_empty());
        assert!(!Path::new(banner::BANNER_FILE).exists());

        stdenv::set_current_dir(orig).unwrap();
        let _ = fs::remove_dir_all(temp);
    }

    #[test]
    fn banner_clear_without_saved_banner_succeeds() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("banner_clear");
        let orig = stdenv::current_dir().unwrap();
        stdenv::set_current_dir(&temp).unwrap();

        let mut out = Vec::new();
        let code = Banner::Clear
            .execute(&mut out, &mut Environment::new())
            .unwrap();
        assert_eq!(code, 0);
        assert!(String::from_utf8(out).unwrap().contains("cleared"));

        stdenv::set_current_dir(orig).unwrap();
        let _ = fs::remove_dir_all(temp);
    }

    #[test]
    fn textedit_reports_helper_spawn_failure() {
        let _lock = lock_current_dir();
        // Only meaningful where no real editor helper is reachable.
        let env = Environment::new();
        if crate::external::find_command_path(&env.search_path(), Path::new("textedit")).is_some() {
            return;
        }

        let mut env = env;
        let res = TextEdit {
            filename: Some("notes.txt".into()),
        }
        .execute(&mut Vec::new(), &mut env);
        assert!(res.is_err());
    }
}
