use crate::env::Environment;
use anyhow::{Context, Result, anyhow};
use log::debug;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Child, Command, ExitStatus};

/// The token that, when it is the last one on a line, requests background
/// execution.
pub const BACKGROUND_MARKER: &str = "&";

/// An external program invocation: everything the parser did not recognize
/// as a built-in.
#[derive(Debug, PartialEq, Eq)]
pub struct ExternalJob {
    /// Command name followed by its arguments.
    pub argv: Vec<String>,
}

impl ExternalJob {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// Remove a trailing background marker from the argument vector.
    ///
    /// Returns true when the marker was present; the job is then meant to
    /// run in the background. A marker anywhere else is an ordinary
    /// argument and is left alone.
    pub fn take_background_marker(&mut self) -> bool {
        if self.argv.last().map(String::as_str) == Some(BACKGROUND_MARKER) {
            self.argv.pop();
            true
        } else {
            false
        }
    }

    /// Spawn the job as a child process, resolving the command through the
    /// environment's search path.
    ///
    /// A failure here happens in the shell's own process — the child either
    /// comes into existence running the requested program or not at all, so
    /// it can never fall back into shell logic.
    pub fn spawn(&self, env: &Environment) -> Result<Child> {
        let name = self
            .argv
            .first()
            .ok_or_else(|| anyhow!("missing command name"))?;
        let path = find_command_path(&env.search_path(), Path::new(name))
            .ok_or_else(|| anyhow!("{}: command not found", name))?;

        debug!("spawning {:?} as {}", self.argv, path.display());
        Command::new(path.as_ref())
            .args(&self.argv[1..])
            .current_dir(&env.current_dir)
            .spawn()
            .with_context(|| format!("failed to start '{}'", name))
    }
}

/// Block until this exact child terminates.
///
/// Foreground jobs are awaited here directly; they never pass through the
/// reaper, so a background child's completion can never be mistaken for a
/// foreground one or vice versa.
pub fn wait_foreground(mut child: Child) -> Result<ExitStatus> {
    let status = child.wait().context("wait for foreground child failed")?;
    debug!("foreground pid {} finished: {}", child.id(), status);
    Ok(status)
}

/// Resolve a command path the way a typical shell would.
///
/// - An absolute path, or any path with more than one component
///   (`bin/sh`, `./foo`), resolves to itself if it exists.
/// - A single bare component is searched for in each directory of
///   `search_paths`, first match wins.
/// - An empty path resolves to nothing.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.as_os_str().is_empty() {
        return None;
    }

    if path.is_absolute() || path.components().count() > 1 {
        return path.exists().then_some(Cow::Borrowed(path));
    }

    std::env::split_paths(search_paths)
        .map(|dir| dir.join(path))
        .find(|candidate| candidate.exists())
        .map(Cow::Owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    fn osstr(s: &str) -> &OsStr {
        OsStr::new(s)
    }

    #[test]
    fn background_marker_is_stripped_from_the_tail() {
        let mut job = ExternalJob::new(vec!["sleep".into(), "5".into(), "&".into()]);
        assert!(job.take_background_marker());
        assert_eq!(job.argv, vec!["sleep".to_string(), "5".to_string()]);
    }

    #[test]
    fn marker_elsewhere_is_an_ordinary_argument() {
        let mut job = ExternalJob::new(vec!["echo".into(), "&".into(), "x".into()]);
        assert!(!job.take_background_marker());
        assert_eq!(job.argv.len(), 3);
    }

    #[test]
    fn lone_marker_leaves_an_empty_job() {
        let _lock = crate::testutil::lock_current_dir();
        let mut job = ExternalJob::new(vec!["&".into()]);
        assert!(job.take_background_marker());
        assert!(job.argv.is_empty());
        assert!(job.spawn(&Environment::new()).is_err());
    }

    #[test]
    fn absolute_existing_path_resolves() {
        let path = Path::new("/bin/sh");
        let found = find_command_path(osstr("/bin"), path).expect("find /bin/sh");
        assert_eq!(found.as_ref(), path);
    }

    #[test]
    fn absolute_missing_path_does_not_resolve() {
        assert!(find_command_path(osstr("/bin"), Path::new("/bin/nonexisting")).is_none());
    }

    #[test]
    fn bare_component_is_searched_in_path() {
        let found = find_command_path(osstr("/bin"), Path::new("sh")).expect("find sh in /bin");
        assert!(found.as_ref().starts_with("/bin"));
        assert!(found.as_ref().ends_with("sh"));

        assert!(find_command_path(osstr("/bin"), Path::new("no_such_cmd_krill")).is_none());
    }

    #[test]
    fn full_path_resolves_against_the_filesystem() {
        let base = std::env::temp_dir().join(format!("external_tests_{}", std::process::id()));
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(base.join("bin")).unwrap();
        File::create(base.join("bin").join("tool")).unwrap();

        let target = base.join("bin").join("tool");
        let found = find_command_path(osstr("/does/not/matter"), &target).expect("find by path");
        assert_eq!(found.as_ref(), target);

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn empty_path_does_not_resolve() {
        assert!(find_command_path(osstr("/bin"), Path::new("")).is_none());
    }

    #[test]
    fn spawn_reports_unknown_commands_without_creating_a_job() {
        let _lock = crate::testutil::lock_current_dir();
        let job = ExternalJob::new(vec!["definitely_not_a_command_krill".into()]);
        let err = job.spawn(&Environment::new()).unwrap_err();
        assert!(err.to_string().contains("command not found"));
    }

    #[test]
    fn foreground_wait_returns_that_childs_status() {
        let _lock = crate::testutil::lock_current_dir();
        let job = ExternalJob::new(vec!["sh".into(), "-c".into(), "exit 7".into()]);
        let child = job.spawn(&Environment::new()).expect("spawn sh");
        let status = wait_foreground(child).expect("wait");
        assert_eq!(status.code(), Some(7));
    }
}
