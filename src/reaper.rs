//! Collection and reporting of terminated background children.
//!
//! The classic implementation of this component is a `SIGCHLD` handler
//! looping over `waitpid(-1, WNOHANG)`. Here each background child is
//! instead owned by a dedicated monitor thread that blocks in `wait()` and
//! forwards the result over a channel; the shell loop drains the channel
//! without blocking. Ownership makes the tricky invariant structural: a
//! monitor thread can only ever reap its own child, so a foreground wait
//! can never lose its status to the reaper, and every background
//! termination is observed exactly once.

use log::{debug, warn};
use std::fmt;
use std::io::{self, Write};
use std::process::{Child, ExitStatus};
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread;

/// How a reaped child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The child exited on its own with this status code.
    Exited(i32),
    /// The child was terminated by this signal.
    Signaled(i32),
}

impl JobOutcome {
    /// Collapse the outcome into a single shell-style status code, mapping
    /// signal deaths to `128 + signal` the way POSIX shells do.
    pub fn shell_code(self) -> i32 {
        match self {
            JobOutcome::Exited(code) => code,
            JobOutcome::Signaled(signal) => 128 + signal,
        }
    }
}

impl From<ExitStatus> for JobOutcome {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return JobOutcome::Signaled(signal);
            }
        }
        JobOutcome::Exited(status.code().unwrap_or(-1))
    }
}

/// Termination report for one background child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobEvent {
    pub pid: u32,
    pub outcome: JobOutcome,
}

impl fmt::Display for JobEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            JobOutcome::Exited(code) => {
                write!(f, "[done] pid {} exited with status {}", self.pid, code)
            }
            JobOutcome::Signaled(signal) => {
                write!(f, "[done] pid {} killed by signal {}", self.pid, signal)
            }
        }
    }
}

/// Collects termination events from background children.
pub struct Reaper {
    tx: Sender<JobEvent>,
    rx: Receiver<JobEvent>,
}

impl Reaper {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// Take ownership of a background child and report its termination.
    ///
    /// Returns immediately; a monitor thread blocks in `wait()` on the
    /// caller's behalf.
    pub fn watch(&self, mut child: Child) {
        let pid = child.id();
        let tx = self.tx.clone();
        thread::spawn(move || match child.wait() {
            Ok(status) => {
                debug!("background pid {} finished: {}", pid, status);
                let _ = tx.send(JobEvent {
                    pid,
                    outcome: status.into(),
                });
            }
            Err(e) => warn!("could not wait for background pid {}: {}", pid, e),
        });
    }

    /// Collect every termination observed so far. Never blocks.
    pub fn drain(&self) -> Vec<JobEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Drain and write one report line per terminated child.
    pub fn report(&self, out: &mut dyn Write) -> io::Result<()> {
        for event in self.drain() {
            writeln!(out, "{}", event)?;
        }
        out.flush()
    }
}

impl Default for Reaper {
    fn default() -> Self {
        Self::new()
    }
}
