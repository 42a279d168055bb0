//! Memoized shell execution for probes.
//!
//! Every probe eventually boils down to "run this command line". The
//! [`Executor`] runs it through a [`Shell`] once and remembers the result for
//! the rest of its lifetime, so two probes that expand to the same command
//! only pay for one subprocess.

use crate::error::{ProbeError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, trace};

/// Captured result of [`Shell::output`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub status: i32,
    pub stdout: String,
}

/// Something that can run a command line.
pub trait Shell {
    /// Run `command`, discarding stdout and stderr, and return its exit status.
    fn call(&self, command: &str) -> std::io::Result<i32>;

    /// Run `command`, capturing stdout and discarding stderr.
    fn output(&self, command: &str) -> std::io::Result<ShellOutput>;
}

impl<S: Shell + ?Sized> Shell for &S {
    fn call(&self, command: &str) -> std::io::Result<i32> {
        (**self).call(command)
    }

    fn output(&self, command: &str) -> std::io::Result<ShellOutput> {
        (**self).output(command)
    }
}

impl<S: Shell + ?Sized> Shell for Box<S> {
    fn call(&self, command: &str) -> std::io::Result<i32> {
        (**self).call(command)
    }

    fn output(&self, command: &str) -> std::io::Result<ShellOutput> {
        (**self).output(command)
    }
}

/// The host shell: `sh -c` (or `cmd /C` on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShell;

impl SystemShell {
    fn command(command: &str) -> Command {
        let shell = if cfg!(windows) { "cmd" } else { "sh" };
        let flag = if cfg!(windows) { "/C" } else { "-c" };
        let mut cmd = Command::new(shell);
        cmd.args([flag, command]).stdin(Stdio::null());
        cmd
    }
}

/// Signal-terminated processes have no exit code; report them as -1.
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

impl Shell for SystemShell {
    fn call(&self, command: &str) -> std::io::Result<i32> {
        let status = Self::command(command)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        Ok(exit_code(status))
    }

    fn output(&self, command: &str) -> std::io::Result<ShellOutput> {
        let output = Self::command(command).stderr(Stdio::null()).output()?;
        Ok(ShellOutput {
            status: exit_code(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// Runs commands through a [`Shell`], caching results by exact command text.
///
/// Caches are never invalidated. Single-threaded by construction (`RefCell`).
pub struct Executor<S = SystemShell> {
    shell: S,
    statuses: RefCell<HashMap<String, i32>>,
    outputs: RefCell<HashMap<String, String>>,
}

impl Executor<SystemShell> {
    /// Executor backed by the host shell.
    pub fn system() -> Self {
        Self::new(SystemShell)
    }
}

impl<S: Shell> Executor<S> {
    pub fn new(shell: S) -> Self {
        Self {
            shell,
            statuses: RefCell::new(HashMap::new()),
            outputs: RefCell::new(HashMap::new()),
        }
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Run `command` and return its exit status; a non-zero status is data,
    /// not an error.
    pub fn call(&self, command: &str) -> Result<i32> {
        let cached = self.statuses.borrow().get(command).copied();
        if let Some(status) = cached {
            trace!(command, status, "probe cache hit");
            return Ok(status);
        }

        debug!(command, "running probe");
        let status = self.shell.call(command)?;
        self.statuses
            .borrow_mut()
            .insert(command.to_string(), status);
        Ok(status)
    }

    /// Run `command` and return its stdout. A non-zero exit status is an
    /// error and is not cached.
    pub fn check_output(&self, command: &str) -> Result<String> {
        let cached = self.outputs.borrow().get(command).cloned();
        if let Some(stdout) = cached {
            trace!(command, "probe output cache hit");
            return Ok(stdout);
        }

        debug!(command, "capturing probe output");
        let output = self.shell.output(command)?;
        if output.status != 0 {
            return Err(ProbeError::CommandFailed {
                command: command.to_string(),
                status: output.status,
            });
        }
        self.outputs
            .borrow_mut()
            .insert(command.to_string(), output.stdout.clone());
        Ok(output.stdout)
    }

    /// Number of distinct commands whose results are cached.
    pub fn cached_commands(&self) -> usize {
        self.statuses.borrow().len() + self.outputs.borrow().len()
    }
}
