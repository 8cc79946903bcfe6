//! External process execution
//!
//! Every external tool (installer, environment manager, interpreter) is driven through
//! [`ProcessRunner`]. Commands are built as argv token lists with [`CommandSpec`]; no
//! shell string is ever assembled.
//!
//! ## Usage
//!
//! ```ignore
//! let spec = CommandSpec::new("pip")
//!     .args(["install", "requests"])
//!     .env("PIP_DISABLE_PIP_VERSION_CHECK", "1")
//!     .timeout(Duration::from_secs(120));
//!
//! let output = SystemRunner::default().run(&spec)?;
//! if !output.success() {
//!     eprintln!("{}", output.stderr);
//! }
//! ```

use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Result, process};
use crate::interrupt::{self, ActiveChild};

/// Poll interval while waiting on a child
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Signal number of SIGINT
#[cfg(unix)]
const SIGINT: i32 = 2;

/// A structured external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: OsString,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
    timeout: Option<Duration>,
    interactive: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            timeout: None,
            interactive: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an environment override on top of the inherited environment
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Kill the child if it has not exited after `timeout`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Keep stdin attached to the terminal
    ///
    /// Output is still captured in full.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    #[cfg(test)]
    pub fn program(&self) -> &OsString {
        &self.program
    }

    #[cfg(test)]
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    #[cfg(test)]
    pub fn get_envs(&self) -> &[(OsString, OsString)] {
        &self.envs
    }

    #[cfg(test)]
    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[cfg(test)]
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Program name used in error messages
    pub fn program_name(&self) -> String {
        PathBuf::from(&self.program)
            .file_name()
            .map_or_else(
                || self.program.to_string_lossy().into_owned(),
                |name| name.to_string_lossy().into_owned(),
            )
    }

    /// Human readable command line, for logs only
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|token| {
                let token = token.to_string_lossy();
                if token.contains(char::is_whitespace) {
                    format!("\"{}\"", token)
                } else {
                    token.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        for (key, value) in &self.envs {
            command.env(key, value);
        }
        command
            .stdin(if self.interactive {
                Stdio::inherit()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ProcessOutput {
    #[cfg(test)]
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executes external commands
///
/// A non-zero exit code is a successful run; callers inspect
/// [`ProcessOutput::exit_code`]. Errors are reserved for failures to run at all:
/// spawn failures, timeouts and interrupts.
pub trait ProcessRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput>;
}

/// Runs commands as real child processes
///
/// A pending Ctrl-C kills the running child and yields `ProcessInterrupted`.
#[derive(Debug, Clone, Copy)]
pub struct SystemRunner {
    interrupted: &'static AtomicBool,
}

impl SystemRunner {
    #[cfg(test)]
    fn with_interrupt_flag(interrupted: &'static AtomicBool) -> Self {
        Self { interrupted }
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self {
            interrupted: interrupt::flag(),
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput> {
        debug!(command = %spec.display(), "running");

        let _active = ActiveChild::enter();
        let child = spec
            .to_command()
            .spawn()
            .map_err(|e| process::spawn_failed(spec.program_name(), e.to_string()))?;
        let mut guard = ChildGuard::new(child);

        let stdout = guard.take_reader(|child| child.stdout.take());
        let stderr = guard.take_reader(|child| child.stderr.take());

        let deadline = spec.timeout.map(|timeout| Instant::now() + timeout);
        let status = match guard
            .wait_until(deadline, self.interrupted)
            .map_err(|e| process::spawn_failed(spec.program_name(), e.to_string()))?
        {
            Wait::Exited(status) => status,
            // Guard drop kills and reaps the child
            Wait::TimedOut => {
                drop(guard);
                let seconds = spec.timeout.map_or(0, |t| t.as_secs());
                return Err(process::timed_out(spec.program_name(), seconds));
            }
            Wait::Interrupted => {
                drop(guard);
                return Err(process::interrupted(spec.program_name()));
            }
        };
        if self.is_interrupted() {
            return Err(process::interrupted(spec.program_name()));
        }

        let output = ProcessOutput {
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
            exit_code: exit_code(&status, spec)?,
        };
        debug!(exit_code = output.exit_code, "finished");

        Ok(output)
    }
}

enum Wait {
    Exited(ExitStatus),
    TimedOut,
    Interrupted,
}

/// Owns a running child and kills and reaps it unless it was waited on
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    fn take_reader<R, F>(&mut self, take: F) -> Option<JoinHandle<String>>
    where
        R: Read + Send + 'static,
        F: FnOnce(&mut Child) -> Option<R>,
    {
        take(&mut self.child).map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                String::from_utf8_lossy(&buf).into_owned()
            })
        })
    }

    /// Poll until the child exits, the deadline passes or `interrupted` is set
    fn wait_until(
        &mut self,
        deadline: Option<Instant>,
        interrupted: &AtomicBool,
    ) -> std::io::Result<Wait> {
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.reaped = true;
                return Ok(Wait::Exited(status));
            }
            if interrupted.load(Ordering::SeqCst) {
                return Ok(Wait::Interrupted);
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Ok(Wait::TimedOut);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

#[cfg(unix)]
fn exit_code(status: &ExitStatus, spec: &CommandSpec) -> Result<i32> {
    use std::os::unix::process::ExitStatusExt;

    if let Some(code) = status.code() {
        return Ok(code);
    }
    match status.signal() {
        Some(SIGINT) => Err(process::interrupted(spec.program_name())),
        Some(signal) => Ok(128 + signal),
        None => Ok(1),
    }
}

#[cfg(not(unix))]
fn exit_code(status: &ExitStatus, _spec: &CommandSpec) -> Result<i32> {
    Ok(status.code().unwrap_or(1))
}
