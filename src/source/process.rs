//! Supervised probe subprocess.
//!
//! Spawns the probe (`ping <target>` by default) with an argument vector,
//! never through a shell, and exposes its stdout as a non-blocking stream.

use std::io::{self, Read};
use std::os::fd::AsRawFd;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use super::ProbeSource;
use crate::error::ProbeError;

/// How long `stop` waits for the probe to exit after SIGTERM.
const STOP_GRACE: Duration = Duration::from_millis(500);
const STOP_POLL: Duration = Duration::from_millis(10);

/// Program and leading arguments used to launch the probe.
///
/// The target is always appended as the final argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ProbeCommand {
    fn default() -> Self {
        Self {
            program: "ping".to_string(),
            args: Vec::new(),
        }
    }
}

impl ProbeCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command(&self, target: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        command
    }

    /// Human-readable command line, for display only.
    pub fn display(&self, target: &str) -> String {
        let mut parts = vec![self.program.as_str()];
        parts.extend(self.args.iter().map(String::as_str));
        parts.push(target);
        parts.join(" ")
    }
}

/// A running probe process and the read end of its stdout pipe.
///
/// Terminating is idempotent; dropping the handle terminates and reaps the
/// child if that has not happened yet.
#[derive(Debug)]
pub struct ProbeHandle {
    child: Child,
    stdout: ChildStdout,
    exit: Option<ExitStatus>,
}

impl ProbeHandle {
    /// Spawn `command` against `target` with a non-blocking stdout.
    pub fn spawn(command: &ProbeCommand, target: &str) -> Result<Self, ProbeError> {
        let mut child =
            command.command(target).spawn().map_err(|source| ProbeError::SpawnFailed {
                program: command.program.clone(),
                source,
            })?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ProbeError::NoOutput(command.program.clone()));
        };

        let mut handle = Self {
            child,
            stdout,
            exit: None,
        };

        if let Err(e) = set_nonblocking(&handle.stdout) {
            handle.terminate();
            return Err(e.into());
        }

        info!(pid = handle.pid(), command = %command.display(target), "probe started");
        Ok(handle)
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Check whether the child has exited, reaping it if so.
    pub fn try_exit(&mut self) -> Option<ExitStatus> {
        if self.exit.is_none() {
            match self.child.try_wait() {
                Ok(status) => self.exit = status,
                Err(e) => debug!(error = %e, "failed to poll probe status"),
            }
        }
        self.exit
    }

    /// Send SIGTERM, wait briefly, escalate to SIGKILL, and reap.
    ///
    /// Calling this on an already reaped child returns the recorded status.
    pub fn terminate(&mut self) -> Option<ExitStatus> {
        if let Some(status) = self.try_exit() {
            return Some(status);
        }

        let pid = Pid::from_raw(self.child.id() as i32);
        if let Err(e) = kill(pid, Signal::SIGTERM) {
            debug!(error = %e, "SIGTERM to probe failed");
        }

        let deadline = Instant::now() + STOP_GRACE;
        while Instant::now() < deadline {
            if let Some(status) = self.try_exit() {
                debug!(%status, "probe terminated");
                return Some(status);
            }
            thread::sleep(STOP_POLL);
        }

        warn!(pid = pid.as_raw(), "probe ignored SIGTERM, killing");
        let _ = self.child.kill();
        match self.child.wait() {
            Ok(status) => {
                self.exit = Some(status);
                Some(status)
            }
            Err(e) => {
                warn!(error = %e, "failed to reap probe");
                None
            }
        }
    }
}

impl Read for ProbeHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stdout.read(buf)
    }
}

impl Drop for ProbeHandle {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn set_nonblocking(stdout: &ChildStdout) -> nix::Result<()> {
    let fd = stdout.as_raw_fd();
    let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
    fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
    Ok(())
}

/// Owns the probe process for the lifetime of a monitoring session.
///
/// `stop` may be called any number of times, including before `start` ever
/// succeeded; only the first call after a successful start does any work.
#[derive(Debug)]
pub struct ProcessSupervisor {
    command: ProbeCommand,
    handle: Option<ProbeHandle>,
    description: String,
    last_exit: Option<ExitStatus>,
}

impl ProcessSupervisor {
    pub fn new(command: ProbeCommand) -> Self {
        let description = command.program.clone();
        Self {
            command,
            handle: None,
            description,
            last_exit: None,
        }
    }

    /// Launch the probe against `target`.
    ///
    /// A failure here is fatal to the session and is returned as is; the
    /// supervisor does not retry.
    pub fn start(&mut self, target: &str) -> Result<(), ProbeError> {
        if self.is_running() {
            return Err(ProbeError::AlreadyRunning);
        }
        // Reap a previous, already exited probe before replacing it
        self.stop();

        let handle = ProbeHandle::spawn(&self.command, target)?;
        self.description = self.command.display(target);
        self.handle = Some(handle);
        self.last_exit = None;
        Ok(())
    }

    /// Terminate and reap the probe. Safe to call repeatedly.
    pub fn stop(&mut self) -> Option<ExitStatus> {
        let mut handle = self.handle.take()?;
        let status = handle.terminate();
        info!(status = ?status, "probe stopped");
        self.last_exit = status;
        status
    }

    /// Whether a probe was started and has not exited yet.
    pub fn is_running(&mut self) -> bool {
        match self.handle.as_mut() {
            Some(handle) => handle.try_exit().is_none(),
            None => false,
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.handle.as_ref().map(ProbeHandle::pid)
    }
}

impl ProbeSource for ProcessSupervisor {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.handle.as_mut() {
            Some(handle) => handle.read(buf),
            None => Ok(0),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn exit_status(&mut self) -> Option<ExitStatus> {
        match self.handle.as_mut() {
            Some(handle) => handle.try_exit(),
            None => self.last_exit,
        }
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process_gone(pid: u32) -> bool {
        // Signal 0 only checks existence; a reaped child no longer exists
        kill(Pid::from_raw(pid as i32), None::<Signal>).is_err()
    }

    /// Read until the stream closes or `limit` passes.
    fn read_all(source: &mut impl ProbeSource, limit: Duration) -> Vec<u8> {
        let deadline = Instant::now() + limit;
        let mut out = Vec::new();
        let mut buf = [0u8; 256];
        while Instant::now() < deadline {
            match source.read_available(&mut buf) {
                Ok(0) => break,
                Ok(n) => out.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5))
                }
                Err(e) => panic!("unexpected read error: {}", e),
            }
        }
        out
    }

    #[test]
    fn test_command_display() {
        let command = ProbeCommand::new("ping", vec!["-n".to_string()]);
        assert_eq!(command.display("1.1.1.1"), "ping -n 1.1.1.1");
        assert_eq!(ProbeCommand::default().display("8.8.8.8"), "ping 8.8.8.8");
    }

    #[test]
    fn test_reads_probe_output() {
        let command = ProbeCommand::new("echo", vec!["time=12.3 ms".to_string()]);
        let mut supervisor = ProcessSupervisor::new(command);
        supervisor.start("8.8.8.8").unwrap();

        let output = read_all(&mut supervisor, Duration::from_secs(5));
        assert_eq!(String::from_utf8_lossy(&output), "time=12.3 ms 8.8.8.8\n");
        assert!(supervisor.stop().is_some());
    }

    #[test]
    fn test_target_is_a_single_argument() {
        // Shell metacharacters reach the program verbatim
        let mut supervisor = ProcessSupervisor::new(ProbeCommand::new("echo", Vec::new()));
        supervisor.start("1.1.1.1; echo injected").unwrap();

        let output = read_all(&mut supervisor, Duration::from_secs(5));
        assert_eq!(String::from_utf8_lossy(&output), "1.1.1.1; echo injected\n");
    }

    #[test]
    fn test_silent_probe_would_block() {
        let mut supervisor = ProcessSupervisor::new(ProbeCommand::new("sleep", Vec::new()));
        supervisor.start("30").unwrap();

        let mut buf = [0u8; 64];
        let err = supervisor.read_available(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
        assert!(supervisor.is_running());
    }

    #[test]
    fn test_stop_reaps_and_is_idempotent() {
        let mut supervisor = ProcessSupervisor::new(ProbeCommand::new("sleep", Vec::new()));
        supervisor.start("30").unwrap();
        let pid = supervisor.pid().unwrap();

        let status = supervisor.stop();
        assert!(status.is_some());
        assert!(process_gone(pid));
        assert!(!supervisor.is_running());

        // Second stop is a no-op
        assert!(supervisor.stop().is_none());
        assert_eq!(supervisor.exit_status(), status);
    }

    #[test]
    fn test_stop_without_start() {
        let mut supervisor = ProcessSupervisor::new(ProbeCommand::default());
        assert!(supervisor.stop().is_none());
        assert!(supervisor.stop().is_none());

        let mut buf = [0u8; 8];
        assert_eq!(supervisor.read_available(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_spawn_failure() {
        let command = ProbeCommand::new("/nonexistent/pingwatch-probe", Vec::new());
        let mut supervisor = ProcessSupervisor::new(command);

        let err = supervisor.start("8.8.8.8").unwrap_err();
        assert!(matches!(err, ProbeError::SpawnFailed { .. }));
        assert!(!supervisor.is_running());
        assert!(supervisor.stop().is_none());
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut supervisor = ProcessSupervisor::new(ProbeCommand::new("sleep", Vec::new()));
        supervisor.start("30").unwrap();
        assert!(matches!(supervisor.start("30"), Err(ProbeError::AlreadyRunning)));
    }

    #[test]
    fn test_drop_reaps_child() {
        let pid = {
            let mut supervisor =
                ProcessSupervisor::new(ProbeCommand::new("sleep", Vec::new()));
            supervisor.start("30").unwrap();
            supervisor.pid().unwrap()
        };
        assert!(process_gone(pid));
    }

    #[test]
    fn test_exit_status_after_probe_exits() {
        let mut supervisor = ProcessSupervisor::new(ProbeCommand::new("false", Vec::new()));
        supervisor.start("ignored").unwrap();

        let _ = read_all(&mut supervisor, Duration::from_secs(5));
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut status = None;
        while status.is_none() && Instant::now() < deadline {
            status = supervisor.exit_status();
            thread::sleep(Duration::from_millis(5));
        }
        assert!(status.is_some_and(|s| !s.success()));
    }
}
