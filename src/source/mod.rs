//! Probe output sources.
//!
//! This module provides a trait-based abstraction over where probe output
//! bytes come from: a supervised child process in normal operation, or an
//! in-memory channel when the engine is embedded or tested.

mod channel;
mod process;

pub use channel::ChannelSource;
pub use process::{ProbeCommand, ProbeHandle, ProcessSupervisor};

use std::fmt::Debug;
use std::io;
use std::process::ExitStatus;

/// Trait for reading probe output without blocking.
///
/// # Example
///
/// ```
/// use pingwatch::{ChannelSource, ProbeSource};
///
/// let (tx, mut source) = ChannelSource::create("example");
/// tx.send(b"time=1.0\n".to_vec()).unwrap();
///
/// let mut buf = [0u8; 64];
/// let n = source.read_available(&mut buf).unwrap();
/// assert_eq!(&buf[..n], b"time=1.0\n");
/// ```
pub trait ProbeSource: Debug {
    /// Read whatever bytes are available right now.
    ///
    /// Returns `Ok(0)` once the stream has closed for good, and an error of
    /// kind [`io::ErrorKind::WouldBlock`] when nothing is available yet.
    /// Implementations must never block.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// Exit status of the underlying process, once it has exited.
    fn exit_status(&mut self) -> Option<ExitStatus> {
        None
    }
}
