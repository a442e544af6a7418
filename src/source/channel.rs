//! Channel-based probe source.
//!
//! Receives probe output bytes through a tokio channel. This is useful when
//! the probe output is produced elsewhere (another process manager, a
//! recorded capture, a test) and pushed rather than read from a pipe.

use std::io;

use tokio::sync::mpsc;

use super::ProbeSource;

/// A probe source that receives output chunks via a channel.
///
/// The stream counts as closed once every sender has been dropped and all
/// queued bytes have been read.
///
/// # Example
///
/// ```
/// use pingwatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("replay");
/// tx.send(b"64 bytes from 1.1.1.1: time=9.1 ms\n".to_vec()).unwrap();
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::UnboundedReceiver<Vec<u8>>,
    description: String,
    /// Bytes of the current chunk not yet handed out.
    pending: Vec<u8>,
    offset: usize,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of an unbounded channel
    /// * `source_description` - Where the bytes come from
    pub fn new(receiver: mpsc::UnboundedReceiver<Vec<u8>>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            pending: Vec::new(),
            offset: 0,
        }
    }

    /// Create a channel pair for pushing bytes into a ChannelSource.
    pub fn create(source_description: &str) -> (mpsc::UnboundedSender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx, source_description))
    }
}

impl ProbeSource for ChannelSource {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.offset >= self.pending.len() {
            match self.receiver.try_recv() {
                Ok(chunk) => {
                    self.pending = chunk;
                    self.offset = 0;
                }
                Err(mpsc::error::TryRecvError::Empty) => {
                    return Err(io::ErrorKind::WouldBlock.into());
                }
                Err(mpsc::error::TryRecvError::Disconnected) => return Ok(0),
            }
        }

        let available = &self.pending[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_channel_would_block() {
        let (_tx, mut source) = ChannelSource::create("test");
        let mut buf = [0u8; 16];
        let err = source.read_available(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }

    #[test]
    fn test_chunks_larger_than_buffer() {
        let (tx, mut source) = ChannelSource::create("test");
        tx.send(b"0123456789".to_vec()).unwrap();

        let mut buf = [0u8; 4];
        let mut out = Vec::new();
        loop {
            match source.read_available(&mut buf) {
                Ok(n) => out.extend_from_slice(&buf[..n]),
                Err(e) => {
                    assert_eq!(e.kind(), io::ErrorKind::WouldBlock);
                    break;
                }
            }
        }
        assert_eq!(out, b"0123456789");
    }

    #[test]
    fn test_closed_after_sender_dropped() {
        let (tx, mut source) = ChannelSource::create("test");
        tx.send(b"abc".to_vec()).unwrap();
        drop(tx);

        let mut buf = [0u8; 16];
        assert_eq!(source.read_available(&mut buf).unwrap(), 3);
        assert_eq!(source.read_available(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_description() {
        let (_tx, source) = ChannelSource::create("replay.log");
        assert_eq!(source.description(), "channel: replay.log");
    }
}
