//! Incremental extraction of latency samples from probe output.
//!
//! Probe output arrives in arbitrary chunks. [`SampleExtractor`] reassembles
//! lines across chunk boundaries and reports one [`ExtractResult`] per
//! complete line: a sample when the line carries a `time=<number>` or
//! `time<<number>` field, `NoMatch` otherwise.

/// Upper bound on a single assembled line, in bytes.
pub const MAX_LINE_LEN: usize = 512;

/// Outcome of examining one complete probe output line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtractResult {
    /// A round-trip time in milliseconds.
    Sample(f64),
    /// The line carried no usable latency field.
    NoMatch,
}

/// Line assembler and latency matcher for a probe output stream.
#[derive(Debug)]
pub struct SampleExtractor {
    line: Vec<u8>,
    max_line: usize,
    /// Set after an overflow until the next terminator, so the tail of the
    /// oversized line is not reported as a line of its own.
    discarding: bool,
}

impl Default for SampleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleExtractor {
    pub fn new() -> Self {
        Self::with_max_line(MAX_LINE_LEN)
    }

    /// Create an extractor with a custom line size limit.
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            line: Vec::with_capacity(max_line.min(MAX_LINE_LEN)),
            max_line: max_line.max(1),
            discarding: false,
        }
    }

    /// Feed a chunk of bytes, returning one result per line it completes.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ExtractResult> {
        let mut results = Vec::new();

        for &byte in bytes {
            if byte == b'\n' {
                if self.discarding {
                    self.discarding = false;
                } else {
                    results.push(parse_line(&self.line));
                }
                self.line.clear();
            } else if self.discarding {
                continue;
            } else if self.line.len() < self.max_line {
                self.line.push(byte);
            } else {
                tracing::debug!(limit = self.max_line, "probe line too long, discarding");
                self.line.clear();
                self.discarding = true;
            }
        }

        results
    }

    /// Number of bytes held for the current incomplete line.
    pub fn pending(&self) -> usize {
        self.line.len()
    }

    /// Drop any partially assembled line.
    pub fn clear(&mut self) {
        self.line.clear();
        self.discarding = false;
    }
}

/// Match one complete line against the latency pattern.
///
/// The first `time=` or `time<` followed by a run of digits and dots wins.
/// A run that does not parse as a finite number (`1.2.3`, `.`, or a digit
/// run too long for an `f64`) is a `NoMatch`.
pub fn parse_line(line: &[u8]) -> ExtractResult {
    const KEY: &[u8] = b"time";

    let mut from = 0;
    while let Some(pos) = find(&line[from..], KEY) {
        let start = from + pos + KEY.len();
        from = from + pos + 1;

        match line.get(start) {
            Some(b'=') | Some(b'<') => {}
            _ => continue,
        }

        let digits = &line[start + 1..];
        let len = digits.iter().take_while(|b| b.is_ascii_digit() || **b == b'.').count();
        if len == 0 {
            continue;
        }

        return std::str::from_utf8(&digits[..len])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .map_or(ExtractResult::NoMatch, ExtractResult::Sample);
    }

    ExtractResult::NoMatch
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = "64 bytes from 8.8.8.8: icmp_seq=1 ttl=117 time=12.3 ms\n";

    #[test]
    fn test_single_reply_line() {
        let mut extractor = SampleExtractor::new();
        assert_eq!(extractor.feed(REPLY.as_bytes()), vec![ExtractResult::Sample(12.3)]);
        assert_eq!(extractor.pending(), 0);
    }

    #[test]
    fn test_less_than_form() {
        let line = b"Reply from 127.0.0.1: bytes=32 time<1ms TTL=128\n";
        assert_eq!(SampleExtractor::new().feed(line), vec![ExtractResult::Sample(1.0)]);
    }

    #[test]
    fn test_integer_value() {
        assert_eq!(parse_line(b"time=7 ms"), ExtractResult::Sample(7.0));
    }

    #[test]
    fn test_unrelated_lines_do_not_match() {
        let mut extractor = SampleExtractor::new();
        let input = b"PING 8.8.8.8 (8.8.8.8): 56 data bytes\n\
                      --- 8.8.8.8 ping statistics ---\n\
                      Request timeout for icmp_seq 3\n";
        assert_eq!(extractor.feed(input), vec![ExtractResult::NoMatch; 3]);
    }

    #[test]
    fn test_malformed_number_is_no_match() {
        assert_eq!(parse_line(b"time=1.2.3 ms"), ExtractResult::NoMatch);
        assert_eq!(parse_line(b"time=. ms"), ExtractResult::NoMatch);
    }

    #[test]
    fn test_overflowing_digit_run_is_no_match() {
        let line = format!("time={} ms", "9".repeat(400));
        assert_eq!(parse_line(line.as_bytes()), ExtractResult::NoMatch);
    }

    #[test]
    fn test_skips_time_without_value() {
        // "time" appears in the summary prefix before the real field
        let line = b"round-trip time: n/a, time=4.5 ms";
        assert_eq!(parse_line(line), ExtractResult::Sample(4.5));
        assert_eq!(parse_line(b"time= 4.5"), ExtractResult::NoMatch);
    }

    #[test]
    fn test_split_across_feeds() {
        let mut whole = SampleExtractor::new();
        let expected = whole.feed(REPLY.as_bytes());

        for split in 1..REPLY.len() {
            let (a, b) = REPLY.as_bytes().split_at(split);
            let mut extractor = SampleExtractor::new();
            let mut results = extractor.feed(a);
            results.extend(extractor.feed(b));
            assert_eq!(results, expected, "split at {}", split);
        }
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut extractor = SampleExtractor::new();
        let mut results = Vec::new();
        for byte in b"tim".iter().chain(b"e=5.0\n".iter()) {
            results.extend(extractor.feed(std::slice::from_ref(byte)));
        }
        assert_eq!(results, vec![ExtractResult::Sample(5.0)]);
    }

    #[test]
    fn test_multiple_lines_in_one_chunk() {
        let mut extractor = SampleExtractor::new();
        let results = extractor.feed(b"time=1.0\nnoise\ntime=2.5\ntime=3");
        assert_eq!(
            results,
            vec![
                ExtractResult::Sample(1.0),
                ExtractResult::NoMatch,
                ExtractResult::Sample(2.5)
            ]
        );
        assert_eq!(extractor.pending(), 6);
        assert_eq!(extractor.feed(b"\n"), vec![ExtractResult::Sample(3.0)]);
    }

    #[test]
    fn test_oversized_line_is_discarded() {
        let mut extractor = SampleExtractor::with_max_line(16);
        let mut input = vec![b'x'; 100];
        input.extend_from_slice(b"time=9.9\n");

        // The whole oversized line is dropped, including its tail
        assert!(extractor.feed(&input).is_empty());
        assert_eq!(extractor.pending(), 0);

        // Normal lines afterwards still work
        assert_eq!(extractor.feed(b"time=2.0\n"), vec![ExtractResult::Sample(2.0)]);
    }

    #[test]
    fn test_overflow_never_grows_buffer() {
        let mut extractor = SampleExtractor::new();
        for _ in 0..100 {
            extractor.feed(&[b'a'; 1000]);
            assert!(extractor.pending() <= MAX_LINE_LEN);
        }
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let mut extractor = SampleExtractor::new();
        let results = extractor.feed(b"\xff\xfe time=3.5 \xff\n");
        assert_eq!(results, vec![ExtractResult::Sample(3.5)]);
    }
}
