//! Fixed-size latency history for the history strip.

/// Number of samples kept in the history strip.
pub const HISTORY_LEN: usize = 40;

/// Circular buffer of the most recent positive latency samples.
///
/// The buffer always holds exactly [`HISTORY_LEN`] slots. A slot containing
/// `0.0` has never been written; only strictly positive values are recorded,
/// so a zero can never be mistaken for a real reading. The write cursor
/// points at the oldest slot, which is the next one to be overwritten.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    slots: [f64; HISTORY_LEN],
    cursor: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBuffer {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            slots: [0.0; HISTORY_LEN],
            cursor: 0,
        }
    }

    /// Record a sample. Returns `false` (and leaves the buffer untouched)
    /// for values that are not strictly positive.
    pub fn record(&mut self, value: f64) -> bool {
        if value.is_nan() || value <= 0.0 {
            return false;
        }
        self.slots[self.cursor] = value;
        self.cursor = (self.cursor + 1) % HISTORY_LEN;
        true
    }

    /// Clear all slots and rewind the cursor.
    pub fn clear(&mut self) {
        self.slots = [0.0; HISTORY_LEN];
        self.cursor = 0;
    }

    /// Iterate over all slots from oldest to newest, empty slots included.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..HISTORY_LEN).map(move |i| self.slots[(self.cursor + i) % HISTORY_LEN])
    }

    /// The most recently recorded value, if any.
    pub fn latest(&self) -> Option<f64> {
        let idx = (self.cursor + HISTORY_LEN - 1) % HISTORY_LEN;
        let value = self.slots[idx];
        (value > 0.0).then_some(value)
    }

    /// Number of slots that hold a recorded sample.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|v| **v > 0.0).count()
    }

    /// Copy the slots out in chronological order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let history = HistoryBuffer::new();
        assert_eq!(history.to_vec().len(), HISTORY_LEN);
        assert!(history.iter().all(|v| v == 0.0));
        assert_eq!(history.latest(), None);
        assert_eq!(history.filled(), 0);
    }

    #[test]
    fn test_records_in_order() {
        let mut history = HistoryBuffer::new();
        history.record(1.0);
        history.record(2.0);
        history.record(3.0);

        let values = history.to_vec();
        // Unwritten slots come first (oldest), newest is at the end
        assert_eq!(&values[HISTORY_LEN - 3..], &[1.0, 2.0, 3.0]);
        assert_eq!(history.latest(), Some(3.0));
        assert_eq!(history.filled(), 3);
    }

    #[test]
    fn test_overwrites_oldest_first() {
        let mut history = HistoryBuffer::new();
        for i in 1..=(HISTORY_LEN + 5) {
            history.record(i as f64);
        }

        let values = history.to_vec();
        let expected: Vec<f64> = (6..=(HISTORY_LEN + 5)).map(|i| i as f64).collect();
        assert_eq!(values, expected);
        assert_eq!(history.latest(), Some((HISTORY_LEN + 5) as f64));
    }

    #[test]
    fn test_non_positive_values_are_ignored() {
        let mut history = HistoryBuffer::new();
        history.record(5.0);
        assert!(!history.record(0.0));
        assert!(!history.record(-1.0));
        assert!(!history.record(f64::NAN));

        assert_eq!(history.filled(), 1);
        assert_eq!(history.latest(), Some(5.0));
    }

    #[test]
    fn test_clear() {
        let mut history = HistoryBuffer::new();
        for i in 1..=10 {
            history.record(i as f64);
        }
        history.clear();
        assert_eq!(history, HistoryBuffer::new());
    }
}
