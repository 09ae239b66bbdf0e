//! Finite State Machine Pattern Matching
//!
//! Byte-exact matching for multipart delimiters. The FSM is fed one byte at
//! a time, so a delimiter split across two reads is matched exactly like one
//! that sits inside a single chunk:
//! - O(1) amortized per byte
//! - Constant memory per pattern
//! - State survives between chunks

/// A pattern to match against
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    /// Pattern bytes
    bytes: Vec<u8>,
    /// `fallback[i]` = length of the longest proper prefix of `bytes[..=i]`
    /// that is also a suffix of it
    fallback: Vec<usize>,
}

impl Pattern {
    /// Create a new pattern from raw bytes
    pub fn new(bytes: &[u8]) -> Self {
        let mut fallback = vec![0usize; bytes.len()];
        let mut k = 0;
        for i in 1..bytes.len() {
            while k > 0 && bytes[i] != bytes[k] {
                k = fallback[k - 1];
            }
            if bytes[i] == bytes[k] {
                k += 1;
            }
            fallback[i] = k;
        }

        Self {
            bytes: bytes.to_vec(),
            fallback,
        }
    }

    /// Pattern bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// State of a single pattern match attempt
#[derive(Clone, Debug, Default)]
pub struct PatternState {
    /// Number of pattern bytes matched so far (0 = not matching)
    position: usize,
}

impl PatternState {
    /// Create a new pattern state
    pub fn new() -> Self {
        Self { position: 0 }
    }

    /// Advance FSM by one byte
    ///
    /// On a mismatch the state falls back to the longest matched prefix that
    /// can still start a match, so overlapping candidates are not skipped.
    pub fn advance(&mut self, byte: u8, pattern: &Pattern) {
        if self.position >= pattern.bytes.len() {
            // Already complete; treat the next byte as the start of a new scan
            self.position = pattern.fallback.last().copied().unwrap_or(0);
        }

        while self.position > 0 && pattern.bytes[self.position] != byte {
            self.position = pattern.fallback[self.position - 1];
        }

        if pattern.bytes.get(self.position) == Some(&byte) {
            self.position += 1;
        }
    }

    /// Check if the pattern has been fully matched
    pub fn is_match(&self, pattern: &Pattern) -> bool {
        !pattern.bytes.is_empty() && self.position >= pattern.bytes.len()
    }

    /// Number of trailing bytes seen so far that form a pattern prefix
    pub fn position(&self) -> usize {
        self.position
    }

    /// Reset the state
    pub fn reset(&mut self) {
        self.position = 0;
    }
}
