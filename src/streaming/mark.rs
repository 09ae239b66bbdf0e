//! Outcome of a ring buffer pattern search

/// Result of [`BufferRing::mark`](super::BufferRing::mark).
///
/// `NotFound` and `StreamEnd` drive different caller logic (retry versus
/// abort or finish), so they are never folded into a boolean.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkResult {
    /// Pattern located; the match span is recorded in the ring
    Found,
    /// Pattern absent from the buffered data, more may arrive.
    /// Dump what is safe, load, and mark again.
    NotFound,
    /// Source exhausted before the pattern was found
    StreamEnd,
}

impl MarkResult {
    pub fn is_found(self) -> bool {
        matches!(self, MarkResult::Found)
    }

    /// Check if the caller should load more data and retry
    pub fn should_continue(self) -> bool {
        matches!(self, MarkResult::NotFound)
    }
}
