//! Chunk Ring for Streaming Boundary Search
//!
//! CRITICAL: Memory usage is FLAT regardless of request size.
//! This ring:
//! - Pre-allocates a fixed number of fixed-size chunks
//! - Reads the source stream once, a chunk at a time
//! - Searches for a delimiter across chunk boundaries
//! - Hands out bytes only by copying them into a caller's sink
//!
//! Positions are absolute stream offsets. Three cursors move forward only:
//! `cursor` (first byte not yet dumped or skipped), `limit` (end of the
//! region the last mark made safe to hand out) and the scan position of a
//! pending search. A chunk is reused as soon as `cursor` passes its end.

use std::io::{self, Read, Write};
use std::sync::Arc;

use super::mark::MarkResult;
use super::pattern_fsm::{Pattern, PatternState};
use crate::progress::UploadInfo;

/// Recommended number of ring slots
pub const DEFAULT_SLOTS: usize = 3;

/// Smallest slot count that can hold a `window - 1` byte partial match and
/// still have a free slot to load into.
pub fn min_slots(chunk_size: usize, window: usize) -> usize {
    window.saturating_sub(1).div_ceil(chunk_size.max(1)) + 2
}

/// One fixed-capacity slot of the ring
struct Chunk {
    data: Box<[u8]>,
    /// Absolute stream offset of `data[0]`
    start: u64,
    /// Filled bytes
    len: usize,
}

impl Chunk {
    fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            start: 0,
            len: 0,
        }
    }

    fn end(&self) -> u64 {
        self.start + self.len as u64
    }

    fn is_full(&self) -> bool {
        self.len == self.data.len()
    }
}

/// A search kept alive across `NotFound` retries
struct Scan {
    pattern: Pattern,
    state: PatternState,
    /// Absolute offset of the next byte to feed the FSM
    scanned: u64,
}

/// Location of the most recent match
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Span {
    start: u64,
    end: u64,
}

enum Fill {
    Loaded,
    Full,
    Eof,
}

/// Bounded ring of chunks over a non-seekable byte source
pub struct BufferRing<R> {
    reader: R,
    chunks: Vec<Chunk>,
    /// Slot holding the oldest retained bytes
    head: usize,
    /// Number of slots holding retained bytes, starting at `head`
    queued: usize,
    cursor: u64,
    limit: u64,
    found: Option<Span>,
    scan: Option<Scan>,
    bytes_read: u64,
    eof: bool,
    /// Longest pattern `mark` accepts
    window: usize,
    progress: Option<Arc<UploadInfo>>,
}

impl<R: Read> BufferRing<R> {
    /// Create a ring of at least `slots` chunks of `chunk_size` bytes that can
    /// recognize patterns up to `window` bytes long.
    ///
    /// The slot count is raised to [`min_slots`] when the chunks are too
    /// small for the window.
    pub fn new(reader: R, slots: usize, chunk_size: usize, window: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let window = window.max(1);
        let slots = slots.max(min_slots(chunk_size, window));

        Self {
            reader,
            chunks: (0..slots).map(|_| Chunk::new(chunk_size)).collect(),
            head: 0,
            queued: 0,
            cursor: 0,
            limit: 0,
            found: None,
            scan: None,
            bytes_read: 0,
            eof: false,
            window,
            progress: None,
        }
    }

    /// Report every load to `info`
    pub fn with_progress(mut self, info: Arc<UploadInfo>) -> Self {
        self.progress = Some(info);
        self
    }

    /// Make sure there is unscanned data, reading one chunk if there is none.
    ///
    /// Returns the cumulative number of bytes read from the source.
    pub fn load(&mut self) -> io::Result<u64> {
        let scan_pos = self.scan.as_ref().map_or(self.cursor, |s| s.scanned);
        if scan_pos >= self.bytes_read {
            self.fill()?;
        }
        Ok(self.bytes_read)
    }

    /// Search forward for `pattern`, loading chunks while a slot is free.
    ///
    /// - `Found`: the match is recorded; [`dump`](Self::dump) yields the bytes
    ///   before it and [`skip_mark`](Self::skip_mark) discards it.
    /// - `NotFound`: the ring is full. Bytes that cannot belong to a match are
    ///   released to `dump`; the possible match prefix is kept. Load and mark
    ///   again with the same pattern to resume.
    /// - `StreamEnd`: the source is exhausted; `dump` yields everything left.
    pub fn mark(&mut self, pattern: &[u8]) -> io::Result<MarkResult> {
        if pattern.is_empty() || pattern.len() > self.window {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "pattern of {} bytes does not fit a ring window of {} bytes",
                    pattern.len(),
                    self.window
                ),
            ));
        }

        let mut scan = match self.scan.take() {
            Some(scan) if scan.pattern.as_bytes() == pattern => scan,
            _ => Scan {
                pattern: Pattern::new(pattern),
                state: PatternState::new(),
                scanned: self.cursor,
            },
        };
        self.found = None;

        loop {
            if let Some(end) = self.feed(&mut scan) {
                let start = end - scan.pattern.len() as u64;
                self.found = Some(Span { start, end });
                self.limit = start;
                return Ok(MarkResult::Found);
            }

            match self.fill()? {
                Fill::Loaded => continue,
                Fill::Eof => {
                    self.limit = self.bytes_read;
                    return Ok(MarkResult::StreamEnd);
                }
                Fill::Full => {
                    self.limit = scan.scanned - scan.state.position() as u64;
                    self.scan = Some(scan);
                    return Ok(MarkResult::NotFound);
                }
            }
        }
    }

    /// Discard the bytes up to the end of the last mark: past the match
    /// when one was found, otherwise up to the safe limit.
    pub fn skip_mark(&mut self) {
        let end = match self.found.take() {
            Some(span) => span.end,
            None => self.limit,
        };
        self.cursor = self.cursor.max(end);
        self.limit = self.cursor;
    }

    /// Copy the bytes between the cursor and the last mark into `out`.
    ///
    /// Returns the number of bytes written.
    pub fn dump<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<u64> {
        let mut written = 0u64;
        while self.cursor < self.limit {
            let Some((idx, offset)) = self.locate(self.cursor) else {
                break;
            };
            let chunk = &self.chunks[idx];
            let len = (chunk.end().min(self.limit) - self.cursor) as usize;

            out.write_all(&chunk.data[offset..offset + len])?;
            self.cursor += len as u64;
            written += len as u64;
        }
        Ok(written)
    }

    /// Same as [`dump`](Self::dump), decoded as UTF-8 (lossy)
    pub fn dump_as_string(&mut self) -> io::Result<String> {
        let mut bytes = Vec::new();
        self.dump(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Get total bytes consumed from the source
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Check whether the source reported end of stream
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Number of slots in the ring
    pub fn slots(&self) -> usize {
        self.chunks.len()
    }

    /// Get ring capacity in bytes (fixed, no growth)
    pub fn capacity(&self) -> usize {
        self.chunks.iter().map(|c| c.data.len()).sum()
    }

    /// Feed retained bytes to the FSM; returns the match end offset
    fn feed(&self, scan: &mut Scan) -> Option<u64> {
        while scan.scanned < self.bytes_read {
            let (idx, offset) = self.locate(scan.scanned)?;
            let chunk = &self.chunks[idx];
            let bytes = &chunk.data[offset..chunk.len];

            for (i, &byte) in bytes.iter().enumerate() {
                scan.state.advance(byte, &scan.pattern);
                if scan.state.is_match(&scan.pattern) {
                    scan.scanned += i as u64 + 1;
                    return Some(scan.scanned);
                }
            }
            scan.scanned += bytes.len() as u64;
        }
        None
    }

    /// Map an absolute offset to (slot, offset in slot)
    fn locate(&self, pos: u64) -> Option<(usize, usize)> {
        let n = self.chunks.len();
        (0..self.queued)
            .map(|q| (self.head + q) % n)
            .find(|&idx| {
                let chunk = &self.chunks[idx];
                chunk.start <= pos && pos < chunk.end()
            })
            .map(|idx| (idx, (pos - self.chunks[idx].start) as usize))
    }

    /// Release slots the cursor has moved past
    fn reclaim(&mut self) {
        while self.queued > 0 && self.chunks[self.head].end() <= self.cursor {
            self.head = (self.head + 1) % self.chunks.len();
            self.queued -= 1;
        }
    }

    /// Read once from the source. A partially filled tail slot is topped up
    /// before a new slot is taken, so only the newest slot is ever partial.
    fn fill(&mut self) -> io::Result<Fill> {
        if self.eof {
            return Ok(Fill::Eof);
        }
        self.reclaim();

        let n = self.chunks.len();
        let tail = (self.head + self.queued + n - 1) % n;
        let (idx, fresh) = if self.queued > 0 && !self.chunks[tail].is_full() {
            (tail, false)
        } else if self.queued < n {
            ((self.head + self.queued) % n, true)
        } else {
            return Ok(Fill::Full);
        };

        let offset = if fresh { 0 } else { self.chunks[idx].len };
        let read = loop {
            match self.reader.read(&mut self.chunks[idx].data[offset..]) {
                Ok(read) => break read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };

        if read == 0 {
            self.eof = true;
            return Ok(Fill::Eof);
        }

        let chunk = &mut self.chunks[idx];
        if fresh {
            chunk.start = self.bytes_read;
            chunk.len = 0;
            self.queued += 1;
        }
        chunk.len += read;
        self.bytes_read += read as u64;

        if let Some(info) = &self.progress {
            info.record(self.bytes_read);
        }
        Ok(Fill::Loaded)
    }
}
