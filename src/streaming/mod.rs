//! Streaming module for bounded-memory body parsing
//!
//! This module provides streaming primitives that:
//! - Use fixed memory allocation (ring of chunks)
//! - Find delimiters split across chunk boundaries
//! - Perform pattern matching with FSM (no regex)

pub mod mark;
pub mod pattern_fsm;
pub mod ring_buffer;

pub use mark::MarkResult;
pub use pattern_fsm::{Pattern, PatternState};
pub use ring_buffer::{min_slots, BufferRing, DEFAULT_SLOTS};
