//! Telemetry Module for uploads
//!
//! The parser reports checkpoints (chunk loaded, boundary found, part
//! complete, parse complete or failed) to an [`UploadObserver`]. The default
//! observer emits each event as one structured JSON log line.

use log::{debug, trace, warn};
use serde::Serialize;

/// Upload checkpoint types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadEventType {
    /// A chunk was read from the body
    ChunkLoaded,
    /// The opening boundary was found
    BoundaryFound,
    /// A field was fully consumed
    PartComplete,
    /// The terminal marker was reached
    ParseComplete,
    /// Parsing stopped with an error
    ParseFailed,
}

/// Upload event for logging
#[derive(Debug, Clone, Serialize)]
pub struct UploadEvent {
    /// Event type
    pub event_type: UploadEventType,
    /// Bytes consumed from the body when the event fired
    pub bytes_read: u64,
    /// Field name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Field kind (text, file, empty_file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    /// Bytes in the field value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Number of fields in the form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<usize>,
    /// Reason for failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl UploadEvent {
    /// Create a new upload event
    pub fn new(event_type: UploadEventType, bytes_read: u64) -> Self {
        Self {
            event_type,
            bytes_read,
            field: None,
            kind: None,
            size: None,
            fields: None,
            reason: None,
        }
    }

    /// Set field name and kind
    pub fn with_field(mut self, name: &str, kind: &'static str) -> Self {
        self.field = Some(name.to_string());
        self.kind = Some(kind);
        self
    }

    /// Set value size
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set field count
    pub fn with_fields(mut self, fields: usize) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Set reason
    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }

    /// Log the event
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(json) => match self.event_type {
                UploadEventType::ParseFailed => warn!("[UPLOAD] {}", json),
                UploadEventType::ChunkLoaded => trace!("[UPLOAD] {}", json),
                _ => debug!("[UPLOAD] {}", json),
            },
            Err(e) => {
                warn!("Failed to serialize upload event: {}", e);
            }
        }
    }
}

/// Receiver of upload checkpoints
pub trait UploadObserver: Send + Sync {
    fn on_event(&self, event: &UploadEvent);
}

/// Observer that logs every event
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl UploadObserver for LogObserver {
    fn on_event(&self, event: &UploadEvent) {
        event.emit();
    }
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl UploadObserver for NoopObserver {
    fn on_event(&self, _event: &UploadEvent) {}
}

/// Create a part complete event
pub fn part_complete(bytes_read: u64, name: &str, kind: &'static str, size: u64) -> UploadEvent {
    UploadEvent::new(UploadEventType::PartComplete, bytes_read)
        .with_field(name, kind)
        .with_size(size)
}

/// Create a parse failed event
pub fn parse_failed(bytes_read: u64, reason: &str) -> UploadEvent {
    UploadEvent::new(UploadEventType::ParseFailed, bytes_read).with_reason(reason)
}
