//! Streaming multipart/form-data parser
//!
//! Reads an HTTP request body exactly once, in fixed-size chunks, and turns
//! it into a map of named fields. Text fields are decoded into strings; file
//! fields are streamed straight into temp files, so memory stays bounded by
//! the chunk ring no matter how large the upload is.
//!
//! ```no_run
//! use std::sync::Arc;
//! use multipart_spool::{TempDirPool, UploadConfig, UploadInfo, Uploader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = Arc::new(TempDirPool::system()?);
//! let uploader = Uploader::new(UploadConfig::default(), pool)?;
//!
//! let body: &[u8] = b"--XYZ\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nhello\r\n--XYZ--\r\n";
//! let info = Arc::new(UploadInfo::new(Some(body.len() as u64)));
//! let form = uploader.parse(body, "multipart/form-data; boundary=XYZ", &info)?;
//! assert_eq!(form.text("a"), Some("hello"));
//! # Ok(())
//! # }
//! ```

pub mod boundary;
pub mod config;
pub mod error;
pub mod field;
pub mod form;
pub mod pool;
pub mod progress;
pub mod streaming;
pub mod telemetry;
pub mod upload;

pub use boundary::Boundary;
pub use config::{ConfigError, UploadConfig};
pub use error::UploadError;
pub use field::FieldMeta;
pub use form::{FieldValue, FormData, TempFile};
pub use pool::{FilePool, TempDirPool};
pub use progress::{ProgressSnapshot, UploadInfo};
pub use streaming::{BufferRing, MarkResult};
pub use telemetry::{LogObserver, NoopObserver, UploadEvent, UploadEventType, UploadObserver};
pub use upload::Uploader;
