//! Multipart Upload Parser
//!
//! CRITICAL: No part is ever held whole in memory unless it is a text field.
//! The body is read exactly once through a [`BufferRing`]; file parts are
//! streamed chunk by chunk into temp files from the [`FilePool`].
//!
//! State machine:
//!
//! ```text
//! AwaitOpeningBoundary -> AwaitFieldHeader -> ConsumeEmptyFile ---+
//!                              ^   |       -> ConsumeFileValue ---+
//!                              |   |       -> ConsumeTextValue ---+
//!                              |   +-> Done                       |
//!                              +----------------------------------+
//! ```

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Read, Write};
use std::sync::Arc;

use encoding_rs::Encoding;
use log::{debug, warn};

use crate::boundary::{Boundary, HEADER_SEPARATOR, TERMINAL_MARKER};
use crate::config::{ConfigError, UploadConfig};
use crate::error::UploadError;
use crate::field::FieldMeta;
use crate::form::{FieldValue, FormData, TempFile};
use crate::pool::FilePool;
use crate::progress::UploadInfo;
use crate::streaming::{BufferRing, MarkResult};
use crate::telemetry::{self, LogObserver, UploadEvent, UploadEventType, UploadObserver};

enum ParseState {
    AwaitOpeningBoundary,
    AwaitFieldHeader,
    /// File input submitted without a file
    ConsumeEmptyFile(FieldMeta),
    ConsumeFileValue(FieldMeta),
    ConsumeTextValue(FieldMeta),
    Done,
}

/// Multipart/form-data parser.
///
/// Holds no per-request state; one instance can serve concurrent requests,
/// each parse builds its own ring.
pub struct Uploader {
    config: UploadConfig,
    encoding: &'static Encoding,
    pool: Arc<dyn FilePool>,
    observer: Arc<dyn UploadObserver>,
}

impl Uploader {
    /// Create a parser spooling file parts into `pool`
    pub fn new(config: UploadConfig, pool: Arc<dyn FilePool>) -> Result<Self, ConfigError> {
        config.validate()?;
        let encoding = config.encoding()?;

        Ok(Self {
            config,
            encoding,
            pool,
            observer: Arc::new(LogObserver),
        })
    }

    /// Replace the default log observer
    pub fn with_observer(mut self, observer: Arc<dyn UploadObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Parse a whole body.
    ///
    /// `content_type` is the request Content-Type header carrying the
    /// boundary; `info` receives byte counts as the body is read.
    pub fn parse<R: Read>(
        &self,
        body: R,
        content_type: &str,
        info: &Arc<UploadInfo>,
    ) -> Result<FormData, UploadError> {
        let mut form = FormData::new();
        self.parse_into(body, content_type, info, &mut form)?;
        Ok(form)
    }

    /// Parse into an existing form.
    ///
    /// On error, fields completed before the failure stay in `form` and
    /// their temp files stay on disk; the caller decides what to keep.
    pub fn parse_into<R: Read>(
        &self,
        body: R,
        content_type: &str,
        info: &Arc<UploadInfo>,
        form: &mut FormData,
    ) -> Result<(), UploadError> {
        let boundary = Boundary::from_content_type(content_type)?;
        debug!("boundary: {}", boundary.token());

        let mut ring = BufferRing::new(
            body,
            self.config.ring_slots,
            self.config.buffer_size,
            boundary.window(),
        )
        .with_progress(info.clone());

        let result = self.run(&mut ring, &boundary, form);
        if let Err(e) = &result {
            self.observer
                .on_event(&telemetry::parse_failed(ring.bytes_read(), &e.to_string()));
        }
        result
    }

    fn run<R: Read>(
        &self,
        ring: &mut BufferRing<R>,
        boundary: &Boundary,
        form: &mut FormData,
    ) -> Result<(), UploadError> {
        let mut state = ParseState::AwaitOpeningBoundary;

        loop {
            state = match state {
                ParseState::AwaitOpeningBoundary => self.skip_opening_boundary(ring, boundary)?,
                ParseState::AwaitFieldHeader => self.read_field_header(ring)?,
                ParseState::ConsumeEmptyFile(meta) => {
                    let size = self.discard_value(ring, boundary, &meta)?;
                    self.part_complete(ring, &meta, "empty_file", size);
                    ParseState::AwaitFieldHeader
                }
                ParseState::ConsumeFileValue(meta) => {
                    self.save_file(ring, boundary, meta, form)?;
                    ParseState::AwaitFieldHeader
                }
                ParseState::ConsumeTextValue(meta) => {
                    let mut bytes = Vec::new();
                    let size = self.consume_value(ring, boundary, &meta, &mut bytes, None)?;
                    let (text, _) = self.encoding.decode_without_bom_handling(&bytes);

                    self.part_complete(ring, &meta, "text", size);
                    insert(form, meta.name(), FieldValue::Text(text.into_owned()));
                    ParseState::AwaitFieldHeader
                }
                ParseState::Done => {
                    self.observer.on_event(
                        &UploadEvent::new(UploadEventType::ParseComplete, ring.bytes_read())
                            .with_fields(form.len()),
                    );
                    return Ok(());
                }
            };
        }
    }

    fn skip_opening_boundary<R: Read>(
        &self,
        ring: &mut BufferRing<R>,
        boundary: &Boundary,
    ) -> Result<ParseState, UploadError> {
        self.load(ring)?;

        match ring.mark(boundary.opening())? {
            MarkResult::Found => {
                let preamble = ring.dump_as_string()?;
                if !preamble.is_empty() {
                    debug!("Skipping {} byte preamble", preamble.len());
                }
                ring.skip_mark();
                self.observer.on_event(&UploadEvent::new(
                    UploadEventType::BoundaryFound,
                    ring.bytes_read(),
                ));
                Ok(ParseState::AwaitFieldHeader)
            }
            MarkResult::NotFound | MarkResult::StreamEnd => {
                let opening = String::from_utf8_lossy(boundary.opening()).into_owned();
                if self.config.lenient_opening_boundary {
                    warn!("Fail to find the opening boundary ({}) in stream, quit!", opening);
                    Ok(ParseState::Done)
                } else {
                    Err(UploadError::MissingOpeningBoundary(opening))
                }
            }
        }
    }

    /// Read the header block of the next part, or detect the terminal marker
    fn read_field_header<R: Read>(
        &self,
        ring: &mut BufferRing<R>,
    ) -> Result<ParseState, UploadError> {
        let mut header = Vec::new();

        loop {
            self.load(ring)?;
            let mm = ring.mark(HEADER_SEPARATOR)?;
            ring.dump(&mut header)?;

            if header.len() > self.config.max_header_size {
                return Err(UploadError::HeaderTooLarge {
                    max: self.config.max_header_size,
                });
            }

            match mm {
                MarkResult::Found => {
                    ring.skip_mark();
                    break;
                }
                MarkResult::NotFound => {}
                MarkResult::StreamEnd if header == TERMINAL_MARKER => {
                    return Ok(ParseState::Done);
                }
                MarkResult::StreamEnd => {
                    return Err(UploadError::InvalidFormat(
                        "stream ended before the part header was terminated".to_string(),
                    ));
                }
            }
        }

        let (text, _) = self.encoding.decode_without_bom_handling(&header);
        let meta = FieldMeta::parse(&text)?;

        Ok(if meta.is_empty_file() {
            ParseState::ConsumeEmptyFile(meta)
        } else if meta.is_file() {
            ParseState::ConsumeFileValue(meta)
        } else {
            ParseState::ConsumeTextValue(meta)
        })
    }

    fn save_file<R: Read>(
        &self,
        ring: &mut BufferRing<R>,
        boundary: &Boundary,
        meta: FieldMeta,
        form: &mut FormData,
    ) -> Result<(), UploadError> {
        let path = self
            .pool
            .create_file(meta.extension())
            .map_err(UploadError::TempFile)?;
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(UploadError::TempFile)?;

        // Dropping the writer closes the file on every error path
        let mut out = BufWriter::with_capacity(self.config.buffer_size.saturating_mul(2), file);
        let size = self.consume_value(ring, boundary, &meta, &mut out, self.config.max_file_size)?;
        out.flush()?;
        drop(out);

        self.part_complete(ring, &meta, "file", size);
        let name = meta.name().to_string();
        insert(form, &name, FieldValue::File(TempFile::new(meta, path)));
        Ok(())
    }

    /// Stream a part body into `sink` up to and past the next delimiter
    fn consume_value<R: Read, W: Write + ?Sized>(
        &self,
        ring: &mut BufferRing<R>,
        boundary: &Boundary,
        meta: &FieldMeta,
        sink: &mut W,
        max: Option<u64>,
    ) -> Result<u64, UploadError> {
        let mut size = 0u64;

        loop {
            self.load(ring)?;
            let mm = ring.mark(boundary.delimiter())?;
            assert_stream_not_end(mm, meta)?;

            size += ring.dump(sink)?;
            if let Some(max) = max.filter(|&max| size > max) {
                return Err(UploadError::FileTooLarge {
                    name: meta.name().to_string(),
                    max,
                });
            }

            if mm.is_found() {
                ring.skip_mark();
                return Ok(size);
            }
        }
    }

    /// Skip a part body without copying it anywhere
    fn discard_value<R: Read>(
        &self,
        ring: &mut BufferRing<R>,
        boundary: &Boundary,
        meta: &FieldMeta,
    ) -> Result<u64, UploadError> {
        let start = ring.bytes_read();

        loop {
            self.load(ring)?;
            let mm = ring.mark(boundary.delimiter())?;
            assert_stream_not_end(mm, meta)?;
            ring.skip_mark();

            if mm.is_found() {
                return Ok(ring.bytes_read() - start);
            }
        }
    }

    fn load<R: Read>(&self, ring: &mut BufferRing<R>) -> io::Result<()> {
        let before = ring.bytes_read();
        let after = ring.load()?;
        if after > before {
            self.observer
                .on_event(&UploadEvent::new(UploadEventType::ChunkLoaded, after));
        }
        Ok(())
    }

    fn part_complete<R: Read>(
        &self,
        ring: &BufferRing<R>,
        meta: &FieldMeta,
        kind: &'static str,
        size: u64,
    ) {
        self.observer.on_event(&telemetry::part_complete(
            ring.bytes_read(),
            meta.name(),
            kind,
            size,
        ));
    }
}

fn assert_stream_not_end(mm: MarkResult, meta: &FieldMeta) -> Result<(), UploadError> {
    match mm {
        MarkResult::StreamEnd => Err(UploadError::InvalidFormat(format!(
            "stream ended inside field `{}`",
            meta.name()
        ))),
        MarkResult::Found | MarkResult::NotFound => Ok(()),
    }
}

fn insert(form: &mut FormData, name: &str, value: FieldValue) {
    if form.insert(name, value).is_some() {
        debug!("Field `{}` repeated, keeping the last value", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::TempDirPool;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const CONTENT_TYPE: &str = "multipart/form-data; boundary=XYZ";

    enum Part<'a> {
        Text(&'a str, &'a [u8]),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn build_body(token: &str, parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", token).as_bytes());
            let value = match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"", name).as_bytes(),
                    );
                    value
                }
                Part::File(name, filename, value) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                             Content-Type: application/octet-stream",
                            name, filename
                        )
                        .as_bytes(),
                    );
                    value
                }
            };
            body.extend_from_slice(b"\r\n\r\n");
            body.extend_from_slice(value);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", token).as_bytes());
        body
    }

    fn uploader(dir: &Path, config: UploadConfig) -> Uploader {
        let pool = Arc::new(TempDirPool::new(dir).unwrap());
        Uploader::new(config, pool)
            .unwrap()
            .with_observer(Arc::new(telemetry::NoopObserver))
    }

    fn parse(dir: &Path, body: &[u8], buffer_size: usize) -> Result<FormData, UploadError> {
        let config = UploadConfig::default().with_buffer_size(buffer_size);
        let info = Arc::new(UploadInfo::new(Some(body.len() as u64)));
        uploader(dir, config).parse(body, CONTENT_TYPE, &info)
    }

    fn files_in(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_simple_text_field() {
        let body = b"--XYZ\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nhello\r\n--XYZ--\r\n";
        for buffer_size in [4, 4096] {
            let dir = TempDir::new().unwrap();
            let form = parse(dir.path(), body, buffer_size).unwrap();
            assert_eq!(form.len(), 1);
            assert_eq!(form.text("a"), Some("hello"));
        }
    }

    #[test]
    fn test_boundary_span_invariance() {
        let payload: Vec<u8> = (0..=255u8).collect();
        let body = build_body(
            "XYZ",
            &[
                Part::Text("title", b"multi\r\nline \r\n--XY value"),
                Part::File("doc", "notes.txt", &payload),
                Part::File("blank", "", b""),
                Part::Text("empty", b""),
            ],
        );

        for buffer_size in (1..=16).chain([4096]) {
            let dir = TempDir::new().unwrap();
            let form = parse(dir.path(), &body, buffer_size).unwrap();

            assert_eq!(form.len(), 3, "buffer size {}", buffer_size);
            assert_eq!(form.text("title"), Some("multi\r\nline \r\n--XY value"));
            assert_eq!(form.text("empty"), Some(""));
            assert!(form.get("blank").is_none());

            let doc = form.file("doc").unwrap();
            assert_eq!(doc.read().unwrap(), payload, "buffer size {}", buffer_size);
            assert_eq!(doc.meta().filename(), Some("notes.txt"));
            assert_eq!(doc.path().extension().and_then(|e| e.to_str()), Some("txt"));
        }
    }

    #[test]
    fn test_binary_file_across_chunks() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(256 * 20).collect();
        let body = build_body("XYZ", &[Part::File("f", "f.txt", &payload)]);

        for buffer_size in [1, 3, 7, 64, 1000, 4096] {
            let dir = TempDir::new().unwrap();
            let form = parse(dir.path(), &body, buffer_size).unwrap();

            let file = form.file("f").unwrap();
            assert_eq!(file.len().unwrap(), payload.len() as u64);
            assert_eq!(file.read().unwrap(), payload);
            assert_eq!(files_in(dir.path()), 1);
        }
    }

    #[test]
    fn test_bytes_read_matches_body_length() {
        let body = build_body(
            "XYZ",
            &[Part::Text("a", b"1"), Part::File("b", "b.bin", &[0u8; 300])],
        );

        for buffer_size in [1, 5, 128, 8192] {
            let dir = TempDir::new().unwrap();
            let config = UploadConfig::default().with_buffer_size(buffer_size);
            let info = Arc::new(UploadInfo::new(Some(body.len() as u64)));

            uploader(dir.path(), config)
                .parse(&body[..], CONTENT_TYPE, &info)
                .unwrap();
            assert_eq!(info.current(), body.len() as u64);
            assert_eq!(info.ratio(), Some(1.0));
        }
    }

    #[test]
    fn test_empty_file_field() {
        let body = build_body("XYZ", &[Part::File("upload", "", b"")]);
        let dir = TempDir::new().unwrap();

        let form = parse(dir.path(), &body, 16).unwrap();
        assert!(form.is_empty());
        assert_eq!(files_in(dir.path()), 0);
    }

    #[test]
    fn test_zero_fields() {
        let dir = TempDir::new().unwrap();
        for buffer_size in [1, 4096] {
            let form = parse(dir.path(), b"--XYZ--\r\n", buffer_size).unwrap();
            assert!(form.is_empty());
        }
    }

    #[test]
    fn test_last_write_wins() {
        let body = build_body("XYZ", &[Part::Text("a", b"first"), Part::Text("a", b"second")]);
        let dir = TempDir::new().unwrap();

        let form = parse(dir.path(), &body, 8).unwrap();
        assert_eq!(form.len(), 1);
        assert_eq!(form.text("a"), Some("second"));
    }

    #[test]
    fn test_missing_header_separator() {
        let body = b"--XYZ\r\nContent-Disposition: form-data; name=\"a\"\r\nhello\r\n--XYZ--\r\n";
        for buffer_size in [4, 4096] {
            let dir = TempDir::new().unwrap();
            let err = parse(dir.path(), body, buffer_size).unwrap_err();
            assert!(matches!(err, UploadError::InvalidFormat(_)), "{:?}", err);
        }
    }

    #[test]
    fn test_stream_ends_inside_part() {
        let body = b"--XYZ\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nhello";
        let dir = TempDir::new().unwrap();

        let err = parse(dir.path(), body, 4).unwrap_err();
        assert!(matches!(err, UploadError::InvalidFormat(_)));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_missing_terminal_crlf() {
        let body = b"--XYZ\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nhello\r\n--XYZ--";
        let dir = TempDir::new().unwrap();

        assert!(matches!(
            parse(dir.path(), body, 4096),
            Err(UploadError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_opening_boundary() {
        let body = b"no multipart here";
        let dir = TempDir::new().unwrap();

        let err = parse(dir.path(), body, 4096).unwrap_err();
        assert!(matches!(err, UploadError::MissingOpeningBoundary(_)));

        let config = UploadConfig {
            lenient_opening_boundary: true,
            ..Default::default()
        };
        let info = Arc::new(UploadInfo::new(None));
        let form = uploader(dir.path(), config)
            .parse(&body[..], CONTENT_TYPE, &info)
            .unwrap();
        assert!(form.is_empty());
    }

    #[test]
    fn test_preamble_skipped() {
        let mut body = b"preamble text\r\n".to_vec();
        body.extend(build_body("XYZ", &[Part::Text("a", b"v")]));
        let dir = TempDir::new().unwrap();

        let form = parse(dir.path(), &body, 4096).unwrap();
        assert_eq!(form.text("a"), Some("v"));
    }

    #[test]
    fn test_missing_boundary_in_content_type() {
        let dir = TempDir::new().unwrap();
        let info = Arc::new(UploadInfo::new(None));

        let err = uploader(dir.path(), UploadConfig::default())
            .parse(&b"--XYZ--\r\n"[..], "multipart/form-data", &info)
            .unwrap_err();
        assert!(matches!(err, UploadError::MissingBoundary(_)));
    }

    #[test]
    fn test_charset_decoding() {
        let body = build_body("XYZ", &[Part::Text("city", b"Z\xfcrich caf\xe9")]);
        let dir = TempDir::new().unwrap();
        let config = UploadConfig::default().with_charset("ISO-8859-1");
        let info = Arc::new(UploadInfo::new(None));

        let form = uploader(dir.path(), config)
            .parse(&body[..], CONTENT_TYPE, &info)
            .unwrap();
        assert_eq!(form.text("city"), Some("Zürich café"));
    }

    #[test]
    fn test_file_too_large() {
        let body = build_body("XYZ", &[Part::File("f", "big.bin", &[7u8; 100])]);
        let dir = TempDir::new().unwrap();
        let config = UploadConfig {
            max_file_size: Some(50),
            ..UploadConfig::default().with_buffer_size(16)
        };
        let info = Arc::new(UploadInfo::new(None));

        let err = uploader(dir.path(), config)
            .parse(&body[..], CONTENT_TYPE, &info)
            .unwrap_err();
        assert!(matches!(err, UploadError::FileTooLarge { max: 50, .. }));
    }

    #[test]
    fn test_header_too_large() {
        let body = build_body("XYZ", &[Part::Text("a-rather-long-field-name", b"v")]);
        let dir = TempDir::new().unwrap();
        let config = UploadConfig {
            max_header_size: 16,
            ..UploadConfig::default().with_buffer_size(8)
        };
        let info = Arc::new(UploadInfo::new(None));

        let err = uploader(dir.path(), config)
            .parse(&body[..], CONTENT_TYPE, &info)
            .unwrap_err();
        assert!(matches!(err, UploadError::HeaderTooLarge { max: 16 }));
    }

    #[test]
    fn test_partial_results_kept() {
        let mut body = build_body("XYZ", &[Part::Text("a", b"kept")]);
        // Replace the terminal marker with a truncated second part
        body.truncate(body.len() - b"--XYZ--\r\n".len());
        body.extend_from_slice(b"--XYZ\r\nContent-Disposition: form-data; name=\"b\"\r\n\r\ncut");

        let dir = TempDir::new().unwrap();
        let info = Arc::new(UploadInfo::new(None));
        let mut form = FormData::new();

        let result = uploader(dir.path(), UploadConfig::default()).parse_into(
            &body[..],
            CONTENT_TYPE,
            &info,
            &mut form,
        );
        assert!(matches!(result, Err(UploadError::InvalidFormat(_))));
        assert_eq!(form.text("a"), Some("kept"));
        assert!(form.get("b").is_none());
    }

    #[test]
    fn test_transport_failure() {
        struct FailAfter {
            data: Vec<u8>,
            pos: usize,
        }

        impl Read for FailAfter {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.pos >= self.data.len() {
                    return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
                }
                let n = buf.len().min(self.data.len() - self.pos);
                buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
                self.pos += n;
                Ok(n)
            }
        }

        let body = build_body("XYZ", &[Part::File("f", "f.bin", &[1u8; 64])]);
        let reader = FailAfter {
            data: body[..40].to_vec(),
            pos: 0,
        };
        let dir = TempDir::new().unwrap();
        let config = UploadConfig::default().with_buffer_size(8);
        let info = Arc::new(UploadInfo::new(None));

        let err = uploader(dir.path(), config)
            .parse(reader, CONTENT_TYPE, &info)
            .unwrap_err();
        assert!(matches!(err, UploadError::Io(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
    }

    #[test]
    fn test_temp_file_failure() {
        struct NoFiles;
        impl FilePool for NoFiles {
            fn create_file(&self, _extension: Option<&str>) -> io::Result<std::path::PathBuf> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
            }
        }

        let body = build_body("XYZ", &[Part::File("f", "f.bin", b"data")]);
        let info = Arc::new(UploadInfo::new(None));
        let uploader = Uploader::new(UploadConfig::default(), Arc::new(NoFiles))
            .unwrap()
            .with_observer(Arc::new(telemetry::NoopObserver));

        let err = uploader.parse(&body[..], CONTENT_TYPE, &info).unwrap_err();
        assert!(matches!(err, UploadError::TempFile(_)));
    }

    #[test]
    fn test_observer_receives_checkpoints() {
        #[derive(Default)]
        struct Recorder(Mutex<Vec<UploadEventType>>);

        impl UploadObserver for Recorder {
            fn on_event(&self, event: &UploadEvent) {
                self.0.lock().unwrap().push(event.event_type);
            }
        }

        let body = build_body("XYZ", &[Part::Text("a", b"1"), Part::File("f", "f.txt", b"2")]);
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(Recorder::default());
        let info = Arc::new(UploadInfo::new(None));

        uploader(dir.path(), UploadConfig::default())
            .with_observer(recorder.clone())
            .parse(&body[..], CONTENT_TYPE, &info)
            .unwrap();

        let events = recorder.0.lock().unwrap();
        assert_eq!(events.first(), Some(&UploadEventType::ChunkLoaded));
        assert!(events.contains(&UploadEventType::BoundaryFound));
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == UploadEventType::PartComplete)
                .count(),
            2
        );
        assert_eq!(events.last(), Some(&UploadEventType::ParseComplete));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = TempDir::new().unwrap();
        let pool = Arc::new(TempDirPool::new(dir.path()).unwrap());
        let config = UploadConfig::default().with_charset("not-a-charset");

        assert!(matches!(
            Uploader::new(config, pool),
            Err(ConfigError::UnknownCharset(_))
        ));
    }
}
