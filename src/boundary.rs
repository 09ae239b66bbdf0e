//! Multipart delimiters derived from the request Content-Type

use crate::error::UploadError;

/// Separator between a part's header block and its body
pub const HEADER_SEPARATOR: &[u8] = b"\r\n\r\n";

/// What follows the last inter-part delimiter
pub const TERMINAL_MARKER: &[u8] = b"--\r\n";

/// Byte sequences that frame one multipart body
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Boundary {
    token: String,
    opening: Vec<u8>,
    delimiter: Vec<u8>,
}

impl Boundary {
    /// Build the delimiters for a boundary token
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            opening: [b"--", token.as_bytes()].concat(),
            delimiter: [b"\r\n--", token.as_bytes()].concat(),
        }
    }

    /// Extract the `boundary` parameter from a Content-Type header value
    ///
    /// Format: `multipart/form-data; boundary=----WebKitFormBoundary...`
    pub fn from_content_type(content_type: &str) -> Result<Self, UploadError> {
        content_type
            .split(';')
            .skip(1)
            .filter_map(|param| param.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
            .map(|(_, value)| value.trim().trim_matches('"'))
            .filter(|token| !token.is_empty())
            .map(Self::new)
            .ok_or_else(|| UploadError::MissingBoundary(content_type.to_string()))
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// `--` + token, starts the body
    pub fn opening(&self) -> &[u8] {
        &self.opening
    }

    /// `\r\n--` + token, ends every part body
    pub fn delimiter(&self) -> &[u8] {
        &self.delimiter
    }

    /// Longest pattern the parser searches for
    pub fn window(&self) -> usize {
        self.delimiter.len().max(HEADER_SEPARATOR.len())
    }
}
