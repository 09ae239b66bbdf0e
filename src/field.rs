//! Part header parsing
//!
//! A part header block looks like:
//!
//! ```text
//! Content-Disposition: form-data; name="photo"; filename="cat.png"
//! Content-Type: image/png
//! ```
//!
//! A part is a file if and only if it carries a `filename` parameter. An
//! empty filename is what browsers send for a file input left blank.

use serde::Serialize;

use crate::error::UploadError;

/// Descriptor of one form field, built from its header block
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldMeta {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
}

impl FieldMeta {
    /// Parse a header block (lines separated by CRLF)
    pub fn parse(header: &str) -> Result<Self, UploadError> {
        let mut name = None;
        let mut filename = None;
        let mut content_type = None;

        for line in header.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();

            if key.eq_ignore_ascii_case("content-disposition") {
                for (param, value) in split_params(value) {
                    if param.eq_ignore_ascii_case("name") {
                        name = Some(value);
                    } else if param.eq_ignore_ascii_case("filename") {
                        filename = Some(value);
                    }
                }
            } else if key.eq_ignore_ascii_case("content-type") {
                content_type = Some(value.trim().to_string());
            }
        }

        let name = name.ok_or_else(|| {
            UploadError::InvalidFormat(format!("part header has no field name: {:?}", header))
        })?;

        Ok(Self {
            name,
            filename,
            content_type,
        })
    }

    /// Field name, the key in the form map
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filename exactly as the client sent it (may include a client path)
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Filename without client path components
    pub fn file_local_name(&self) -> Option<&str> {
        self.filename
            .as_deref()
            .map(|f| f.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(f))
    }

    /// Extension of the local filename, without the dot
    pub fn extension(&self) -> Option<&str> {
        self.file_local_name()
            .and_then(|f| f.rsplit_once('.'))
            .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
            .map(|(_, ext)| ext)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }

    /// File input submitted without a file
    pub fn is_empty_file(&self) -> bool {
        self.filename.as_deref().is_some_and(|f| f.trim().is_empty())
    }
}

/// Split `form-data; name="a"; filename="b;c"` into unquoted key/value
/// pairs. Semicolons inside quotes do not separate parameters.
fn split_params(value: &str) -> Vec<(&str, String)> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);

    segments
        .into_iter()
        .filter_map(|segment| segment.split_once('='))
        .map(|(key, value)| (key.trim(), unquote(value.trim())))
        .collect()
}

fn unquote(s: &str) -> String {
    match s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\""),
        None => s.to_string(),
    }
}
