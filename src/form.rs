//! Parsed form fields

use std::collections::hash_map::{self, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use crate::field::FieldMeta;

/// A file part spooled to disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TempFile {
    meta: FieldMeta,
    path: PathBuf,
}

impl TempFile {
    pub fn new(meta: FieldMeta, path: PathBuf) -> Self {
        Self { meta, path }
    }

    /// Descriptor of the part the file came from
    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the spooled file on disk
    pub fn len(&self) -> io::Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }

    /// Read the whole file back
    pub fn read(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }

    /// Delete the spooled file
    pub fn remove(self) -> io::Result<()> {
        std::fs::remove_file(&self.path)
    }
}

/// Value of one form field
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    /// Decoded text value
    Text(String),
    /// Uploaded file
    File(TempFile),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&TempFile> {
        match self {
            FieldValue::File(file) => Some(file),
            FieldValue::Text(_) => None,
        }
    }
}

/// Field name to value. A repeated name keeps the last value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormData {
    fields: HashMap<String, FieldValue>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the value it displaced
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Text value of `name`, if it is a text field
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// File of `name`, if it is a file field
    pub fn file(&self, name: &str) -> Option<&TempFile> {
        self.get(name).and_then(FieldValue::as_file)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }

    /// Delete every spooled file. Stops at the first failure.
    pub fn remove_temp_files(&self) -> io::Result<()> {
        for file in self.fields.values().filter_map(FieldValue::as_file) {
            match std::fs::remove_file(file.path()) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn into_map(self) -> HashMap<String, FieldValue> {
        self.fields
    }
}

impl<'a> IntoIterator for &'a FormData {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = hash_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
