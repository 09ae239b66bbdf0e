//! Temp file pool for spooled file parts
//!
//! The parser asks the pool for a fresh, empty file per uploaded file part.
//! Files outlive the parse; whoever consumes the form removes them.

use std::io;
use std::path::{Path, PathBuf};

/// Source of scratch files, shared by concurrent parses
pub trait FilePool: Send + Sync {
    /// Create a new, empty, uniquely named file and return its path.
    ///
    /// `extension` comes from the client filename, without the dot.
    fn create_file(&self, extension: Option<&str>) -> io::Result<PathBuf>;
}

/// Pool creating files inside one directory
#[derive(Clone, Debug)]
pub struct TempDirPool {
    dir: PathBuf,
    prefix: String,
}

impl TempDirPool {
    /// Pool rooted at `dir` (created if missing)
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: "upload-".to_string(),
        })
    }

    /// Pool in the system temp directory
    pub fn system() -> io::Result<Self> {
        Self::new(std::env::temp_dir())
    }

    /// Override the filename prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FilePool for TempDirPool {
    fn create_file(&self, extension: Option<&str>) -> io::Result<PathBuf> {
        // Client-controlled, so only plain extensions make it into the name
        let suffix = match extension {
            Some(ext) if !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()) => {
                format!(".{}", ext)
            }
            _ => String::new(),
        };

        let file = tempfile::Builder::new()
            .prefix(&self.prefix)
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;

        Ok(file.into_temp_path().keep()?)
    }
}
