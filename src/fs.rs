//! File access boundary used by credential discovery.
//!
//! The resolver never touches the disk directly; it asks a [`FileSystem`]
//! instead, so lookups can be exercised against an in-memory fake.

use std::io;
use std::path::Path;

/// The two file operations credential discovery needs.
pub trait FileSystem {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Real filesystem implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
