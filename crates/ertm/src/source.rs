//! File access for referenced resources.
//!
//! Resource files name their dependencies by bare file name, with whatever
//! casing the authoring tool used. Sources resolve those names against a
//! directory or an in-memory table.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Something that can supply resource files by name.
pub trait FileSource {
    /// Read the whole file called `name`.
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Whether `name` can be read.
    fn exists(&self, name: &str) -> bool;
}

impl<T: FileSource + ?Sized> FileSource for &T {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        (**self).read(name)
    }

    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }
}

/// Files in a directory on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locate `name` under the root, falling back to a case-insensitive
    /// match on the file name.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let exact = self.root.join(name.replace('\\', "/"));
        if exact.is_file() {
            return Some(exact);
        }
        let dir = exact.parent()?;
        let wanted = exact.file_name()?.to_str()?.to_ascii_lowercase();
        fs::read_dir(dir)
            .ok()?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .find(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.to_ascii_lowercase() == wanted)
            })
    }
}

impl FileSource for FsSource {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let path = self.resolve(name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{name} not found under {}", self.root.display()),
            )
        })?;
        tracing::debug!("reading {}", path.display());
        fs::read(path)
    }

    fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}

/// Files held in memory, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, data: Vec<u8>) {
        self.files.insert(name.to_ascii_lowercase(), data);
    }

    /// Builder form of [`MemorySource::insert`].
    #[must_use]
    pub fn with_file(mut self, name: &str, data: Vec<u8>) -> Self {
        self.insert(name, data);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSource for MemorySource {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_owned()))
    }

    fn exists(&self, name: &str) -> bool {
        self.files.contains_key(&name.to_ascii_lowercase())
    }
}
