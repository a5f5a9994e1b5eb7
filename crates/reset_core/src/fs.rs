//! Filesystem port used by every stage of the remap.
//!
//! [`OsFileSystem`] talks to the real disk. [`MemoryFileSystem`] keeps the
//! whole tree in memory with the same observable behaviour, so the engine can
//! be driven end to end without touching disk.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

pub trait FileSystem {
    fn exists(&self, path: &Path) -> io::Result<bool>;

    fn is_dir(&self, path: &Path) -> io::Result<bool>;

    fn is_file(&self, path: &Path) -> io::Result<bool>;

    /// Direct children of `dir` (files and directories), sorted by path.
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replaces the whole content of `path`. The parent directory must exist.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Moves `from` to `to`, replacing `to` if it is a file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        (**self).exists(path)
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        (**self).is_dir(path)
    }

    fn is_file(&self, path: &Path) -> io::Result<bool> {
        (**self).is_file(path)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        (**self).list_dir(dir)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        (**self).open(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        (**self).write(path, contents)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        (**self).rename(from, to)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }

    fn tmp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn is_file(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(dir)? {
            out.push(entry?.path());
        }
        out.sort();
        Ok(out)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(path)?))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    /// Writes to a sibling `.tmp` file, syncs it, then renames it over
    /// `path`. Readers see either the old or the new content, never a mix.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let tmp_path = Self::tmp_path(path);
        let result = (|| {
            let mut file = File::create(&tmp_path)?;
            file.write_all(contents)?;
            file.sync_all()?;
            fs::rename(&tmp_path, path)
        })();
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

#[derive(Debug, Default)]
struct MemoryTree {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
}

impl MemoryTree {
    fn add_parents(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn require_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.dirs.contains(parent) => {
                Err(not_found(parent))
            }
            _ => Ok(()),
        }
    }
}

/// In-memory [`FileSystem`].
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    tree: RefCell<MemoryTree>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `dir` and all its ancestors.
    pub fn add_dir(&self, dir: impl AsRef<Path>) {
        let dir = dir.as_ref();
        let mut tree = self.tree.borrow_mut();
        tree.add_parents(dir);
        tree.dirs.insert(dir.to_path_buf());
    }

    /// Creates (or replaces) a file, creating any missing parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut tree = self.tree.borrow_mut();
        tree.add_parents(path);
        tree.files.insert(path.to_path_buf(), contents.into());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.tree.borrow().files.get(path.as_ref()).cloned()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
    )
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        let tree = self.tree.borrow();
        Ok(tree.files.contains_key(path) || tree.dirs.contains(path))
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        Ok(self.tree.borrow().dirs.contains(path))
    }

    fn is_file(&self, path: &Path) -> io::Result<bool> {
        Ok(self.tree.borrow().files.contains_key(path))
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let tree = self.tree.borrow();
        if !tree.dirs.contains(dir) {
            return Err(not_found(dir));
        }
        let mut out: Vec<PathBuf> = tree
            .files
            .keys()
            .chain(tree.dirs.iter())
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect();
        out.sort();
        Ok(out)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.read(path)?)))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.tree
            .borrow()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut tree = self.tree.borrow_mut();
        tree.require_parent(path)?;
        if tree.dirs.contains(path) {
            return Err(io::Error::other(format!(
                "{} is a directory",
                path.display()
            )));
        }
        tree.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut tree = self.tree.borrow_mut();
        tree.require_parent(to)?;
        let Some(contents) = tree.files.remove(from) else {
            return Err(not_found(from));
        };
        tree.files.insert(to.to_path_buf(), contents);
        Ok(())
    }
}
