use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::core_api::{CoreError, CoreErrorCode};
use crate::fs::FileSystem;
use crate::id::IdGenerator;
use crate::layout::WorldLayout;
use crate::record::{Document, Record, decode_document};

/// Documents decoded from one database file, before any replacement is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedStore {
    pub path: PathBuf,
    pub file_name: String,
    pub documents: Vec<Document>,
    pub skipped_lines: usize,
}

impl DecodedStore {
    pub fn old_ids(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|doc| doc.old_id.as_str())
    }

    pub fn assign_ids<R: Rng>(self, ids: &mut IdGenerator<R>) -> ScannedStore {
        ScannedStore {
            path: self.path,
            file_name: self.file_name,
            records: self
                .documents
                .into_iter()
                .map(|doc| doc.assign(ids))
                .collect(),
            skipped_lines: self.skipped_lines,
        }
    }
}

/// Records parsed from one database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedStore {
    pub path: PathBuf,
    pub file_name: String,
    pub records: Vec<Record>,
    /// Lines that failed to decode and contributed no record.
    pub skipped_lines: usize,
}

/// Lists the database files for every data kind the layout carries: world
/// files first, then module files, each group sorted by path.
pub fn store_files<F: FileSystem>(
    fs: &F,
    layout: &WorldLayout,
    extension: &str,
) -> Result<Vec<PathBuf>, CoreError> {
    let mut files = Vec::new();
    for kind in layout.kinds() {
        let dir = layout.data_dir(kind);
        let entries = fs
            .list_dir(&dir)
            .map_err(|e| CoreError::io("finding database files in", &dir, e))?;
        for path in entries {
            if path.extension().is_none_or(|ext| ext != extension) {
                continue;
            }
            let is_file = fs
                .is_file(&path)
                .map_err(|e| CoreError::io("checking", &path, e))?;
            if is_file {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        tracing::error!(path = %layout.root.display(), "No database files found.");
        return Err(CoreError::validation(format!(
            "no database files found under {}",
            layout.root.display()
        )));
    }

    Ok(files)
}

/// Reads a database file line by line and decodes every document in it.
///
/// Lines that do not decode are logged and skipped. A line longer than
/// `max_line_len` bytes, not counting its `\n` or `\r\n` ending, aborts the
/// scan.
pub fn scan_store<F: FileSystem>(
    fs: &F,
    path: &Path,
    max_line_len: usize,
) -> Result<DecodedStore, CoreError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    tracing::debug!(file = %file_name, "Parsing database file.");

    let file = fs
        .open(path)
        .map_err(|e| CoreError::io("opening database file", path, e))?;
    let mut reader = BufReader::new(file);

    let mut documents = Vec::new();
    let mut skipped_lines = 0;
    let mut line_no = 0usize;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = (&mut reader)
            .take(max_line_len as u64 + 2)
            .read_until(b'\n', &mut buf)
            .map_err(|e| CoreError::io("reading database file", path, e))?;
        if read == 0 {
            break;
        }
        line_no += 1;

        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        if buf.len() > max_line_len {
            return Err(CoreError::new(
                CoreErrorCode::LineTooLong,
                format!(
                    "{} line {line_no} exceeds the maximum line length of {max_line_len} bytes",
                    path.display()
                ),
            ));
        }

        if buf.iter().all(u8::is_ascii_whitespace) {
            tracing::debug!(file = %file_name, line = line_no, "Skipping blank line.");
            continue;
        }

        match decode_document(&buf) {
            Ok(doc) => documents.push(doc),
            Err(e) => {
                tracing::error!(
                    file = %file_name,
                    line = line_no,
                    error = %e,
                    "Error parsing document."
                );
                skipped_lines += 1;
            }
        }
    }

    tracing::debug!(file = %file_name, "Parsed {} documents.", documents.len());

    Ok(DecodedStore {
        path: path.to_path_buf(),
        file_name,
        documents,
        skipped_lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;

    #[test]
    fn malformed_lines_contribute_no_document() {
        let fs = MemoryFileSystem::new();
        fs.add_file(
            "/w/data/actors.db",
            "{\"_id\":\"a1\",\"name\":\"One\"}\n{broken\n\n{\"_id\":\"a2\",\"name\":\"Two\"}\r\n",
        );

        let store = scan_store(&fs, Path::new("/w/data/actors.db"), 1024)
            .expect("scan should succeed");

        assert_eq!(store.old_ids().collect::<Vec<_>>(), vec!["a1", "a2"]);
        assert_eq!(store.skipped_lines, 1);
        assert_eq!(store.file_name, "actors.db");
    }

    #[test]
    fn overlong_line_is_fatal() {
        let fs = MemoryFileSystem::new();
        let long_name = "x".repeat(64);
        fs.add_file(
            "/w/data/items.db",
            format!("{{\"_id\":\"i1\"}}\n{{\"_id\":\"i2\",\"name\":\"{long_name}\"}}\n"),
        );

        let err = scan_store(&fs, Path::new("/w/data/items.db"), 32)
            .expect_err("second line is too long");
        assert_eq!(err.code, CoreErrorCode::LineTooLong);
        assert!(err.message.contains("line 2"));
    }

    #[test]
    fn line_of_exactly_max_length_is_accepted() {
        let fs = MemoryFileSystem::new();
        let line = r#"{"_id":"abc"}"#;
        fs.add_file("/w/data/a.db", line);

        let store = scan_store(&fs, Path::new("/w/data/a.db"), line.len()).expect("line fits exactly");
        assert_eq!(store.documents.len(), 1);
    }

    #[test]
    fn crlf_ending_does_not_count_toward_the_limit() {
        let fs = MemoryFileSystem::new();
        let line = r#"{"_id":"abc"}"#;
        fs.add_file("/w/data/a.db", format!("{line}\r\n{line}\n"));

        let store = scan_store(&fs, Path::new("/w/data/a.db"), line.len()).expect("both lines fit");
        assert_eq!(store.documents.len(), 2);

        fs.add_file("/w/data/b.db", format!("{line}x\r\n"));
        let err = scan_store(&fs, Path::new("/w/data/b.db"), line.len())
            .expect_err("one byte over the limit");
        assert_eq!(err.code, CoreErrorCode::LineTooLong);
    }

    #[test]
    fn assign_ids_keeps_document_order() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/w/data/a.db", "{\"_id\":\"a1\"}\n{\"_id\":\"a2\",\"name\":\"Two\"}\n");
        let decoded = scan_store(&fs, Path::new("/w/data/a.db"), 1024).expect("scan should succeed");

        let mut ids = IdGenerator::seeded(5);
        let store = decoded.assign_ids(&mut ids);

        let old_ids: Vec<&str> = store.records.iter().map(|r| r.old_id.as_str()).collect();
        assert_eq!(old_ids, vec!["a1", "a2"]);
        assert_eq!(store.records[1].name.as_deref(), Some("Two"));
        assert_ne!(store.records[0].new_id, store.records[1].new_id);
    }
}
