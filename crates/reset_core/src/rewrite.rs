use std::path::Path;

use aho_corasick::{AhoCorasick, MatchKind};
use serde::{Deserialize, Serialize};

use crate::core_api::CoreError;
use crate::fs::FileSystem;
use crate::table::RemapTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub bytes: Vec<u8>,
    pub replacements: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteStats {
    pub file: String,
    pub replacements: usize,
}

/// Literal identifier substitution over raw file bytes.
///
/// All old identifiers are matched in a single leftmost-longest pass, so the
/// output does not depend on table order and an inserted replacement is
/// never matched again.
#[derive(Debug)]
pub struct ContentRewriter {
    matcher: Option<AhoCorasick>,
    replacements: Vec<Vec<u8>>,
}

impl ContentRewriter {
    pub fn new(table: &RemapTable) -> Result<Self, CoreError> {
        if table.is_empty() {
            return Ok(Self {
                matcher: None,
                replacements: Vec::new(),
            });
        }

        let mut patterns = Vec::with_capacity(table.len());
        let mut replacements = Vec::with_capacity(table.len());
        for (old_id, new_id) in table.iter() {
            patterns.push(old_id);
            replacements.push(new_id.as_bytes().to_vec());
        }

        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(patterns)
            .map_err(|e| CoreError::validation(format!("failed to build identifier matcher: {e}")))?;

        Ok(Self {
            matcher: Some(matcher),
            replacements,
        })
    }

    pub fn rewrite(&self, input: &[u8]) -> Rewritten {
        let Some(matcher) = &self.matcher else {
            return Rewritten {
                bytes: input.to_vec(),
                replacements: 0,
            };
        };

        let mut bytes = Vec::with_capacity(input.len());
        let mut replacements = 0;
        matcher.replace_all_with_bytes(input, &mut bytes, |mat, _, dst| {
            dst.extend_from_slice(&self.replacements[mat.pattern().as_usize()]);
            replacements += 1;
            true
        });

        Rewritten {
            bytes,
            replacements,
        }
    }

    /// Reads the whole file, rewrites it in memory and writes it back.
    /// A file with nothing to replace is not written.
    pub fn rewrite_file<F: FileSystem>(
        &self,
        fs: &F,
        path: &Path,
    ) -> Result<RewriteStats, CoreError> {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::debug!(file = %file, "Updating database file.");

        let input = fs
            .read(path)
            .map_err(|e| CoreError::io("opening database file", path, e))?;
        let output = self.rewrite(&input);

        if output.replacements > 0 {
            fs.write(path, &output.bytes)
                .map_err(|e| CoreError::io("writing database file", path, e))?;
        } else {
            tracing::debug!(file = %file, "No identifiers to replace.");
        }

        Ok(RewriteStats {
            file,
            replacements: output.replacements,
        })
    }
}
