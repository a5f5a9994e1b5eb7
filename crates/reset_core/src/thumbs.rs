use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::fs::FileSystem;
use crate::options::THUMBNAIL_EXTENSION;
use crate::table::RemapTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedAsset {
    pub old_id: String,
    pub new_id: String,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Renames scene thumbnails (`<id>.png`) to follow their scene's new id.
#[derive(Debug)]
pub struct ThumbnailRenamer<'a, F> {
    fs: &'a F,
    dir: PathBuf,
}

impl<'a, F: FileSystem> ThumbnailRenamer<'a, F> {
    pub fn new(fs: &'a F, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{THUMBNAIL_EXTENSION}"))
    }

    /// Checks every pending rename without touching the disk: each source
    /// thumbnail exists and no target is already taken.
    pub fn preflight(&self, scenes: &RemapTable) -> Result<(), CoreError> {
        for (old_id, new_id) in pending(scenes) {
            let from = self.path_for(old_id);
            self.require_source(&from, old_id)?;

            let to = self.path_for(new_id);
            let taken = self
                .fs
                .exists(&to)
                .map_err(|e| CoreError::io("checking for thumbnail file", &to, e))?;
            if taken {
                return Err(CoreError::new(
                    CoreErrorCode::AssetConflict,
                    format!("thumbnail target already exists: {}", to.display()),
                ));
            }
        }
        Ok(())
    }

    /// Renames every thumbnail in key order, stopping at the first failure.
    pub fn rename_all(&self, scenes: &RemapTable) -> Result<Vec<RenamedAsset>, CoreError> {
        let mut renamed = Vec::new();
        for (old_id, new_id) in pending(scenes) {
            renamed.push(self.rename(old_id, new_id)?);
        }
        Ok(renamed)
    }

    pub fn rename(&self, old_id: &str, new_id: &str) -> Result<RenamedAsset, CoreError> {
        let from = self.path_for(old_id);
        let to = self.path_for(new_id);
        tracing::debug!(
            old_path = %file_name(&from),
            new_path = %file_name(&to),
            "Renaming scene thumbnail."
        );

        self.require_source(&from, old_id)?;
        self.fs.rename(&from, &to).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!(
                    "error renaming thumbnail file {} to {}: {e}",
                    from.display(),
                    to.display()
                ),
            )
        })?;

        Ok(RenamedAsset {
            old_id: old_id.to_string(),
            new_id: new_id.to_string(),
            from,
            to,
        })
    }

    fn require_source(&self, from: &Path, old_id: &str) -> Result<(), CoreError> {
        let present = self
            .fs
            .is_file(from)
            .map_err(|e| CoreError::io("checking for thumbnail file", from, e))?;
        if !present {
            return Err(CoreError::new(
                CoreErrorCode::MissingAsset,
                format!(
                    "thumbnail file not found for scene {old_id}: {}",
                    from.display()
                ),
            ));
        }
        Ok(())
    }
}

fn pending(scenes: &RemapTable) -> impl Iterator<Item = (&str, &str)> {
    scenes.iter().filter(|(old_id, new_id)| old_id != new_id)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
