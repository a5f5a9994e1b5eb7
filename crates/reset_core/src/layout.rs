use std::path::{Path, PathBuf};

use crate::core_api::CoreError;
use crate::fs::FileSystem;

pub const WORLD_MARKER: &str = "world.json";
pub const MODULE_MARKER: &str = "module.json";
pub const WORLD_DATA_DIR: &str = "data";
pub const MODULE_DATA_DIR: &str = "packs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    World,
    Module,
}

impl DataKind {
    pub fn marker(&self) -> &'static str {
        match *self {
            Self::World => WORLD_MARKER,
            Self::Module => MODULE_MARKER,
        }
    }

    pub fn data_dir(&self) -> &'static str {
        match *self {
            Self::World => WORLD_DATA_DIR,
            Self::Module => MODULE_DATA_DIR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::World => "world",
            Self::Module => "module",
        }
    }
}

/// Which kinds of data a root directory carries, and where their database
/// files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldLayout {
    pub root: PathBuf,
    pub has_world_data: bool,
    pub has_module_data: bool,
}

impl WorldLayout {
    /// Checks the root for `world.json`/`module.json` and the data directory
    /// each marker requires.
    pub fn detect<F: FileSystem>(fs: &F, root: &Path) -> Result<Self, CoreError> {
        let world_marker = root.join(DataKind::World.marker());
        let has_world_data = fs
            .exists(&world_marker)
            .map_err(|e| CoreError::io("checking for", &world_marker, e))?;
        let module_marker = root.join(DataKind::Module.marker());
        let has_module_data = fs
            .exists(&module_marker)
            .map_err(|e| CoreError::io("checking for", &module_marker, e))?;

        if !has_world_data && !has_module_data {
            return Err(CoreError::validation(format!(
                "{WORLD_MARKER} or {MODULE_MARKER} not found in {}, check this is a Foundry VTT world or module directory",
                root.display()
            )));
        }

        let layout = Self {
            root: root.to_path_buf(),
            has_world_data,
            has_module_data,
        };

        for kind in layout.kinds() {
            let dir = layout.data_dir(kind);
            let present = fs
                .is_dir(&dir)
                .map_err(|e| CoreError::io("checking for", &dir, e))?;
            if !present {
                return Err(CoreError::validation(format!(
                    "{} database directory {} not found, check this is a Foundry VTT {} directory",
                    kind.as_str(),
                    dir.display(),
                    kind.as_str()
                )));
            }
        }

        Ok(layout)
    }

    pub fn kinds(&self) -> Vec<DataKind> {
        let mut out = Vec::with_capacity(2);
        if self.has_world_data {
            out.push(DataKind::World);
        }
        if self.has_module_data {
            out.push(DataKind::Module);
        }
        out
    }

    pub fn data_dir(&self, kind: DataKind) -> PathBuf {
        self.root.join(kind.data_dir())
    }
}
