use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::layout::WorldLayout;
use crate::rewrite::RewriteStats;
use crate::scanner::ScannedStore;
use crate::table::RemapTables;
use crate::thumbs::RenamedAsset;

/// Points at which the pipeline waits for the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Checkpoint {
    /// Before anything is read; the world must not be open in Foundry VTT.
    BeforeStart,
    /// The ID map is built and validated; nothing has been written yet.
    BeforeApply,
}

impl Checkpoint {
    pub fn prompt(&self) -> &'static str {
        match *self {
            Self::BeforeStart => {
                "Ensure that your Foundry VTT world is NOT running. You will likely corrupt your database files if they are actively being referenced by Foundry VTT."
            }
            Self::BeforeApply => {
                "ID Mapping has been generated. Run this program with the --verbose flag to see the mapping."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Validate,
    Scan,
    BuildTable,
    Gate,
    ConfirmProceed,
    RewriteAllFiles,
    RenameAllAssets,
}

/// A validated ID map, ready to be applied. Building one never writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapPlan {
    pub layout: WorldLayout,
    pub stores: Vec<ScannedStore>,
    pub tables: RemapTables,
}

impl RemapPlan {
    pub fn store_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.stores.iter().map(|store| &store.path)
    }

    pub fn document_count(&self) -> usize {
        self.stores.iter().map(|store| store.records.len()).sum()
    }

    pub fn skipped_lines(&self) -> usize {
        self.stores.iter().map(|store| store.skipped_lines).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapReport {
    pub files: Vec<RewriteStats>,
    pub thumbnails: Vec<RenamedAsset>,
}

impl RemapReport {
    pub fn total_replacements(&self) -> usize {
        self.files.iter().map(|f| f.replacements).sum()
    }
}
