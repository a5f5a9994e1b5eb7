use std::path::PathBuf;

pub const DEFAULT_MAX_LINE_LEN: usize = 1024 * 1024;
pub const DEFAULT_STORE_EXTENSION: &str = "db";
pub const DEFAULT_SCENE_STORE: &str = "scenes.db";
pub const DEFAULT_THUMBNAIL_DIR: &str = "scenes/thumbs";
pub const THUMBNAIL_EXTENSION: &str = "png";

/// Settings for one remap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapOptions {
    /// World or module root, the directory holding `world.json`/`module.json`.
    pub root: PathBuf,
    /// Fixed seed for identifier generation; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Longest accepted database line in bytes, excluding the newline.
    pub max_line_len: usize,
    pub store_extension: String,
    pub scene_store: String,
    /// Thumbnail directory relative to `root`.
    pub thumbnail_dir: PathBuf,
}

impl RemapOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            seed: None,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            store_extension: DEFAULT_STORE_EXTENSION.to_string(),
            scene_store: DEFAULT_SCENE_STORE.to_string(),
            thumbnail_dir: PathBuf::from(DEFAULT_THUMBNAIL_DIR),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    pub fn thumbnail_path(&self) -> PathBuf {
        self.root.join(&self.thumbnail_dir)
    }
}
