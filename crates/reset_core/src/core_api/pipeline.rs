use std::fmt::Write as _;

use rand::rngs::StdRng;

use crate::fs::FileSystem;
use crate::id::IdGenerator;
use crate::layout::WorldLayout;
use crate::options::RemapOptions;
use crate::rewrite::ContentRewriter;
use crate::scanner::{ScannedStore, scan_store, store_files};
use crate::table::RemapTableBuilder;
use crate::thumbs::ThumbnailRenamer;

use super::error::{CoreError, CoreErrorCode};
use super::types::{Checkpoint, RemapPlan, RemapReport, Stage};

/// Blocks until the operator acknowledges a checkpoint.
///
/// Returning an error aborts the run; nothing has been written at either
/// checkpoint.
pub trait Confirm {
    fn confirm(&mut self, checkpoint: Checkpoint) -> Result<(), CoreError>;
}

/// Accepts every checkpoint without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, checkpoint: Checkpoint) -> Result<(), CoreError> {
        tracing::debug!(?checkpoint, "Auto-confirming checkpoint.");
        Ok(())
    }
}

impl<C> Confirm for C
where
    C: FnMut(Checkpoint) -> Result<(), CoreError>,
{
    fn confirm(&mut self, checkpoint: Checkpoint) -> Result<(), CoreError> {
        self(checkpoint)
    }
}

/// Resets every document id under a world or module root.
///
/// [`RemapPipeline::plan`] reads every database file and validates the full
/// ID map; [`RemapPipeline::apply`] is the only step that writes.
#[derive(Debug)]
pub struct RemapPipeline<F> {
    fs: F,
    options: RemapOptions,
}

impl<F: FileSystem> RemapPipeline<F> {
    pub fn new(fs: F, options: RemapOptions) -> Self {
        Self { fs, options }
    }

    pub fn validate(&self) -> Result<WorldLayout, CoreError> {
        enter(Stage::Validate);
        WorldLayout::detect(&self.fs, &self.options.root)
    }

    /// Scans every database file and builds the ID map. Fails if any id is
    /// duplicated or any scene thumbnail is missing; never writes.
    pub fn plan(&self) -> Result<RemapPlan, CoreError> {
        let layout = self.validate()?;

        enter(Stage::Scan);
        let files = store_files(&self.fs, &layout, &self.options.store_extension)?;
        tracing::debug!(files = ?files, "Parsing {} database files.", files.len());

        let mut decoded = Vec::with_capacity(files.len());
        for path in &files {
            decoded.push(scan_store(&self.fs, path, self.options.max_line_len)?);
        }

        let mut ids = self.id_generator();
        for store in &decoded {
            for old_id in store.old_ids() {
                ids.reserve(old_id);
            }
        }
        let stores: Vec<ScannedStore> = decoded
            .into_iter()
            .map(|store| store.assign_ids(&mut ids))
            .collect();

        enter(Stage::BuildTable);
        let mut builder = RemapTableBuilder::new(self.options.scene_store.clone());
        for store in &stores {
            builder.add_store(store);
            log_id_map(store);
        }
        let tables = builder
            .finish()
            .map_err(|dups| CoreError::new(CoreErrorCode::DuplicateId, dups.to_string()))?;

        enter(Stage::Gate);
        self.thumbnails().preflight(&tables.scenes)?;

        tracing::info!(
            documents = tables.global.len(),
            scenes = tables.scenes.len(),
            "ID map built and validated."
        );

        Ok(RemapPlan {
            layout,
            stores,
            tables,
        })
    }

    /// Rewrites every database file, then renames scene thumbnails.
    ///
    /// Stops at the first failure. Files already rewritten stay rewritten.
    pub fn apply(&self, plan: &RemapPlan) -> Result<RemapReport, CoreError> {
        self.apply_all(plan).inspect_err(|e| {
            tracing::error!(
                error = %e,
                "Update stopped; files already rewritten were not rolled back. Inspect the world before retrying."
            );
        })
    }

    fn apply_all(&self, plan: &RemapPlan) -> Result<RemapReport, CoreError> {
        enter(Stage::RewriteAllFiles);
        tracing::info!("Updating database files.");
        let rewriter = ContentRewriter::new(&plan.tables.global)?;
        let mut report = RemapReport::default();
        for path in plan.store_paths() {
            report.files.push(rewriter.rewrite_file(&self.fs, path)?);
        }

        enter(Stage::RenameAllAssets);
        report.thumbnails = self.thumbnails().rename_all(&plan.tables.scenes)?;

        tracing::info!(
            files = report.files.len(),
            replacements = report.total_replacements(),
            thumbnails = report.thumbnails.len(),
            "Finished updating IDs."
        );
        Ok(report)
    }

    pub fn run<C: Confirm + ?Sized>(&self, confirm: &mut C) -> Result<RemapReport, CoreError> {
        self.validate()?;
        confirm.confirm(Checkpoint::BeforeStart)?;

        let plan = self.plan()?;

        enter(Stage::ConfirmProceed);
        confirm.confirm(Checkpoint::BeforeApply)?;

        self.apply(&plan)
    }

    fn id_generator(&self) -> IdGenerator<StdRng> {
        match self.options.seed {
            Some(seed) => IdGenerator::seeded(seed),
            None => IdGenerator::from_entropy(),
        }
    }

    fn thumbnails(&self) -> ThumbnailRenamer<'_, F> {
        ThumbnailRenamer::new(&self.fs, self.options.thumbnail_path())
    }
}

fn enter(stage: Stage) {
    tracing::debug!(?stage, "Entering stage.");
}

fn log_id_map(store: &ScannedStore) {
    if store.records.is_empty() {
        return;
    }
    let mut output = format!("{} ID Map:\n", store.file_name);
    for record in &store.records {
        writeln!(
            output,
            "{}: {} -> {}",
            record.display_name(),
            record.old_id,
            record.new_id
        )
        .expect("writing to String cannot fail");
    }
    tracing::debug!(file = %store.file_name, "{output}");
}
