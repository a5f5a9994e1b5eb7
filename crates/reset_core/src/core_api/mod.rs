mod error;
mod pipeline;
mod types;

pub use error::{CoreError, CoreErrorCode};
pub use pipeline::{AutoConfirm, Confirm, RemapPipeline};
pub use types::{Checkpoint, RemapPlan, RemapReport, Stage};
