use std::fmt::Write as _;

use reset_core::core_api::{RemapPlan, RemapReport};
use reset_core::record::Record;
use reset_core::rewrite::RewriteStats;
use reset_core::scanner::ScannedStore;
use reset_core::table::RemapTable;
use reset_core::thumbs::RenamedAsset;
use serde_json::{Map as JsonMap, Value as JsonValue};

const NAME_COL_WIDTH: usize = 32;
const FILE_COL_WIDTH: usize = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// Include skipped-line counts and the scene table.
    pub verbose: bool,
}

pub fn render_plan_json(plan: &RemapPlan, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(plan_json(plan)),
    }
}

pub fn render_report_json(report: &RemapReport, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(report_json(report)),
    }
}

/// The per-file ID map, one `name: old -> new` line per document.
pub fn render_plan_text(plan: &RemapPlan, options: TextRenderOptions) -> String {
    let mut out = String::new();

    for store in &plan.stores {
        if store.records.is_empty() && !options.verbose {
            continue;
        }
        writeln!(out, "{} ID Map:", store.file_name).expect("writing to String cannot fail");
        for record in &store.records {
            write_record_line(&mut out, record);
        }
        if options.verbose && store.skipped_lines > 0 {
            writeln!(out, "  ({} unparseable lines skipped)", store.skipped_lines)
                .expect("writing to String cannot fail");
        }
        out.push('\n');
    }

    if options.verbose && !plan.tables.scenes.is_empty() {
        writeln!(out, "Scene thumbnails:").expect("writing to String cannot fail");
        for (old_id, new_id) in &plan.tables.scenes {
            writeln!(out, "  {old_id}.png -> {new_id}.png").expect("writing to String cannot fail");
        }
        out.push('\n');
    }

    writeln!(
        out,
        "{} documents in {} files, {} scene thumbnails.",
        plan.document_count(),
        plan.stores.len(),
        plan.tables.scenes.len()
    )
    .expect("writing to String cannot fail");
    out
}

pub fn render_report_text(report: &RemapReport) -> String {
    let mut out = String::new();

    writeln!(out, "Updated database files:").expect("writing to String cannot fail");
    for stats in &report.files {
        writeln!(
            out,
            "  {:<width$} {} replacements",
            fit_column(&stats.file, FILE_COL_WIDTH),
            stats.replacements,
            width = FILE_COL_WIDTH
        )
        .expect("writing to String cannot fail");
    }

    if !report.thumbnails.is_empty() {
        writeln!(out, "Renamed scene thumbnails:").expect("writing to String cannot fail");
        for asset in &report.thumbnails {
            writeln!(out, "  {}.png -> {}.png", asset.old_id, asset.new_id)
                .expect("writing to String cannot fail");
        }
    }

    writeln!(
        out,
        "{} identifiers replaced across {} files.",
        report.total_replacements(),
        report.files.len()
    )
    .expect("writing to String cannot fail");
    out
}

fn write_record_line(out: &mut String, record: &Record) {
    let line = format!(
        "  {:<width$} {} -> {}",
        fit_column(record.display_name(), NAME_COL_WIDTH),
        record.old_id,
        record.new_id,
        width = NAME_COL_WIDTH
    );
    writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
}

fn plan_json(plan: &RemapPlan) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();

    out.insert(
        "root".to_string(),
        JsonValue::String(plan.layout.root.display().to_string()),
    );
    out.insert(
        "documents".to_string(),
        JsonValue::from(plan.document_count()),
    );
    out.insert(
        "skipped_lines".to_string(),
        JsonValue::from(plan.skipped_lines()),
    );
    out.insert(
        "files".to_string(),
        JsonValue::Array(plan.stores.iter().map(store_to_json).collect()),
    );
    out.insert("scenes".to_string(), table_to_json(&plan.tables.scenes));

    out
}

fn store_to_json(store: &ScannedStore) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("file".to_string(), JsonValue::String(store.file_name.clone()));
    m.insert(
        "path".to_string(),
        JsonValue::String(store.path.display().to_string()),
    );
    m.insert(
        "skipped_lines".to_string(),
        JsonValue::from(store.skipped_lines),
    );
    m.insert(
        "documents".to_string(),
        JsonValue::Array(
            store
                .records
                .iter()
                .map(|r: &Record| {
                    let mut doc = JsonMap::new();
                    doc.insert(
                        "name".to_string(),
                        match &r.name {
                            Some(name) => JsonValue::String(name.clone()),
                            None => JsonValue::Null,
                        },
                    );
                    doc.insert("old_id".to_string(), JsonValue::String(r.old_id.clone()));
                    doc.insert("new_id".to_string(), JsonValue::String(r.new_id.clone()));
                    JsonValue::Object(doc)
                })
                .collect(),
        ),
    );
    JsonValue::Object(m)
}

fn table_to_json(table: &RemapTable) -> JsonValue {
    let mut m = JsonMap::new();
    for (old_id, new_id) in table {
        m.insert(old_id.clone(), JsonValue::String(new_id.clone()));
    }
    JsonValue::Object(m)
}

fn report_json(report: &RemapReport) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();

    out.insert(
        "files".to_string(),
        JsonValue::Array(
            report
                .files
                .iter()
                .map(|s: &RewriteStats| {
                    let mut m = JsonMap::new();
                    m.insert("file".to_string(), JsonValue::String(s.file.clone()));
                    m.insert("replacements".to_string(), JsonValue::from(s.replacements));
                    JsonValue::Object(m)
                })
                .collect(),
        ),
    );
    out.insert(
        "thumbnails".to_string(),
        JsonValue::Array(
            report
                .thumbnails
                .iter()
                .map(|a: &RenamedAsset| {
                    let mut m = JsonMap::new();
                    m.insert("old_id".to_string(), JsonValue::String(a.old_id.clone()));
                    m.insert("new_id".to_string(), JsonValue::String(a.new_id.clone()));
                    m.insert(
                        "to".to_string(),
                        JsonValue::String(a.to.display().to_string()),
                    );
                    JsonValue::Object(m)
                })
                .collect(),
        ),
    );
    out.insert(
        "total_replacements".to_string(),
        JsonValue::from(report.total_replacements()),
    );

    out
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out = String::with_capacity(width);
    for ch in value.chars().take(width - 3) {
        out.push(ch);
    }
    out.push_str("...");
    out
}
