use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use reset_core::core_api::{
    AutoConfirm, Checkpoint, Confirm, CoreError, CoreErrorCode, RemapPipeline,
};
use reset_core::fs::OsFileSystem;
use reset_core::options::RemapOptions;
use reset_render::{
    JsonStyle, TextRenderOptions, render_plan_json, render_plan_text, render_report_json,
    render_report_text,
};
use serde_json::Value as JsonValue;

/// Resets the IDs of all of the documents in a Foundry VTT world.
///
/// This is likely only something you will do if you have duplicated a world
/// to use as a base, and would like to be able to merge them afterwards.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// The world or module folder to process. It should contain the
    /// "world.json" or "module.json" file. Defaults to the current directory.
    #[arg(short, long, value_name = "DIR")]
    path: Option<PathBuf>,
    /// Output verbose logging, including the full ID map.
    #[arg(short, long)]
    verbose: bool,
    /// Do not wait for confirmation before starting or before writing.
    #[arg(short, long)]
    yes: bool,
    /// Build and print the ID map without changing any file.
    #[arg(long = "dry-run")]
    dry_run: bool,
    /// Print the ID map or run report as JSON.
    #[arg(long)]
    json: bool,
    #[arg(long, hide = true)]
    seed: Option<u64>,
}

/// Waits for the operator to press Enter at each checkpoint.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, checkpoint: Checkpoint) -> Result<(), CoreError> {
        tracing::info!("{}", checkpoint.prompt());
        tracing::info!("Ctrl-C this program if you do not want to proceed.");
        tracing::info!("Press 'Enter' to continue...");

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line).map_err(|e| {
            CoreError::new(CoreErrorCode::Io, format!("error reading confirmation: {e}"))
        })?;
        if read == 0 {
            return Err(CoreError::new(
                CoreErrorCode::Cancelled,
                "standard input closed before confirmation; pass --yes to run unattended",
            ));
        }
        Ok(())
    }
}

fn setup_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let root = match &cli.path {
        Some(path) => path.clone(),
        None => env::current_dir().unwrap_or_else(|e| {
            eprintln!("Error resolving current directory: {e}");
            process::exit(1);
        }),
    };

    let mut options = RemapOptions::new(root);
    if let Some(seed) = cli.seed {
        options = options.with_seed(seed);
    }
    tracing::debug!(options = ?options, "Running with provided configuration.");

    let pipeline = RemapPipeline::new(OsFileSystem::new(), options);

    if cli.dry_run {
        let plan = pipeline.plan().unwrap_or_else(|e| fail(&e));
        if cli.json {
            print_json(&render_plan_json(&plan, JsonStyle::CanonicalV1));
        } else {
            print!(
                "{}",
                render_plan_text(
                    &plan,
                    TextRenderOptions {
                        verbose: cli.verbose
                    }
                )
            );
        }
        return;
    }

    let result = if cli.yes {
        pipeline.run(&mut AutoConfirm)
    } else {
        pipeline.run(&mut StdinConfirm)
    };
    let report = result.unwrap_or_else(|e| fail(&e));

    if cli.json {
        print_json(&render_report_json(&report, JsonStyle::CanonicalV1));
    } else {
        print!("{}", render_report_text(&report));
    }
}

fn print_json(value: &JsonValue) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

fn fail(err: &CoreError) -> ! {
    eprintln!("Error: {}", err.message);
    process::exit(1);
}
