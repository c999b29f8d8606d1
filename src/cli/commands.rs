//! Command implementations

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::app::{AppContainer, ProgressInteractor};
use crate::cli::args::{ConcatArgs, InputArgs, OutputFormat, PlanArgs, ProbeArgs, ProgressArgs};
use crate::domain::model::{ConcatRequest, ItemState, MediaItem};
use crate::engine::progress::{
    ConsoleProgressCallback, JsonProgressCallback, ProgressCallback, ProgressEstimate,
};
use crate::error::ConcatXError;
use crate::planner::PlanSummary;
use crate::utils::media_files::list_media_files;

/// Execute the concat command
pub async fn concat(container: &dyn AppContainer, args: ConcatArgs) -> Result<()> {
    info!("Starting concat operation");
    let inputs = collect_inputs(&args.input)?;
    info!("Inputs: {}", inputs.len());
    info!("Output: {}", args.output.display());

    let created = prepare_output(&args.output, args.force)?;

    let interactor = container.concat_interactor();
    let items = interactor.prepare_items(&inputs).await;
    let handle = match interactor.start(&ConcatRequest::new(items, &args.output)).await {
        Ok(handle) => handle,
        Err(e) => {
            discard_output(&args.output, created);
            return Err(e.into());
        }
    };

    let callback: Box<dyn ProgressCallback> = if args.json {
        Box::new(JsonProgressCallback)
    } else {
        Box::new(ConsoleProgressCallback::new(args.verbose))
    };

    let outcome = match container
        .progress_interactor()
        .watch(handle, callback.as_ref())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            discard_output(&args.output, created);
            return Err(e.into());
        }
    };

    if !outcome.success() {
        for line in &outcome.stderr_tail {
            warn!("ffmpeg: {}", line);
        }
        discard_output(&args.output, created);
        bail!(
            "ffmpeg failed with exit code {}",
            outcome
                .exit_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "none (terminated by signal)".to_string())
        );
    }

    info!("Concat operation completed successfully");
    Ok(())
}

/// Execute the plan command
pub async fn plan(container: &dyn AppContainer, args: PlanArgs) -> Result<()> {
    info!("Starting plan operation");
    let inputs = collect_inputs(&args.input)?;

    let interactor = container.concat_interactor();
    let items = interactor.prepare_items(&inputs).await;
    let plan = interactor.plan(&ConcatRequest::new(items, &args.output))?;
    let summary = plan.summary();

    match args.format {
        OutputFormat::Text => display_plan(&summary),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary).map_err(ConcatXError::from)?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&summary).map_err(ConcatXError::from)?;
            print!("{}", yaml);
        }
    }

    Ok(())
}

/// Execute the probe command
pub async fn probe(container: &dyn AppContainer, args: ProbeArgs) -> Result<()> {
    info!("Starting probe operation");
    let items = container.concat_interactor().prepare_items(&args.inputs).await;

    if args.json {
        let json = serde_json::to_string_pretty(&items)
            .context("Failed to serialize media items to JSON")?;
        println!("{}", json);
    } else {
        for item in &items {
            display_media_item(item);
        }
    }

    let invalid = items.iter().filter(|i| i.state != ItemState::Valid).count();
    if invalid > 0 {
        bail!("{} of {} files could not be probed", invalid, items.len());
    }
    Ok(())
}

/// Execute the progress command
pub fn progress(args: ProgressArgs) -> Result<()> {
    let estimate = ProgressInteractor::estimate(&args.file, args.duration)?;

    if args.json {
        let json = serde_json::to_string_pretty(&estimate)
            .context("Failed to serialize progress estimate to JSON")?;
        println!("{}", json);
    } else {
        display_estimate(&estimate);
    }
    Ok(())
}

/// Explicit inputs followed by the media files of `--dir`
fn collect_inputs(args: &InputArgs) -> Result<Vec<PathBuf>> {
    let mut inputs = args.inputs.clone();
    if let Some(dir) = &args.dir {
        let found = list_media_files(dir)?;
        info!("Found {} media files in {}", found.len(), dir.display());
        inputs.extend(found);
    }
    Ok(inputs)
}

/// Make sure the output file exists and may be written.
///
/// Returns true when the file was created here.
fn prepare_output(output: &Path, force: bool) -> Result<bool> {
    match std::fs::metadata(output) {
        Ok(meta) if meta.is_dir() => Err(ConcatXError::InvalidOutput {
            path: output.display().to_string(),
            message: "is a directory".to_string(),
        }
        .into()),
        Ok(meta) if meta.len() > 0 && !force => Err(ConcatXError::InvalidOutput {
            path: output.display().to_string(),
            message: "file exists and is not empty (use --force to overwrite)".to_string(),
        }
        .into()),
        Ok(meta) => {
            if meta.permissions().readonly() {
                bail!("Output file {} is read-only", output.display());
            }
            Ok(false)
        }
        Err(_) => {
            OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(output)
                .with_context(|| format!("Failed to create output file {}", output.display()))?;
            Ok(true)
        }
    }
}

/// Remove the output file again if this run created it
fn discard_output(output: &Path, created: bool) {
    if !created {
        return;
    }
    // best effort, the error being reported is what matters
    if let Err(e) = std::fs::remove_file(output) {
        warn!("Could not remove {}: {}", output.display(), e);
    }
}

/// Display a plan in human-readable format
fn display_plan(summary: &PlanSummary) {
    println!("Concatenation Plan");
    println!("==================");
    println!("Strategy: {}", summary.strategy);
    println!("Items: {}", summary.item_count);
    println!("Expected duration: {}", summary.expected_duration);
    println!("Output: {}", summary.output.display());
    println!();
    println!("ffmpeg {}", summary.args.join(" "));
    println!();
    println!("Scratch files are created when the job starts.");
}

/// Display one probed item in human-readable format
fn display_media_item(item: &MediaItem) {
    println!("{}", item.path.display());
    match item.state {
        ItemState::Valid => {
            println!("  Duration: {}", item.duration);
            if item.video_streams.is_empty() {
                println!("  No video streams");
            }
            for stream in &item.video_streams {
                println!(
                    "  Video #{}: {}x{} {} ({}) tbn={} tbc={} tbr={}",
                    stream.index,
                    stream.width,
                    stream.height,
                    stream.codec_name.as_deref().unwrap_or("unknown"),
                    stream.codec_tag,
                    stream.tbn,
                    stream.tbc,
                    stream.tbr
                );
            }
        }
        ItemState::Invalid | ItemState::InProgress => {
            println!(
                "  Invalid: {}",
                item.problem.as_deref().unwrap_or("not probed")
            );
        }
    }
}

/// Display a progress estimate in human-readable format
fn display_estimate(estimate: &ProgressEstimate) {
    println!("Progress: {:.1}%", estimate.percent);
    println!("Processed: {} / {}", estimate.processed, estimate.expected);
    match estimate.eta {
        Some(eta) => println!("ETA: {:.0}s", eta.as_secs_f64()),
        None => println!("ETA: unknown"),
    }
    if estimate.finished {
        println!("Finished");
    }
}
