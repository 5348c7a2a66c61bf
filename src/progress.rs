use crate::cli;
use crate::file_processing;
use crate::log_sink;
use crate::pipeline;
use crate::render;
use crate::snapshot;

use rayon::prelude::*;
use std::io::Write;

/// Per-run totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rendered: usize,
    pub failed: usize,
    pub rows: usize,
}

/// Loads every input file with its own pipeline, in parallel on the current Rayon
/// pool, with a progress bar over the file count.
///
/// A file that fails is reported through its log sink and counted; the run as a whole
/// only fails when no file could be rendered.
///
/// # Arguments
/// * `args` - Parsed command line.
///
/// # Returns
/// * `anyhow::Result<BatchSummary>` - Counts of rendered/failed files and total rows.
pub fn process_files(args: &cli::Args) -> anyhow::Result<BatchSummary> {
    let files = file_processing::collect_input_files(&args.input)?;
    if files.is_empty() {
        println!("⚠️ No CSV/TXT files found in {}", args.input.display());
        return Ok(BatchSummary::default());
    }

    let pb = indicatif::ProgressBar::new(files.len() as u64);
    pb.set_style(
        indicatif::ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let summary = files
        .par_iter()
        .map(|path| {
            let outcome = process_file(path, args, &pb);
            pb.inc(1);
            match outcome {
                pipeline::OpenOutcome::Rendered { rows, .. } => BatchSummary { rendered: 1, failed: 0, rows },
                pipeline::OpenOutcome::Failed(_) => BatchSummary { rendered: 0, failed: 1, rows: 0 },
            }
        })
        .reduce(BatchSummary::default, |a, b| BatchSummary {
            rendered: a.rendered + b.rendered,
            failed: a.failed + b.failed,
            rows: a.rows + b.rows,
        });
    pb.finish_with_message("done");

    if summary.rendered == 0 {
        return Err(anyhow::anyhow!("None of the {} input file(s) could be loaded", summary.failed));
    }
    Ok(summary)
}

/// Runs one file through a fresh pipeline with the renderers selected by `args`.
///
/// The file's log messages and preview are collected and written as one block with
/// the progress bar suspended, so concurrent files never interleave on stdout.
fn process_file(
    path: &std::path::Path,
    args: &cli::Args,
    pb: &indicatif::ProgressBar,
) -> pipeline::OpenOutcome {
    let mut sink = log_sink::ConsoleSink::new();
    let mut preview = (args.preview > 0).then(|| render::ConsolePreview::new(args.preview));

    let outcome = {
        let mut targets = pipeline::RenderTargets::new();
        if let Some(preview) = preview.as_mut() {
            targets.push(preview);
        }
        if let Some(output) = &args.output {
            targets.push(snapshot::SnapshotWriter::new(snapshot::snapshot_path(output, path)));
        }

        let mut pipeline = pipeline::Pipeline::new(args.projector());
        pipeline.open_file(path, &mut sink, &mut targets)
    };

    let mut block = sink.take();
    if let Some(preview) = preview.as_mut() {
        block.push_str(&preview.take_output());
    }
    pb.suspend(|| {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(block.as_bytes());
        let _ = out.flush();
    });
    outcome
}
