use crate::common::{IMAGE_EXTENSION, build_download_pool, build_transform_pool};
use crate::config::PipelineConfig;
use crate::setup::banner::print_banner;
use crate::utils::{ensure_directory, list_files_with_extension};
use crate::workflow::processors::{fetch::Fetcher, image::transform};
use crate::workflow::report::{PipelineSummary, log_failures, stage_progress_bar};
use crate::workflow::types::{Outcome, TimingReport, TransformTask};
use anyhow::{Context, Result};
use rayon::ThreadPool;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

/// Run `worker` once per task on `pool`, with a single join point.
///
/// Returns the outcomes in task order; completion order is unspecified.
fn run_on_pool<T, F>(pool: &ThreadPool, label: &str, tasks: &[T], worker: F) -> Result<Vec<Outcome>>
where
    T: Sync,
    F: Fn(&T) -> Outcome + Sync,
{
    let bar = stage_progress_bar(label, tasks.len())?;
    let outcomes = pool.install(|| {
        tasks
            .par_iter()
            .map(|task| {
                let outcome = worker(task);
                bar.inc(1);
                outcome
            })
            .collect::<Vec<_>>()
    });
    bar.finish_and_clear();
    Ok(outcomes)
}

/// Download identifiers `1..=count` into `destination`.
pub fn download_all(
    count: u32,
    destination: &Path,
    config: &PipelineConfig,
) -> Result<TimingReport> {
    ensure_directory(destination)?;

    let width = config.download_pool_width();
    info!("Downloading {} images with {} workers", count, width);

    let fetcher = Fetcher::new(config)?;
    let pool = build_download_pool(width)?;
    let ids: Vec<u32> = (1..=count).collect();

    let start_time = Instant::now();
    let outcomes = run_on_pool(&pool, "Downloading", &ids, |&id| {
        fetcher.fetch(id, destination)
    })?;
    let elapsed = start_time.elapsed();

    let report = TimingReport {
        stage: "Download",
        elapsed,
        items: outcomes.len(),
        failures: log_failures("downloading", &outcomes),
    };
    info!(
        duration = &*format!("{:?}", elapsed);
        "Download completed: {} ok, {} failed, average {:.2} s/img",
        report.succeeded(),
        report.failures,
        report.average_seconds()
    );
    Ok(report)
}

/// Filter every `.png` in `source` into `destination`.
pub fn transform_all(
    source: &Path,
    destination: &Path,
    config: &PipelineConfig,
) -> Result<TimingReport> {
    ensure_directory(destination)?;

    let tasks: Vec<TransformTask> = list_files_with_extension(source, IMAGE_EXTENSION)
        .context(format!("failed to enumerate images in {:?}", source))?
        .into_iter()
        .map(TransformTask::new)
        .collect();

    let width = config.transform_pool_width();
    info!("Processing {} images with {} workers", tasks.len(), width);

    let pool = build_transform_pool(width)?;

    let start_time = Instant::now();
    let outcomes = run_on_pool(&pool, "Processing", &tasks, |task| {
        transform(
            task,
            source,
            destination,
            &config.filters,
            config.skip_existing,
        )
    })?;
    let elapsed = start_time.elapsed();

    let report = TimingReport {
        stage: "Processing",
        elapsed,
        items: outcomes.len(),
        failures: log_failures("processing", &outcomes),
    };
    info!(
        duration = &*format!("{:?}", elapsed);
        "Processing completed: {} ok, {} failed, average {:.2} s/img",
        report.succeeded(),
        report.failures,
        report.average_seconds()
    );
    Ok(report)
}

/// Download, then transform what was downloaded, then print the summary.
///
/// A stage that cannot start is logged and counted as empty; the summary is
/// always printed.
pub fn run_pipeline(config: &PipelineConfig) -> PipelineSummary {
    print_banner();

    let download = download_all(config.count, &config.download_dir, config)
        .unwrap_or_else(|e| {
            error!("Download stage failed: {:?}", e);
            TimingReport::empty("Download")
        });

    let transform = transform_all(&config.download_dir, &config.processed_dir, config)
        .unwrap_or_else(|e| {
            error!("Processing stage failed: {:?}", e);
            TimingReport::empty("Processing")
        });

    let summary = PipelineSummary {
        download,
        transform,
    };
    println!("{}", summary.render());
    summary
}
