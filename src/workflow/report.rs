use crate::setup::banner::rule;
use crate::workflow::types::{Outcome, TimingReport};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write;

const PROGRESS_TEMPLATE: &str =
    "{msg:>12} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} img ({eta})";

pub fn stage_progress_bar(label: &str, len: usize) -> Result<ProgressBar> {
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .context("invalid progress bar template")?
        .progress_chars("=> ");
    let bar = ProgressBar::new(len as u64).with_style(style);
    bar.set_message(label.to_string());
    Ok(bar)
}

/// Log every failure collected by a stage, after its pool has drained.
pub fn log_failures(verb: &str, outcomes: &[Outcome]) -> usize {
    let mut failures = 0;
    for failure in outcomes.iter().filter_map(Outcome::failure) {
        error!("Error {} {}", verb, failure);
        failures += 1;
    }
    failures
}

/// Combined timings of both stages.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSummary {
    pub download: TimingReport,
    pub transform: TimingReport,
}

impl PipelineSummary {
    pub fn total_seconds(&self) -> f64 {
        self.download.seconds() + self.transform.seconds()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", rule());
        let _ = writeln!(out, "TIMING SUMMARY\n");
        for report in [&self.download, &self.transform] {
            let _ = writeln!(
                out,
                "  {:<16} {:>8.2} s  ({} img, {} failed, {:.2} s/img)",
                format!("{}:", report.stage),
                report.seconds(),
                report.items,
                report.failures,
                report.average_seconds()
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "  {:<16} {:>8.2} s", "Total:", self.total_seconds());
        let _ = write!(out, "{}", rule());
        out
    }
}
