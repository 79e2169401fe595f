use crate::common::{FILE_NAME_WIDTH, IMAGE_EXTENSION, errors::TaskError};
use std::{fmt, time::Duration};

// ────────────────────────────────────────────────────────────────
// Tasks
// ────────────────────────────────────────────────────────────────

/// One download attempt, derived entirely from its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTask {
    pub id: u32,
    pub file_name: String,
    pub url: String,
}

impl ImageTask {
    pub fn new(id: u32, base_url: &str) -> Self {
        let file_name = image_file_name(id);
        let url = format!("{}/{}", base_url.trim_end_matches('/'), file_name);
        Self { id, file_name, url }
    }
}

/// `7` becomes `007.png`; identifiers wider than the padding keep every digit.
pub fn image_file_name(id: u32) -> String {
    format!("{:0width$}.{}", id, IMAGE_EXTENSION, width = FILE_NAME_WIDTH)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformTask {
    pub file_name: String,
}

impl TransformTask {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

// ────────────────────────────────────────────────────────────────
// Outcome
// ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct TaskFailure {
    pub file_name: String,
    pub error: TaskError,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file_name, self.error)
    }
}

/// Result of exactly one task. Produced by a worker, consumed by its coordinator.
#[derive(Debug)]
pub enum Outcome {
    Success,
    Failure(TaskFailure),
}

impl Outcome {
    pub fn from_result(file_name: &str, result: Result<(), TaskError>) -> Self {
        match result {
            Ok(()) => Outcome::Success,
            Err(error) => Outcome::Failure(TaskFailure {
                file_name: file_name.to_string(),
                error,
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn failure(&self) -> Option<&TaskFailure> {
        match self {
            Outcome::Success => None,
            Outcome::Failure(failure) => Some(failure),
        }
    }
}

// ────────────────────────────────────────────────────────────────
// Timing
// ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TimingReport {
    /// Label shown in the summary
    pub stage: &'static str,
    pub elapsed: Duration,
    pub items: usize,
    pub failures: usize,
}

impl TimingReport {
    pub fn empty(stage: &'static str) -> Self {
        Self {
            stage,
            elapsed: Duration::ZERO,
            items: 0,
            failures: 0,
        }
    }

    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Seconds per item; zero when the stage had nothing to do
    pub fn average_seconds(&self) -> f64 {
        if self.items == 0 {
            0.0
        } else {
            self.seconds() / self.items as f64
        }
    }

    pub fn succeeded(&self) -> usize {
        self.items - self.failures
    }
}
