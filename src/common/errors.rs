//! Task-level error taxonomy.
//!
//! Every variant is caught at the task boundary and turned into an
//! [`Outcome::Failure`](crate::workflow::types::Outcome). Nothing here ever
//! propagates out of a coordinator.

use reqwest::StatusCode;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    /// Connection failure, timeout or a body that could not be read
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("server responded with {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("filter chain failed: {0}")]
    Filter(String),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl TaskError {
    pub fn read(path: &Path, source: std::io::Error) -> Self {
        TaskError::Io {
            context: format!("failed to read {}", path.display()),
            source,
        }
    }

    pub fn write(path: &Path, source: std::io::Error) -> Self {
        TaskError::Io {
            context: format!("failed to write {}", path.display()),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_status_message_names_code_and_url() {
        let error = TaskError::Status {
            status: StatusCode::NOT_FOUND,
            url: "http://localhost/999.png".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("999.png"));
    }

    #[test]
    fn test_io_message_keeps_path_and_cause() {
        let error = TaskError::write(
            Path::new("out/001.png"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(error.to_string(), "failed to write out/001.png: denied");
    }
}
