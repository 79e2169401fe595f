//! Fetcher - downloads one image by identifier
//!
//! Includes:
//! - HTTP client construction
//! - URL / file name derivation (via `ImageTask`)
//! - Status checking and body persistence

use crate::{
    common::errors::TaskError,
    config::PipelineConfig,
    utils::{is_non_empty_file, write_atomically},
    workflow::types::{ImageTask, Outcome},
};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::path::Path;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct Fetcher {
    client: Client,
    base_url: String,
    skip_existing: bool,
}

impl Fetcher {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            skip_existing: config.skip_existing,
        })
    }

    /// Download `base_url/NNN.png` into `destination`.
    ///
    /// The destination directory must already exist.
    pub fn fetch(&self, id: u32, destination: &Path) -> Outcome {
        let task = ImageTask::new(id, &self.base_url);
        let result = self.fetch_task(&task, destination);
        Outcome::from_result(&task.file_name, result)
    }

    fn fetch_task(&self, task: &ImageTask, destination: &Path) -> Result<(), TaskError> {
        let target = destination.join(&task.file_name);

        if self.skip_existing && is_non_empty_file(&target) {
            debug!("Skipping {}, already downloaded", task.file_name);
            return Ok(());
        }

        let response = self
            .client
            .get(&task.url)
            .send()
            .map_err(TaskError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::Status {
                status,
                url: task.url.clone(),
            });
        }

        let body = response.bytes().map_err(TaskError::Network)?;
        write_atomically(&target, &body).map_err(|e| TaskError::write(&target, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::Cursor};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn one_pixel_png() -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image::RgbImage::from_pixel(1, 1, image::Rgb([255, 204, 0]))
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn config_for(server: &MockServer) -> PipelineConfig {
        PipelineConfig {
            base_url: server.uri(),
            ..PipelineConfig::default()
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_writes_body_to_destination() {
        let server = MockServer::start().await;
        let png = one_pixel_png();
        Mock::given(method("GET"))
            .and(path("/001.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().to_path_buf();
        let config = config_for(&server);

        let outcome = tokio::task::spawn_blocking(move || {
            Fetcher::new(&config).unwrap().fetch(1, &destination)
        })
        .await
        .unwrap();

        assert!(outcome.is_success(), "unexpected failure: {:?}", outcome);
        assert_eq!(fs::read(dir.path().join("001.png")).unwrap(), png);
        assert!(!dir.path().join(".001.png.part").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_failed_write_leaves_no_file_behind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/005.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"body".to_vec()))
            .mount(&server)
            .await;

        // A directory in the way makes the final rename fail after the body was written
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("005.png")).unwrap();
        fs::write(dir.path().join("005.png").join("keep"), b"x").unwrap();
        let destination = dir.path().to_path_buf();
        let config = config_for(&server);

        let outcome = tokio::task::spawn_blocking(move || {
            Fetcher::new(&config).unwrap().fetch(5, &destination)
        })
        .await
        .unwrap();

        let failure = outcome.failure().expect("blocked target must fail");
        assert_eq!(failure.file_name, "005.png");
        assert!(matches!(failure.error, TaskError::Io { .. }));
        assert!(!dir.path().join("005.png").is_file());
        assert!(!dir.path().join(".005.png.part").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_not_found_reports_failure_and_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/999.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().to_path_buf();
        let config = config_for(&server);

        let outcome = tokio::task::spawn_blocking(move || {
            Fetcher::new(&config).unwrap().fetch(999, &destination)
        })
        .await
        .unwrap();

        let failure = outcome.failure().expect("404 must be a failure");
        let message = failure.to_string();
        assert!(message.contains("999"));
        assert!(message.contains("404"));
        assert!(matches!(failure.error, TaskError::Status { .. }));
        assert!(!dir.path().join("999.png").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_overwrites_existing_file_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/002.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("002.png"), b"stale").unwrap();
        let destination = dir.path().to_path_buf();
        let config = config_for(&server);

        let outcome = tokio::task::spawn_blocking(move || {
            Fetcher::new(&config).unwrap().fetch(2, &destination)
        })
        .await
        .unwrap();

        assert!(outcome.is_success());
        assert_eq!(fs::read(dir.path().join("002.png")).unwrap(), b"fresh");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_skip_existing_leaves_file_alone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("003.png"), b"kept").unwrap();
        let destination = dir.path().to_path_buf();
        let config = PipelineConfig {
            skip_existing: true,
            ..config_for(&server)
        };

        let outcome = tokio::task::spawn_blocking(move || {
            Fetcher::new(&config).unwrap().fetch(3, &destination)
        })
        .await
        .unwrap();

        assert!(outcome.is_success());
        assert_eq!(fs::read(dir.path().join("003.png")).unwrap(), b"kept");
    }

    #[test]
    fn test_fetch_connection_refused_is_network_failure() {
        // Bind then drop a listener so the port is known to be closed
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            base_url: format!("http://127.0.0.1:{}", port),
            request_timeout_secs: 5,
            ..PipelineConfig::default()
        };

        let outcome = Fetcher::new(&config).unwrap().fetch(4, dir.path());

        let failure = outcome.failure().expect("closed port must fail");
        assert_eq!(failure.file_name, "004.png");
        assert!(matches!(failure.error, TaskError::Network(_)));
        assert!(!dir.path().join("004.png").exists());
    }
}
