//! Pipeline configuration.
//!
//! Values come from `POKEPIPE_*` environment variables (an optional `.env`
//! file is loaded first). Filter parameters use the `POKEPIPE_FILTER_*`
//! prefix. Every field has a default, so an empty environment runs the
//! stock pipeline.

use crate::common::{
    DEFAULT_BASE_URL, DEFAULT_DOWNLOAD_DIR, DEFAULT_IMAGE_COUNT, DEFAULT_PROCESSED_DIR,
    DOWNLOAD_POOL_WIDTH,
};
use anyhow::{Context, Result, bail};
use dotenv::dotenv;
use reqwest::Url;
use serde::Deserialize;
use std::{num::NonZeroUsize, path::PathBuf, thread::available_parallelism, time::Duration};

pub const ENV_PREFIX: &str = "POKEPIPE_";

pub const FILTER_ENV_PREFIX: &str = "POKEPIPE_FILTER_";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub count: u32,
    pub base_url: String,
    pub download_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub download_workers: usize,
    /// 0 means one worker per available core
    pub transform_workers: usize,
    /// 0 keeps the HTTP client's own default
    pub request_timeout_secs: u64,
    /// Leave files that are already on disk untouched instead of overwriting them
    pub skip_existing: bool,
    #[serde(skip)]
    pub filters: FilterChainConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_IMAGE_COUNT,
            base_url: DEFAULT_BASE_URL.to_string(),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            download_workers: DOWNLOAD_POOL_WIDTH,
            transform_workers: 0,
            request_timeout_secs: 0,
            skip_existing: false,
            filters: FilterChainConfig::default(),
        }
    }
}

/// Parameters of the fixed frame filter chain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterChainConfig {
    /// Gaussian sigma of the first blur
    pub primary_blur: f32,
    /// Multiplicative contrast factor, 1.0 leaves the image unchanged
    pub contrast_factor: f32,
    /// Gaussian sigma of the blur applied after inversion
    pub secondary_blur: f32,
    /// Scale of the intermediate upsampled frame
    pub resample_factor: u32,
    /// Encoder quality for lossy output formats
    pub quality: u8,
}

impl Default for FilterChainConfig {
    fn default() -> Self {
        Self {
            primary_blur: 10.0,
            contrast_factor: 1.5,
            secondary_blur: 5.0,
            resample_factor: 2,
            quality: 95,
        }
    }
}

impl PipelineConfig {
    /// Load `.env`, then read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        let mut config: PipelineConfig = envy::prefixed(ENV_PREFIX)
            .from_iter(vars.clone())
            .context("failed to parse POKEPIPE_* environment variables")?;
        config.filters = envy::prefixed(FILTER_ENV_PREFIX)
            .from_iter(vars)
            .context("failed to parse POKEPIPE_FILTER_* environment variables")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }
        let url = Url::parse(&self.base_url)
            .context(format!("base_url is not a valid URL: {}", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("base_url must use http or https, got {}", url.scheme());
        }
        self.filters.validate()
    }

    pub fn download_pool_width(&self) -> usize {
        self.download_workers.max(1)
    }

    pub fn transform_pool_width(&self) -> usize {
        if self.transform_workers == 0 {
            available_parallelism().map(NonZeroUsize::get).unwrap_or(1)
        } else {
            self.transform_workers
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

impl FilterChainConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, sigma) in [
            ("primary_blur", self.primary_blur),
            ("secondary_blur", self.secondary_blur),
        ] {
            if !sigma.is_finite() || sigma < 0.0 {
                bail!("{} must be a non-negative number, got {}", name, sigma);
            }
        }
        if !self.contrast_factor.is_finite() || self.contrast_factor < 0.0 {
            bail!(
                "contrast_factor must be a non-negative number, got {}",
                self.contrast_factor
            );
        }
        if self.resample_factor == 0 {
            bail!("resample_factor must be at least 1");
        }
        if !(1..=100).contains(&self.quality) {
            bail!("quality must be between 1 and 100, got {}", self.quality);
        }
        Ok(())
    }
}
