pub mod errors;

use anyhow::{Context, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};

pub const DEFAULT_IMAGE_COUNT: u32 = 150;

pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/HybridShivam/Pokemon/master/assets/imagesHQ";

pub const DEFAULT_DOWNLOAD_DIR: &str = "pokemon_dataset";

pub const DEFAULT_PROCESSED_DIR: &str = "pokemon_processed";

/// Downloads spend nearly all their time waiting on the network.
pub const DOWNLOAD_POOL_WIDTH: usize = 20;

pub const IMAGE_EXTENSION: &str = "png";

pub const FILE_NAME_WIDTH: usize = 3;

// Pools are built per stage and dropped when the stage returns.
// Neither touches the global rayon pool.

/// Rayon pool for blocking network fetches
pub fn build_download_pool(width: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(width)
        .thread_name(|i| format!("download-worker-{}", i))
        .build()
        .context(format!("failed to build download pool with {} workers", width))
}

/// Rayon pool for CPU-intensive filter work
pub fn build_transform_pool(width: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(width)
        .thread_name(|i| format!("cpu-intensive-worker-{}", i))
        .build()
        .context(format!("failed to build transform pool with {} workers", width))
}
