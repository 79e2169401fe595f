use anyhow::Result;
use pokepipe::config::PipelineConfig;
use pokepipe::setup::logger::initialize_logger;
use pokepipe::workflow::flows::run_pipeline;

fn main() -> Result<()> {
    initialize_logger()?;

    let config = PipelineConfig::from_env()?;

    // Per-item failures are reported by the stages and never change the exit status
    run_pipeline(&config);

    Ok(())
}
