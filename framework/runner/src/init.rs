use crate::cli::FrameProbeCli;
use clap::Parser;

/// Initialise the CLI and logging for the frame-probe runner.
pub fn init() -> FrameProbeCli {
    env_logger::init();

    FrameProbeCli::parse()
}
