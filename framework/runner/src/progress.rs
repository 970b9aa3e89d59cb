use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Displays a spinner while the runner polls for the first captured frame.
pub(crate) fn start_capture_spinner(cycle: usize) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .expect("Failed to set progress style"),
    );
    pb.set_message(format!("cycle {}: waiting for first frame", cycle));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
