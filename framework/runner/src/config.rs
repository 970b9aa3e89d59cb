use std::path::PathBuf;
use std::time::Duration;

use crate::cli::FrameProbeCli;

/// Immutable configuration for a single run.
///
/// Built once from the CLI and environment, then passed by reference into the orchestrator.
/// Nothing mutates it for the duration of the run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub auth_header: String,
    pub auth_prefix: String,
    pub verify_tls: bool,
    pub rtsp_url: String,
    pub workflow_name: String,
    pub camera_name: String,
    pub threshold_seconds: f64,
    pub cycles: usize,
    pub poll_interval_seconds: f64,
    pub request_timeout_seconds: f64,
    pub definition_path: PathBuf,
    pub reports_dir: PathBuf,
    pub no_progress: bool,
}

impl RunConfig {
    /// The window the first frame must arrive within.
    pub fn threshold(&self) -> Duration {
        Duration::from_secs_f64(self.threshold_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_seconds)
    }
}

impl From<FrameProbeCli> for RunConfig {
    fn from(cli: FrameProbeCli) -> Self {
        Self {
            base_url: cli.base_url,
            auth_token: cli.auth_token,
            auth_header: cli.auth_header,
            auth_prefix: cli.auth_prefix,
            verify_tls: cli.verify_tls,
            rtsp_url: cli.rtsp_url,
            workflow_name: cli.workflow_name,
            camera_name: cli.camera_name,
            threshold_seconds: cli.threshold_seconds,
            cycles: cli.cycles,
            poll_interval_seconds: cli.poll_interval_seconds,
            request_timeout_seconds: cli.request_timeout_seconds,
            definition_path: cli.definition_path,
            reports_dir: cli.reports_dir,
            no_progress: cli.no_progress,
        }
    }
}
