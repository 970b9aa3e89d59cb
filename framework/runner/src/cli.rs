use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(about, long_about = None)]
pub struct FrameProbeCli {
    /// Base URL of the camera management API to test
    #[clap(long, env = "BASE_URL", default_value = "http://127.0.0.1:38080")]
    pub base_url: String,

    /// Static token attached to every request
    #[clap(long, env = "AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// The header that carries the auth token
    #[clap(long, env = "AUTH_HEADER", default_value = "Authorization")]
    pub auth_header: String,

    /// The prefix placed before the token, for example `Bearer`.
    ///
    /// Pass an empty string to send the bare token.
    #[clap(long, env = "AUTH_PREFIX", default_value = "Bearer")]
    pub auth_prefix: String,

    /// Verify TLS certificates when talking to an HTTPS endpoint.
    ///
    /// Accepts 1/true/yes/y/on and 0/false/no/n/off. Turn this off for self-signed endpoints.
    #[clap(long, env = "VERIFY_TLS", default_value = "true", value_parser = parse_switch)]
    pub verify_tls: bool,

    /// RTSP stream URL the camera under test will be bound to
    #[clap(long, env = "RTSP_URL")]
    pub rtsp_url: String,

    /// Name for the workflow created for this run
    #[clap(long, env = "WORKFLOW_NAME", default_value = "Smoke Test Workflow")]
    pub workflow_name: String,

    /// Name for the camera created for this run
    #[clap(long, env = "CAMERA_NAME", default_value = "Smoke Test Camera")]
    pub camera_name: String,

    /// Maximum acceptable first-frame latency in seconds; a breach fails the run
    #[clap(long, env = "THRESHOLD_SECONDS", default_value_t = 120.0)]
    pub threshold_seconds: f64,

    /// The number of start/capture/stop cycles to sample
    #[clap(long, env = "CYCLES", default_value_t = 2)]
    pub cycles: usize,

    /// Pause between capture attempts while waiting for the first frame, in seconds
    #[clap(long, env = "POLL_INTERVAL_SECONDS", default_value_t = 1.0)]
    pub poll_interval_seconds: f64,

    /// Per-request HTTP timeout in seconds
    #[clap(long, env = "REQUEST_TIMEOUT_SECONDS", default_value_t = 10.0)]
    pub request_timeout_seconds: f64,

    /// Workflow definition JSON document.
    ///
    /// A missing or empty file falls back to a minimal definition with a single image input.
    #[clap(
        long,
        env = "WORKFLOW_DEFINITION_PATH",
        default_value = "workflow_definition.json"
    )]
    pub definition_path: PathBuf,

    /// Directory the JSON and Markdown reports are written to
    #[clap(long, env = "REPORTS_DIR", default_value = "reports")]
    pub reports_dir: PathBuf,

    /// Do not show a progress spinner while waiting for the first frame.
    ///
    /// This is recommended for CI/CD environments where the spinner isn't being looked at by
    /// anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,
}

fn parse_switch(s: &str) -> anyhow::Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("Not a boolean switch: {}", other)),
    }
}
