mod camera;
mod cli;
mod client;
mod config;
mod init;
mod progress;
mod run;
mod types;
mod workflow;

pub mod prelude {
    pub use crate::camera::{
        assign_workflow, capture, create_camera, delete_camera, get_token, start_camera,
        start_monitoring, stop_camera, stop_monitoring, CaptureResponse,
    };
    pub use crate::cli::FrameProbeCli;
    pub use crate::client::{ApiClient, ApiError};
    pub use crate::config::RunConfig;
    pub use crate::init::init;
    pub use crate::run::run;
    pub use crate::types::ProbeResult;
    pub use crate::workflow::{
        create_workflow, default_definition, delete_workflow, load_definition,
    };
    pub use frame_probe_report_model::{
        load_report, RunReport, StepRecord, StepStatus, Summary,
    };
}
