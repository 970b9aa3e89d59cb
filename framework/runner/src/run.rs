use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};

use frame_probe_core::prelude::{poll_until, truncate, PollOutcome};
use frame_probe_report_model::{
    aggregate, save_report_json, save_report_markdown, CycleRecord, RunReport, StepRecord,
    StepStatus, Summary,
};

use crate::camera::{
    assign_workflow, capture, create_camera, delete_camera, get_token, start_camera,
    start_monitoring, stop_camera, stop_monitoring, CaptureResponse,
};
use crate::client::ApiClient;
use crate::config::RunConfig;
use crate::progress::start_capture_spinner;
use crate::types::ProbeResult;
use crate::workflow::{create_workflow, delete_workflow, load_definition};

const TOKEN_ATTEMPTS: u32 = 3;
const TOKEN_RETRY_PAUSE: Duration = Duration::from_secs(1);
const VIEWER_IDENTITY: &str = "smoke-test";
const CAPTURE_BODY_LIMIT: usize = 300;

/// Mutable state accumulated over a run: recorded steps, completed cycle details, the latency
/// samples feeding the summary, and the ids of whatever got provisioned so far.
struct RunState {
    steps: Vec<StepRecord>,
    cycles_detail: Vec<CycleRecord>,
    first_frame_times: Vec<f64>,
    stop_camera_times: Vec<f64>,
    workflow_id: Option<i64>,
    camera_id: Option<i64>,
}

impl RunState {
    fn new() -> Self {
        Self {
            steps: Vec::new(),
            cycles_detail: Vec::new(),
            first_frame_times: Vec::new(),
            stop_camera_times: Vec::new(),
            workflow_id: None,
            camera_id: None,
        }
    }

    fn record(
        &mut self,
        name: impl Into<String>,
        status: StepStatus,
        duration_seconds: Option<f64>,
        error: Option<String>,
    ) {
        let name = name.into();
        match status {
            StepStatus::Ok => log::info!("[OK] {}", name),
            StepStatus::Warning => log::warn!(
                "[WARN] {}: {}",
                name,
                error.as_deref().unwrap_or("unknown")
            ),
            StepStatus::Fail => log::error!(
                "[FAIL] {}: {}",
                name,
                error.as_deref().unwrap_or("unknown")
            ),
        }
        self.steps.push(StepRecord {
            name,
            status,
            duration_seconds,
            error,
        });
    }
}

fn elapsed(started: Instant) -> f64 {
    started.elapsed().as_secs_f64()
}

/// Execute a full smoke-test run: setup, cycles, summary, guaranteed cleanup, report files.
///
/// Cleanup of provisioned resources always runs, whatever the main sequence did. The report pair
/// is written on every exit path so failed steps stay on record, and only then is any fatal error
/// propagated to the caller.
pub async fn run(config: &RunConfig) -> ProbeResult<RunReport> {
    let run_id = format!("smoke-{}", nanoid::nanoid!(8));
    log::info!("Run id: {}", run_id);

    let api = ApiClient::new(config)?;
    let mut state = RunState::new();

    let outcome = execute(&api, config, &mut state).await;

    cleanup(&api, &state).await;

    let report = build_report(run_id, config, state);
    // A fatal run error outranks a failure to write the report files
    let written = write_reports(&report, &config.reports_dir);

    outcome?;
    written?;
    Ok(report)
}

/// The fallible main sequence. Everything provisioned before a failure is noted in `state` so
/// that [cleanup] can release it.
async fn execute(api: &ApiClient, config: &RunConfig, state: &mut RunState) -> ProbeResult<()> {
    // Create workflow
    let started = Instant::now();
    let definition = load_definition(&config.definition_path)?;
    let workflow_id = match create_workflow(api, &config.workflow_name, &definition).await {
        Ok(id) => {
            state.record("create_workflow", StepStatus::Ok, Some(elapsed(started)), None);
            log::info!("workflow created id={}", id);
            id
        }
        Err(e) => {
            state.record(
                "create_workflow",
                StepStatus::Fail,
                Some(elapsed(started)),
                Some(e.to_string()),
            );
            return Err(e);
        }
    };
    state.workflow_id = Some(workflow_id);

    // Create camera
    let started = Instant::now();
    let camera_id =
        match create_camera(api, &config.camera_name, &config.rtsp_url, workflow_id).await {
            Ok(id) => {
                state.record("create_camera", StepStatus::Ok, Some(elapsed(started)), None);
                log::info!("camera created id={}", id);
                id
            }
            Err(e) => {
                state.record(
                    "create_camera",
                    StepStatus::Fail,
                    Some(elapsed(started)),
                    Some(e.to_string()),
                );
                return Err(e);
            }
        };
    state.camera_id = Some(camera_id);

    // Optional workflow assignment; never fatal
    let started = Instant::now();
    let assign_warning = match assign_workflow(api, camera_id, workflow_id).await {
        Ok(warning) => warning,
        Err(e) => Some(e.to_string()),
    };
    let status = if assign_warning.is_some() {
        StepStatus::Warning
    } else {
        StepStatus::Ok
    };
    state.record("assign_workflow", status, Some(elapsed(started)), assign_warning);

    for cycle in 1..=config.cycles {
        run_cycle(api, config, camera_id, cycle, state).await?;
    }

    Ok(())
}

async fn run_cycle(
    api: &ApiClient,
    config: &RunConfig,
    camera_id: i64,
    cycle: usize,
    state: &mut RunState,
) -> ProbeResult<()> {
    log::info!("[CYCLE {}] start", cycle);
    let mut record = CycleRecord {
        cycle,
        ..Default::default()
    };

    let started = Instant::now();
    start_camera(api, camera_id)
        .await
        .with_context(|| format!("Failed to start camera in cycle {}", cycle))?;
    record.start_camera = Some(elapsed(started));

    let started = Instant::now();
    start_monitoring(api, camera_id)
        .await
        .with_context(|| format!("Failed to start monitoring in cycle {}", cycle))?;
    record.start_monitoring = Some(elapsed(started));

    // First frame, polled up to the threshold window
    let started = Instant::now();
    let spinner = (!config.no_progress).then(|| start_capture_spinner(cycle));
    let outcome = poll_until(
        || capture(api, camera_id),
        |result| matches!(result, Ok(frame) if frame.is_first_frame()),
        config.threshold(),
        config.poll_interval(),
    )
    .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let first_frame = elapsed(started);
    record.first_frame = Some(first_frame);

    let step = format!("cycle_{}_first_frame", cycle);
    if !outcome.satisfied {
        let reason = describe_capture_failure(&outcome);
        state.record(step, StepStatus::Fail, Some(first_frame), Some(reason.clone()));
        bail!("First frame failed in cycle {}: {}", cycle, reason);
    }
    if first_frame > config.threshold_seconds {
        let reason = format!("exceeded threshold {}s", config.threshold_seconds);
        state.record(step, StepStatus::Fail, Some(first_frame), Some(reason));
        bail!(
            "First frame exceeded threshold {}s in cycle {}",
            config.threshold_seconds,
            cycle
        );
    }
    state.record(step, StepStatus::Ok, Some(first_frame), None);
    state.first_frame_times.push(first_frame);

    // Viewer token, bounded retry; exhaustion degrades to a warning
    let started = Instant::now();
    let mut token_error = None;
    for attempt in 1..=TOKEN_ATTEMPTS {
        match get_token(api, camera_id, VIEWER_IDENTITY).await {
            Ok(_) => {
                token_error = None;
                break;
            }
            Err(e) => {
                log::debug!("Token attempt {} failed in cycle {}: {:#}", attempt, cycle, e);
                token_error = Some(e.to_string());
                tokio::time::sleep(TOKEN_RETRY_PAUSE).await;
            }
        }
    }
    let token_duration = elapsed(started);
    record.get_token = Some(token_duration);
    let step = format!("cycle_{}_get_token", cycle);
    match token_error {
        Some(error) => state.record(step, StepStatus::Warning, Some(token_duration), Some(error)),
        None => state.record(step, StepStatus::Ok, Some(token_duration), None),
    }

    let started = Instant::now();
    stop_monitoring(api, camera_id)
        .await
        .with_context(|| format!("Failed to stop monitoring in cycle {}", cycle))?;
    record.stop_monitoring = Some(elapsed(started));

    // Monitoring was already stopped above, so don't force it here
    let started = Instant::now();
    stop_camera(api, camera_id, false)
        .await
        .with_context(|| format!("Failed to stop camera in cycle {}", cycle))?;
    let stop_duration = elapsed(started);
    record.stop_camera = Some(stop_duration);
    state.stop_camera_times.push(stop_duration);

    state.cycles_detail.push(record);
    log::info!("[CYCLE {}] done", cycle);
    Ok(())
}

/// Describe why the first-frame poll came up empty, distinguishing a bad final response from a
/// window that closed before any attempt completed.
fn describe_capture_failure(outcome: &PollOutcome<ProbeResult<CaptureResponse>>) -> String {
    match &outcome.last {
        None => "no capture attempt completed within the threshold window".to_string(),
        Some(Err(e)) => format!(
            "last capture attempt errored after {} attempts: {}",
            outcome.attempts, e
        ),
        Some(Ok(frame)) => format!(
            "timeout or bad response after {} attempts: {} {}",
            outcome.attempts,
            frame.status,
            truncate(&frame.body_text(), CAPTURE_BODY_LIMIT)
        ),
    }
}

/// Best-effort release of whatever the run provisioned, in a fixed order. Each action is
/// isolated so one failure cannot block the next, and nothing here escalates.
async fn cleanup(api: &ApiClient, state: &RunState) {
    if let Some(camera_id) = state.camera_id {
        if let Err(e) = stop_monitoring(api, camera_id).await {
            log::warn!("Cleanup stop_monitoring failed: {:#}", e);
        }
        if let Err(e) = stop_camera(api, camera_id, true).await {
            log::warn!("Cleanup stop_camera failed: {:#}", e);
        }
        if let Err(e) = delete_camera(api, camera_id).await {
            log::warn!("Cleanup delete_camera failed: {:#}", e);
        }
    }
    if let Some(workflow_id) = state.workflow_id {
        if let Err(e) = delete_workflow(api, workflow_id).await {
            log::warn!("Cleanup delete_workflow failed: {:#}", e);
        }
    }
}

fn build_report(run_id: String, config: &RunConfig, state: RunState) -> RunReport {
    let completed = !state
        .steps
        .iter()
        .any(|step| step.status == StepStatus::Fail);
    let pass = completed
        && state
            .first_frame_times
            .iter()
            .all(|t| *t <= config.threshold_seconds);

    let summary = Summary {
        first_frame: aggregate(&state.first_frame_times),
        stop_camera: aggregate(&state.stop_camera_times),
        threshold_seconds: config.threshold_seconds,
        pass,
    };

    RunReport {
        run_id,
        timestamp: chrono::Utc::now().timestamp(),
        base_url: config.base_url.clone(),
        rtsp_url: config.rtsp_url.clone(),
        steps: state.steps,
        cycles: config.cycles,
        cycles_detail: state.cycles_detail,
        threshold_seconds: config.threshold_seconds,
        summary,
    }
}

fn write_reports(report: &RunReport, reports_dir: &Path) -> ProbeResult<()> {
    save_report_json(report, &reports_dir.join("report.json"))?;
    save_report_markdown(report, &reports_dir.join("report.md"))?;
    log::info!("Report written to {}", reports_dir.display());
    Ok(())
}
