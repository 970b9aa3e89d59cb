use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

mod markdown;

pub use markdown::render_markdown;

/// Outcome of a single recorded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Ok,
    Fail,
    Warning,
}

/// One discrete action taken during a run.
///
/// Steps are append-only; their order in [RunReport::steps] is chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    pub status: StepStatus,
    pub duration_seconds: Option<f64>,
    pub error: Option<String>,
}

/// Per-phase durations for one operational cycle, in seconds.
///
/// The serialized field names match the report format consumers already parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub cycle: usize,
    #[serde(rename = "t_start_camera_api")]
    pub start_camera: Option<f64>,
    #[serde(rename = "t_start_monitoring_api")]
    pub start_monitoring: Option<f64>,
    #[serde(rename = "t_first_frame")]
    pub first_frame: Option<f64>,
    #[serde(rename = "t_get_token")]
    pub get_token: Option<f64>,
    #[serde(rename = "t_stop_monitoring_api")]
    pub stop_monitoring: Option<f64>,
    #[serde(rename = "t_stop_camera_api")]
    pub stop_camera: Option<f64>,
}

/// Average and maximum over a set of duration samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

/// Aggregate duration samples into [Aggregate] statistics.
///
/// An empty input produces empty statistics rather than an error.
pub fn aggregate(values: &[f64]) -> Aggregate {
    if values.is_empty() {
        return Aggregate::default();
    }
    let sum: f64 = values.iter().sum();
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    Aggregate {
        avg: Some(sum / values.len() as f64),
        max: Some(max),
    }
}

/// Summary statistics and the overall verdict for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub first_frame: Aggregate,
    pub stop_camera: Aggregate,
    pub threshold_seconds: f64,
    pub pass: bool,
}

/// The durable record of a smoke-test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// The unique run id
    ///
    /// Chosen by the runner. Unique for each run.
    pub run_id: String,
    /// The time the run finished, as a Unix timestamp in seconds
    pub timestamp: i64,
    /// The base URL of the API under test
    pub base_url: String,
    /// The RTSP source the camera was bound to
    pub rtsp_url: String,
    /// Every recorded action, in chronological order
    pub steps: Vec<StepRecord>,
    /// The configured cycle count
    pub cycles: usize,
    /// Per-phase durations for each completed cycle
    pub cycles_detail: Vec<CycleRecord>,
    pub threshold_seconds: f64,
    pub summary: Summary,
}

/// Serialize the report as pretty JSON to a writer
pub fn store_report<W: Write>(report: &RunReport, writer: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Load a report from a reader
pub fn load_report<R: Read>(reader: R) -> anyhow::Result<RunReport> {
    let reader = std::io::BufReader::new(reader);
    let report: RunReport = serde_json::from_reader(reader)?;
    Ok(report)
}

/// Write the JSON report file, creating parent directories as needed
pub fn save_report_json(report: &RunReport, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    store_report(report, &mut file)?;
    Ok(())
}

/// Write the Markdown report file, creating parent directories as needed
pub fn save_report_markdown(report: &RunReport, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_markdown(report))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn sample_report() -> RunReport {
        RunReport {
            run_id: "smoke-abc12345".to_string(),
            timestamp: 1_700_000_000,
            base_url: "http://127.0.0.1:38080".to_string(),
            rtsp_url: "rtsp://example/stream".to_string(),
            steps: vec![
                StepRecord {
                    name: "create_workflow".to_string(),
                    status: StepStatus::Ok,
                    duration_seconds: Some(0.25),
                    error: None,
                },
                StepRecord {
                    name: "cycle_1_get_token".to_string(),
                    status: StepStatus::Warning,
                    duration_seconds: Some(3.1),
                    error: Some("503 unavailable".to_string()),
                },
            ],
            cycles: 1,
            cycles_detail: vec![CycleRecord {
                cycle: 1,
                start_camera: Some(0.1),
                start_monitoring: Some(0.2),
                first_frame: Some(3.5),
                get_token: Some(3.1),
                stop_monitoring: Some(0.1),
                stop_camera: Some(0.3),
            }],
            threshold_seconds: 120.0,
            summary: Summary {
                first_frame: aggregate(&[3.5]),
                stop_camera: aggregate(&[0.3]),
                threshold_seconds: 120.0,
                pass: true,
            },
        }
    }

    #[test]
    fn aggregate_of_nothing_is_empty() {
        assert_eq!(aggregate(&[]), Aggregate::default());
    }

    #[test]
    fn aggregate_computes_avg_and_max() {
        let agg = aggregate(&[3.0, 5.0, 4.0]);
        assert_eq!(agg.avg, Some(4.0));
        assert_eq!(agg.max, Some(5.0));
    }

    #[test]
    fn report_round_trips_through_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("report.json");
        let report = sample_report();

        save_report_json(&report, &path).unwrap();
        let loaded = load_report(std::fs::File::open(&path).unwrap()).unwrap();

        assert_eq!(loaded, report);
    }

    #[test]
    fn cycle_record_serializes_with_wire_field_names() {
        let value = serde_json::to_value(&sample_report().cycles_detail[0]).unwrap();
        assert!(value.get("t_first_frame").is_some());
        assert!(value.get("t_stop_camera_api").is_some());
        assert_eq!(value.get("first_frame"), None);
    }

    #[test]
    fn step_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(StepStatus::Warning).unwrap(),
            serde_json::json!("warning")
        );
    }
}
