use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::{Aggregate, CycleRecord, RunReport, StepStatus};

#[derive(Tabled)]
struct CycleRow {
    cycle: usize,
    start_camera: String,
    start_monitoring: String,
    first_frame: String,
    get_token: String,
    stop_monitoring: String,
    stop_camera: String,
}

impl From<&CycleRecord> for CycleRow {
    fn from(cycle: &CycleRecord) -> Self {
        Self {
            cycle: cycle.cycle,
            start_camera: duration(&cycle.start_camera),
            start_monitoring: duration(&cycle.start_monitoring),
            first_frame: duration(&cycle.first_frame),
            get_token: duration(&cycle.get_token),
            stop_monitoring: duration(&cycle.stop_monitoring),
            stop_camera: duration(&cycle.stop_camera),
        }
    }
}

fn duration(value: &Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.3}s", value),
        None => "-".to_string(),
    }
}

fn aggregate_line(name: &str, aggregate: &Aggregate) -> String {
    format!(
        "- {}: avg {}, max {}",
        name,
        duration(&aggregate.avg),
        duration(&aggregate.max)
    )
}

/// Render the report as Markdown.
pub fn render_markdown(report: &RunReport) -> String {
    let mut lines = Vec::new();
    lines.push("# Smoke Test Report".to_string());
    lines.push(String::new());
    lines.push(format!("- run_id: {}", report.run_id));
    lines.push(format!("- base_url: {}", report.base_url));
    lines.push(format!("- rtsp_url: {}", report.rtsp_url));
    lines.push(format!("- threshold_seconds: {}", report.threshold_seconds));
    lines.push(format!("- cycles: {}", report.cycles));
    lines.push(String::new());

    lines.push("## Steps".to_string());
    for step in &report.steps {
        let status = match step.status {
            StepStatus::Ok => "ok",
            StepStatus::Fail => "fail",
            StepStatus::Warning => "warning",
        };
        let mut line = match step.duration_seconds {
            Some(seconds) => format!("- {}: {}, {:.3}s", step.name, status, seconds),
            None => format!("- {}: {}", step.name, status),
        };
        if let Some(error) = &step.error {
            line.push_str(&format!(" ({})", error));
        }
        lines.push(line);
    }
    lines.push(String::new());

    if !report.cycles_detail.is_empty() {
        lines.push("## Cycles".to_string());
        let rows = report
            .cycles_detail
            .iter()
            .map(CycleRow::from)
            .collect::<Vec<_>>();
        let mut table = Table::new(&rows);
        table.with(Style::markdown());
        lines.push(table.to_string());
        lines.push(String::new());
    }

    lines.push("## Summary".to_string());
    lines.push(aggregate_line("first_frame", &report.summary.first_frame));
    lines.push(aggregate_line("stop_camera", &report.summary.stop_camera));
    lines.push(format!(
        "- threshold_seconds: {}",
        report.summary.threshold_seconds
    ));
    lines.push(format!("- pass: {}", report.summary.pass));
    lines.push(String::new());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_report;

    #[test]
    fn renders_header_steps_and_summary() {
        let rendered = render_markdown(&sample_report());

        assert!(rendered.starts_with("# Smoke Test Report"));
        assert!(rendered.contains("- create_workflow: ok, 0.250s"));
        assert!(rendered.contains("- cycle_1_get_token: warning, 3.100s (503 unavailable)"));
        assert!(rendered.contains("- pass: true"));
    }

    #[test]
    fn renders_one_table_row_per_cycle() {
        let rendered = render_markdown(&sample_report());

        assert!(rendered.contains("## Cycles"));
        assert!(rendered.contains("3.500s"));
    }

    #[test]
    fn skips_the_cycle_table_when_no_cycle_completed() {
        let mut report = sample_report();
        report.cycles_detail.clear();

        let rendered = render_markdown(&report);

        assert!(!rendered.contains("## Cycles"));
        assert!(rendered.contains("## Summary"));
    }
}
