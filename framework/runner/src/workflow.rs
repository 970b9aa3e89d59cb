use std::path::Path;

use anyhow::{anyhow, bail, Context};
use reqwest::Method;
use serde_json::{json, Value};

use frame_probe_core::prelude::truncate;

use crate::client::{ApiClient, DEFAULT_EXPECTED, STOP_DELETE_EXPECTED};
use crate::types::ProbeResult;

const PARSE_ERROR_LIMIT: usize = 200;

/// Minimal definition used when no definition file is provided: a single image input, no steps,
/// no outputs.
pub fn default_definition() -> Value {
    json!({
        "version": "1.0",
        "inputs": [{ "type": "WorkflowImage", "name": "image" }],
        "steps": [],
        "outputs": [],
    })
}

/// Load the workflow definition from `path`.
///
/// A missing file, empty content, or a blank parsed value (`null`, `{}`, `[]`, `""`) falls back
/// to [default_definition]. Content that does not parse as JSON is an error.
pub fn load_definition(path: &Path) -> ProbeResult<Value> {
    if !path.exists() {
        return Ok(default_definition());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(default_definition());
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) if is_blank(&value) => Ok(default_definition()),
        Ok(value) => Ok(value),
        Err(e) => bail!(
            "{} invalid JSON: {}",
            path.display(),
            truncate(&e.to_string(), PARSE_ERROR_LIMIT)
        ),
    }
}

/// Parsed content that carries no definition at all.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

/// Create a remotely-stored workflow and hand back the id the API assigned to it.
pub async fn create_workflow(api: &ApiClient, name: &str, definition: &Value) -> ProbeResult<i64> {
    let payload = json!({ "name": name, "definition": definition });
    let response = api
        .request_json(Method::POST, "/workflows", Some(&payload), DEFAULT_EXPECTED)
        .await?;

    let map = match response {
        Some(Value::Object(map)) => map,
        other => bail!("Unexpected workflow response: {:?}", other),
    };
    ["workflow_id", "id"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_i64))
        .ok_or_else(|| anyhow!("Workflow id missing in response: {:?}", map))
}

pub async fn delete_workflow(api: &ApiClient, workflow_id: i64) -> ProbeResult<()> {
    api.request_json(
        Method::DELETE,
        &format!("/workflows/{}", workflow_id),
        None,
        STOP_DELETE_EXPECTED,
    )
    .await?;
    Ok(())
}
