use anyhow::{anyhow, bail};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use frame_probe_core::prelude::truncate;

use crate::client::{ApiClient, DEFAULT_EXPECTED, STOP_DELETE_EXPECTED};
use crate::types::ProbeResult;

const WARNING_BODY_LIMIT: usize = 300;

/// A raw capture response.
///
/// Success for a capture is "200 with a non-empty body", not any particular JSON shape, so the
/// status and body bytes are kept as-is.
#[derive(Debug)]
pub struct CaptureResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl CaptureResponse {
    /// Whether this response carries a usable first frame.
    pub fn is_first_frame(&self) -> bool {
        self.status == StatusCode::OK && !self.body.is_empty()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Register a camera bound to `stream_url` and `workflow_id`, handing back its assigned id.
pub async fn create_camera(
    api: &ApiClient,
    name: &str,
    stream_url: &str,
    workflow_id: i64,
) -> ProbeResult<i64> {
    let payload = json!({
        "name": name,
        "stream_url": stream_url,
        "workflow_id": workflow_id,
    });
    let response = api
        .request_json(Method::POST, "/cameras", Some(&payload), DEFAULT_EXPECTED)
        .await?;

    let map = match response {
        Some(Value::Object(map)) => map,
        other => bail!("Unexpected camera response: {:?}", other),
    };
    ["id", "camera_id", "cameraId"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_i64))
        .ok_or_else(|| anyhow!("Camera id missing in response: {:?}", map))
}

/// Bulk-assign `workflow_id` to the camera.
///
/// A non-success status is not fatal: it is handed back as a warning string for the caller to
/// record, and `None` means the assignment went through.
pub async fn assign_workflow(
    api: &ApiClient,
    camera_id: i64,
    workflow_id: i64,
) -> ProbeResult<Option<String>> {
    let payload = json!({ "camera_ids": [camera_id], "workflow_id": workflow_id });
    let response = api
        .request(Method::POST, "/cameras/assign-workflow", Some(&payload))
        .await?;

    let status = response.status();
    if !DEFAULT_EXPECTED.contains(&status) {
        let body = truncate(&response.text().await.unwrap_or_default(), WARNING_BODY_LIMIT);
        return Ok(Some(format!("{} {}", status.as_u16(), body)));
    }
    Ok(None)
}

pub async fn start_camera(api: &ApiClient, camera_id: i64) -> ProbeResult<()> {
    api.request_json(
        Method::POST,
        &format!("/cameras/{}/start", camera_id),
        None,
        DEFAULT_EXPECTED,
    )
    .await?;
    Ok(())
}

/// Stop the camera, optionally forcing its monitoring off in the same call.
pub async fn stop_camera(api: &ApiClient, camera_id: i64, stop_monitoring: bool) -> ProbeResult<()> {
    let payload = json!({ "stop_monitoring": stop_monitoring });
    api.request_json(
        Method::POST,
        &format!("/cameras/{}/stop", camera_id),
        Some(&payload),
        STOP_DELETE_EXPECTED,
    )
    .await?;
    Ok(())
}

pub async fn start_monitoring(api: &ApiClient, camera_id: i64) -> ProbeResult<()> {
    api.request_json(
        Method::POST,
        &format!("/cameras/{}/start-monitoring", camera_id),
        None,
        DEFAULT_EXPECTED,
    )
    .await?;
    Ok(())
}

pub async fn stop_monitoring(api: &ApiClient, camera_id: i64) -> ProbeResult<()> {
    api.request_json(
        Method::POST,
        &format!("/cameras/{}/stop-monitoring", camera_id),
        None,
        STOP_DELETE_EXPECTED,
    )
    .await?;
    Ok(())
}

/// Fetch one frame from the camera, keeping the response raw.
pub async fn capture(api: &ApiClient, camera_id: i64) -> ProbeResult<CaptureResponse> {
    let response = api
        .request(Method::GET, &format!("/cameras/{}/capture", camera_id), None)
        .await?;
    let status = response.status();
    let body = response.bytes().await?.to_vec();
    Ok(CaptureResponse { status, body })
}

/// Request a viewer token for the camera.
pub async fn get_token(
    api: &ApiClient,
    camera_id: i64,
    viewer_identity: &str,
) -> ProbeResult<Option<Value>> {
    let payload = json!({ "viewer_identity": viewer_identity });
    let token = api
        .request_json(
            Method::POST,
            &format!("/cameras/{}/token", camera_id),
            Some(&payload),
            DEFAULT_EXPECTED,
        )
        .await?;
    Ok(token)
}

pub async fn delete_camera(api: &ApiClient, camera_id: i64) -> ProbeResult<()> {
    api.request_json(
        Method::DELETE,
        &format!("/cameras/{}", camera_id),
        None,
        STOP_DELETE_EXPECTED,
    )
    .await?;
    Ok(())
}
