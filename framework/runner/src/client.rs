use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use thiserror::Error;

use frame_probe_core::prelude::truncate;

use crate::config::RunConfig;

/// Statuses accepted by [ApiClient::request_json] callers that do not supply their own set.
pub const DEFAULT_EXPECTED: &[StatusCode] = &[
    StatusCode::OK,
    StatusCode::CREATED,
    StatusCode::ACCEPTED,
    StatusCode::NO_CONTENT,
];

/// Statuses accepted for stop and delete operations, which may legitimately return no content.
pub const STOP_DELETE_EXPECTED: &[StatusCode] =
    &[StatusCode::OK, StatusCode::ACCEPTED, StatusCode::NO_CONTENT];

/// Maximum characters of a response body carried into an error message.
const ERROR_BODY_LIMIT: usize = 500;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{method} {path} failed: {status} {body}")]
    UnexpectedStatus {
        method: Method,
        path: String,
        status: StatusCode,
        body: String,
    },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

/// Authenticated JSON HTTP client for the camera management API.
///
/// Configured once per run from [RunConfig]; owned by the orchestrator for the run's duration.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &RunConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.auth_token {
            let value = if config.auth_prefix.is_empty() {
                token.clone()
            } else {
                format!("{} {}", config.auth_prefix, token)
            };
            let name = HeaderName::from_bytes(config.auth_header.as_bytes())
                .map_err(|e| ApiError::Config(format!("bad auth header name: {}", e)))?;
            let value = HeaderValue::from_str(value.trim())
                .map_err(|e| ApiError::Config(format!("bad auth header value: {}", e)))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(!config.verify_tls)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn full_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Issue a request and hand back the raw response.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let mut request = self.client.request(method, self.full_url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Issue a request and decode the body, treating any status outside `expected` as an error.
    ///
    /// A 204 decodes to `None`. A success body that is not JSON is handed back as a raw text
    /// value rather than failing.
    pub async fn request_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        expected: &[StatusCode],
    ) -> Result<Option<Value>, ApiError> {
        let response = self.request(method.clone(), path, body).await?;
        let status = response.status();

        if !expected.contains(&status) {
            let body = truncate(
                &response.text().await.unwrap_or_default(),
                ERROR_BODY_LIMIT,
            );
            return Err(ApiError::UnexpectedStatus {
                method,
                path: path.to_string(),
                status,
                body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response.text().await?;
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(_) => Ok(Some(Value::String(text))),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn test_config(base_url: String) -> RunConfig {
        RunConfig {
            base_url,
            auth_token: None,
            auth_header: "Authorization".to_string(),
            auth_prefix: "Bearer".to_string(),
            verify_tls: true,
            rtsp_url: "rtsp://example/stream".to_string(),
            workflow_name: "Smoke Test Workflow".to_string(),
            camera_name: "Smoke Test Camera".to_string(),
            threshold_seconds: 2.0,
            cycles: 2,
            poll_interval_seconds: 0.05,
            request_timeout_seconds: 5.0,
            definition_path: PathBuf::from("does-not-exist.json"),
            reports_dir: PathBuf::from("reports"),
            no_progress: true,
        }
    }

    #[tokio::test]
    async fn unexpected_status_embeds_method_path_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/workflows"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let api = ApiClient::new(&test_config(server.uri())).unwrap();
        let err = api
            .request_json(Method::POST, "/workflows", None, DEFAULT_EXPECTED)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "POST /workflows failed: 500 Internal Server Error boom"
        );
    }

    #[tokio::test]
    async fn long_error_bodies_are_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workflows"))
            .respond_with(ResponseTemplate::new(502).set_body_string("x".repeat(2000)))
            .mount(&server)
            .await;

        let api = ApiClient::new(&test_config(server.uri())).unwrap();
        let err = api
            .request_json(Method::GET, "/workflows", None, DEFAULT_EXPECTED)
            .await
            .unwrap_err();

        assert!(err.to_string().ends_with("...(truncated)"));
    }

    #[tokio::test]
    async fn no_content_decodes_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/workflows/1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let api = ApiClient::new(&test_config(server.uri())).unwrap();
        let decoded = api
            .request_json(Method::DELETE, "/workflows/1", None, STOP_DELETE_EXPECTED)
            .await
            .unwrap();

        assert_eq!(decoded, None);
    }

    #[tokio::test]
    async fn non_json_success_bodies_come_back_as_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("all good"))
            .mount(&server)
            .await;

        let api = ApiClient::new(&test_config(server.uri())).unwrap();
        let decoded = api
            .request_json(Method::GET, "/status", None, DEFAULT_EXPECTED)
            .await
            .unwrap();

        assert_eq!(decoded, Some(json!("all good")));
    }

    #[tokio::test]
    async fn auth_token_is_sent_with_the_configured_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = test_config(server.uri());
        config.auth_token = Some("secret".to_string());
        let api = ApiClient::new(&config).unwrap();

        api.request_json(Method::GET, "/status", None, DEFAULT_EXPECTED)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn an_empty_prefix_sends_the_bare_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .and(header("X-Api-Key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = test_config(server.uri());
        config.auth_token = Some("secret".to_string());
        config.auth_header = "X-Api-Key".to_string();
        config.auth_prefix = String::new();
        let api = ApiClient::new(&config).unwrap();

        api.request_json(Method::GET, "/status", None, DEFAULT_EXPECTED)
            .await
            .unwrap();
    }
}
