//! Common test utilities
//!
//! Shared setup for integration and Pact tests: rustls crypto provider
//! initialization, an in-process mock of the imgix sources API that records
//! every request, and record fixtures.

#![allow(dead_code, reason = "each test binary uses a different subset of helpers")]

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use imgix_source_provider::client::{Cancellation, ImgixClient};
use imgix_source_provider::config::ProviderConfig;
use imgix_source_provider::resource::{DeploymentModel, SourceModel, SourceResource};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
///
/// Uses a `Once` so it's only installed once per test binary.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        rustls::crypto::ring::default_provider()
            .install_default()
            .expect("Failed to install rustls crypto provider");
    });
}

/// A request as seen by the mock API
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path relative to the API root, e.g. `/sources/42`
    pub path: String,
    /// Raw (still percent-encoded) query string
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responses: Arc<Mutex<VecDeque<(u16, String)>>>,
}

/// In-process imgix API mock serving scripted responses in order
pub struct MockApi {
    endpoint: String,
    state: MockState,
}

impl MockApi {
    /// Start a mock that answers requests with `responses`, first to last
    pub async fn start(responses: Vec<(u16, Value)>) -> Self {
        Self::start_raw(
            responses
                .into_iter()
                .map(|(status, body)| (status, body.to_string()))
                .collect(),
        )
        .await
    }

    /// Start a mock with verbatim response bodies
    pub async fn start_raw(responses: Vec<(u16, String)>) -> Self {
        let state = MockState {
            requests: Arc::default(),
            responses: Arc::new(Mutex::new(responses.into())),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Failed to read mock address");
        let app = Router::new().fallback(record).with_state(state.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("mock imgix API stopped: {e}");
            }
        });

        Self {
            endpoint: format!("http://{addr}/api/v1"),
            state,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &Method) -> usize {
        self.requests().iter().filter(|r| r.method == *method).count()
    }

    /// `METHOD path` of every request, for sequence assertions
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    pub fn client(&self) -> ImgixClient {
        ImgixClient::from_config(&test_config(&self.endpoint), Cancellation::new())
            .expect("Failed to build client")
    }

    /// Client whose requests are spaced at least `interval` apart
    pub fn throttled_client(&self, interval: Duration) -> ImgixClient {
        let config = ProviderConfig {
            rate_limit_interval: interval,
            ..test_config(&self.endpoint)
        };
        ImgixClient::from_config(&config, Cancellation::new()).expect("Failed to build client")
    }

    pub fn resource(&self, upsert_by_name: bool) -> SourceResource {
        SourceResource::new(self.client(), upsert_by_name)
    }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: uri
            .path()
            .strip_prefix("/api/v1")
            .unwrap_or(uri.path())
            .to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: serde_json::from_str(&body).ok(),
    });

    let (status, body) = state.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
        (
            500,
            json!({"errors": [{"detail": "no scripted response left"}]}).to_string(),
        )
    });
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/vnd.api+json")],
        body,
    )
}

/// Provider configuration pointing at `endpoint` with a negligible throttle
pub fn test_config(endpoint: &str) -> ProviderConfig {
    ProviderConfig {
        token: "test-token".to_string(),
        upsert_by_name: false,
        endpoint: endpoint.to_string(),
        rate_limit_interval: Duration::from_millis(1),
        request_timeout: Duration::from_secs(5),
    }
}

/// JSON:API document for a single source
pub fn source_document(id: &str, name: &str, enabled: bool) -> Value {
    json!({
        "data": {
            "type": "sources",
            "id": id,
            "attributes": source_attributes(name, enabled)
        }
    })
}

/// JSON:API collection holding one source per id
pub fn collection_document(ids: &[&str], name: &str) -> Value {
    let data: Vec<Value> = ids
        .iter()
        .map(|id| json!({"type": "sources", "id": id, "attributes": source_attributes(name, true)}))
        .collect();
    json!({"data": data, "meta": {"pagination": {"totalRecords": ids.len()}}})
}

fn source_attributes(name: &str, enabled: bool) -> Value {
    json!({
        "name": name,
        "enabled": enabled,
        "deployment_status": "deployed",
        "secure_url_token": "sut",
        "date_deployed": 1_700_000_000,
        "deployment": {
            "type": "s3",
            "s3_bucket": "assets",
            "s3_access_key": "AKIAEXAMPLE",
            "s3_prefix": "",
            "imgix_subdomains": [name]
        }
    })
}

/// Desired record for an S3-backed source
pub fn s3_model(id: Option<&str>, name: &str, enabled: bool, secret: &str) -> SourceModel {
    SourceModel {
        id: id.map(str::to_string),
        name: name.to_string(),
        enabled: Some(enabled),
        deployment: Some(DeploymentModel {
            deployment_type: "s3".to_string(),
            s3_bucket: "assets".to_string(),
            s3_access_key: "AKIAEXAMPLE".to_string(),
            s3_secret_key: secret.to_string(),
            imgix_subdomains: vec![name.to_string()],
            ..Default::default()
        }),
        ..Default::default()
    }
}
