use awc::http::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::form::StudentSubmission;
use crate::models::{HealthStatus, PredictionRecord, PredictionResult, Statistics, StudentRecords};

pub const PREDICT_PATH: &str = "/api/predict";

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// The seam between the form adapter and whatever answers predictions.
#[allow(async_fn_in_trait)]
pub trait PredictionApi {
    async fn predict(&self, submission: &StudentSubmission) -> Result<PredictionResult, RequestError>;
}

/// HTTP client for the prediction service.
pub struct PredictionClient {
    http: awc::Client,
    config: ClientConfig,
}

impl PredictionClient {
    pub fn new(config: ClientConfig) -> Self {
        let http = awc::Client::builder().timeout(config.timeout).finish();
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn health(&self) -> Result<HealthStatus, RequestError> {
        self.get_json("/api/health").await
    }

    pub async fn records(&self) -> Result<StudentRecords, RequestError> {
        self.get_json("/api/students").await
    }

    pub async fn record(&self, roll_number: &str) -> Result<PredictionRecord, RequestError> {
        self.get_json(&format!("/api/student/{}", encode_segment(roll_number)))
            .await
    }

    pub async fn statistics(&self) -> Result<Statistics, RequestError> {
        self.get_json("/api/statistics").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        let url = self.config.endpoint(path);
        log::debug!("GET {url}");

        let mut response = self
            .http
            .get(&url)
            .insert_header(("Accept", "application/json"))
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        ensure_success(response.status())?;

        let body = response
            .body()
            .limit(MAX_BODY_BYTES)
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        decode(&body)
    }
}

impl PredictionApi for PredictionClient {
    async fn predict(&self, submission: &StudentSubmission) -> Result<PredictionResult, RequestError> {
        let url = self.config.endpoint(PREDICT_PATH);
        log::debug!("POST {url} for roll number {}", submission.roll_number);

        // send_json sets Content-Type: application/json
        let mut response = self
            .http
            .post(&url)
            .send_json(submission)
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        ensure_success(response.status())?;

        let body = response
            .body()
            .limit(MAX_BODY_BYTES)
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        decode(&body)
    }
}

fn ensure_success(status: StatusCode) -> Result<(), RequestError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(RequestError::Status(status.as_u16()))
    }
}

/// Roll numbers such as `21/CSE/001` contain slashes, so every byte outside
/// the unreserved set is percent-encoded.
fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RequestError> {
    serde_json::from_slice(body).map_err(|e| RequestError::Decode(e.to_string()))
}
