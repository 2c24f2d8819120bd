use crate::error::SubmissionError;
use crate::upload::types::{RawRow, SubmissionReceipt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use tracing::{info, warn};

pub const SUBMISSION_PATH: &str = "/api/v1/bulk-uploads";

#[derive(Serialize)]
pub struct SubmissionPayload<'a> {
    #[serde(rename = "type")]
    pub upload_type: &'a str,
    pub records: &'a [RawRow],
}

/// Posts a validated batch to the back-office API. One request per call,
/// no retries.
#[derive(Clone)]
pub struct SubmissionGateway {
    client: reqwest::Client,
    endpoint: String,
    headers: HeaderMap,
}

impl SubmissionGateway {
    pub fn new(base_url: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), SUBMISSION_PATH),
            headers,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn submit(
        &self,
        upload_type: &str,
        rows: &[RawRow],
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let payload = SubmissionPayload {
            upload_type,
            records: rows,
        };

        info!(
            "Submitting {} '{}' records to {}",
            rows.len(),
            upload_type,
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Submission of '{}' rejected with {}", upload_type, status);
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;

        info!("Submission of '{}' accepted with {}", upload_type, status);
        Ok(SubmissionReceipt {
            status: status.as_u16(),
            body: serde_json::from_str(&body).ok(),
        })
    }
}
