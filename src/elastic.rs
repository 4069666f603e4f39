//! Client for the cluster's snapshot API.
//!
//! Three calls, always in the same order: PUT the repository definition,
//! POST a verify request, PUT the snapshot request. Every call is gated on a
//! plain-GET reachability probe of the base URL; an unreachable cluster is an
//! explicit [`ApiError::Unreachable`], never a silent fall-through.
//!
//! [`ApiError::status`] maps each error kind onto the fixed status code the
//! tool reports for it, so the repository-configuration stage can always
//! surface a numeric status even when no request was made.

use reqwest::StatusCode;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

/// Failure kinds of the snapshot API stages.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("cluster is not reachable")]
    Unreachable,
    #[error("payload file not found: {0}")]
    PayloadMissing(PathBuf),
    #[error("payload is not valid JSON: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("response body is not valid JSON: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

impl ApiError {
    /// Fixed status reported for this failure: 406 for a payload that is not
    /// valid JSON, 404 for everything else.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::NOT_ACCEPTABLE,
            _ => StatusCode::NOT_FOUND,
        }
    }
}

fn repository_uri(repository: &str) -> String {
    format!("/_snapshot/{repository}")
}

fn verify_uri(repository: &str) -> String {
    format!("/_snapshot/{repository}/_verify?pretty")
}

fn snapshot_uri(repository: &str, snapshot: &str) -> String {
    format!("/_snapshot/{repository}/{snapshot}?pretty")
}

pub struct ElasticClient {
    http: reqwest::Client,
    base_url: String,
    repository: String,
}

impl ElasticClient {
    pub fn new(base_url: String, repository: String) -> Self {
        ElasticClient {
            http: reqwest::Client::new(),
            base_url,
            repository,
        }
    }

    /// True iff a plain GET of the base URL answers with a success status.
    /// Transport errors count as unreachable, they never propagate.
    pub async fn is_reachable(&self) -> bool {
        match self.http.get(&self.base_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, url = %self.base_url, "cluster not reachable");
                false
            }
        }
    }

    /// Registers (or updates) the snapshot repository from the rendered
    /// bucket payload and returns the cluster's response status.
    pub async fn configure_repository(&self, payload: &Path) -> Result<StatusCode, ApiError> {
        if !self.is_reachable().await {
            return Err(ApiError::Unreachable);
        }
        if !payload.is_file() {
            return Err(ApiError::PayloadMissing(payload.to_path_buf()));
        }

        let body = read_json_payload(payload)?;
        let uri = repository_uri(&self.repository);
        info!(uri = %uri, "Registering snapshot repository");
        let response = self
            .http
            .put(format!("{}{uri}", self.base_url))
            .json(&body)
            .send()
            .await?;
        info!(status = %response.status(), "Repository registration answered");
        Ok(response.status())
    }

    /// Verifies the registered repository and returns the parsed response.
    pub async fn verify_repository(&self) -> Result<Value, ApiError> {
        if !self.is_reachable().await {
            return Err(ApiError::Unreachable);
        }

        let uri = verify_uri(&self.repository);
        info!(uri = %uri, "Verifying snapshot repository");
        let response = self
            .http
            .post(format!("{}{uri}", self.base_url))
            .send()
            .await?;
        parse_response(response).await
    }

    /// Requests a snapshot from the rendered snapshot payload and returns the
    /// parsed response.
    pub async fn create_snapshot(&self, snapshot: &str, payload: &Path) -> Result<Value, ApiError> {
        if !self.is_reachable().await {
            return Err(ApiError::Unreachable);
        }
        if !payload.is_file() {
            return Err(ApiError::PayloadMissing(payload.to_path_buf()));
        }

        let body = read_json_payload(payload)?;
        let uri = snapshot_uri(&self.repository, snapshot);
        info!(uri = %uri, "Creating snapshot");
        let response = self
            .http
            .put(format!("{}{uri}", self.base_url))
            .json(&body)
            .send()
            .await?;
        parse_response(response).await
    }
}

fn read_json_payload(payload: &Path) -> Result<Value, ApiError> {
    let content = match fs::read_to_string(payload) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, payload = ?payload, "Failed to read payload file");
            return Err(ApiError::PayloadMissing(payload.to_path_buf()));
        }
    };
    serde_json::from_str(&content).map_err(|e| {
        error!(error = %e, payload = ?payload, "Payload is not valid JSON");
        ApiError::InvalidPayload(e)
    })
}

async fn parse_response(response: reqwest::Response) -> Result<Value, ApiError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        error!(error = %e, "Response body is not valid JSON");
        ApiError::MalformedResponse(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_uri_targets_snapshot_api() {
        assert_eq!(repository_uri("backups"), "/_snapshot/backups");
    }

    #[test]
    fn verify_uri_appends_verify_action() {
        assert_eq!(verify_uri("backups"), "/_snapshot/backups/_verify?pretty");
    }

    #[test]
    fn snapshot_uri_names_the_snapshot() {
        assert_eq!(
            snapshot_uri("backups", "snapshot-2026-08-07"),
            "/_snapshot/backups/snapshot-2026-08-07?pretty"
        );
    }

    #[test]
    fn invalid_payload_maps_to_406_and_the_rest_to_404() {
        let bad_json = serde_json::from_str::<Value>("{").unwrap_err();
        assert_eq!(
            ApiError::InvalidPayload(bad_json).status(),
            StatusCode::NOT_ACCEPTABLE
        );
        assert_eq!(ApiError::Unreachable.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::PayloadMissing("configuration/bucket.json".into()).status(),
            StatusCode::NOT_FOUND
        );
    }
}
