//! Prediction service integration
//!
//! The grade page sends climbing-wall photos to an external image
//! classification service. The service is hosted on a platform that puts
//! idle instances to sleep, so a cold start answers `502 Bad Gateway` for a
//! while; requests are retried with a fixed delay to ride that out.

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;

/// Fixed-delay retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Image uploads: three tries, two seconds apart.
    pub const PREDICT: RetryPolicy = RetryPolicy {
        attempts: 3,
        delay: Duration::from_millis(2000),
    };

    /// Health check: two tries, one second apart.
    pub const HEALTH: RetryPolicy = RetryPolicy {
        attempts: 2,
        delay: Duration::from_millis(1000),
    };

    pub fn without_delay(self) -> Self {
        Self {
            delay: Duration::ZERO,
            ..self
        }
    }
}

/// Uploaded picture forwarded to the service.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// What the service answered once retries are settled.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    /// Successful prediction, passed through verbatim
    Success(serde_json::Value),
    /// Upstream answered with a non-success status
    Upstream {
        status: u16,
        message: String,
        details: String,
    },
}

/// Reported when every attempt was answered with a 502.
pub const MAX_RETRIES_REACHED: &str = "Max retries reached";

#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: reqwest::Client,
    base_url: String,
    predict_policy: RetryPolicy,
    health_policy: RetryPolicy,
}

impl PredictionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            predict_policy: RetryPolicy::PREDICT,
            health_policy: RetryPolicy::HEALTH,
        })
    }

    pub fn with_policies(mut self, predict: RetryPolicy, health: RetryPolicy) -> Self {
        self.predict_policy = predict;
        self.health_policy = health;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `request()` until it yields something other than a 502 or the
    /// attempts run out. Transport errors are retried the same way and the
    /// last one is returned as is; a 502 on every attempt is
    /// [`MAX_RETRIES_REACHED`].
    async fn send_with_retry<F>(&self, policy: RetryPolicy, mut request: F) -> Result<Response, String>
    where
        F: FnMut() -> RequestBuilder,
    {
        let attempts = policy.attempts.max(1);

        for attempt in 1..=attempts {
            match request().send().await {
                Ok(response) if response.status() == StatusCode::BAD_GATEWAY => {
                    tracing::warn!(
                        "Attempt {}: prediction service returned 502, waiting {:?} before retry",
                        attempt,
                        policy.delay
                    );
                }
                Ok(response) => return Ok(response),
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        "Attempt {} failed ({}), retrying in {:?}",
                        attempt,
                        e,
                        policy.delay
                    );
                }
                Err(e) => return Err(e.to_string()),
            }
            if attempt < attempts {
                tokio::time::sleep(policy.delay).await;
            }
        }

        Err(MAX_RETRIES_REACHED.to_string())
    }

    /// Forward an image to `POST /predict`. `Err` carries transport or decode
    /// failure details.
    pub async fn predict(&self, upload: &ImageUpload) -> Result<PredictionOutcome, String> {
        tracing::info!(
            "Forwarding {} ({} bytes) to prediction service",
            upload.file_name,
            upload.bytes.len()
        );

        let url = format!("{}/predict", self.base_url);
        let content_type = upload
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let response = self
            .send_with_retry(self.predict_policy, || {
                let part = Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
                let part = match part.mime_str(&content_type) {
                    Ok(p) => p,
                    Err(_) => Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone()),
                };
                self.http
                    .post(&url)
                    .multipart(Form::new().part("file", part))
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            tracing::error!(
                "Prediction service error: status={} details={}",
                status,
                details
            );
            let message = format!(
                "Prediction service error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string();
            return Ok(PredictionOutcome::Upstream {
                status: status.as_u16(),
                message,
                details,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map(PredictionOutcome::Success)
            .map_err(|e| format!("Invalid response from prediction service: {}", e))
    }

    /// Check `GET /` on the service.
    pub async fn health(&self) -> Result<(), String> {
        let url = format!("{}/", self.base_url);
        let response = self
            .send_with_retry(self.health_policy, || self.http.get(&url))
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!(
                "Prediction service is not responding (status {})",
                response.status().as_u16()
            ))
        }
    }
}
