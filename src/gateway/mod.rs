//! Model gateway
//!
//! One-shot client for the Cloudflare Workers AI run endpoint. No retries,
//! no streaming; a single call either yields the model payload or an error
//! the handlers translate into their own failure shape.

pub mod chat;

use crate::config::GatewayConfig;
use chat::{RunEnvelope, RunRequest};
use serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("request: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("request: {0} ({1})")]
    ReqwestWithBody(reqwest::Error, String),

    #[error("api: {0}")]
    Api(String),

    #[error("invalid api token")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),
}

pub struct Client {
    client: reqwest::Client,
    run_url: String,
    model: String,
}

impl Client {
    pub fn new(config: &GatewayConfig) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", config.api_token).parse()?,
        );

        let client = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            run_url: format!(
                "{}/accounts/{}/ai/run",
                config.api_base.trim_end_matches('/'),
                config.account_id
            ),
            model: config.model.clone(),
        })
    }

    /// Model identifier echoed in `/sentiment` responses
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Invoke the model once and return the `result.response` payload.
    ///
    /// Any transport failure, non-2xx status, or `success: false` envelope
    /// surfaces as an [`Error`].
    pub async fn run(&self, req: &RunRequest) -> Result<Value, Error> {
        let url = format!("{}/{}", self.run_url, self.model);
        let resp = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if let Err(e) = resp.error_for_status_ref() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::ReqwestWithBody(e.without_url(), body));
        }

        let envelope: RunEnvelope = resp.json().await.map_err(reqwest::Error::without_url)?;
        extract_payload(envelope)
    }
}

/// Convert a decoded envelope into the model payload.
///
/// A `success: false` envelope is an upstream rejection even on a 2xx
/// status; a successful envelope without a `result` yields a null payload.
fn extract_payload(envelope: RunEnvelope) -> Result<Value, Error> {
    if !envelope.success {
        let detail = envelope
            .errors
            .iter()
            .map(|e| format!("{} (code {})", e.message, e.code))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::Api(if detail.is_empty() {
            "unspecified upstream failure".to_string()
        } else {
            detail
        }));
    }

    Ok(envelope.result.map_or(Value::Null, |r| r.response))
}
