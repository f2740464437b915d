use crate::error::EvaluationError;
use crate::eval::wire::{EvaluationRequest, EvaluationResponse, EvaluationResult};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;

pub const CALCULATE_PATH: &str = "calculate";

/// Anything that can turn a canvas snapshot into evaluated expressions.
pub trait EvaluationService: Send + Sync {
    fn evaluate(&self, request: &EvaluationRequest) -> Result<Vec<EvaluationResult>, EvaluationError>;
}

/// Blocking HTTP client for the remote `/calculate` endpoint.
pub struct HttpEvaluationClient {
    client: Client,
    endpoint: Url,
}

impl HttpEvaluationClient {
    pub fn new(api_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("math-canvas evaluation client")
            .build()?;
        Ok(Self {
            client,
            endpoint: calculate_endpoint(api_url)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// `<api_url>/calculate`, tolerating a trailing slash on the base.
pub fn calculate_endpoint(api_url: &str) -> anyhow::Result<Url> {
    let mut base = Url::parse(api_url.trim())?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(CALCULATE_PATH)?)
}

impl EvaluationService for HttpEvaluationClient {
    fn evaluate(&self, request: &EvaluationRequest) -> Result<Vec<EvaluationResult>, EvaluationError> {
        let body =
            serde_json::to_vec(request).map_err(|e| EvaluationError::Decode(e.to_string()))?;
        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| EvaluationError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(EvaluationError::Status(resp.status().as_u16()));
        }

        let bytes = resp
            .bytes()
            .map_err(|e| EvaluationError::Transport(e.to_string()))?;
        let parsed: EvaluationResponse =
            serde_json::from_slice(&bytes).map_err(|e| EvaluationError::Decode(e.to_string()))?;
        tracing::debug!(items = parsed.data.len(), "evaluation response decoded");
        Ok(parsed.into_results())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_calculate() {
        assert_eq!(
            calculate_endpoint("http://localhost:8900").expect("url").as_str(),
            "http://localhost:8900/calculate"
        );
        assert_eq!(
            calculate_endpoint("https://api.example.com/v1/").expect("url").as_str(),
            "https://api.example.com/v1/calculate"
        );
        assert_eq!(
            calculate_endpoint("https://api.example.com/v1").expect("url").as_str(),
            "https://api.example.com/v1/calculate"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(calculate_endpoint("not a url").is_err());
    }
}
