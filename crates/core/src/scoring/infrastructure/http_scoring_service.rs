use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::scoring::domain::leaderboard::LeaderboardEntry;
use crate::scoring::domain::score_result::ScoreResult;
use crate::scoring::domain::scoring_service::{ScoringError, ScoringService};
use crate::scoring::domain::submission_request::SubmissionRequest;
use crate::scoring::infrastructure::wire::{ScoreboardResponse, UploadResponse};
use crate::shared::config::KioskConfig;
use crate::shared::constants::{SCOREBOARD_PATH, UPLOAD_FILE_NAME, UPLOAD_MIME, UPLOAD_PATH};

/// Blocking HTTP client for the scoring service.
///
/// Every request carries the configured timeout; there is no retry.
#[derive(Clone)]
pub struct HttpScoringService {
    client: Client,
    base_url: Url,
}

impl HttpScoringService {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        extra_headers: &BTreeMap<String, String>,
    ) -> Result<Self, ScoringError> {
        let base_url = normalize_base(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(header_map(extra_headers)?)
            .build()
            .map_err(|e| ScoringError::Request(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &KioskConfig) -> Result<Self, ScoringError> {
        Self::new(
            &config.base_url,
            config.request_timeout(),
            &config.extra_headers,
        )
    }

    fn endpoint(&self, path: &str) -> Result<Url, ScoringError> {
        self.base_url
            .join(path)
            .map_err(|e| ScoringError::Request(format!("bad endpoint '{path}': {e}")))
    }

    fn send(
        &self,
        url: &Url,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<Response, ScoringError> {
        let response = request.send().map_err(|e| ScoringError::Transport {
            url: url.to_string(),
            source: e,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScoringError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    fn read_json<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T, ScoringError> {
        let body = response.text().map_err(|e| ScoringError::Transport {
            url: url.to_string(),
            source: e,
        })?;
        serde_json::from_str(&body).map_err(|e| ScoringError::Decode {
            url: url.to_string(),
            source: e,
        })
    }
}

impl ScoringService for HttpScoringService {
    fn upload(&self, request: &SubmissionRequest) -> Result<ScoreResult, ScoringError> {
        let url = self.endpoint(UPLOAD_PATH)?;
        let file = Part::bytes(request.image_jpeg.clone())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(UPLOAD_MIME)
            .map_err(|e| ScoringError::Request(e.to_string()))?;
        let form = Form::new()
            .text("name", request.display_name.as_str().to_owned())
            .part("file", file);

        log::info!(
            "Uploading {} bytes for '{}' to {url}",
            request.image_jpeg.len(),
            request.display_name
        );
        let response = self.send(&url, self.client.post(url.clone()).multipart(form))?;
        let parsed: UploadResponse = Self::read_json(&url, response)?;
        parsed.into_domain()
    }

    fn scoreboard(&self) -> Result<Vec<LeaderboardEntry>, ScoringError> {
        let url = self.endpoint(SCOREBOARD_PATH)?;
        let request = self
            .client
            .get(url.clone())
            .header(CONTENT_TYPE, "application/json");
        let response = self.send(&url, request)?;
        let parsed: ScoreboardResponse = Self::read_json(&url, response)?;
        parsed.into_domain()
    }

    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ScoringError> {
        // Relative URLs resolve against the service root.
        let url = self
            .base_url
            .join(url)
            .map_err(|e| ScoringError::Request(format!("bad image url '{url}': {e}")))?;
        let response = self.send(&url, self.client.get(url.clone()))?;
        let bytes = response.bytes().map_err(|e| ScoringError::Transport {
            url: url.to_string(),
            source: e,
        })?;
        Ok(bytes.to_vec())
    }
}

/// Parses the base URL and guarantees a trailing slash so endpoint joins
/// append instead of replacing the last path segment.
fn normalize_base(base_url: &str) -> Result<Url, ScoringError> {
    let mut url = Url::parse(base_url.trim())
        .map_err(|e| ScoringError::Request(format!("bad base url '{base_url}': {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ScoringError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ScoringError::Request(format!("bad header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ScoringError::Request(format!("bad header value for {name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}
