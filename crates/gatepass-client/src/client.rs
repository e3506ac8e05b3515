//! Async client for the visitor API

use async_trait::async_trait;
use gatepass_api::{
    DailyStat, RegistrationRequest, ScanErrorBody, ScanRequest, ScanResponse, VisitorPass,
};
use gatepass_config::ApiSettings;
use gatepass_core::TransitionService;
use gatepass_util::PassId;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::{ClientError, ClientResult};

const VISITORS_PATH: &str = "api/visitors";
const STATS_PATH: &str = "api/visitors/stats";
const SCAN_PATH: &str = "api/visitors/scan";

/// Characters of an unexpected body kept in error messages
const BODY_PREVIEW_CHARS: usize = 200;

/// Client for the visitor API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client with its own connection pool and request timeout
    pub fn new(base_url: Url, timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Wrap an existing `reqwest::Client`
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: with_trailing_slash(base_url),
        }
    }

    /// Build from validated settings, failing if no base URL is configured
    pub fn from_settings(settings: &ApiSettings) -> ClientResult<Self> {
        let base_url = settings.base_url.clone().ok_or(ClientError::NotConfigured)?;
        Self::new(base_url, settings.timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch every pass record, in the order the API returns them
    pub async fn fetch_passes(&self) -> ClientResult<Vec<VisitorPass>> {
        let passes: Vec<VisitorPass> = self.get(VISITORS_PATH).await?;
        info!(count = passes.len(), "Fetched visitor roster");
        Ok(passes)
    }

    /// Fetch registrations per day
    pub async fn fetch_daily_stats(&self) -> ClientResult<Vec<DailyStat>> {
        self.get(STATS_PATH).await
    }

    /// Submit a scanned pass id.
    ///
    /// A 4xx answer carrying a `{ "message" }` body is the service refusing
    /// the scan and comes back as a `Rejected` response. Anything else that
    /// is not a 2xx (timeouts, throttling, proxy pages, 5xx) is an error.
    pub async fn submit_scan(&self, pass_id: &PassId) -> ClientResult<ScanResponse> {
        let url = self.url(SCAN_PATH)?;
        debug!(%url, pass_id = %pass_id, "POST");

        let resp = self
            .http
            .post(url)
            .json(&ScanRequest::new(pass_id.clone()))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return decode_body(resp).await;
        }

        let body = resp.text().await?;
        if is_refusal_status(status) {
            let rejection = serde_json::from_str::<ScanErrorBody>(&body)
                .ok()
                .and_then(ScanErrorBody::into_rejection);
            if let Some(response) = rejection {
                warn!(
                    pass_id = %pass_id,
                    status = status.as_u16(),
                    message = ?response.message,
                    "Scan rejected by visitor API"
                );
                return Ok(response);
            }
        }

        Err(api_error(status, &body))
    }

    /// Register a new visitor and return the created pass
    pub async fn register_pass(&self, request: &RegistrationRequest) -> ClientResult<VisitorPass> {
        let url = self.url(VISITORS_PATH)?;
        debug!(%url, visitor_type = request.visitor_type.as_str(), "POST");

        let resp = self.http.post(url).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            return Err(api_error(status, &body));
        }

        let pass: VisitorPass = decode_body(resp).await?;
        info!(pass_id = %pass.pass_id, "Registered visitor");
        Ok(pass)
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path)?;
        debug!(%url, "GET");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if status.is_success() {
            decode_body(resp).await
        } else {
            let body = resp.text().await?;
            Err(api_error(status, &body))
        }
    }
}

#[async_trait]
impl TransitionService for ApiClient {
    async fn scan(&self, pass_id: &PassId) -> gatepass_util::Result<ScanResponse> {
        Ok(self.submit_scan(pass_id).await?)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// 4xx statuses the scan service uses to refuse a scan. Timeouts and
/// throttling are transient and stay errors.
fn is_refusal_status(status: reqwest::StatusCode) -> bool {
    status.is_client_error()
        && status != reqwest::StatusCode::REQUEST_TIMEOUT
        && status != reqwest::StatusCode::TOO_MANY_REQUESTS
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

async fn decode_body<T: DeserializeOwned>(resp: reqwest::Response) -> ClientResult<T> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::Deserialization {
        message: format!("{} (body preview: {:?})", e, preview(&body)),
        body,
    })
}

fn api_error(status: reqwest::StatusCode, body: &str) -> ClientError {
    #[derive(serde::Deserialize)]
    struct ErrorResponse {
        #[serde(default)]
        message: Option<String>,
    }

    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://visitors.example/gate").unwrap(),
        );
        assert_eq!(client.base_url().as_str(), "https://visitors.example/gate/");
        assert_eq!(
            client.url(SCAN_PATH).unwrap().as_str(),
            "https://visitors.example/gate/api/visitors/scan"
        );
    }

    #[test]
    fn missing_base_url_is_not_configured() {
        let settings = ApiSettings::default();
        assert!(matches!(
            ApiClient::from_settings(&settings),
            Err(ClientError::NotConfigured)
        ));
    }

    #[test]
    fn refusal_statuses_exclude_transient_ones() {
        assert!(is_refusal_status(reqwest::StatusCode::BAD_REQUEST));
        assert!(is_refusal_status(reqwest::StatusCode::CONFLICT));
        assert!(!is_refusal_status(reqwest::StatusCode::REQUEST_TIMEOUT));
        assert!(!is_refusal_status(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_refusal_status(reqwest::StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn api_error_prefers_body_message() {
        let err = api_error(reqwest::StatusCode::BAD_GATEWAY, r#"{"message":"upstream down"}"#);
        assert!(matches!(err, ClientError::Api { status: 502, ref message } if message == "upstream down"));

        let err = api_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "<html>");
        assert!(matches!(err, ClientError::Api { status: 500, ref message } if message == "Internal Server Error"));
    }
}
