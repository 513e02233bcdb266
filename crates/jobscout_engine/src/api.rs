use bytes::Bytes;
use jobscout_core::{
    Platform, ScrapeHistoryEntry, ScrapeRequest, StopError, SubmissionError, SubmissionFailure,
};
use jobscout_logging::{scout_debug, scout_info};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{ApiError, ApiFailure, ApiSettings, Credentials};

/// The job-submission side of the backend, as seen by a session.
#[async_trait::async_trait]
pub trait ScraperApi: Send + Sync {
    async fn start_session(
        &self,
        request: &ScrapeRequest,
        credentials: &Credentials,
    ) -> Result<(), SubmissionError>;

    async fn stop_session(&self, credentials: &Credentials) -> Result<(), StopError>;
}

#[derive(Debug, Clone)]
pub struct HttpScraperApi {
    settings: ApiSettings,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Deserialize, Default)]
struct PlatformGroups {
    #[serde(default)]
    common: Vec<Platform>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpScraperApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(ApiFailure::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Platforms the signed-in user may scrape.
    pub async fn platforms(&self, credentials: &Credentials) -> Result<Vec<Platform>, ApiError> {
        let url = self.settings.endpoint(&["api", "user", "platforms"])?;
        let body = self
            .execute(self.client.get(url).bearer_auth(&credentials.bearer_token))
            .await?;
        let envelope: Envelope<PlatformGroups> = decode(&body)?;
        Ok(envelope.data.unwrap_or_default().common)
    }

    /// Requests previously submitted by the signed-in user.
    pub async fn history(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<ScrapeHistoryEntry>, ApiError> {
        let url = self.settings.endpoint(&["api", "scraper", "requests", "my"])?;
        let body = self
            .execute(self.client.get(url).bearer_auth(&credentials.bearer_token))
            .await?;
        let envelope: Envelope<Vec<ScrapeHistoryEntry>> = decode(&body)?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Deletes every request in the signed-in user's history.
    pub async fn clear_history(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let url = self.settings.endpoint(&["api", "scraper", "requests", "my"])?;
        self.execute(self.client.delete(url).bearer_auth(&credentials.bearer_token))
            .await?;
        scout_info!("Cleared scraper request history");
        Ok(())
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Bytes, ApiError> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_success() {
            return response.bytes().await.map_err(map_reqwest_error);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| status.to_string());
        let kind = if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            ApiFailure::Unauthorized
        } else {
            ApiFailure::HttpStatus(status.as_u16())
        };
        Err(ApiError::new(kind, message).with_status(status.as_u16()))
    }
}

#[async_trait::async_trait]
impl ScraperApi for HttpScraperApi {
    async fn start_session(
        &self,
        request: &ScrapeRequest,
        credentials: &Credentials,
    ) -> Result<(), SubmissionError> {
        let url = self.settings.endpoint(&["api", "scraper", "start"])?;
        let payload = serde_json::to_vec(request)
            .map_err(|err| ApiError::new(ApiFailure::InvalidRequest, err.to_string()))?;
        scout_debug!("POST {} ({} bytes)", url, payload.len());
        self.execute(
            self.client
                .post(url)
                .bearer_auth(&credentials.bearer_token)
                .header(CONTENT_TYPE, "application/json")
                .body(payload),
        )
        .await?;
        Ok(())
    }

    async fn stop_session(&self, credentials: &Credentials) -> Result<(), StopError> {
        let url = self.settings.endpoint(&["api", "scraper", "stop"])?;
        scout_debug!("POST {} for session {}", url, credentials.session_id);
        self.execute(
            self.client
                .post(url)
                .bearer_auth(&credentials.bearer_token)
                .header(CONTENT_TYPE, "application/json")
                .body("{}"),
        )
        .await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|err| ApiError::new(ApiFailure::InvalidResponse, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(ApiFailure::Timeout, err.to_string());
    }
    ApiError::new(ApiFailure::Network, err.to_string())
}

impl From<ApiError> for SubmissionError {
    fn from(err: ApiError) -> Self {
        let kind = match err.kind {
            ApiFailure::Unauthorized => SubmissionFailure::Unauthorized,
            ApiFailure::HttpStatus(code) => SubmissionFailure::HttpStatus(code),
            ApiFailure::Timeout => SubmissionFailure::Timeout,
            ApiFailure::Network | ApiFailure::InvalidResponse => SubmissionFailure::Network,
            ApiFailure::InvalidUrl | ApiFailure::InvalidRequest => SubmissionFailure::InvalidRequest,
        };
        SubmissionError::new(kind, err.message)
    }
}

impl From<ApiError> for StopError {
    fn from(err: ApiError) -> Self {
        StopError {
            status: err.status,
            message: err.message,
        }
    }
}

impl From<crate::config::SettingsError> for SubmissionError {
    fn from(err: crate::config::SettingsError) -> Self {
        ApiError::from(err).into()
    }
}

impl From<crate::config::SettingsError> for StopError {
    fn from(err: crate::config::SettingsError) -> Self {
        ApiError::from(err).into()
    }
}
