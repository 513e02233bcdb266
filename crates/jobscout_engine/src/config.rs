use std::time::Duration;

use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Where the scraper backend lives and how long to wait for it.
///
/// `request_timeout` bounds the start/stop/history calls only; the live
/// stream is long-lived and is bounded by `connect_timeout` alone.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid api base url {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

impl ApiSettings {
    pub fn with_base_url(base_url: &str) -> Result<Self, SettingsError> {
        let parsed = Url::parse(base_url).map_err(|err| SettingsError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: err.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(SettingsError::InvalidBaseUrl {
                url: base_url.to_string(),
                message: "not a hierarchical url".to_string(),
            });
        }
        Ok(Self {
            base_url: parsed,
            ..Self::default()
        })
    }

    /// Appends percent-encoded path segments to the base url.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, SettingsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SettingsError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                message: "not a hierarchical url".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
