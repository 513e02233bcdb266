use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, ValidationError};

pub const MIN_PAGES: u32 = 1;
pub const MAX_PAGES: u32 = 50;

/// One scraping job submission, sent once when a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub platform_id: String,
    pub query: String,
    pub location: String,
    pub max_pages: u32,
    #[serde(default)]
    pub profile_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestField {
    PlatformId,
    Query,
    Location,
    MaxPages,
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestField::PlatformId => "platformId",
            RequestField::Query => "query",
            RequestField::Location => "location",
            RequestField::MaxPages => "maxPages",
        };
        f.write_str(name)
    }
}

impl ScrapeRequest {
    pub fn new(
        platform_id: impl Into<String>,
        query: impl Into<String>,
        location: impl Into<String>,
        max_pages: u32,
    ) -> Self {
        Self {
            platform_id: platform_id.into(),
            query: query.into(),
            location: location.into(),
            max_pages,
            profile_keywords: Vec::new(),
        }
    }

    /// Appends a profile keyword; blank keywords are ignored.
    pub fn with_keyword(mut self, keyword: &str) -> Self {
        let keyword = keyword.trim();
        if !keyword.is_empty() {
            self.profile_keywords.push(keyword.to_owned());
        }
        self
    }

    /// Checks every field and reports all failures at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut fields = Vec::new();
        if self.platform_id.trim().is_empty() {
            fields.push(FieldError {
                field: RequestField::PlatformId,
                message: "Platform is required".to_string(),
            });
        }
        if self.query.trim().is_empty() {
            fields.push(FieldError {
                field: RequestField::Query,
                message: "Query is required".to_string(),
            });
        }
        if self.location.trim().is_empty() {
            fields.push(FieldError {
                field: RequestField::Location,
                message: "Location is required".to_string(),
            });
        }
        if !(MIN_PAGES..=MAX_PAGES).contains(&self.max_pages) {
            fields.push(FieldError {
                field: RequestField::MaxPages,
                message: format!("Max pages must be between {MIN_PAGES} and {MAX_PAGES}"),
            });
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { fields })
        }
    }
}
