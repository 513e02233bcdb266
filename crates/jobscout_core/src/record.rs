use serde::{Deserialize, Deserializer, Serialize};

/// One scraped job posting pushed by the live stream.
///
/// `public_id` identifies the posting within a session; a later record with
/// the same id supersedes the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub public_id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl JobRecord {
    pub fn new(public_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            public_id: public_id.into(),
            title: title.into(),
            company: String::new(),
            location: String::new(),
            description: String::new(),
            salary: None,
            url: None,
        }
    }

    /// Decodes one stream payload.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Salary for display; the backend uses `"N/A"` as a placeholder.
    pub fn display_salary(&self) -> Option<&str> {
        self.salary
            .as_deref()
            .filter(|salary| !salary.is_empty() && *salary != "N/A")
    }
}

/// Treats an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
