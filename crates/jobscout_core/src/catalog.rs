use serde::{Deserialize, Serialize};

/// A scraping platform the user may target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub public_id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub parser_type: String,
    #[serde(default)]
    pub notes: String,
}

impl Platform {
    pub fn label(&self) -> String {
        format!(
            "{} ({}, {}) - {}",
            self.name,
            self.kind.to_uppercase(),
            self.parser_type,
            self.notes
        )
    }
}
