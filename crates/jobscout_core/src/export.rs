use csv::{Terminator, WriterBuilder};

use crate::JobResultSet;

pub const CSV_HEADERS: [&str; 5] = ["Title", "Company", "Location", "Salary", "URL"];
const MISSING_URL: &str = "N/A";

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv output is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn filename(self) -> &'static str {
        match self {
            ExportFormat::Csv => "scraped_jobs.csv",
            ExportFormat::Json => "scraped_jobs.json",
        }
    }
}

impl JobResultSet {
    /// Snapshot as CSV, newest first, one line per record.
    pub fn to_csv(&self) -> Result<String, SerializeError> {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(CSV_HEADERS)?;
        for record in self.iter() {
            writer.write_record([
                record.title.as_str(),
                record.company.as_str(),
                record.location.as_str(),
                record.salary.as_deref().unwrap_or_default(),
                record.url.as_deref().unwrap_or(MISSING_URL),
            ])?;
        }
        let bytes = writer.into_inner().map_err(|err| err.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Snapshot as a pretty-printed JSON array, newest first.
    pub fn to_json(&self) -> Result<String, SerializeError> {
        let records: Vec<_> = self.iter().collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    pub fn serialize(&self, format: ExportFormat) -> Result<String, SerializeError> {
        match format {
            ExportFormat::Csv => self.to_csv(),
            ExportFormat::Json => self.to_json(),
        }
    }
}
