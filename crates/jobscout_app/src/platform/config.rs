//! App configuration: `jobscout.ron`, then the environment, then CLI flags.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use jobscout_engine::ApiSettings;
use jobscout_logging::{scout_info, scout_warn};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "jobscout.ron";
pub const BASE_URL_ENV: &str = "JOBSCOUT_API_BASE_URL";
const DEFAULT_CREDENTIALS_FILENAME: &str = "session.ron";
const DEFAULT_EXPORT_DIR: &str = "exports";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub credentials_path: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub credentials_path: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub settings: ApiSettings,
    pub credentials_path: PathBuf,
    pub export_dir: PathBuf,
}

/// A missing file is an empty config; a malformed one is an error.
pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading {}", path.display()));
        }
    };
    let config: AppConfig =
        ron::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    scout_info!("Loaded configuration from {:?}", path);
    Ok(config)
}

pub fn resolve(
    file: AppConfig,
    env_base_url: Option<String>,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let base_url = overrides
        .api_base_url
        .or(env_base_url.filter(|url| !url.trim().is_empty()))
        .or(file.api_base_url);

    let mut settings = match base_url {
        Some(url) => ApiSettings::with_base_url(url.trim())?,
        None => ApiSettings::default(),
    };
    if let Some(secs) = file.connect_timeout_secs {
        settings.connect_timeout = timeout_from_secs(secs, settings.connect_timeout);
    }
    if let Some(secs) = file.request_timeout_secs {
        settings.request_timeout = timeout_from_secs(secs, settings.request_timeout);
    }

    Ok(ResolvedConfig {
        settings,
        credentials_path: overrides
            .credentials_path
            .or(file.credentials_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_FILENAME)),
        export_dir: overrides
            .export_dir
            .or(file.export_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR)),
    })
}

fn timeout_from_secs(secs: u64, fallback: Duration) -> Duration {
    if secs == 0 {
        scout_warn!("Ignoring zero timeout in configuration");
        return fallback;
    }
    Duration::from_secs(secs)
}
