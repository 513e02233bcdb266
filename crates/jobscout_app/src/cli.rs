use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use jobscout_core::{ExportFormat, JobFilter, ScrapeRequest};

use crate::platform::config::CONFIG_FILENAME;

#[derive(Debug, Parser)]
#[command(name = "jobscout")]
#[command(about = "Run live job-scraping sessions against the scraper backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (RON)
    #[arg(long, global = true, default_value = CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Backend base url, overrides the config file and JOBSCOUT_API_BASE_URL
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    /// Credentials file written at sign-in (RON)
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Mirror the log to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the platforms you may scrape
    Platforms,
    /// Start a scraping session and print jobs as they arrive
    Scrape(ScrapeArgs),
    /// Show your previous scrape requests
    History {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Delete all of your previous scrape requests
    ClearHistory {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// Platform public id, see `jobscout platforms`
    #[arg(long)]
    pub platform: String,
    #[arg(long)]
    pub query: String,
    #[arg(long)]
    pub location: String,
    #[arg(long, default_value_t = 1)]
    pub max_pages: u32,
    /// Profile keyword, repeatable
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,
    /// Write the results when the session ends
    #[arg(long, value_enum, value_delimiter = ',')]
    pub export: Vec<ExportArg>,
    #[arg(long)]
    pub export_dir: Option<PathBuf>,
    /// Only list jobs whose title contains this text
    #[arg(long, default_value = "")]
    pub title_filter: String,
    /// Only list jobs whose location contains this text
    #[arg(long, default_value = "")]
    pub location_filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportArg {
    Csv,
    Json,
}

impl From<ExportArg> for ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Csv => ExportFormat::Csv,
            ExportArg::Json => ExportFormat::Json,
        }
    }
}

impl ScrapeArgs {
    pub fn request(&self) -> ScrapeRequest {
        self.keywords.iter().fold(
            ScrapeRequest::new(&self.platform, &self.query, &self.location, self.max_pages),
            |request, keyword| request.with_keyword(keyword),
        )
    }

    pub fn filter(&self) -> JobFilter {
        JobFilter::new(&self.title_filter, &self.location_filter)
    }

    pub fn export_formats(&self) -> Vec<ExportFormat> {
        let mut formats: Vec<ExportFormat> = Vec::with_capacity(self.export.len());
        for format in self.export.iter().copied().map(ExportFormat::from) {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        formats
    }
}
