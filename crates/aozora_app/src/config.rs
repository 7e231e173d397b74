//! Settings for the collector binary: an optional RON file layered under CLI flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use aozora_engine::{ArchiveSettings, CollectorConfig, DetailUrlTemplate};
use aozora_logging::{LevelFilter, LogDestination};
use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_INDEX_URL: &str = "https://www.aozora.gr.jp/index_pages/person879.html";

/// Collect the texts of every work listed on an Aozora Bunko author page.
#[derive(Debug, Parser)]
#[command(name = "aozora-collector", version)]
pub struct Cli {
    /// Author index page to collect from.
    pub index_url: Option<String>,

    /// RON file with collector settings.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Works processed at the same time.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Cancel the run after this many seconds.
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Also write logs to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the discovered works without downloading them.
    #[arg(long)]
    pub list_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub index_url: Option<String>,
    pub detail_url_template: Option<String>,
    pub archive_link_suffix: Option<String>,
    pub payload_extension: Option<String>,
    pub source_encoding: Option<String>,
    pub concurrency: Option<usize>,
    pub deadline_secs: Option<u64>,
    pub page_timeout_secs: Option<u64>,
    pub archive_timeout_secs: Option<u64>,
    pub max_archive_bytes: Option<u64>,
    pub max_payload_bytes: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }
}

#[derive(Debug)]
pub struct AppSettings {
    pub index_url: String,
    pub collector: CollectorConfig,
    pub deadline: Option<Duration>,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
    pub list_only: bool,
}

impl AppSettings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let file = match cli.config.as_deref() {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// CLI flags win over file values, file values win over defaults.
    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self> {
        let mut collector = CollectorConfig::default();

        if let Some(template) = file.detail_url_template {
            collector.detail_url_template = DetailUrlTemplate::new(template)?;
        }
        let mut archive = ArchiveSettings::default();
        if let Some(suffix) = file.archive_link_suffix {
            archive.link_suffix = suffix;
        }
        if let Some(extension) = file.payload_extension {
            archive.payload_extension = extension.trim_start_matches('.').to_string();
        }
        if let Some(label) = file.source_encoding.as_deref() {
            archive = archive.with_encoding_label(label)?;
        }
        if let Some(max_bytes) = file.max_payload_bytes {
            archive.max_payload_bytes = max_bytes;
        }
        collector.archive = archive;

        if let Some(secs) = file.page_timeout_secs {
            collector.page_fetch.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.archive_timeout_secs {
            collector.archive_fetch.request_timeout = Duration::from_secs(secs);
        }
        if let Some(max_bytes) = file.max_archive_bytes {
            collector.archive_fetch.max_bytes = max_bytes;
        }
        if let Some(concurrency) = cli.concurrency.or(file.concurrency) {
            collector.concurrency = concurrency;
        }

        let log_destination = match cli.log_file.clone().or(file.log_file) {
            Some(path) => LogDestination::Both(path),
            None => LogDestination::Terminal,
        };

        Ok(Self {
            index_url: cli
                .index_url
                .clone()
                .or(file.index_url)
                .unwrap_or_else(|| DEFAULT_INDEX_URL.to_string()),
            collector,
            deadline: cli
                .deadline_secs
                .or(file.deadline_secs)
                .map(Duration::from_secs),
            log_destination,
            log_level: if cli.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
            list_only: cli.list_only,
        })
    }
}
