use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::hocr::Granularity;
use crate::iiif::UriTemplate;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Template producing a canvas URL from a page identifier
    /// Placeholders: {id}
    #[serde(default = "default_canvas_url_template")]
    pub canvas_url_template: String,

    /// Template producing the annotation-list base URL from a page identifier
    #[serde(default = "default_annotation_list_base_template")]
    pub annotation_list_base_template: String,

    /// Granularity used when none is given on the command line
    #[serde(default)]
    pub granularity: Granularity,

    /// Pretty-print the annotation list JSON
    #[serde(default)]
    pub pretty_json: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_canvas_url_template() -> String {
    "https://example.org/iiif/canvas/{id}".to_string()
}

fn default_annotation_list_base_template() -> String {
    "https://example.org/iiif/annotation/".to_string()
}

impl Config {
    /// Load the configuration file, writing a default one if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .context(format!("Failed to open config file: {}", path.display()))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .context(format!("Failed to parse config file: {}", path.display()))?;

            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(path, config_json)
            .context(format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let canvas = self.canvas_template()?;
        if !canvas.references("id") {
            return Err(anyhow!(
                "canvas_url_template must reference {{id}}: {}",
                self.canvas_url_template
            ));
        }

        self.annotation_list_base()?;

        Ok(())
    }

    pub fn canvas_template(&self) -> Result<UriTemplate> {
        UriTemplate::parse(&self.canvas_url_template)
            .context("Invalid canvas_url_template")
    }

    pub fn annotation_list_base(&self) -> Result<UriTemplate> {
        UriTemplate::parse(&self.annotation_list_base_template)
            .context("Invalid annotation_list_base_template")
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            canvas_url_template: default_canvas_url_template(),
            annotation_list_base_template: default_annotation_list_base_template(),
            granularity: Granularity::default(),
            pretty_json: false,
            log_level: LogLevel::default(),
        }
    }
}
