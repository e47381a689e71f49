use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::hocr::{Granularity, HocrDocument};
use crate::iiif::{AnnotationList, LinkOutcome, Manifest, UriTemplate, build_annotation_list};

// @module: Application controller for hOCR to IIIF conversion

/// Inputs for one conversion run
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// hOCR file to read
    pub hocr_path: PathBuf,
    /// Granularity; the configured default when `None`
    pub granularity: Option<Granularity>,
    /// Page identifier; the hOCR file stem when `None`
    pub identifier: Option<String>,
    /// Where to write the annotation list; next to the hOCR file when `None`
    pub output_path: Option<PathBuf>,
    /// Manifest to link the list into; skipped when `None`
    pub manifest_path: Option<PathBuf>,
}

impl ConversionRequest {
    pub fn new(hocr_path: impl Into<PathBuf>) -> Self {
        ConversionRequest {
            hocr_path: hocr_path.into(),
            granularity: None,
            identifier: None,
            output_path: None,
            manifest_path: None,
        }
    }
}

/// What a conversion run produced
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub identifier: String,
    pub granularity: Granularity,
    pub annotation_list_id: String,
    pub annotation_count: usize,
    pub output_path: PathBuf,
    /// Outcome of the manifest link step, if a manifest was given
    pub link: Option<LinkOutcome>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    canvas_template: UriTemplate,
    list_base_template: UriTemplate,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let canvas_template = config.canvas_template()?;
        let list_base_template = config.annotation_list_base()?;

        Ok(Self {
            config,
            canvas_template,
            list_base_template,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Canvas URL for a page identifier
    pub fn canvas_id(&self, identifier: &str) -> String {
        self.canvas_template.expand_id(identifier)
    }

    /// Parse the hOCR file and build its annotation list
    pub fn build_annotation_list(
        &self,
        hocr_path: &Path,
        identifier: &str,
        granularity: Granularity,
    ) -> Result<AnnotationList> {
        let document = HocrDocument::from_file(hocr_path).with_context(|| {
            format!("[{}] failed to parse hOCR file {}", identifier, hocr_path.display())
        })?;

        let chunks = document.chunks(granularity).with_context(|| {
            format!(
                "[{}] failed to extract {} chunks from {}",
                identifier,
                granularity,
                hocr_path.display()
            )
        })?;
        debug!("[{}] {} non-empty {} chunks", identifier, chunks.len(), granularity);

        let base_url = self.list_base_template.expand_id(identifier);
        Ok(build_annotation_list(
            &chunks,
            identifier,
            granularity,
            &base_url,
            |id| self.canvas_id(id),
        ))
    }

    /// Run the main workflow: parse, write the list, then patch the manifest
    pub fn run(&self, request: &ConversionRequest) -> Result<ConversionReport> {
        let identifier = match &request.identifier {
            Some(identifier) => identifier.clone(),
            None => FileManager::identifier_from_path(&request.hocr_path).ok_or_else(|| {
                anyhow!("Cannot derive an identifier from {}", request.hocr_path.display())
            })?,
        };
        let granularity = request.granularity.unwrap_or(self.config.granularity);

        info!(
            "[{}] Converting {} at {} granularity",
            identifier,
            request.hocr_path.display(),
            granularity
        );

        let list = self.build_annotation_list(&request.hocr_path, &identifier, granularity)?;

        let output_path = request.output_path.clone().unwrap_or_else(|| {
            FileManager::generate_output_path(&request.hocr_path, &identifier, granularity)
        });
        self.write_annotation_list(&list, &output_path)
            .with_context(|| {
                format!("[{}] failed to write annotation list {}", identifier, output_path.display())
            })?;
        info!("[{}] Wrote {} annotations to {}", identifier, list.len(), output_path.display());

        let link = match &request.manifest_path {
            Some(manifest_path) => Some(self.link_into_manifest(manifest_path, &identifier, &list.id)?),
            None => None,
        };

        Ok(ConversionReport {
            identifier,
            granularity,
            annotation_list_id: list.id.clone(),
            annotation_count: list.len(),
            output_path,
            link,
        })
    }

    fn write_annotation_list(&self, list: &AnnotationList, output_path: &Path) -> Result<()> {
        let json = if self.config.pretty_json {
            list.to_json_pretty()?
        } else {
            list.to_json()?
        };

        FileManager::write_atomic(output_path, &json)?;
        Ok(())
    }

    /// Attach the list to the page's canvas; the file is only rewritten when it changed
    pub fn link_into_manifest(
        &self,
        manifest_path: &Path,
        identifier: &str,
        list_id: &str,
    ) -> Result<LinkOutcome> {
        let mut manifest = Manifest::from_file(manifest_path).with_context(|| {
            format!("[{}] failed to load manifest {}", identifier, manifest_path.display())
        })?;

        let canvas_id = self.canvas_id(identifier);
        let outcome = manifest
            .link_annotation_list(&canvas_id, list_id)
            .with_context(|| {
                format!("[{}] failed to patch manifest {}", identifier, manifest_path.display())
            })?;

        if outcome.changed() {
            manifest.write_to(manifest_path).with_context(|| {
                format!("[{}] failed to write manifest {}", identifier, manifest_path.display())
            })?;
        }

        Ok(outcome)
    }
}
