/*!
 * Error types for the hocr2iiif conversion pipeline.
 *
 * Every stage of the pipeline reports failures through `ConversionError`,
 * using the thiserror crate for ergonomic error definitions. The binary and
 * the controller wrap these with anyhow context naming the stage and path.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting hOCR and patching a manifest
#[derive(Error, Debug)]
pub enum ConversionError {
    /// An input file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Malformed hOCR or manifest structure
    #[error("Parse error: {0}")]
    Parse(String),

    /// A bbox keyword is present but is not followed by four coordinates
    #[error("Malformed region: {0}")]
    MalformedRegion(String),

    /// Granularity is not one of word, line or paragraph
    #[error("Unsupported granularity: '{0}' (expected word, line or paragraph)")]
    UnsupportedGranularity(String),

    /// No JSON document could be recovered from the manifest file
    #[error("Manifest format error: {0}")]
    ManifestFormat(String),

    /// No canvas in the manifest carries the expected identifier
    #[error("Canvas not found in manifest: {0}")]
    CanvasNotFound(String),

    /// Reading or writing an existing path failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ConversionError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<quick_xml::Error> for ConversionError {
    fn from(error: quick_xml::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ConversionError {
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        Self::Parse(format!("invalid attribute: {}", error))
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
