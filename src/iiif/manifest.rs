use std::fmt;
use std::path::Path;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};

use crate::errors::{ConversionError, Result};
use crate::file_utils::FileManager;
use crate::iiif::annotation::ANNOTATION_LIST_TYPE;

// @module: IIIF manifest loading and canvas patching

// @const: Leading front-matter block delimited by `---` lines
static FRONT_MATTER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A(---\r?\n(?:.*?\r?\n)?---\r?\n)(.*)\z").expect("front matter regex is valid")
});

/// Result of attaching an annotation list to a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The canvas already referenced the list; nothing changed
    AlreadyLinked,
    /// `otherContent` was replaced with a reference to the list
    Linked,
}

impl LinkOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, LinkOutcome::Linked)
    }
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkOutcome::AlreadyLinked => f.write_str("already linked"),
            LinkOutcome::Linked => f.write_str("linked"),
        }
    }
}

/// A manifest file: opaque prefix followed by the JSON document.
///
/// The prefix is kept byte for byte. The JSON keeps its key order so that a
/// rewrite only touches the patched canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    prefix: String,
    document: Value,
}

impl Manifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = FileManager::read_to_string(path.as_ref())?;
        Self::load(&raw)
    }

    /// Split raw file content into prefix and JSON body and parse the body
    pub fn load(raw: &str) -> Result<Self> {
        let (prefix, body) = match FRONT_MATTER_REGEX.captures(raw) {
            Some(caps) => {
                let prefix = caps.get(1).map_or("", |m| m.as_str());
                let body = caps.get(2).map_or("", |m| m.as_str());
                (prefix, body)
            }
            None => ("", raw),
        };

        if body.trim().is_empty() {
            return Err(ConversionError::ManifestFormat(
                "no JSON document after the front matter".to_string(),
            ));
        }

        let document: Value = serde_json::from_str(body)
            .map_err(|e| ConversionError::ManifestFormat(format!("invalid JSON body: {}", e)))?;

        debug!("Loaded manifest with {} byte prefix", prefix.len());

        Ok(Manifest {
            prefix: prefix.to_string(),
            document,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// `sequences[0].canvases`
    pub fn canvases(&self) -> Result<&Vec<Value>> {
        self.document
            .get("sequences")
            .and_then(|sequences| sequences.get(0))
            .and_then(|sequence| sequence.get("canvases"))
            .and_then(Value::as_array)
            .ok_or_else(missing_canvases)
    }

    fn canvases_mut(&mut self) -> Result<&mut Vec<Value>> {
        self.document
            .get_mut("sequences")
            .and_then(|sequences| sequences.get_mut(0))
            .and_then(|sequence| sequence.get_mut("canvases"))
            .and_then(Value::as_array_mut)
            .ok_or_else(missing_canvases)
    }

    /// First canvas whose `@id` equals `canvas_id`
    pub fn find_canvas(&self, canvas_id: &str) -> Result<&Value> {
        self.canvases()?
            .iter()
            .find(|canvas| canvas_identifier(canvas) == Some(canvas_id))
            .ok_or_else(|| ConversionError::CanvasNotFound(canvas_id.to_string()))
    }

    pub fn find_canvas_mut(&mut self, canvas_id: &str) -> Result<&mut Value> {
        self.canvases_mut()?
            .iter_mut()
            .find(|canvas| canvas_identifier(canvas) == Some(canvas_id))
            .ok_or_else(|| ConversionError::CanvasNotFound(canvas_id.to_string()))
    }

    /// Point the canvas `canvas_id` at the annotation list `list_id`
    pub fn link_annotation_list(&mut self, canvas_id: &str, list_id: &str) -> Result<LinkOutcome> {
        let canvas = self.find_canvas_mut(canvas_id)?;
        let outcome = merge_annotation_list(canvas, list_id)?;
        info!("AnnotationList {} {} on canvas {}", list_id, outcome, canvas_id);
        Ok(outcome)
    }

    /// Prefix followed by the compact JSON document
    pub fn serialize(&self) -> Result<String> {
        let body = serde_json::to_string(&self.document)
            .map_err(|e| ConversionError::ManifestFormat(format!("cannot serialize manifest: {}", e)))?;
        Ok(format!("{}{}", self.prefix, body))
    }

    /// Atomically replace the file at `path` with the serialized manifest
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        FileManager::write_atomic(path, &self.serialize()?)
    }
}

fn missing_canvases() -> ConversionError {
    ConversionError::Parse("manifest has no sequences[0].canvases array".to_string())
}

fn canvas_identifier(canvas: &Value) -> Option<&str> {
    canvas.get("@id").and_then(Value::as_str)
}

/// Attach `list_id` to a canvas.
///
/// Only one annotation list per canvas is supported: a canvas already holding
/// exactly this list is left alone, anything else in `otherContent` is replaced.
pub fn merge_annotation_list(canvas: &mut Value, list_id: &str) -> Result<LinkOutcome> {
    let canvas = canvas
        .as_object_mut()
        .ok_or_else(|| ConversionError::Parse("canvas is not a JSON object".to_string()))?;

    if is_linked(canvas, list_id) {
        return Ok(LinkOutcome::AlreadyLinked);
    }

    canvas.insert(
        "otherContent".to_string(),
        json!([{ "@id": list_id, "@type": ANNOTATION_LIST_TYPE }]),
    );

    Ok(LinkOutcome::Linked)
}

fn is_linked(canvas: &Map<String, Value>, list_id: &str) -> bool {
    match canvas.get("otherContent").and_then(Value::as_array) {
        Some(entries) if entries.len() == 1 => {
            entries[0].get("@id").and_then(Value::as_str) == Some(list_id)
        }
        _ => false,
    }
}
