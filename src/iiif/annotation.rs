/*!
 * IIIF Presentation 2 Open Annotation objects built from hOCR chunks.
 *
 * Every non-empty chunk becomes one `oa:Annotation` painting its text onto a
 * region of the page canvas. Annotations are gathered into an
 * `sc:AnnotationList` whose order is the order of the source document.
 */

use serde::{Deserialize, Serialize};

use crate::hocr::{Chunk, Granularity};
use crate::iiif::uri_template::join_url;

pub const PRESENTATION_CONTEXT: &str = "http://iiif.io/api/presentation/2/context.json";
pub const ANNOTATION_LIST_TYPE: &str = "sc:AnnotationList";
pub const ANNOTATION_TYPE: &str = "oa:Annotation";
pub const PAINTING_MOTIVATION: &str = "sc:painting";
pub const TEXT_RESOURCE_TYPE: &str = "cnt:ContentAsText";

/// Textual body of an annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResource {
    #[serde(rename = "@type")]
    pub resource_type: String,
    pub format: String,
    pub chars: String,
}

impl TextResource {
    pub fn plain(chars: impl Into<String>) -> Self {
        TextResource {
            resource_type: TEXT_RESOURCE_TYPE.to_string(),
            format: "text/plain".to_string(),
            chars: chars.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub annotation_type: String,
    pub motivation: String,
    pub resource: TextResource,
    /// Canvas media fragment, `<canvas>#xywh=x,y,w,h`
    pub on: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationList {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub list_type: String,
    #[serde(rename = "@label")]
    pub label: String,
    pub resources: Vec<Annotation>,
}

impl AnnotationList {
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Base of all ids minted for one list: `<base>/<identifier>-annotation-list-<granularity>`
pub fn annotation_list_id_base(base_url: &str, identifier: &str, granularity: Granularity) -> String {
    join_url(base_url, &format!("{}-annotation-list-{}", identifier, granularity))
}

/// Canonical id of the list document
pub fn annotation_list_id(base_url: &str, identifier: &str, granularity: Granularity) -> String {
    format!("{}.json", annotation_list_id_base(base_url, identifier, granularity))
}

pub fn build_annotation(chunk: &Chunk, list_id_base: &str, canvas_id: &str) -> Annotation {
    let xywh = chunk.region.xywh();

    Annotation {
        id: join_url(list_id_base, &xywh),
        annotation_type: ANNOTATION_TYPE.to_string(),
        motivation: PAINTING_MOTIVATION.to_string(),
        resource: TextResource::plain(chunk.text.clone()),
        on: format!("{}#xywh={}", canvas_id, xywh),
    }
}

/// Assemble the list for one page. `canvas_id_of` maps the page identifier
/// to its canvas URL.
pub fn build_annotation_list<F>(
    chunks: &[Chunk],
    identifier: &str,
    granularity: Granularity,
    base_url: &str,
    canvas_id_of: F,
) -> AnnotationList
where
    F: Fn(&str) -> String,
{
    let list_id_base = annotation_list_id_base(base_url, identifier, granularity);
    let canvas_id = canvas_id_of(identifier);

    let resources = chunks
        .iter()
        .filter(|chunk| !chunk.text.is_empty())
        .map(|chunk| build_annotation(chunk, &list_id_base, &canvas_id))
        .collect();

    AnnotationList {
        context: PRESENTATION_CONTEXT.to_string(),
        id: format!("{}.json", list_id_base),
        list_type: ANNOTATION_LIST_TYPE.to_string(),
        label: format!("OCR text granularity of {}", granularity),
        resources,
    }
}
