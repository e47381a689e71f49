//! IIIF output: URI templates, annotation lists and manifest patching.

pub mod annotation;
pub mod manifest;
pub mod uri_template;

pub use annotation::{Annotation, AnnotationList, TextResource, build_annotation, build_annotation_list};
pub use manifest::{LinkOutcome, Manifest, merge_annotation_list};
pub use uri_template::{UriTemplate, join_url};
