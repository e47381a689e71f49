use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};

use crate::errors::{ConversionError, Result};
use crate::file_utils::FileManager;
use crate::hocr::geometry::{self, Region};

// @module: hOCR document loading and chunk selection

/// OCR structural level at which annotations are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Word,
    Line,
    #[default]
    Paragraph,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Word, Granularity::Line, Granularity::Paragraph];

    /// hOCR class marking elements of this granularity
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Word => "ocrx_word",
            Self::Line => "ocr_line",
            Self::Paragraph => "ocr_par",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Line => "line",
            Self::Paragraph => "paragraph",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "word" => Ok(Self::Word),
            "line" => Ok(Self::Line),
            "paragraph" => Ok(Self::Paragraph),
            _ => Err(ConversionError::UnsupportedGranularity(s.to_string())),
        }
    }
}

/// One element of the hOCR tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HocrElement {
    /// Tag name as written in the source
    pub name: String,
    pub class: Option<String>,
    pub title: Option<String>,
    /// Concatenated text of all descendants, unnormalized
    pub text: String,
    /// Nesting depth, root element is 0
    pub depth: usize,
}

impl HocrElement {
    pub fn has_class_marker(&self, marker: &str) -> bool {
        self.class.as_deref().is_some_and(|class| class.contains(marker))
    }
}

/// Text and position of one selected element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub region: Region,
}

impl Chunk {
    pub fn new(text: impl Into<String>, region: Region) -> Self {
        Chunk {
            text: text.into(),
            region,
        }
    }
}

/// Parsed hOCR file, elements kept in document order
#[derive(Debug, Clone, Default)]
pub struct HocrDocument {
    elements: Vec<HocrElement>,
}

impl HocrDocument {
    /// Load and parse an hOCR file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = FileManager::read_to_string(path.as_ref())?;
        let document = Self::parse(&content)?;
        debug!(
            "Parsed {} elements from {}",
            document.elements.len(),
            path.as_ref().display()
        );
        Ok(document)
    }

    /// Parse hOCR markup held in memory
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.trim_text(false);
        reader.check_end_names(true);

        let mut elements: Vec<HocrElement> = Vec::new();
        // indexes into `elements` of the currently open tags
        let mut open: Vec<usize> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                ConversionError::Parse(format!("{} at byte {}", e, reader.buffer_position()))
            })?;

            match event {
                Event::Start(start) => {
                    elements.push(Self::element_from_tag(&start, open.len())?);
                    open.push(elements.len() - 1);
                }
                Event::Empty(start) => {
                    elements.push(Self::element_from_tag(&start, open.len())?);
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::Text(text) => {
                    let text = text.unescape_with(resolve_html_entity)?;
                    Self::append_text(&mut elements, &open, &text);
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8_lossy(&cdata);
                    Self::append_text(&mut elements, &open, &text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(&index) = open.last() {
            return Err(ConversionError::Parse(format!(
                "unclosed element <{}> at end of document",
                elements[index].name
            )));
        }

        Ok(HocrDocument { elements })
    }

    fn element_from_tag(start: &BytesStart<'_>, depth: usize) -> Result<HocrElement> {
        Ok(HocrElement {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            class: Self::attribute(start, "class")?,
            title: Self::attribute(start, "title")?,
            text: String::new(),
            depth,
        })
    }

    fn attribute(start: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
        match start.try_get_attribute(name)? {
            Some(attr) => {
                let value = attr.unescape_value_with(resolve_html_entity)?;
                Ok(Some(value.into_owned()))
            }
            None => Ok(None),
        }
    }

    fn append_text(elements: &mut [HocrElement], open: &[usize], text: &str) {
        for &index in open {
            elements[index].text.push_str(text);
        }
    }

    /// All elements in document order
    pub fn elements(&self) -> &[HocrElement] {
        &self.elements
    }

    /// Elements whose class attribute contains the granularity marker, in document order
    pub fn select(&self, granularity: Granularity) -> Vec<&HocrElement> {
        let marker = granularity.marker();
        self.elements
            .iter()
            .filter(|element| element.has_class_marker(marker))
            .collect()
    }

    /// Like `select`, for a granularity given by name
    pub fn select_by_name(&self, granularity: &str) -> Result<Vec<&HocrElement>> {
        let granularity = granularity.parse::<Granularity>()?;
        Ok(self.select(granularity))
    }

    /// Normalized chunks for a granularity; elements with no text are dropped
    pub fn chunks(&self, granularity: Granularity) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();

        for element in self.select(granularity) {
            let text = normalize_text(&element.text);
            if text.is_empty() {
                debug!("Skipping empty <{}> element", element.name);
                continue;
            }

            let region = geometry::region_from_title(element.title.as_deref())?;
            chunks.push(Chunk::new(text, region));
        }

        Ok(chunks)
    }
}

/// Collapse newlines and whitespace runs to single spaces and trim
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// XHTML written by OCR engines often uses HTML entities without declaring them
fn resolve_html_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some("\u{a0}"),
        "ensp" => Some("\u{2002}"),
        "emsp" => Some("\u{2003}"),
        "thinsp" => Some("\u{2009}"),
        _ => None,
    }
}
