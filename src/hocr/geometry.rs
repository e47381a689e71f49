use std::fmt;

use crate::errors::{ConversionError, Result};

// @module: bbox extraction from hOCR title properties

/// Keyword introducing a bounding box in an hOCR `title` attribute
pub const BBOX_KEYWORD: &str = "bbox";

/// Rectangle on the page image, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Region { x, y, width, height }
    }

    /// Build a region from left/top/right/bottom corners
    pub fn from_corners(x0: u32, y0: u32, x1: u32, y1: u32) -> Result<Self> {
        let width = x1.checked_sub(x0).ok_or_else(|| {
            ConversionError::MalformedRegion(format!("right edge {} is left of {}", x1, x0))
        })?;
        let height = y1.checked_sub(y0).ok_or_else(|| {
            ConversionError::MalformedRegion(format!("bottom edge {} is above {}", y1, y0))
        })?;

        Ok(Region::new(x0, y0, width, height))
    }

    /// Compact `x,y,w,h` form used in annotation ids and media fragments
    pub fn xywh(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

/// Parse a single property such as `bbox 10 20 110 220`.
///
/// The property must begin with the keyword to count as a bbox, so
/// neighbours like `x_bboxes` or an image path containing "bbox" are ignored.
/// Returns `Ok(None)` for any other property, and `MalformedRegion` when the
/// keyword is there but the four coordinates are not.
pub fn parse_bbox(property: &str) -> Result<Option<Region>> {
    let property = property.trim();
    let mut tokens = property.split_whitespace();
    let Some(keyword) = tokens.next() else {
        return Ok(None);
    };

    if !keyword.eq_ignore_ascii_case(BBOX_KEYWORD) {
        // `bbox10 20 30 40`: the keyword is there but glued to its first coordinate
        let glued = keyword
            .get(..BBOX_KEYWORD.len())
            .filter(|head| head.eq_ignore_ascii_case(BBOX_KEYWORD))
            .map(|_| &keyword[BBOX_KEYWORD.len()..]);
        return match glued {
            Some(tail) if tail.starts_with(|c: char| c.is_ascii_digit() || c == '-') => {
                Err(ConversionError::MalformedRegion(property.to_string()))
            }
            _ => Ok(None),
        };
    }

    let mut coords = [0u32; 4];
    for slot in coords.iter_mut() {
        *slot = tokens
            .next()
            .and_then(|token| token.parse::<u32>().ok())
            .ok_or_else(|| ConversionError::MalformedRegion(property.to_string()))?;
    }

    let [x0, y0, x1, y1] = coords;
    Region::from_corners(x0, y0, x1, y1).map(Some)
}

/// Extract the region from a whole `title` attribute value.
///
/// Properties are separated by `;`. When several carry a bbox the last one
/// wins; with none the region is all zeros.
pub fn region_from_title(title: Option<&str>) -> Result<Region> {
    let mut region = Region::default();

    if let Some(title) = title {
        for property in title.split(';') {
            if let Some(found) = parse_bbox(property)? {
                region = found;
            }
        }
    }

    Ok(region)
}
