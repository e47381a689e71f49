//! hOCR input handling: element selection, text normalization and bbox geometry.

pub mod geometry;
pub mod parser;

pub use geometry::Region;
pub use parser::{Chunk, Granularity, HocrDocument, HocrElement};
