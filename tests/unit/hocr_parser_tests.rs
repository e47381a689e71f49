/*!
 * Tests for hOCR parsing and chunk selection
 */

use anyhow::Result;
use hocr2iiif::errors::ConversionError;
use hocr2iiif::hocr::{Granularity, HocrDocument, Region};
use crate::common;

/// Every granularity selects exactly the elements carrying its marker
#[test]
fn test_select_withRecipePage_shouldReturnMarkedElementsInOrder() -> Result<()> {
    let doc = HocrDocument::parse(common::RECIPE_HOCR)?;

    for granularity in Granularity::ALL {
        let selected = doc.select(granularity);
        let expected: Vec<_> = doc
            .elements()
            .iter()
            .filter(|e| e.class.as_deref().is_some_and(|c| c.contains(granularity.marker())))
            .collect();

        assert_eq!(selected, expected, "granularity {}", granularity);
        assert_eq!(selected.len(), 3);
    }

    let words = doc.select(Granularity::Word);
    assert_eq!(words[0].text, "Flour");
    assert_eq!(words[1].text, "Sugar");

    Ok(())
}

/// An unknown granularity never matches everything
#[test]
fn test_select_by_name_withUnknownGranularity_shouldFail() -> Result<()> {
    let doc = HocrDocument::parse(common::RECIPE_HOCR)?;

    for name in ["", "page", "block", "words"] {
        let err = doc.select_by_name(name).unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedGranularity(_)), "{:?}", name);
    }

    Ok(())
}

/// Blank elements are dropped and regions are derived from the title
#[test]
fn test_chunks_withParagraphs_shouldSkipBlankAndComputeRegions() -> Result<()> {
    let doc = HocrDocument::parse(common::RECIPE_HOCR)?;
    let chunks = doc.chunks(Granularity::Paragraph)?;

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, "Flour");
    assert_eq!(chunks[0].region, Region::new(10, 10, 40, 20));
    assert_eq!(chunks[1].text, "Sugar");
    assert_eq!(chunks[1].region, Region::new(10, 40, 40, 20));

    Ok(())
}

/// Elements without a title get the zero region
#[test]
fn test_chunks_withoutTitle_shouldUseZeroRegion() -> Result<()> {
    let doc = HocrDocument::parse(
        "<body><span class='ocr_line'>Hello\nWorld  Foo</span></body>",
    )?;
    let chunks = doc.chunks(Granularity::Line)?;

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "Hello World Foo");
    assert_eq!(chunks[0].region, Region::default());

    Ok(())
}

/// Loading a file that does not exist fails with FileNotFound
#[test]
fn test_from_file_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let err = HocrDocument::from_file(temp_dir.path().join("404.hocr")).unwrap_err();
    assert!(matches!(err, ConversionError::FileNotFound(_)));
    Ok(())
}
