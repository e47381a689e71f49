/*!
 * Tests for error types
 */

use std::path::PathBuf;
use hocr2iiif::errors::ConversionError;

#[test]
fn test_conversionError_fileNotFound_shouldNamePath() {
    let error = ConversionError::FileNotFound(PathBuf::from("/data/002.hocr"));
    let display = format!("{}", error);
    assert!(display.contains("File not found"));
    assert!(display.contains("/data/002.hocr"));
}

#[test]
fn test_conversionError_unsupportedGranularity_shouldListChoices() {
    let error = ConversionError::UnsupportedGranularity("page".to_string());
    let display = format!("{}", error);
    assert!(display.contains("'page'"));
    assert!(display.contains("word, line or paragraph"));
}

#[test]
fn test_conversionError_canvasNotFound_shouldDisplayCanvasId() {
    let error = ConversionError::CanvasNotFound("https://example.org/canvas/9".to_string());
    assert_eq!(
        format!("{}", error),
        "Canvas not found in manifest: https://example.org/canvas/9"
    );
}

#[test]
fn test_conversionError_io_shouldKeepSource() {
    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error = ConversionError::io("/data/manifest.json", io_error);
    let display = format!("{}", error);
    assert!(display.contains("/data/manifest.json"));
    assert!(display.contains("denied"));
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_conversionError_intoAnyhow_shouldPreserveMessage() {
    let error: anyhow::Error = ConversionError::MalformedRegion("bbox 1 2".to_string()).into();
    assert!(error.to_string().contains("Malformed region: bbox 1 2"));
}
