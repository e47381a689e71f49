/*!
 * Integration tests for the hOCR to manifest workflow
 */

use std::fs;
use anyhow::Result;
use serde_json::Value;

use hocr2iiif::errors::ConversionError;
use hocr2iiif::hocr::Granularity;
use hocr2iiif::{ConversionRequest, Controller, LinkOutcome};
use crate::common;

/// Paragraph annotations for page 002 carry the expected ids, targets and text
#[test]
fn test_run_withRecipePage_shouldWriteAnnotationList() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let hocr = common::create_test_file(temp_dir.path(), "002.hocr", common::RECIPE_HOCR)?;

    let controller = Controller::with_config(common::test_config())?;
    let mut request = ConversionRequest::new(&hocr);
    request.granularity = Some(Granularity::Paragraph);

    let report = controller.run(&request)?;

    assert_eq!(report.identifier, "002");
    assert_eq!(report.annotation_count, 2);
    assert_eq!(report.link, None);
    assert_eq!(report.output_path, temp_dir.path().join("002-annotation-list-paragraph.json"));
    assert_eq!(
        report.annotation_list_id,
        "https://example.org/iiif/annotation/002-annotation-list-paragraph.json"
    );

    let list: Value = serde_json::from_str(&fs::read_to_string(&report.output_path)?)?;
    let resources = list["resources"].as_array().expect("resources array");

    assert_eq!(list["@type"], "sc:AnnotationList");
    assert_eq!(list["@label"], "OCR text granularity of paragraph");
    assert_eq!(resources.len(), 2);
    assert!(resources[0]["@id"].as_str().unwrap().ends_with("/10,10,40,20"));
    assert!(resources[1]["@id"].as_str().unwrap().ends_with("/10,40,40,20"));
    assert_eq!(resources[0]["resource"]["chars"], "Flour");
    assert_eq!(resources[1]["resource"]["chars"], "Sugar");
    assert_eq!(
        resources[1]["on"],
        "https://example.org/iiif/canvas/recipebook_002.json#xywh=10,40,40,20"
    );

    Ok(())
}

/// The second run finds the list already linked and leaves the manifest untouched
#[test]
fn test_run_withManifestTwice_shouldLinkOnce() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let hocr = common::create_test_file(temp_dir.path(), "002.hocr", common::RECIPE_HOCR)?;
    let manifest = common::create_test_file(temp_dir.path(), "manifest.json", &common::recipe_manifest())?;

    let controller = Controller::with_config(common::test_config())?;
    let mut request = ConversionRequest::new(&hocr);
    request.manifest_path = Some(manifest.clone());

    let first = controller.run(&request)?;
    assert_eq!(first.link, Some(LinkOutcome::Linked));
    let after_first = fs::read_to_string(&manifest)?;
    let modified_first = fs::metadata(&manifest)?.modified()?;
    #[cfg(unix)]
    let inode_first = std::os::unix::fs::MetadataExt::ino(&fs::metadata(&manifest)?);

    let second = controller.run(&request)?;
    assert_eq!(second.link, Some(LinkOutcome::AlreadyLinked));
    let after_second = fs::read_to_string(&manifest)?;

    assert_eq!(after_first, after_second);
    // an atomic rewrite would swap in a new file even with identical bytes
    assert_eq!(fs::metadata(&manifest)?.modified()?, modified_first);
    #[cfg(unix)]
    assert_eq!(std::os::unix::fs::MetadataExt::ino(&fs::metadata(&manifest)?), inode_first);
    assert!(after_second.starts_with(common::MANIFEST_FRONT_MATTER));

    let json: Value = serde_json::from_str(&after_second[common::MANIFEST_FRONT_MATTER.len()..])?;
    let canvases = json["sequences"][0]["canvases"].as_array().expect("canvases");
    assert_eq!(canvases[0]["otherContent"], serde_json::json!([]));
    assert_eq!(
        canvases[1]["otherContent"],
        serde_json::json!([{
            "@id": "https://example.org/iiif/annotation/002-annotation-list-paragraph.json",
            "@type": "sc:AnnotationList"
        }])
    );
    assert!(canvases[2].get("otherContent").is_none());

    Ok(())
}

/// Without a matching canvas the run fails and the manifest is not rewritten
#[test]
fn test_run_withUnknownCanvas_shouldFailWithoutWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let hocr = common::create_test_file(temp_dir.path(), "009.hocr", common::RECIPE_HOCR)?;
    let original = common::recipe_manifest();
    let manifest = common::create_test_file(temp_dir.path(), "manifest.json", &original)?;

    let controller = Controller::with_config(common::test_config())?;
    let mut request = ConversionRequest::new(&hocr);
    request.manifest_path = Some(manifest.clone());

    let err = controller.run(&request).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConversionError>(),
        Some(ConversionError::CanvasNotFound(_))
    ));
    assert!(format!("{:#}", err).contains("[009]"));
    assert_eq!(fs::read_to_string(&manifest)?, original);

    Ok(())
}

/// A manifest that is only front matter is reported as a format error
#[test]
fn test_run_withEmptyManifestBody_shouldFailWithFormatError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let hocr = common::create_test_file(temp_dir.path(), "002.hocr", common::RECIPE_HOCR)?;
    let manifest = common::create_test_file(temp_dir.path(), "manifest.json", common::MANIFEST_FRONT_MATTER)?;

    let controller = Controller::with_config(common::test_config())?;
    let mut request = ConversionRequest::new(&hocr);
    request.manifest_path = Some(manifest);

    let err = controller.run(&request).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConversionError>(),
        Some(ConversionError::ManifestFormat(_))
    ));

    Ok(())
}

/// Word granularity with explicit identifier and output path
#[test]
fn test_run_withWordGranularityAndOverrides_shouldUseThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let hocr = common::create_test_file(temp_dir.path(), "scan.hocr", common::RECIPE_HOCR)?;
    let output = temp_dir.path().join("out").join("words.json");

    let controller = Controller::with_config(common::test_config())?;
    let request = ConversionRequest {
        hocr_path: hocr,
        granularity: Some(Granularity::Word),
        identifier: Some("002".to_string()),
        output_path: Some(output.clone()),
        manifest_path: None,
    };

    let report = controller.run(&request)?;

    assert_eq!(report.annotation_count, 2);
    assert_eq!(report.output_path, output);
    assert!(report.annotation_list_id.ends_with("/002-annotation-list-word.json"));
    assert!(output.exists());

    Ok(())
}

/// A missing hOCR file surfaces as FileNotFound with the identifier in context
#[test]
fn test_run_withMissingHocr_shouldFailWithFileNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config())?;
    let request = ConversionRequest::new(temp_dir.path().join("002.hocr"));

    let err = controller.run(&request).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConversionError>(),
        Some(ConversionError::FileNotFound(_))
    ));
    assert!(format!("{:#}", err).contains("[002] failed to parse hOCR file"));

    Ok(())
}
