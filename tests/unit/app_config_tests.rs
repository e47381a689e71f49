/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use hocr2iiif::app_config::{Config, LogLevel};
use hocr2iiif::hocr::Granularity;
use crate::common;

/// A missing config file is created with defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefault() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert_eq!(config, Config::default());
    assert!(path.exists());
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded, config);

    Ok(())
}

/// An existing config file is read as-is
#[test]
fn test_load_or_create_withExistingFile_shouldParseIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "canvas_url_template": "{{ '/' | absolute_url }}img/derivatives/iiif/canvas/recipebook_{id}.json",
            "annotation_list_base_template": "{{ '/' | absolute_url }}img/derivatives/iiif/annotation/",
            "granularity": "line",
            "pretty_json": true,
            "log_level": "warn"
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.granularity, Granularity::Line);
    assert!(config.pretty_json);
    assert_eq!(config.log_level, LogLevel::Warn);
    assert!(config.validate().is_ok());
    assert_eq!(
        config.canvas_template()?.expand_id("002"),
        "{{ '/' | absolute_url }}img/derivatives/iiif/canvas/recipebook_002.json"
    );

    Ok(())
}

/// An unknown granularity in the config file is rejected
#[test]
fn test_load_or_create_withBadGranularity_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", r#"{"granularity": "page"}"#)?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}
