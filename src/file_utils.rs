use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use crate::errors::{ConversionError, Result};
use crate::hocr::Granularity;

// @module: File and path utilities

/// Suffix stripped from hOCR file names to derive the page identifier
const HOCR_EXTENSION: &str = ".hocr";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path).map_err(|e| ConversionError::io(path, e))?;
        }
        Ok(())
    }

    /// Page identifier of an hOCR file: its name with a trailing `.hocr` removed.
    ///
    /// Only the `.hocr` suffix is stripped (case-insensitively), so `002.html`
    /// keeps its full name as the identifier.
    pub fn identifier_from_path<P: AsRef<Path>>(path: P) -> Option<String> {
        let name = path.as_ref().file_name()?.to_string_lossy().to_string();
        let stem_len = name.len().saturating_sub(HOCR_EXTENSION.len());
        let identifier = match name.get(stem_len..) {
            Some(suffix) if suffix.eq_ignore_ascii_case(HOCR_EXTENSION) => &name[..stem_len],
            _ => name.as_str(),
        };

        Some(identifier.to_string()).filter(|id| !id.is_empty())
    }

    // @generates: Output path for an annotation list next to its hOCR input
    // @params: input_file, identifier, granularity
    pub fn generate_output_path<P: AsRef<Path>>(
        input_file: P,
        identifier: &str,
        granularity: Granularity,
    ) -> PathBuf {
        let dir = input_file.as_ref().parent().unwrap_or(Path::new(""));
        dir.join(format!("{}-annotation-list-{}.json", identifier, granularity))
    }

    /// Read a file to a string, reporting a missing file as `FileNotFound`
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            return Err(ConversionError::FileNotFound(path.to_path_buf()));
        }

        fs::read_to_string(path).map_err(|e| ConversionError::io(path, e))
    }

    /// Replace the file at `path` with `content`.
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed over the target, so readers never see a partial file.
    /// An existing target keeps its permissions; a new one gets the same
    /// umask-derived permissions `File::create` would give it.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&dir)?;

        let permissions = Self::target_permissions(path)?;

        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| ConversionError::io(&dir, e))?;
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.flush())
            .and_then(|_| temp.as_file().set_permissions(permissions))
            .map_err(|e| ConversionError::io(temp.path(), e))?;
        temp.persist(path)
            .map_err(|e| ConversionError::io(path, e.error))?;

        debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    // @returns: Permissions the rewritten file should carry
    fn target_permissions(path: &Path) -> Result<fs::Permissions> {
        match fs::metadata(path) {
            Ok(metadata) => Ok(metadata.permissions()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // Let the OS apply the umask, then take over what it chose
                let created = fs::File::create(path).map_err(|e| ConversionError::io(path, e))?;
                created
                    .metadata()
                    .map(|metadata| metadata.permissions())
                    .map_err(|e| ConversionError::io(path, e))
            }
            Err(e) => Err(ConversionError::io(path, e)),
        }
    }
}
