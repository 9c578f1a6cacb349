//! The ToC store: one `ToC.json` per album directory, the single durable
//! representation of album and track metadata.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::AlbumToc;

pub const TOC_FILENAME: &str = "ToC.json";

pub fn toc_path(dir: &Path) -> PathBuf {
    dir.join(TOC_FILENAME)
}

pub fn exists(dir: &Path) -> bool {
    toc_path(dir).is_file()
}

/// Load the ToC of a directory. `Ok(None)` when the directory has none;
/// a document that exists but does not parse is corrupt.
pub fn load(dir: &Path) -> Result<Option<AlbumToc>> {
    let path = toc_path(dir);
    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let toc = serde_json::from_str(&data).map_err(|source| Error::CorruptToc { path, source })?;
    Ok(Some(toc))
}

/// Save the ToC atomically: write a temp file beside the target, then
/// rename it into place, so readers never observe a partial document.
pub fn save(dir: &Path, toc: &AlbumToc) -> Result<()> {
    let path = toc_path(dir);
    let json = serde_json::to_string_pretty(toc).map_err(|source| Error::EncodeToc {
        path: path.clone(),
        source,
    })?;

    let tmp = temp_path(&path);
    fs::write(&tmp, json)?;
    if let Err(err) = fs::rename(&tmp, &path) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

/// Temp name in the same directory as the target so the final rename stays
/// on one filesystem.
fn temp_path(target: &Path) -> PathBuf {
    let pid = std::process::id();
    target.with_file_name(format!(".{TOC_FILENAME}.{pid}.tmp"))
}
