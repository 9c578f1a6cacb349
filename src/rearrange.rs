//! Move files into a tag-derived directory tree. Unlike the ToC-driven
//! pipelines this reads the tags embedded in each file, so it works on
//! trees that were never cataloged.

use std::fs;
use std::path::Path;

use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::parse;
use crate::render;
use crate::tagwrite;
use crate::types::Field;

#[derive(Debug, Default)]
pub struct RearrangeSummary {
    pub moved: usize,
    pub discarded: usize,
    pub failed: usize,
}

pub fn run(source: &Path, dest_root: &Path, template: &str) -> Result<RearrangeSummary> {
    if !source.is_dir() {
        return Err(Error::Config(format!(
            "source {} is not a directory",
            source.display()
        )));
    }

    let mut summary = RearrangeSummary::default();
    for entry in WalkDir::new(source)
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        if !entry.file_type().is_file() || is_hidden(entry.path()) {
            continue;
        }
        match rearrange_file(entry.path(), dest_root, template) {
            Ok(true) => summary.moved += 1,
            Ok(false) => summary.discarded += 1,
            Err(err) => {
                error!("{}: {err}", entry.path().display());
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Returns `Ok(true)` when the file was moved, `Ok(false)` when an equal
/// destination already existed and the source was discarded.
fn rearrange_file(path: &Path, dest_root: &Path, template: &str) -> Result<bool> {
    let mut fields = tagwrite::read_fields(path)?;
    if let Some(raw) = fields.get(&Field::Track) {
        let context = path.display().to_string();
        let normalized = parse::normalize_track_number(&context, raw)?;
        fields.insert(Field::Track, normalized);
    }

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let destination = render::destination(dest_root, template, &fields, extension);
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    if destination.exists() {
        warn!(
            "{} already exists, discarding {}",
            destination.display(),
            path.display()
        );
        fs::remove_file(path)?;
        return Ok(false);
    }

    move_file(path, &destination)?;
    info!("moved {} -> {}", path.display(), destination.display());
    Ok(true)
}

/// Plain rename, falling back to copy-and-remove when the destination is
/// on another filesystem.
fn move_file(source: &Path, destination: &Path) -> Result<()> {
    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }
    fs::copy(source, destination)?;
    fs::remove_file(source)?;
    Ok(())
}
