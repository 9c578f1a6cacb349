//! Cataloging pipeline: parse delimiter-encoded filenames, reconcile them
//! into a ToC document, persist it, and move the files onto their short
//! names.

use std::fs;
use std::path::Path;

use tracing::{error, info};
use walkdir::WalkDir;

use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use crate::parse;
use crate::reconcile::{self, ParsedTrack};
use crate::toc;

/// What happened to one scanned directory.
#[derive(Debug, PartialEq, Eq)]
pub enum DirOutcome {
    /// A ToC with this many tracks was written.
    Cataloged(usize),
    /// The directory already holds a ToC and was left alone.
    HasToc,
    /// No matching audio files.
    NoTracks,
}

#[derive(Debug, Default)]
pub struct CatalogSummary {
    pub cataloged: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Catalog every directory under the configured source. Directory-scoped
/// failures are logged and counted without stopping the run; no ToC is
/// written for a directory that failed.
pub fn run(config: &CatalogConfig) -> Result<CatalogSummary> {
    if !config.source.is_dir() {
        return Err(Error::Config(format!(
            "source {} is not a directory",
            config.source.display()
        )));
    }

    let mut summary = CatalogSummary::default();
    if config.recurse {
        for entry in WalkDir::new(&config.source)
            .into_iter()
            .filter_map(|entry| entry.ok())
        {
            if entry.file_type().is_dir() {
                catalog_into(&mut summary, entry.path(), config);
            }
        }
    } else {
        catalog_into(&mut summary, &config.source, config);
    }
    Ok(summary)
}

fn catalog_into(summary: &mut CatalogSummary, dir: &Path, config: &CatalogConfig) {
    match catalog_dir(dir, config) {
        Ok(DirOutcome::Cataloged(tracks)) => {
            info!("cataloged {} ({tracks} tracks)", dir.display());
            summary.cataloged += 1;
        }
        Ok(DirOutcome::HasToc) => {
            info!("{} already contains a ToC, skipping", dir.display());
            summary.skipped += 1;
        }
        Ok(DirOutcome::NoTracks) => {}
        Err(err) => {
            error!("{}: {err}", dir.display());
            summary.failed += 1;
        }
    }
}

/// Catalog a single directory. Any parse or reconciliation failure aborts
/// the directory before the ToC is written, so no partial document ever
/// reaches disk.
pub fn catalog_dir(dir: &Path, config: &CatalogConfig) -> Result<DirOutcome> {
    if toc::exists(dir) {
        return Ok(DirOutcome::HasToc);
    }

    let mut names = matching_files(dir, &config.extension)?;
    if names.is_empty() {
        return Ok(DirOutcome::NoTracks);
    }
    names.sort();

    let suffix = format!(".{}", config.extension);
    let mut parsed = Vec::with_capacity(names.len());
    for name in names {
        let stem = name.strip_suffix(&suffix).unwrap_or(&name).to_string();
        let tags = parse::parse_stem(&stem, &config.delimiter, &config.schema, config.policy)?;
        parsed.push(ParsedTrack {
            tags,
            long_name: name,
        });
    }

    let album = reconcile::reconcile(parsed, &config.separator)?;
    toc::save(dir, &album)?;

    // The document already records both names, so the move can follow it.
    for track in &album.tracks {
        let short = &track.filename.short;
        if short.is_empty() || *short == track.filename.long {
            continue;
        }
        fs::rename(dir.join(&track.filename.long), dir.join(short))?;
    }

    Ok(DirOutcome::Cataloged(album.tracks.len()))
}

/// Non-hidden files in `dir` carrying the configured extension.
fn matching_files(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let suffix = format!(".{extension}");
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !name.ends_with(&suffix) {
            continue;
        }
        names.push(name);
    }
    Ok(names)
}
