//! Re-derive short filenames from ToC metadata and rename the files,
//! keeping the document in step with the disk after every move.

use std::fs;
use std::path::Path;

use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::sanitize;
use crate::toc;
use crate::types::AlbumToc;

#[derive(Debug, Default)]
pub struct RenameSummary {
    pub renamed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RenameSummary {
    fn absorb(&mut self, other: RenameSummary) {
        self.renamed += other.renamed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

pub fn run(source: &Path, recurse: bool, separator: &str) -> Result<RenameSummary> {
    if !source.is_dir() {
        return Err(Error::Config(format!(
            "source {} is not a directory",
            source.display()
        )));
    }

    let mut summary = RenameSummary::default();
    if recurse {
        for entry in WalkDir::new(source)
            .into_iter()
            .filter_map(|entry| entry.ok())
        {
            if entry.file_type().is_dir() && toc::exists(entry.path()) {
                match rename_dir(entry.path(), separator) {
                    Ok(dir_summary) => summary.absorb(dir_summary),
                    Err(err) => {
                        error!("{}: {err}", entry.path().display());
                        summary.failed += 1;
                    }
                }
            }
        }
    } else {
        summary.absorb(rename_dir(source, separator)?);
    }
    Ok(summary)
}

/// Rename every track of one directory. The ToC is re-saved after each
/// successful rename so an interrupted run leaves it consistent with
/// whatever moves already happened.
pub fn rename_dir(dir: &Path, separator: &str) -> Result<RenameSummary> {
    let mut summary = RenameSummary::default();
    let Some(mut album) = toc::load(dir)? else {
        info!("no ToC in {}, skipping", dir.display());
        return Ok(summary);
    };

    for index in 0..album.tracks.len() {
        match rename_track(dir, &mut album, index, separator) {
            Ok(true) => {
                toc::save(dir, &album)?;
                summary.renamed += 1;
            }
            Ok(false) => summary.skipped += 1,
            Err(err) => {
                error!("{err}");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// Returns `Ok(true)` when the file was moved and the ToC entry updated.
fn rename_track(dir: &Path, album: &mut AlbumToc, index: usize, separator: &str) -> Result<bool> {
    let track = &album.tracks[index];
    let current = track.filename.short.clone();
    let source = dir.join(&current);
    if !source.is_file() {
        return Err(Error::SourceNotFound(source));
    }

    let (Some(number), Some(title)) = (track.track.clone(), track.title.clone()) else {
        warn!("{}: track entry without number or title, skipping", source.display());
        return Ok(false);
    };

    let stem = sanitize::clean(&format!("{number}{separator}{title}"));
    let new_name = match Path::new(&current).extension().and_then(|e| e.to_str()) {
        Some(extension) => format!("{stem}.{extension}"),
        None => stem,
    };
    if new_name == current {
        return Ok(false);
    }

    fs::rename(&source, dir.join(&new_name))?;
    info!("renamed {current} -> {new_name}");
    album.tracks[index].filename.short = new_name;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileNames, TrackEntry};
    use tempfile::tempdir;

    fn entry(track: Option<&str>, title: Option<&str>, short: &str) -> TrackEntry {
        TrackEntry {
            track: track.map(str::to_string),
            title: title.map(str::to_string),
            filename: FileNames {
                long: short.to_string(),
                short: short.to_string(),
            },
        }
    }

    fn album(tracks: Vec<TrackEntry>) -> AlbumToc {
        AlbumToc {
            artist: "Quasar".to_string(),
            album: "Afterglow".to_string(),
            genre: String::new(),
            year: String::new(),
            tracks,
        }
    }

    #[test]
    fn renames_and_persists() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("01-Dawn.wav"), b"audio").unwrap();
        toc::save(
            dir.path(),
            &album(vec![entry(Some("01"), Some("Dawn"), "01-Dawn.wav")]),
        )
        .unwrap();

        let summary = rename_dir(dir.path(), " - ").unwrap();
        assert_eq!(summary.renamed, 1);
        assert!(dir.path().join("01 - Dawn.wav").is_file());
        assert!(!dir.path().join("01-Dawn.wav").exists());

        let reloaded = toc::load(dir.path()).unwrap().unwrap();
        assert_eq!(reloaded.tracks[0].filename.short, "01 - Dawn.wav");
    }

    #[test]
    fn unchanged_name_is_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("01-Dawn.wav"), b"audio").unwrap();
        toc::save(
            dir.path(),
            &album(vec![entry(Some("01"), Some("Dawn"), "01-Dawn.wav")]),
        )
        .unwrap();

        let summary = rename_dir(dir.path(), "-").unwrap();
        assert_eq!(summary.renamed, 0);
        assert_eq!(summary.skipped, 1);
        assert!(dir.path().join("01-Dawn.wav").is_file());
    }

    #[test]
    fn missing_source_fails_that_track_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("02-Dusk.wav"), b"audio").unwrap();
        toc::save(
            dir.path(),
            &album(vec![
                entry(Some("01"), Some("Dawn"), "01-Dawn.wav"),
                entry(Some("02"), Some("Dusk"), "02-Dusk.wav"),
            ]),
        )
        .unwrap();

        let summary = rename_dir(dir.path(), " - ").unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.renamed, 1);
        assert!(dir.path().join("02 - Dusk.wav").is_file());

        // The ToC reflects the one successful rename.
        let reloaded = toc::load(dir.path()).unwrap().unwrap();
        assert_eq!(reloaded.tracks[0].filename.short, "01-Dawn.wav");
        assert_eq!(reloaded.tracks[1].filename.short, "02 - Dusk.wav");
    }

    #[test]
    fn entry_without_metadata_is_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("mystery.wav"), b"audio").unwrap();
        toc::save(
            dir.path(),
            &album(vec![entry(None, None, "mystery.wav")]),
        )
        .unwrap();

        let summary = rename_dir(dir.path(), " - ").unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(dir.path().join("mystery.wav").is_file());
    }

    #[test]
    fn directory_without_toc_is_skipped() {
        let dir = tempdir().unwrap();
        let summary = rename_dir(dir.path(), "-").unwrap();
        assert_eq!(summary.renamed + summary.skipped + summary.failed, 0);
    }
}
