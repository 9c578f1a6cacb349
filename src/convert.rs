//! The transformation driver: walks cataloged directories and, for every
//! track whose destination does not exist yet, runs the external converter
//! and writes tags plus cover art into the result.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::config::{ConverterSpec, InputConfig, OutputProfile};
use crate::error::{Error, Result};
use crate::render;
use crate::tagwrite;
use crate::toc;
use crate::types::{AlbumToc, TrackEntry};

/// Placeholder tokens inside a converter argument list.
const CONVERTER_INPUT: &str = "%input%";
const CONVERTER_OUTPUT: &str = "%output%";

#[derive(Debug, Default)]
pub struct ConvertSummary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ConvertSummary {
    fn absorb(&mut self, other: ConvertSummary) {
        self.converted += other.converted;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Convert every cataloged directory under the input root. A directory
/// that fails (unreadable ToC) is logged and counted; the others still
/// run.
pub fn run(input: &InputConfig, profile: &OutputProfile) -> Result<ConvertSummary> {
    if !input.path.is_dir() {
        return Err(Error::Config(format!(
            "input path {} is not a directory",
            input.path.display()
        )));
    }

    let mut summary = ConvertSummary::default();
    if input.recurse {
        for entry in WalkDir::new(&input.path)
            .into_iter()
            .filter_map(|entry| entry.ok())
        {
            if entry.file_type().is_dir() && toc::exists(entry.path()) {
                match convert_dir(entry.path(), profile) {
                    Ok(dir_summary) => summary.absorb(dir_summary),
                    Err(err) => {
                        error!("{}: {err}", entry.path().display());
                        summary.failed += 1;
                    }
                }
            }
        }
    } else {
        summary.absorb(convert_dir(&input.path, profile)?);
    }
    Ok(summary)
}

/// Convert one directory's tracks. Each track is independent: a failure is
/// logged and counted without blocking the rest.
pub fn convert_dir(dir: &Path, profile: &OutputProfile) -> Result<ConvertSummary> {
    let mut summary = ConvertSummary::default();
    let Some(album) = toc::load(dir)? else {
        info!("no ToC in {}, nothing to convert", dir.display());
        return Ok(summary);
    };

    let cover = tagwrite::load_cover(dir);
    for track in &album.tracks {
        match convert_track(dir, &album, track, profile, cover.as_deref()) {
            Ok(true) => summary.converted += 1,
            Ok(false) => summary.skipped += 1,
            Err(err) => {
                error!("{err}");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// Returns `Ok(true)` when the track was converted, `Ok(false)` when the
/// destination already existed.
fn convert_track(
    dir: &Path,
    album: &AlbumToc,
    track: &TrackEntry,
    profile: &OutputProfile,
    cover: Option<&[u8]>,
) -> Result<bool> {
    let source = dir.join(&track.filename.short);
    if !source.is_file() {
        return Err(Error::SourceNotFound(source));
    }

    let fields = album.fields_for(track);
    let destination = render::destination(&profile.path, &profile.format, &fields, &profile.kind);
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    // Presence is the sole idempotence mechanism; outputs below always
    // materialize through an atomic rename, so presence implies the track
    // was fully converted and tagged.
    if destination.exists() {
        debug!("{} already exists, skipping", destination.display());
        return Ok(false);
    }

    let staging = staging_path(&destination);
    let result = (|| -> Result<()> {
        run_converter(&profile.converter, &source, &staging, &destination)?;
        tagwrite::write_fields(&staging, &fields, cover)
    })();
    if let Err(err) = result {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }
    fs::rename(&staging, &destination)?;

    info!("converted {} -> {}", source.display(), destination.display());
    Ok(true)
}

/// Run the external converter with `%input%`/`%output%` substituted; all
/// other arguments pass through unchanged.
fn run_converter(
    spec: &ConverterSpec,
    source: &Path,
    staging: &Path,
    destination: &Path,
) -> Result<()> {
    let mut command = Command::new(&spec.bin);
    for arg in &spec.args {
        if arg == CONVERTER_INPUT {
            command.arg(source);
        } else if arg == CONVERTER_OUTPUT {
            command.arg(staging);
        } else {
            command.arg(arg);
        }
    }

    let status = command.status()?;
    if !status.success() {
        return Err(Error::Converter {
            path: destination.to_path_buf(),
            status,
        });
    }
    Ok(())
}

/// Staging name beside the destination so the final rename stays on one
/// filesystem. Keeps the target extension at the end; converters commonly
/// pick their output format from it.
fn staging_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("output");
    let pid = std::process::id();
    destination.with_file_name(format!(".{pid}.part.{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConverterSpec;
    use crate::testutil::write_minimal_wav;
    use crate::types::{Field, FileNames};
    use tempfile::tempdir;

    fn profile(out_root: &Path) -> OutputProfile {
        OutputProfile {
            kind: "wav".to_string(),
            path: out_root.to_path_buf(),
            format: "{artist}/{album}/{track}-{title}".to_string(),
            converter: ConverterSpec {
                bin: "cp".to_string(),
                args: vec![CONVERTER_INPUT.to_string(), CONVERTER_OUTPUT.to_string()],
            },
        }
    }

    fn album_with_one_track() -> AlbumToc {
        AlbumToc {
            artist: "Quasar".to_string(),
            album: "Afterglow".to_string(),
            genre: "Ambient".to_string(),
            year: "2003".to_string(),
            tracks: vec![TrackEntry {
                track: Some("01".to_string()),
                title: Some("Dawn".to_string()),
                filename: FileNames {
                    long: "Quasar#Afterglow#2003#Ambient#1#Dawn.wav".to_string(),
                    short: "01-Dawn.wav".to_string(),
                },
            }],
        }
    }

    #[test]
    fn converts_tags_and_skips_on_rerun() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        write_minimal_wav(&src.path().join("01-Dawn.wav"));
        toc::save(src.path(), &album_with_one_track()).unwrap();

        let profile = profile(out.path());
        let first = convert_dir(src.path(), &profile).unwrap();
        assert_eq!(first.converted, 1);
        assert_eq!(first.failed, 0);

        let destination = out.path().join("Quasar/Afterglow/01-Dawn.wav");
        assert!(destination.is_file());

        // The destination carries the reconciled tags.
        let fields = tagwrite::read_fields(&destination).unwrap();
        assert_eq!(fields.get(&Field::Artist).unwrap(), "Quasar");
        assert_eq!(fields.get(&Field::Track).unwrap(), "01");
        assert_eq!(fields.get(&Field::Title).unwrap(), "Dawn");

        // Second run performs zero conversions and zero tag-writes.
        let second = convert_dir(src.path(), &profile).unwrap();
        assert_eq!(second.converted, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(second.failed, 0);
    }

    #[test]
    fn missing_source_fails_only_that_track() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let mut album = album_with_one_track();
        album.tracks.push(TrackEntry {
            track: Some("02".to_string()),
            title: Some("Dusk".to_string()),
            filename: FileNames {
                long: "x.wav".to_string(),
                short: "02-Dusk.wav".to_string(),
            },
        });
        // Only track 02 exists on disk.
        write_minimal_wav(&src.path().join("02-Dusk.wav"));
        toc::save(src.path(), &album).unwrap();

        let summary = convert_dir(src.path(), &profile(out.path())).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.converted, 1);
        assert!(out.path().join("Quasar/Afterglow/02-Dusk.wav").is_file());
    }

    #[test]
    fn failing_converter_leaves_no_destination() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        write_minimal_wav(&src.path().join("01-Dawn.wav"));
        toc::save(src.path(), &album_with_one_track()).unwrap();

        let mut profile = profile(out.path());
        profile.converter = ConverterSpec {
            bin: "false".to_string(),
            args: vec![],
        };

        let summary = convert_dir(src.path(), &profile).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.converted, 0);
        assert!(!out.path().join("Quasar/Afterglow/01-Dawn.wav").exists());
        // No staging leftovers either.
        let album_dir = out.path().join("Quasar/Afterglow");
        let leftovers = fs::read_dir(&album_dir).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn directory_without_toc_does_nothing() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let summary = convert_dir(src.path(), &profile(out.path())).unwrap();
        assert_eq!(summary.converted + summary.skipped + summary.failed, 0);
    }

    #[test]
    fn recursive_run_only_visits_cataloged_directories() {
        let root = tempdir().unwrap();
        let out = tempdir().unwrap();
        let cataloged = root.path().join("cataloged");
        let plain = root.path().join("plain");
        fs::create_dir_all(&cataloged).unwrap();
        fs::create_dir_all(&plain).unwrap();
        write_minimal_wav(&cataloged.join("01-Dawn.wav"));
        write_minimal_wav(&plain.join("01-Dawn.wav"));
        toc::save(&cataloged, &album_with_one_track()).unwrap();

        let input = InputConfig {
            path: root.path().to_path_buf(),
            recurse: true,
        };
        let summary = run(&input, &profile(out.path())).unwrap();
        assert_eq!(summary.converted, 1);
    }
}
