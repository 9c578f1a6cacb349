//! Album-level reconciliation: folds per-track tag records into one ToC
//! document and derives each track's normalized short filename.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use crate::error::{Error, Result};
use crate::sanitize;
use crate::types::{AlbumToc, Field, FileNames, TrackEntry};

/// A parsed file waiting for album-level reconciliation.
#[derive(Debug, Clone)]
pub struct ParsedTrack {
    pub tags: BTreeMap<Field, String>,
    /// Original on-disk filename, extension included.
    pub long_name: String,
}

/// Fold `parsed` into an album document.
///
/// The first track asserting a value seeds each album-scoped field; a later
/// track asserting a different non-empty value is an inconsistency. Absent
/// values never conflict. Album-scoped fields are dropped from the per-track
/// entries afterwards; they live only at album scope.
pub fn reconcile(parsed: Vec<ParsedTrack>, separator: &str) -> Result<AlbumToc> {
    let mut album: BTreeMap<Field, String> = BTreeMap::new();
    for track in &parsed {
        for field in Field::ALBUM_SCOPED {
            let Some(value) = track.tags.get(&field) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            match album.get(&field) {
                None => {
                    album.insert(field, value.clone());
                }
                Some(existing) if existing == value => {}
                Some(existing) => {
                    return Err(Error::InconsistentMetadata {
                        field,
                        first: existing.clone(),
                        second: value.clone(),
                    });
                }
            }
        }
    }

    let mut tracks = Vec::with_capacity(parsed.len());
    for track in parsed {
        let number = track.tags.get(&Field::Track).cloned();
        let title = track.tags.get(&Field::Title).cloned();
        let short = short_name(
            number.as_deref(),
            title.as_deref(),
            &track.long_name,
            separator,
        );
        tracks.push(TrackEntry {
            track: number,
            title,
            filename: FileNames {
                long: track.long_name,
                short,
            },
        });
    }

    Ok(AlbumToc {
        artist: album.remove(&Field::Artist).unwrap_or_default(),
        album: album.remove(&Field::Album).unwrap_or_default(),
        genre: album.remove(&Field::Genre).unwrap_or_default(),
        year: album.remove(&Field::Year).unwrap_or_default(),
        tracks,
    })
}

/// Build the normalized short filename for one track.
///
/// Policy: track and title join through the separator; either alone stands
/// on its own; neither yields an empty name, which is reported and kept so
/// the track still appears in the document.
fn short_name(number: Option<&str>, title: Option<&str>, long_name: &str, separator: &str) -> String {
    let stem = match (number, title) {
        (Some(number), Some(title)) => format!("{number}{separator}{title}"),
        (Some(number), None) => number.to_string(),
        (None, Some(title)) => title.to_string(),
        (None, None) => {
            warn!("{long_name}: neither track number nor title, short name left empty");
            return String::new();
        }
    };

    let stem = sanitize::clean(&stem);
    if stem.is_empty() {
        warn!("{long_name}: short name sanitized down to nothing");
        return String::new();
    }

    match Path::new(long_name).extension().and_then(|e| e.to_str()) {
        Some(extension) => format!("{stem}.{extension}"),
        None => stem,
    }
}
