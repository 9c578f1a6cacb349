//! The closed set of tag fields and the shape of the persisted ToC document.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// All tag fields the suite understands. Artist, album, genre and year are
/// album-scoped; track and title belong to a single track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Artist,
    Album,
    Genre,
    Year,
    Track,
    Title,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Artist,
        Field::Album,
        Field::Genre,
        Field::Year,
        Field::Track,
        Field::Title,
    ];

    /// Fields shared by every track in one directory.
    pub const ALBUM_SCOPED: [Field; 4] = [Field::Artist, Field::Album, Field::Genre, Field::Year];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Artist => "artist",
            Field::Album => "album",
            Field::Genre => "genre",
            Field::Year => "year",
            Field::Track => "track",
            Field::Title => "title",
        }
    }

    /// The template token the destination path renderer substitutes.
    pub fn placeholder(self) -> &'static str {
        match self {
            Field::Artist => "{artist}",
            Field::Album => "{album}",
            Field::Genre => "{genre}",
            Field::Year => "{year}",
            Field::Track => "{track}",
            Field::Title => "{title}",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "artist" => Ok(Field::Artist),
            "album" => Ok(Field::Album),
            "genre" => Ok(Field::Genre),
            "year" => Ok(Field::Year),
            "track" => Ok(Field::Track),
            "title" => Ok(Field::Title),
            other => Err(Error::Config(format!("unknown field \"{other}\""))),
        }
    }
}

/// Original ("long") and normalized ("short") on-disk names of one track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNames {
    pub long: String,
    pub short: String,
}

/// One track entry of a ToC document. Absent fields are omitted from the
/// JSON rather than written as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub filename: FileNames,
}

/// The persisted per-directory album document. Album-scoped fields hold the
/// empty string when unset; `tracks` keeps scan insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumToc {
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub tracks: Vec<TrackEntry>,
}

impl AlbumToc {
    pub fn album_value(&self, field: Field) -> &str {
        match field {
            Field::Artist => &self.artist,
            Field::Album => &self.album,
            Field::Genre => &self.genre,
            Field::Year => &self.year,
            Field::Track | Field::Title => "",
        }
    }

    /// Collect the non-empty album-scoped fields plus the track's own fields
    /// into one map, the shape consumed by the renderer and the tag writer.
    pub fn fields_for(&self, track: &TrackEntry) -> BTreeMap<Field, String> {
        let mut fields = BTreeMap::new();
        for field in Field::ALBUM_SCOPED {
            let value = self.album_value(field);
            if !value.is_empty() {
                fields.insert(field, value.to_string());
            }
        }
        if let Some(number) = &track.track {
            fields.insert(Field::Track, number.clone());
        }
        if let Some(title) = &track.title {
            fields.insert(Field::Title, title.clone());
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_roundtrip() {
        for field in Field::ALL {
            assert_eq!(field.as_str().parse::<Field>().unwrap(), field);
        }
    }

    #[test]
    fn unknown_field_rejected() {
        assert!("bpm".parse::<Field>().is_err());
        assert!("".parse::<Field>().is_err());
    }

    #[test]
    fn fields_for_merges_album_and_track_scope() {
        let toc = AlbumToc {
            artist: "Quasar".to_string(),
            album: "Afterglow".to_string(),
            genre: String::new(),
            year: "2003".to_string(),
            tracks: vec![],
        };
        let track = TrackEntry {
            track: Some("04".to_string()),
            title: Some("Departure".to_string()),
            filename: FileNames {
                long: "x.wav".to_string(),
                short: "04-Departure.wav".to_string(),
            },
        };

        let fields = toc.fields_for(&track);
        assert_eq!(fields.get(&Field::Artist).unwrap(), "Quasar");
        assert_eq!(fields.get(&Field::Year).unwrap(), "2003");
        assert_eq!(fields.get(&Field::Track).unwrap(), "04");
        assert_eq!(fields.get(&Field::Title).unwrap(), "Departure");
        assert!(!fields.contains_key(&Field::Genre));
    }
}
