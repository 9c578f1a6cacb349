//! Tag read/write through `lofty`. Synchronous, path-in path-out; the rest
//! of the crate never touches the tag library directly.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lofty::config::{ParseOptions, ParsingMode, WriteOptions};
use lofty::file::TaggedFileExt;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag, TagType};
use tracing::warn;

use crate::error::{Error, Result};
use crate::types::Field;

/// Conventional cover-art file beside the ToC.
pub const COVER_FILENAME: &str = "Cover.jpg";

fn parse_options() -> ParseOptions {
    ParseOptions::new()
        .read_cover_art(true)
        .parsing_mode(ParsingMode::BestAttempt)
}

fn field_item_key(field: Field) -> ItemKey {
    match field {
        Field::Artist => ItemKey::TrackArtist,
        Field::Album => ItemKey::AlbumTitle,
        Field::Genre => ItemKey::Genre,
        Field::Year => ItemKey::RecordingDate,
        Field::Track => ItemKey::TrackNumber,
        Field::Title => ItemKey::TrackTitle,
    }
}

fn tag_error(path: &Path, message: impl ToString) -> Error {
    Error::Tag {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Read the known fields from a file's primary tag. Absent tags and absent
/// fields simply don't appear in the result.
pub fn read_fields(path: &Path) -> Result<BTreeMap<Field, String>> {
    let tagged_file = Probe::open(path)
        .map_err(|err| tag_error(path, err))?
        .options(parse_options())
        .read()
        .map_err(|err| tag_error(path, err))?;

    let mut fields = BTreeMap::new();
    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        return Ok(fields);
    };

    for field in Field::ALL {
        let value = match tag.get_string(&field_item_key(field)) {
            Some(value) => Some(value.to_string()),
            // Year splits across keys depending on the tag format.
            None if field == Field::Year => tag.get_string(&ItemKey::Year).map(str::to_string),
            None => None,
        };
        match value {
            Some(value) if !value.is_empty() => {
                fields.insert(field, value);
            }
            _ => {}
        }
    }
    Ok(fields)
}

/// Write the given fields into the file's primary tag, creating the tag if
/// the file has none. Fields not in `fields` are left untouched. `cover`,
/// when given, replaces the front-cover picture as `image/jpeg`.
pub fn write_fields(
    path: &Path,
    fields: &BTreeMap<Field, String>,
    cover: Option<&[u8]>,
) -> Result<()> {
    let mut tagged_file = Probe::open(path)
        .map_err(|err| tag_error(path, err))?
        .options(parse_options())
        .read()
        .map_err(|err| tag_error(path, err))?;

    let tag_type = tagged_file.file_type().primary_tag_type();
    let tag = match tagged_file.tag_mut(tag_type) {
        Some(tag) => tag,
        None => {
            tagged_file.insert_tag(Tag::new(tag_type));
            tagged_file
                .tag_mut(tag_type)
                .ok_or_else(|| tag_error(path, format!("file does not support {tag_type:?} tags")))?
        }
    };

    for (field, value) in fields {
        if value.is_empty() {
            continue;
        }
        tag.insert_text(field_item_key(*field), value.clone());
        // Vorbis Comments use DATE per spec; everything else also gets the
        // legacy YEAR key for reader compatibility.
        if *field == Field::Year && tag_type != TagType::VorbisComments {
            tag.insert_text(ItemKey::Year, value.clone());
        }
    }

    if let Some(data) = cover {
        let picture = Picture::new_unchecked(
            PictureType::CoverFront,
            Some(MimeType::Jpeg),
            None,
            data.to_vec(),
        );
        tag.remove_picture_type(PictureType::CoverFront);
        tag.push_picture(picture);
    }

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|err| tag_error(path, err))
}

/// Load `Cover.jpg` from `dir` if present; its absence is reported, not an
/// error.
pub fn load_cover(dir: &Path) -> Option<Vec<u8>> {
    let path = dir.join(COVER_FILENAME);
    match fs::read(&path) {
        Ok(data) => Some(data),
        Err(_) => {
            warn!("{} not found", path.display());
            None
        }
    }
}
