//! Delimiter-based filename parsing: splits a stem into tag fields along a
//! configured schema and decodes the reversible escape sequences that let
//! tag values carry path-unsafe characters through a filename.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::Field;

/// How the parsed segment count may relate to the schema length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaPolicy {
    /// Segment count must not exceed the schema; trailing schema fields
    /// simply stay unset.
    #[default]
    Strict,
    /// Segment count must reach the schema length; extra segments beyond
    /// the schema are ignored.
    Minimum,
}

impl FromStr for SchemaPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "strict" => Ok(SchemaPolicy::Strict),
            "minimum" => Ok(SchemaPolicy::Minimum),
            other => Err(Error::Config(format!(
                "unknown schema policy \"{other}\" (expected \"strict\" or \"minimum\")"
            ))),
        }
    }
}

/// Reversible encodings for characters that cannot appear literally in a
/// filename. Decoded in every parsed value.
const ESCAPE_CODES: &[(&str, char)] = &[
    ("&47;", '/'),
    ("&58;", ':'),
    ("&63;", '?'),
    ("&92;", '\\'),
    ("&35;", '#'),
];

/// Decode the escape-code table back into literal punctuation.
pub fn decode_escapes(value: &str) -> String {
    let mut decoded = value.to_string();
    for (code, literal) in ESCAPE_CODES {
        if decoded.contains(code) {
            decoded = decoded.replace(code, &literal.to_string());
        }
    }
    decoded
}

/// Reduce a raw track-number value to a two-digit zero-padded decimal.
///
/// An embedded fraction like `"3/12"` only uses the part before the slash.
/// `name` labels the offending file in the error.
pub fn normalize_track_number(name: &str, raw: &str) -> Result<String> {
    let digits = raw.split('/').next().unwrap_or(raw);
    let number: u32 = digits.trim().parse().map_err(|_| Error::InvalidTrackNumber {
        name: name.to_string(),
        value: raw.to_string(),
    })?;
    Ok(format!("{number:02}"))
}

/// Split `stem` on `delimiter` and map segment `i` onto `schema[i]`.
///
/// Empty segments are treated as absent rather than stored as empty
/// strings. Track numbers are normalized at this point so every later
/// consumer sees the zero-padded form.
pub fn parse_stem(
    stem: &str,
    delimiter: &str,
    schema: &[Field],
    policy: SchemaPolicy,
) -> Result<BTreeMap<Field, String>> {
    let segments: Vec<&str> = stem.split(delimiter).collect();

    let mismatch = match policy {
        SchemaPolicy::Strict => segments.len() > schema.len(),
        SchemaPolicy::Minimum => segments.len() < schema.len(),
    };
    if mismatch {
        return Err(Error::SchemaMismatch {
            name: stem.to_string(),
            expected: schema.len(),
            found: segments.len(),
        });
    }

    let mut tags = BTreeMap::new();
    for (field, segment) in schema.iter().zip(segments) {
        if segment.is_empty() {
            continue;
        }
        let value = decode_escapes(segment);
        let value = if *field == Field::Track {
            normalize_track_number(stem, &value)?
        } else {
            value
        };
        tags.insert(*field, value);
    }
    Ok(tags)
}
