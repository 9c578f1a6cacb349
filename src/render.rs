//! Destination path renderer: expands `{field}` tokens in a configured
//! template against sanitized tag values.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::sanitize;
use crate::types::Field;

/// Substitute every placeholder token with the sanitized field value.
///
/// Tokens are the exact `{field}` strings, so a field value can never be
/// mistaken for a placeholder (braces don't survive sanitization). Absent
/// fields render as the empty string; the caller decides whether the
/// resulting degenerate segments are acceptable.
pub fn render(template: &str, fields: &BTreeMap<Field, String>) -> String {
    let mut rendered = template.to_string();
    for field in Field::ALL {
        let token = field.placeholder();
        if !rendered.contains(token) {
            continue;
        }
        let value = fields.get(&field).map(String::as_str).unwrap_or("");
        rendered = rendered.replace(token, &sanitize::clean(value));
    }
    rendered
}

/// Render the full destination path: template expansion under `root`, with
/// the target extension appended. The segment after the last separator is
/// the file's base name; everything above is the destination directory.
pub fn destination(
    root: &Path,
    template: &str,
    fields: &BTreeMap<Field, String>,
    extension: &str,
) -> PathBuf {
    let rendered = render(template, fields);
    if extension.is_empty() {
        root.join(rendered)
    } else {
        root.join(format!("{rendered}.{extension}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(Field, &str)]) -> BTreeMap<Field, String> {
        pairs.iter().map(|(f, v)| (*f, v.to_string())).collect()
    }

    #[test]
    fn substitutes_all_tokens() {
        let rendered = render(
            "{artist}/{year} - {album}/{track} - {title}",
            &fields(&[
                (Field::Artist, "Quasar"),
                (Field::Year, "2003"),
                (Field::Album, "Afterglow"),
                (Field::Track, "07"),
                (Field::Title, "Departure"),
            ]),
        );
        assert_eq!(rendered, "Quasar/2003 - Afterglow/07 - Departure");
    }

    #[test]
    fn sanitizes_substituted_values() {
        let rendered = render(
            "{artist}/{title}",
            &fields(&[(Field::Artist, "AC/DC"), (Field::Title, "What Now?")]),
        );
        assert_eq!(rendered, "ACDC/What Now");
    }

    #[test]
    fn absent_field_renders_empty() {
        let rendered = render("{artist}/{album}", &fields(&[(Field::Artist, "Quasar")]));
        assert_eq!(rendered, "Quasar/");
    }

    #[test]
    fn literal_text_passes_through() {
        let rendered = render("music/{genre}/archive", &fields(&[(Field::Genre, "Jazz")]));
        assert_eq!(rendered, "music/Jazz/archive");
    }

    #[test]
    fn destination_appends_extension_under_root() {
        let dest = destination(
            Path::new("/out"),
            "{artist}/{track}",
            &fields(&[(Field::Artist, "Quasar"), (Field::Track, "07")]),
            "mp3",
        );
        assert_eq!(dest, PathBuf::from("/out/Quasar/07.mp3"));
    }
}
