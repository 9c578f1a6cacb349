//! Filename sanitizer: maps arbitrary tag values to path-segment-safe
//! tokens through a single whitelist pass.

use tracing::warn;

/// Characters allowed in a path segment besides ASCII letters and digits.
const EXTRA_ALLOWED: &[char] = &[' ', '-', '_', '(', ')'];

/// Hard cap for a single path segment on common filesystems.
const MAX_SEGMENT_LEN: usize = 255;

/// Reduce `raw` to the whitelisted character set and cap its length.
///
/// Everything outside the whitelist is dropped, which covers the reserved
/// set (quotes, slashes, colon, question mark, hash, apostrophe, comma,
/// exclamation mark) as well as any non-ASCII input. Truncation keeps the
/// left-anchored prefix and is reported, not fatal. Never fails; an empty
/// input yields an empty output.
pub fn clean(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || EXTRA_ALLOWED.contains(c))
        .collect();
    let cleaned = cleaned.trim().to_string();

    if cleaned.len() > MAX_SEGMENT_LEN {
        warn!("\"{}...\" truncated to {MAX_SEGMENT_LEN} characters, names may collide", &cleaned[..32]);
        // All remaining characters are ASCII, so byte indexing is safe.
        return cleaned[..MAX_SEGMENT_LEN].trim_end().to_string();
    }
    cleaned
}
