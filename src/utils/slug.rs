//! URL slug derivation for post filenames and permalinks.
//!
//! Converts article titles to URL-safe, length-capped identifiers.

use deunicode::deunicode;

/// Maximum slug length in characters.
///
/// Long titles produce unwieldy filenames and permalinks; 50 characters
/// keeps `<date>-<slug>.md` comfortably under common path limits.
pub const MAX_SLUG_LEN: usize = 50;

/// Convert a title to a URL-safe slug.
///
/// - Transliterates non-ASCII characters to their closest ASCII equivalent
/// - Lowercases everything
/// - Collapses runs of non-alphanumeric characters into single dashes
/// - Caps the result at [`MAX_SLUG_LEN`] characters, never ending in a dash
///
/// # Examples
///
/// | Title | Slug |
/// |-------|------|
/// | `Strategi Bisnis 2025` | `strategi-bisnis-2025` |
/// | `Café & Résumé` | `cafe-resume` |
pub fn slugify(title: &str) -> String {
    let ascii = deunicode(title).to_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut prev_dash = true; // suppress leading dash
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
    }
    slug.trim_end_matches('-').to_owned()
}
