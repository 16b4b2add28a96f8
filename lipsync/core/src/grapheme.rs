//! Grapheme Classifier
//!
//! Maps a written character to a [`PhoneticCategory`]. This is a cheap
//! heuristic stand-in for phoneme detection: English spelling is treated as
//! if every letter were one sound. It does not handle digraphs ("th", "ch"),
//! silent letters, or any language other than English.
//!
//! `r` is classified as [`PhoneticCategory::Rhotic`], separate from the
//! `n`/`l` nasal-liquid bucket. `w` rounds the lips like "oo" and shares the
//! [`PhoneticCategory::VowelU`] shape.

use crate::viseme::PhoneticCategory;

/// Classify a single character (case-insensitive, total)
///
/// Anything without a rule (punctuation, digits, `h`, `y`, non-ASCII)
/// falls back to [`PhoneticCategory::Silence`].
#[must_use]
pub fn classify(c: char) -> PhoneticCategory {
    if c.is_whitespace() {
        return PhoneticCategory::Silence;
    }

    match c.to_ascii_lowercase() {
        'a' => PhoneticCategory::VowelA,
        'e' => PhoneticCategory::VowelE,
        'i' => PhoneticCategory::VowelI,
        'o' => PhoneticCategory::VowelO,
        'u' | 'w' => PhoneticCategory::VowelU,
        'b' | 'm' | 'p' => PhoneticCategory::Bilabial,
        'f' | 'v' => PhoneticCategory::Labiodental,
        's' | 'z' => PhoneticCategory::Sibilant,
        't' | 'd' => PhoneticCategory::Alveolar,
        'k' | 'g' => PhoneticCategory::Velar,
        'n' | 'l' => PhoneticCategory::NasalLiquid,
        'r' => PhoneticCategory::Rhotic,
        _ => PhoneticCategory::Silence,
    }
}
