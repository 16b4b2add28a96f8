//! Duration Model
//!
//! Per-character playback estimates used to lay out a timeline. The defaults
//! assume a speaking rate of roughly 150 words per minute.

use serde::{Deserialize, Serialize};

/// Default duration of a vowel
pub const VOWEL_MS: u32 = 130;
/// Default duration of a nasal, liquid or semivowel (m, n, l, r, w, y)
pub const SUSTAINED_MS: u32 = 100;
/// Default duration of a whitespace pause
pub const PAUSE_MS: u32 = 80;
/// Default duration of any other character
pub const CONSONANT_MS: u32 = 70;

/// Per-character duration estimates in milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationModel {
    /// Vowels are held longest (sustained mouth opening)
    pub vowel_ms: u32,
    /// m, n, l, r, w, y
    pub sustained_ms: u32,
    /// Whitespace between words
    pub pause_ms: u32,
    /// Every other character
    pub consonant_ms: u32,
}

impl Default for DurationModel {
    fn default() -> Self {
        Self {
            vowel_ms: VOWEL_MS,
            sustained_ms: SUSTAINED_MS,
            pause_ms: PAUSE_MS,
            consonant_ms: CONSONANT_MS,
        }
    }
}

impl DurationModel {
    /// Estimated duration of `c`, never zero
    #[must_use]
    pub fn duration_ms(&self, c: char) -> u32 {
        let ms = if c.is_whitespace() {
            self.pause_ms
        } else {
            match c.to_ascii_lowercase() {
                'a' | 'e' | 'i' | 'o' | 'u' => self.vowel_ms,
                'm' | 'n' | 'l' | 'r' | 'w' | 'y' => self.sustained_ms,
                _ => self.consonant_ms,
            }
        };
        ms.max(1)
    }
}
