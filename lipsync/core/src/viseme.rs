//! Viseme Table
//!
//! Static mapping from a phonetic category to the pair of mouth intensities
//! the renderer understands. Values follow the Oculus/ARKit viseme set,
//! collapsed onto two axes: how far the jaw opens and how wide the lips
//! stretch.

use serde::{Deserialize, Serialize};

/// Coarse phonetic category of a sound
///
/// This is a closed set. Every vowel quality has its own category because
/// each one gets a distinct mouth shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhoneticCategory {
    /// Rest position (pauses, punctuation, unmapped characters)
    Silence,
    /// Lips pressed together (b, m, p)
    Bilabial,
    /// Lower lip against teeth (f, v)
    Labiodental,
    /// Hissing sounds (s, z)
    Sibilant,
    /// Tongue on the ridge behind the teeth (t, d)
    Alveolar,
    /// Back of the tongue raised (k, g)
    Velar,
    /// Nasals and laterals (n, l)
    NasalLiquid,
    /// The r sound
    Rhotic,
    /// Open "ah"
    VowelA,
    /// Spread "eh"
    VowelE,
    /// Wide "ee"
    VowelI,
    /// Rounded "oh"
    VowelO,
    /// Pursed "oo"
    VowelU,
}

impl PhoneticCategory {
    /// Every category, in table order
    pub const ALL: [Self; 13] = [
        Self::Silence,
        Self::Bilabial,
        Self::Labiodental,
        Self::Sibilant,
        Self::Alveolar,
        Self::Velar,
        Self::NasalLiquid,
        Self::Rhotic,
        Self::VowelA,
        Self::VowelE,
        Self::VowelI,
        Self::VowelO,
        Self::VowelU,
    ];

    /// Whether this category is one of the vowel qualities
    #[must_use]
    pub fn is_vowel(self) -> bool {
        matches!(
            self,
            Self::VowelA | Self::VowelE | Self::VowelI | Self::VowelO | Self::VowelU
        )
    }

    /// Conventional viseme label (as used by Oculus/ARKit rigs)
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Silence => "sil",
            Self::Bilabial => "PP",
            Self::Labiodental => "FF",
            Self::Sibilant => "SS",
            Self::Alveolar => "DD",
            Self::Velar => "kk",
            Self::NasalLiquid => "nn",
            Self::Rhotic => "RR",
            Self::VowelA => "aa",
            Self::VowelE => "E",
            Self::VowelI => "I",
            Self::VowelO => "O",
            Self::VowelU => "U",
        }
    }
}

impl std::fmt::Display for PhoneticCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "viseme_{}", self.label())
    }
}

/// Pose of the avatar's mouth as two normalized intensities
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MouthShape {
    /// Jaw opening (0.0 = closed, 1.0 = fully open)
    pub open: f32,
    /// Lip stretch (0.0 = neutral, 1.0 = full smile)
    pub smile: f32,
}

impl MouthShape {
    /// Closed, neutral mouth
    pub const SILENT: Self = Self::raw(0.0, 0.0);

    /// Create a shape, clamping both intensities to `[0, 1]`
    #[must_use]
    pub fn new(open: f32, smile: f32) -> Self {
        Self {
            open: clamp_unit(open),
            smile: clamp_unit(smile),
        }
    }

    const fn raw(open: f32, smile: f32) -> Self {
        Self { open, smile }
    }

    /// Move toward `target` by `alpha` (0.0 = stay, 1.0 = jump)
    #[must_use]
    pub fn approach(self, target: Self, alpha: f32) -> Self {
        Self::new(
            self.open + (target.open - self.open) * alpha,
            self.smile + (target.smile - self.smile) * alpha,
        )
    }

    /// Scale both intensities by `factor`
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.open * factor, self.smile * factor)
    }

    /// Whether both intensities are exactly zero
    #[must_use]
    pub fn is_silent(self) -> bool {
        self.open == 0.0 && self.smile == 0.0
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Category -> shape lookup table
static VISEME_TABLE: [(PhoneticCategory, MouthShape); 13] = [
    (PhoneticCategory::Silence, MouthShape::raw(0.0, 0.0)),
    (PhoneticCategory::Bilabial, MouthShape::raw(0.0, 0.0)),
    (PhoneticCategory::Labiodental, MouthShape::raw(0.1, 0.2)),
    (PhoneticCategory::Sibilant, MouthShape::raw(0.1, 0.5)),
    (PhoneticCategory::Alveolar, MouthShape::raw(0.15, 0.0)),
    (PhoneticCategory::Velar, MouthShape::raw(0.2, 0.0)),
    (PhoneticCategory::NasalLiquid, MouthShape::raw(0.15, 0.0)),
    (PhoneticCategory::Rhotic, MouthShape::raw(0.25, 0.0)),
    (PhoneticCategory::VowelA, MouthShape::raw(1.0, 0.0)),
    (PhoneticCategory::VowelE, MouthShape::raw(0.4, 0.8)),
    (PhoneticCategory::VowelI, MouthShape::raw(0.2, 1.0)),
    (PhoneticCategory::VowelO, MouthShape::raw(0.9, 0.0)),
    (PhoneticCategory::VowelU, MouthShape::raw(0.5, 0.0)),
];

/// Target mouth shape for a phonetic category
///
/// A category missing from the table falls back to [`MouthShape::SILENT`].
#[must_use]
pub fn shape_for(category: PhoneticCategory) -> MouthShape {
    VISEME_TABLE
        .iter()
        .find(|(c, _)| *c == category)
        .map_or(MouthShape::SILENT, |(_, shape)| *shape)
}
