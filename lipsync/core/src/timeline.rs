//! Timeline Builder
//!
//! Lays an utterance out along a virtual time axis. Each character becomes
//! one [`TimelineEntry`]; entries are contiguous and cover
//! `[0, total_ms)` with no gaps or overlaps.

use serde::{Deserialize, Serialize};

use crate::duration::DurationModel;
use crate::grapheme::classify;
use crate::viseme::{shape_for, MouthShape, PhoneticCategory};

/// One character's slot on the timeline
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Source character
    pub character: char,
    /// Category the character was classified as
    pub category: PhoneticCategory,
    /// Inclusive start offset
    pub start_ms: u64,
    /// Exclusive end offset
    pub end_ms: u64,
    /// Mouth shape to move toward while this entry is active
    pub target: MouthShape,
}

impl TimelineEntry {
    /// Whether `elapsed_ms` falls inside `[start_ms, end_ms)`
    #[must_use]
    pub fn contains(&self, elapsed_ms: u64) -> bool {
        self.start_ms <= elapsed_ms && elapsed_ms < self.end_ms
    }

    /// Length of this entry
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

/// Ordered, contiguous sequence of entries for one utterance
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    total_ms: u64,
}

impl Timeline {
    /// Build a timeline using the default [`DurationModel`]
    #[must_use]
    pub fn build(text: &str) -> Self {
        TimelineBuilder::default().build(text)
    }

    /// All entries in order
    #[must_use]
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Estimated length of the whole utterance
    #[must_use]
    pub fn total_duration_ms(&self) -> u64 {
        self.total_ms
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the timeline has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry active at `elapsed_ms`
    ///
    /// Linear scan; the earliest matching entry wins.
    #[must_use]
    pub fn entry_at(&self, elapsed_ms: u64) -> Option<&TimelineEntry> {
        self.entries.iter().find(|e| e.contains(elapsed_ms))
    }
}

/// Builds timelines with a configurable duration model
#[derive(Clone, Copy, Debug, Default)]
pub struct TimelineBuilder {
    durations: DurationModel,
}

impl TimelineBuilder {
    /// Create a builder with the given duration model
    #[must_use]
    pub fn new(durations: DurationModel) -> Self {
        Self { durations }
    }

    /// Lay out `text` character by character
    #[must_use]
    pub fn build(&self, text: &str) -> Timeline {
        let mut entries = Vec::with_capacity(text.len());
        let mut offset = 0u64;

        for character in text.chars() {
            let category = classify(character);
            let end = offset + u64::from(self.durations.duration_ms(character));
            entries.push(TimelineEntry {
                character,
                category,
                start_ms: offset,
                end_ms: end,
                target: shape_for(category),
            });
            offset = end;
        }

        Timeline {
            entries,
            total_ms: offset,
        }
    }
}
