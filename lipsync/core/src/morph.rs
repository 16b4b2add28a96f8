//! Morph-target fan-out
//!
//! Renderers expose mouth controls as named morph targets (blend shapes).
//! [`MorphRig`] binds those names to the two published intensities and
//! eases every channel toward its target once per rendered frame.

use serde::Serialize;

use crate::animation::AnimationState;

/// Per-frame easing applied to every channel
pub const CHANNEL_RESPONSE: f32 = 0.8;

const OPEN_CHANNELS: [&str; 4] = ["mouthOpen", "jawOpen", "viseme_aa", "viseme_O"];
const SMILE_CHANNELS: [&str; 4] = ["mouthSmile", "mouthSmileLeft", "mouthSmileRight", "viseme_I"];

/// Published intensity a channel follows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MouthAxis {
    /// Jaw / lip opening
    Open,
    /// Lip corner spread
    Smile,
}

impl MouthAxis {
    /// Axis a morph target of this name follows, if any (case-insensitive)
    #[must_use]
    pub fn for_channel(name: &str) -> Option<Self> {
        if OPEN_CHANNELS.iter().any(|c| c.eq_ignore_ascii_case(name)) {
            Some(Self::Open)
        } else if SMILE_CHANNELS.iter().any(|c| c.eq_ignore_ascii_case(name)) {
            Some(Self::Smile)
        } else {
            None
        }
    }
}

/// One named morph target
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MorphChannel {
    /// Morph target name as the renderer knows it
    pub name: String,
    /// Axis it follows; unbound channels are driven to zero
    pub binding: Option<MouthAxis>,
    /// Current influence in [0, 1]
    pub influence: f32,
}

/// Set of morph channels driven from [`AnimationState`]
#[derive(Clone, Debug, Default, Serialize)]
pub struct MorphRig {
    channels: Vec<MorphChannel>,
}

impl MorphRig {
    /// Build a rig from morph target names, binding each by name
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channels = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                MorphChannel {
                    binding: MouthAxis::for_channel(&name),
                    name,
                    influence: 0.0,
                }
            })
            .collect();
        Self { channels }
    }

    /// Advance one rendered frame toward `state`
    pub fn update(&mut self, state: &AnimationState) {
        for channel in &mut self.channels {
            let target = if state.is_playing {
                match channel.binding {
                    Some(MouthAxis::Open) => state.current_shape.open,
                    Some(MouthAxis::Smile) => state.current_shape.smile,
                    None => 0.0,
                }
            } else {
                0.0
            };
            channel.influence += (target - channel.influence) * CHANNEL_RESPONSE;
        }
    }

    /// All channels
    #[must_use]
    pub fn channels(&self) -> &[MorphChannel] {
        &self.channels
    }

    /// `(name, influence)` pairs in declaration order
    pub fn influences(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.channels
            .iter()
            .map(|channel| (channel.name.as_str(), channel.influence))
    }

    /// Influence of the named channel
    #[must_use]
    pub fn influence(&self, name: &str) -> Option<f32> {
        self.channels
            .iter()
            .find(|channel| channel.name == name)
            .map(|channel| channel.influence)
    }
}
