//! Types for the preset catalog.

use serde::Serialize;

/// Broad category a preset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetCategory {
    Video,
    Audio,
    Image,
}

/// A named, pre-configured combination of container and codec policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    /// Stable identifier used by clients.
    pub id: &'static str,
    /// Human readable name.
    pub name: &'static str,
    pub category: PresetCategory,
    /// Extension of files produced with this preset (without the dot).
    pub extension: &'static str,
    /// Container format passed to `-f`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    /// Video encoder, `None` leaves the choice to the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<&'static str>,
    /// Audio encoder, `None` leaves the choice to the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<&'static str>,
    /// Encoder flags appended after the codec selection.
    pub extra_args: &'static [&'static str],
}

impl Preset {
    /// Engine arguments selecting this preset's container and codecs.
    pub fn engine_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(format) = self.format {
            args.extend(["-f".to_string(), format.to_string()]);
        }
        if let Some(codec) = self.video_codec {
            args.extend(["-c:v".to_string(), codec.to_string()]);
        }
        if let Some(codec) = self.audio_codec {
            args.extend(["-c:a".to_string(), codec.to_string()]);
        }
        args.extend(self.extra_args.iter().map(|a| a.to_string()));

        args
    }
}
