//! Types describing a conversion request.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::BuildError;

/// Which streams of the input are carried into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSelection {
    pub include_video: bool,
    pub include_audio: bool,
    pub include_subtitles: bool,
}

impl Default for StreamSelection {
    fn default() -> Self {
        Self {
            include_video: true,
            include_audio: true,
            include_subtitles: true,
        }
    }
}

/// Explicit overrides used instead of a preset.
///
/// `None` (or a blank string) means unspecified: the engine picks, and no
/// flag is emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    /// Free-form engine arguments, split on whitespace and appended after
    /// every structured flag. They are passed through uninterpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_args: Option<String>,
}

impl AdvancedOptions {
    pub fn format(&self) -> Option<&str> {
        non_blank(self.format.as_deref())
    }

    pub fn video_codec(&self) -> Option<CodecChoice> {
        non_blank(self.video_codec.as_deref()).map(CodecChoice::parse)
    }

    pub fn audio_codec(&self) -> Option<CodecChoice> {
        non_blank(self.audio_codec.as_deref()).map(CodecChoice::parse)
    }

    /// Whitespace separated extra arguments.
    pub fn extra_tokens(&self) -> Vec<String> {
        self.extra_args
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// True when no field would produce an engine flag.
    pub fn is_empty(&self) -> bool {
        self.format().is_none()
            && self.video_codec().is_none()
            && self.audio_codec().is_none()
            && self.extra_tokens().is_empty()
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "format={:?}, video_codec={:?}, audio_codec={:?}, extra_args={:?}",
            self.format, self.video_codec, self.audio_codec, self.extra_args
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolved meaning of a codec field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecChoice {
    /// Stream copy, no re-encode.
    Copy,
    /// Drop the stream entirely.
    Disabled,
    /// Encode with the named encoder.
    Encoder(String),
}

impl CodecChoice {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("copy") {
            Self::Copy
        } else if value.eq_ignore_ascii_case("none") {
            Self::Disabled
        } else {
            Self::Encoder(value.to_string())
        }
    }
}

/// How the target is specified: a preset or explicit options, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ConversionMode {
    Preset { preset_id: String },
    Advanced(AdvancedOptions),
}

impl ConversionMode {
    pub fn preset(id: impl Into<String>) -> Self {
        Self::Preset {
            preset_id: id.into(),
        }
    }

    pub fn preset_id(&self) -> Option<&str> {
        match self {
            Self::Preset { preset_id } => Some(preset_id),
            Self::Advanced(_) => None,
        }
    }

    pub fn advanced(&self) -> Option<&AdvancedOptions> {
        match self {
            Self::Preset { .. } => None,
            Self::Advanced(options) => Some(options),
        }
    }
}

/// The resolved intent for one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub mode: ConversionMode,
    #[serde(default)]
    pub streams: StreamSelection,
}

impl ConversionRequest {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        mode: ConversionMode,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            mode,
            streams: StreamSelection::default(),
        }
    }

    pub fn with_streams(mut self, streams: StreamSelection) -> Self {
        self.streams = streams;
        self
    }

    /// Checks that the engine would never write over its own input.
    pub fn validate(&self) -> Result<(), BuildError> {
        if absolute(&self.input_path) == absolute(&self.output_path) {
            return Err(BuildError::SameInputOutput {
                path: self.input_path.clone(),
            });
        }
        Ok(())
    }
}

/// Absolute form of `path`, resolved against the working directory without
/// touching the file itself.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_choice_parse() {
        assert_eq!(CodecChoice::parse("copy"), CodecChoice::Copy);
        assert_eq!(CodecChoice::parse(" COPY "), CodecChoice::Copy);
        assert_eq!(CodecChoice::parse("none"), CodecChoice::Disabled);
        assert_eq!(
            CodecChoice::parse("libx264"),
            CodecChoice::Encoder("libx264".to_string())
        );
    }

    #[test]
    fn test_blank_fields_are_unspecified() {
        let options = AdvancedOptions {
            format: Some("  ".to_string()),
            video_codec: Some(String::new()),
            audio_codec: None,
            extra_args: Some("   ".to_string()),
        };
        assert!(options.is_empty());
        assert!(options.format().is_none());
        assert!(options.video_codec().is_none());
    }

    #[test]
    fn test_extra_tokens_split_on_whitespace() {
        let options = AdvancedOptions {
            extra_args: Some("-ss  5\t-t 10 -metadata title=\"a b\"".to_string()),
            ..Default::default()
        };
        assert_eq!(
            options.extra_tokens(),
            vec!["-ss", "5", "-t", "10", "-metadata", "title=\"a", "b\""]
        );
    }

    #[test]
    fn test_mode_serde_is_tagged() {
        let json = r#"{"mode":"preset","preset_id":"mp3"}"#;
        let mode: ConversionMode = serde_json::from_str(json).unwrap();
        assert_eq!(mode.preset_id(), Some("mp3"));

        let json = r#"{"mode":"advanced","video_codec":"none","audio_codec":"copy"}"#;
        let mode: ConversionMode = serde_json::from_str(json).unwrap();
        let options = mode.advanced().unwrap();
        assert_eq!(options.video_codec(), Some(CodecChoice::Disabled));
        assert_eq!(options.audio_codec(), Some(CodecChoice::Copy));
    }

    #[test]
    fn test_request_validate_rejects_same_path() {
        let request = ConversionRequest::new("/a/b.mp4", "/a/b.mp4", ConversionMode::preset("mp3"));
        assert!(matches!(
            request.validate(),
            Err(BuildError::SameInputOutput { .. })
        ));

        let request = ConversionRequest::new("/a/b.mp4", "/a/./b.mp4", ConversionMode::preset("mp3"));
        assert!(request.validate().is_err());

        let request = ConversionRequest::new("/a/b.mp4", "/a/b.mp3", ConversionMode::preset("mp3"));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_stream_selection_default_includes_all() {
        let selection = StreamSelection::default();
        assert!(selection.include_video && selection.include_audio && selection.include_subtitles);
    }
}
