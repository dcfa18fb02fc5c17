//! Types describing a probed media file.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Kind of an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Attachment,
    Unknown,
}

impl StreamKind {
    /// Maps ffprobe's `codec_type`; anything unrecognised is `Unknown`.
    pub fn from_codec_type(codec_type: &str) -> Self {
        match codec_type {
            "video" => Self::Video,
            "audio" => Self::Audio,
            "subtitle" => Self::Subtitle,
            "data" => Self::Data,
            "attachment" => Self::Attachment,
            _ => Self::Unknown,
        }
    }
}

/// One stream within a probed file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaStream {
    pub index: u32,
    pub kind: StreamKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_long_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Rational frame rate as reported, e.g. `24000/1001`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix_fmt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl MediaStream {
    /// A stream with only its index and kind set.
    pub fn new(index: u32, kind: StreamKind) -> Self {
        Self {
            index,
            kind,
            codec_name: None,
            codec_long_name: None,
            width: None,
            height: None,
            frame_rate: None,
            pix_fmt: None,
            sample_rate: None,
            channels: None,
            channel_layout: None,
            language: None,
            title: None,
        }
    }
}

/// Container level information.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContainerInfo {
    /// Comma separated demuxer names, e.g. `mov,mp4,m4a,3gp,3g2,mj2`.
    pub format_name: String,
    pub format_long_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<u64>,
}

/// Normalized description of a probed file.
///
/// The `has_*` flags are derived from the stream list once, at
/// construction, and the fields are not publicly mutable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaDescription {
    path: PathBuf,
    filename: String,
    format: ContainerInfo,
    streams: Vec<MediaStream>,
    has_video: bool,
    has_audio: bool,
    has_subtitles: bool,
}

impl MediaDescription {
    pub fn new(path: impl Into<PathBuf>, format: ContainerInfo, streams: Vec<MediaStream>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let has = |kind: StreamKind| streams.iter().any(|s| s.kind == kind);

        Self {
            has_video: has(StreamKind::Video),
            has_audio: has(StreamKind::Audio),
            has_subtitles: has(StreamKind::Subtitle),
            path,
            filename,
            format,
            streams,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn format(&self) -> &ContainerInfo {
        &self.format
    }

    pub fn streams(&self) -> &[MediaStream] {
        &self.streams
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.format.duration_secs
    }

    pub fn has_video(&self) -> bool {
        self.has_video
    }

    pub fn has_audio(&self) -> bool {
        self.has_audio
    }

    pub fn has_subtitles(&self) -> bool {
        self.has_subtitles
    }

    /// Streams of the given kind, in file order.
    pub fn streams_of(&self, kind: StreamKind) -> impl Iterator<Item = &MediaStream> {
        self.streams.iter().filter(move |s| s.kind == kind)
    }
}
