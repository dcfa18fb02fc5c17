//! Testing utilities: a mock prober, media fixtures and fake engines.
//!
//! # Example
//!
//! ```rust,ignore
//! use convertify_core::testing::{fixtures, fake_engine, MockProber};
//!
//! let prober = MockProber::with_default(fixtures::two_stream_mp4("/media/clip.mp4"));
//! let ffmpeg = fake_engine(dir.path(), "ffmpeg", "printf 'time=00:00:01.00\\r' >&2")?;
//! ```

mod mock_prober;

pub use mock_prober::MockProber;

use std::path::{Path, PathBuf};

/// Writes an executable `/bin/sh` script named `name` into `dir`.
///
/// The script ignores its arguments and runs `body`, which makes it a
/// stand-in for ffmpeg or ffprobe in process-level tests.
#[cfg(unix)]
pub fn fake_engine(dir: &Path, name: &str, body: &str) -> std::io::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// Media description fixtures.
pub mod fixtures {
    use std::path::Path;

    use crate::probe::{ContainerInfo, MediaDescription, MediaStream, StreamKind};

    /// Ten second 720p H.264 + stereo AAC mp4.
    pub fn two_stream_mp4(path: impl AsRef<Path>) -> MediaDescription {
        let video = MediaStream {
            codec_name: Some("h264".to_string()),
            width: Some(1280),
            height: Some(720),
            frame_rate: Some("30/1".to_string()),
            pix_fmt: Some("yuv420p".to_string()),
            ..MediaStream::new(0, StreamKind::Video)
        };
        let audio = MediaStream {
            codec_name: Some("aac".to_string()),
            sample_rate: Some(48_000),
            channels: Some(2),
            channel_layout: Some("stereo".to_string()),
            language: Some("eng".to_string()),
            ..MediaStream::new(1, StreamKind::Audio)
        };

        MediaDescription::new(
            path.as_ref(),
            ContainerInfo {
                format_name: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
                format_long_name: "QuickTime / MOV".to_string(),
                duration_secs: Some(10.0),
                size_bytes: Some(1_048_576),
                bit_rate: Some(838_860),
            },
            vec![video, audio],
        )
    }

    /// Three minute FLAC with no video.
    pub fn audio_only(path: impl AsRef<Path>) -> MediaDescription {
        let audio = MediaStream {
            codec_name: Some("flac".to_string()),
            sample_rate: Some(44_100),
            channels: Some(2),
            ..MediaStream::new(0, StreamKind::Audio)
        };

        MediaDescription::new(
            path.as_ref(),
            ContainerInfo {
                format_name: "flac".to_string(),
                format_long_name: "raw FLAC".to_string(),
                duration_secs: Some(180.0),
                ..Default::default()
            },
            vec![audio],
        )
    }

    /// Mkv with video, audio and a subtitle track but no known duration.
    pub fn mkv_with_subtitles(path: impl AsRef<Path>) -> MediaDescription {
        MediaDescription::new(
            path.as_ref(),
            ContainerInfo {
                format_name: "matroska,webm".to_string(),
                ..Default::default()
            },
            vec![
                MediaStream::new(0, StreamKind::Video),
                MediaStream::new(1, StreamKind::Audio),
                MediaStream {
                    language: Some("fre".to_string()),
                    ..MediaStream::new(2, StreamKind::Subtitle)
                },
            ],
        )
    }
}
