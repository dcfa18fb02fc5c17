use super::types::{Preset, PresetCategory};

static PRESETS: &[Preset] = &[
    // Video
    Preset {
        id: "mp4_h264",
        name: "MP4 (H.264)",
        category: PresetCategory::Video,
        extension: "mp4",
        format: Some("mp4"),
        video_codec: Some("libx264"),
        audio_codec: Some("aac"),
        extra_args: &["-preset", "medium", "-crf", "23"],
    },
    Preset {
        id: "mp4_h265",
        name: "MP4 (H.265/HEVC)",
        category: PresetCategory::Video,
        extension: "mp4",
        format: Some("mp4"),
        video_codec: Some("libx265"),
        audio_codec: Some("aac"),
        extra_args: &["-preset", "medium", "-crf", "28"],
    },
    Preset {
        id: "webm_vp9",
        name: "WebM (VP9)",
        category: PresetCategory::Video,
        extension: "webm",
        format: Some("webm"),
        video_codec: Some("libvpx-vp9"),
        audio_codec: Some("libopus"),
        extra_args: &["-crf", "30", "-b:v", "0"],
    },
    Preset {
        id: "avi",
        name: "AVI",
        category: PresetCategory::Video,
        extension: "avi",
        format: Some("avi"),
        video_codec: Some("mpeg4"),
        audio_codec: Some("mp3"),
        extra_args: &["-q:v", "5"],
    },
    Preset {
        id: "mkv",
        name: "MKV (H.264)",
        category: PresetCategory::Video,
        extension: "mkv",
        format: Some("matroska"),
        video_codec: Some("libx264"),
        audio_codec: Some("aac"),
        extra_args: &["-preset", "medium", "-crf", "23"],
    },
    Preset {
        id: "mov",
        name: "MOV (ProRes)",
        category: PresetCategory::Video,
        extension: "mov",
        format: Some("mov"),
        video_codec: Some("prores_ks"),
        audio_codec: Some("pcm_s16le"),
        extra_args: &["-profile:v", "3"],
    },
    Preset {
        id: "gif",
        name: "GIF (Animated)",
        category: PresetCategory::Video,
        extension: "gif",
        format: Some("gif"),
        video_codec: None,
        audio_codec: None,
        extra_args: &[
            "-vf",
            "fps=15,scale=480:-1:flags=lanczos,split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse",
        ],
    },
    // Audio
    Preset {
        id: "mp3",
        name: "MP3",
        category: PresetCategory::Audio,
        extension: "mp3",
        format: Some("mp3"),
        video_codec: None,
        audio_codec: Some("libmp3lame"),
        extra_args: &["-q:a", "2", "-vn"],
    },
    Preset {
        id: "aac",
        name: "AAC (M4A)",
        category: PresetCategory::Audio,
        extension: "m4a",
        format: Some("ipod"),
        video_codec: None,
        audio_codec: Some("aac"),
        extra_args: &["-b:a", "192k", "-vn"],
    },
    Preset {
        id: "flac",
        name: "FLAC (Lossless)",
        category: PresetCategory::Audio,
        extension: "flac",
        format: Some("flac"),
        video_codec: None,
        audio_codec: Some("flac"),
        extra_args: &["-vn"],
    },
    Preset {
        id: "opus",
        name: "Opus",
        category: PresetCategory::Audio,
        extension: "opus",
        format: Some("opus"),
        video_codec: None,
        audio_codec: Some("libopus"),
        extra_args: &["-b:a", "128k", "-vn"],
    },
    Preset {
        id: "wav",
        name: "WAV (PCM)",
        category: PresetCategory::Audio,
        extension: "wav",
        format: Some("wav"),
        video_codec: None,
        audio_codec: Some("pcm_s16le"),
        extra_args: &["-vn"],
    },
    // Image
    Preset {
        id: "png",
        name: "PNG",
        category: PresetCategory::Image,
        extension: "png",
        format: Some("image2"),
        video_codec: Some("png"),
        audio_codec: None,
        extra_args: &["-frames:v", "1", "-an"],
    },
    Preset {
        id: "jpg",
        name: "JPEG",
        category: PresetCategory::Image,
        extension: "jpg",
        format: Some("image2"),
        video_codec: Some("mjpeg"),
        audio_codec: None,
        extra_args: &["-frames:v", "1", "-q:v", "2", "-an"],
    },
    Preset {
        id: "webp",
        name: "WebP",
        category: PresetCategory::Image,
        extension: "webp",
        format: Some("webp"),
        video_codec: Some("libwebp"),
        audio_codec: None,
        extra_args: &["-frames:v", "1", "-quality", "80", "-an"],
    },
];

/// All presets, in display order.
pub fn list_presets() -> &'static [Preset] {
    PRESETS
}

/// Looks up a preset by its identifier.
pub fn find_preset(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_preset_ids_are_unique() {
        let ids: HashSet<_> = list_presets().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), list_presets().len());
    }

    #[test]
    fn test_list_presets_is_stable() {
        let first: Vec<_> = list_presets().iter().map(|p| p.id).collect();
        let second: Vec<_> = list_presets().iter().map(|p| p.id).collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "mp4_h264");
    }

    #[test]
    fn test_find_preset() {
        let preset = find_preset("mp4_h264").unwrap();
        assert_eq!(preset.name, "MP4 (H.264)");
        assert_eq!(preset.extension, "mp4");
        assert_eq!(preset.video_codec, Some("libx264"));
        assert_eq!(preset.audio_codec, Some("aac"));

        assert!(find_preset("does_not_exist").is_none());
    }

    #[test]
    fn test_every_category_is_represented() {
        for category in [
            PresetCategory::Video,
            PresetCategory::Audio,
            PresetCategory::Image,
        ] {
            assert!(list_presets().iter().any(|p| p.category == category));
        }
    }

    #[test]
    fn test_audio_presets_drop_video() {
        for preset in list_presets()
            .iter()
            .filter(|p| p.category == PresetCategory::Audio)
        {
            assert!(preset.video_codec.is_none(), "{}", preset.id);
            assert!(preset.extra_args.contains(&"-vn"), "{}", preset.id);
        }
    }
}
