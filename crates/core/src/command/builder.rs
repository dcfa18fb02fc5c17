//! Translates a [`ConversionRequest`] into transcoding engine arguments.

use super::error::BuildError;
use super::types::{absolute, CodecChoice, ConversionMode, ConversionRequest};
use crate::preset::find_preset;
use crate::probe::MediaDescription;

const DROP_VIDEO: &str = "-vn";
const DROP_AUDIO: &str = "-an";
const DROP_SUBTITLES: &str = "-sn";

/// Builds the ffmpeg argument list for `request`.
///
/// The output is a pure function of its inputs: the same request and media
/// description always yield the same arguments. Layout:
///
/// 1. `-hide_banner -i <absolute input>`
/// 2. stream drop directives (`-vn`, `-an`, `-sn`)
/// 3. preset flags, or the structured advanced flags
/// 4. advanced extra arguments, verbatim
/// 5. `-y <output>`
pub fn build_args(
    request: &ConversionRequest,
    media: &MediaDescription,
) -> Result<Vec<String>, BuildError> {
    request.validate()?;

    let mut args = vec![
        "-hide_banner".to_string(),
        "-i".to_string(),
        absolute(&request.input_path).to_string_lossy().to_string(),
    ];

    let selection = &request.streams;
    let mut drop_video = !selection.include_video && media.has_video();
    let mut drop_audio = !selection.include_audio && media.has_audio();
    let drop_subtitles = !selection.include_subtitles && media.has_subtitles();

    match &request.mode {
        ConversionMode::Preset { preset_id } => {
            let preset = find_preset(preset_id).ok_or_else(|| BuildError::UnknownPreset {
                preset_id: preset_id.clone(),
            })?;

            // presets such as the audio ones already carry their own drops
            let has = |flag: &str| preset.extra_args.contains(&flag);
            push_drops(
                &mut args,
                drop_video && !has(DROP_VIDEO),
                drop_audio && !has(DROP_AUDIO),
                drop_subtitles && !has(DROP_SUBTITLES),
            );
            args.extend(preset.engine_args());
        }
        ConversionMode::Advanced(options) => {
            if options.is_empty() {
                return Err(BuildError::NothingToDo);
            }

            let video = options.video_codec();
            let audio = options.audio_codec();
            drop_video |= video == Some(CodecChoice::Disabled);
            drop_audio |= audio == Some(CodecChoice::Disabled);
            push_drops(&mut args, drop_video, drop_audio, drop_subtitles);

            if let Some(format) = options.format() {
                args.extend(["-f".to_string(), format.to_string()]);
            }
            if !drop_video {
                push_codec(&mut args, "-c:v", video);
            }
            if !drop_audio {
                push_codec(&mut args, "-c:a", audio);
            }
            args.extend(options.extra_tokens());
        }
    }

    args.push("-y".to_string());
    args.push(
        absolute(&request.output_path)
            .to_string_lossy()
            .to_string(),
    );

    Ok(args)
}

fn push_drops(args: &mut Vec<String>, video: bool, audio: bool, subtitles: bool) {
    for (enabled, flag) in [
        (video, DROP_VIDEO),
        (audio, DROP_AUDIO),
        (subtitles, DROP_SUBTITLES),
    ] {
        if enabled {
            args.push(flag.to_string());
        }
    }
}

fn push_codec(args: &mut Vec<String>, flag: &str, choice: Option<CodecChoice>) {
    let codec = match choice {
        Some(CodecChoice::Copy) => "copy".to_string(),
        Some(CodecChoice::Encoder(name)) => name,
        Some(CodecChoice::Disabled) | None => return,
    };
    args.extend([flag.to_string(), codec]);
}

/// Renders a printable command line, quoting tokens with whitespace.
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|arg| {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                format!("\"{}\"", arg.replace('"', "\\\""))
            } else {
                arg.clone()
            }
        }))
        .collect::<Vec<_>>()
        .join(" ")
}
