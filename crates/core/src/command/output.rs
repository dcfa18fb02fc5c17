//! Default output path resolution.

use std::path::{Path, PathBuf};

use crate::preset::find_preset;

/// Extension used before anything has been resolved.
pub const DEFAULT_EXTENSION: &str = "mp4";

const COLLISION_SUFFIX: &str = "_converted";
const FALLBACK_STEM: &str = "output";

/// What the output extension is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Preset(String),
    Format(String),
}

/// Maps a container format name to the usual file extension.
///
/// Uncommon formats map to their own name.
pub fn format_extension(format: &str) -> String {
    let ext = match format.trim().to_ascii_lowercase().as_str() {
        "matroska" | "mkv" => "mkv",
        "mpegts" => "ts",
        "m4a" | "ipod" => "m4a",
        "image2" | "png" => "png",
        "mjpeg" | "jpeg" | "jpg" => "jpg",
        "rawvideo" => "raw",
        other => return other.to_string(),
    };
    ext.to_string()
}

/// Extension for `target`, or `None` when it names an unknown preset or a
/// blank format.
fn target_extension(target: &OutputTarget) -> Option<String> {
    match target {
        OutputTarget::Preset(id) => find_preset(id).map(|p| p.extension.to_string()),
        OutputTarget::Format(name) if name.trim().is_empty() => None,
        OutputTarget::Format(name) => Some(format_extension(name)),
    }
}

/// Derives `<dir>/<stem>.<ext>` for `input`.
///
/// `fallback_ext` is used when `target` is absent or does not yield an
/// extension. The result never designates the input file itself: on a clash
/// the stem gets a `_converted` suffix. No filesystem access.
pub fn resolve_output_path(
    input: &Path,
    target: Option<&OutputTarget>,
    fallback_ext: &str,
) -> PathBuf {
    let ext = target
        .and_then(target_extension)
        .unwrap_or_else(|| fallback_ext.to_string());

    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string());

    let candidate = dir.join(format!("{stem}.{ext}"));
    if same_file_name(&candidate, input) {
        dir.join(format!("{stem}{COLLISION_SUFFIX}.{ext}"))
    } else {
        candidate
    }
}

// Case-insensitive so that `clip.MP4` -> `clip.mp4` is still caught on
// filesystems that fold case.
fn same_file_name(a: &Path, b: &Path) -> bool {
    a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}

/// Remembers the last resolved extension so that a call without a target
/// keeps the previous choice.
#[derive(Debug, Clone)]
pub struct OutputPathResolver {
    last_extension: String,
}

impl Default for OutputPathResolver {
    fn default() -> Self {
        Self {
            last_extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl OutputPathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_extension(&self) -> &str {
        &self.last_extension
    }

    pub fn resolve(&mut self, input: &Path, target: Option<&OutputTarget>) -> PathBuf {
        let path = resolve_output_path(input, target, &self.last_extension);
        if let Some(ext) = path.extension() {
            self.last_extension = ext.to_string_lossy().to_string();
        }
        path
    }
}

/// Returns `path` when nothing exists there, otherwise the first free
/// `<stem>_N.<ext>` with N starting at 2.
pub fn next_free_output_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| FALLBACK_STEM.to_string());
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (2u32..)
        .map(|n| dir.join(format!("{stem}_{n}{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
