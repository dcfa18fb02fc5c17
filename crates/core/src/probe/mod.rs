//! Media probing.
//!
//! Runs the probing engine against a file and normalizes its report into a
//! [`MediaDescription`]. Optional fields that the engine omits stay `None`;
//! stream types outside the known set are classified as
//! [`StreamKind::Unknown`].
//!
//! # Example
//!
//! ```ignore
//! use convertify_core::probe::{FfprobeProber, Prober};
//!
//! let prober = FfprobeProber::with_defaults();
//! let media = prober.probe(Path::new("/videos/clip.mp4")).await?;
//! println!("{} streams, video: {}", media.streams().len(), media.has_video());
//! ```

mod error;
mod ffprobe;
mod traits;
mod types;

pub use error::ProbeError;
pub use ffprobe::FfprobeProber;
pub use traits::Prober;
pub use types::{ContainerInfo, MediaDescription, MediaStream, StreamKind};
