//! Conversion requests and their translation into engine invocations.
//!
//! Everything in here is deterministic and free of process I/O: the same
//! request and media description always produce the same argument list.
//! [`resolve_output_path`] only inspects path strings; the single helper
//! that looks at the filesystem is [`next_free_output_path`].

mod builder;
mod error;
mod output;
mod types;

pub use builder::{build_args, command_line};
pub use error::BuildError;
pub use output::{
    format_extension, next_free_output_path, resolve_output_path, OutputPathResolver,
    OutputTarget, DEFAULT_EXTENSION,
};
pub use types::{AdvancedOptions, CodecChoice, ConversionMode, ConversionRequest, StreamSelection};

pub(crate) use types::absolute;
