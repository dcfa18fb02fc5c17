pub mod command;
pub mod config;
pub mod engine;
pub mod history;
pub mod job;
pub mod metrics;
pub mod preset;
pub mod probe;
pub mod progress;
pub mod testing;

pub use command::{
    build_args, command_line, next_free_output_path, resolve_output_path, AdvancedOptions,
    BuildError, ConversionMode, ConversionRequest, OutputPathResolver, OutputTarget,
    StreamSelection,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, EngineConfig,
};
pub use engine::{check_engine, EngineError, EngineVersions};
pub use history::{ConversionLog, LogLevel, LogStore};
pub use job::{
    JobController, JobError, JobEvent, JobHandle, JobNotification, JobResult, JobState, JobStatus,
};
pub use preset::{find_preset, list_presets, Preset, PresetCategory};
pub use probe::{FfprobeProber, MediaDescription, MediaStream, ProbeError, Prober, StreamKind};
pub use progress::{ProgressParser, ProgressSnapshot};
