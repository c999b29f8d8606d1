// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod fs_temp;
pub mod probe_ffprobe;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::FfmpegDispatchAdapter;
pub use fs_temp::TempScratchAdapter;
pub use probe_ffprobe::FfprobeAdapter;
pub use toml_config::{AppConfig, TomlConfigAdapter};
