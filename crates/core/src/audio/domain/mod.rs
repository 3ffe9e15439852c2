pub mod audio_segment;
pub mod audio_source;
