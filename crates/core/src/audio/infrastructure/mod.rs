pub mod wav_audio_source;
