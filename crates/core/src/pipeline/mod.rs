pub mod align_batch_use_case;
pub mod align_recording_use_case;
pub mod pipeline_logger;
pub mod prepare_language_use_case;
