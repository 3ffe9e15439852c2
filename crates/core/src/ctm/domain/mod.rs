pub mod ctm_error;
pub mod ctm_record;
pub mod phone_label;
pub mod segment_record;
pub mod time_base;
