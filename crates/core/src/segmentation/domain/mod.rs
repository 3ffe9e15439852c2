pub mod segmentation_provider;
pub mod transcript_segment;
