pub mod alignment;
pub mod audio;
pub mod ctm;
pub mod lexicon;
pub mod mapping;
pub mod pipeline;
pub mod segmentation;
pub mod shared;
