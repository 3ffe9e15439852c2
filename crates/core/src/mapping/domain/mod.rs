pub mod field_remapper;
pub mod field_selector;
pub mod mapping_error;
