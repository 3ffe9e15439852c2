pub mod constants;
pub mod external_program;
pub mod program_locator;
pub mod settings;
