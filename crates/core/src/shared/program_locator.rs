use std::fs;
use std::path::{Path, PathBuf};

use super::external_program::ProcessError;

/// Finds external tool binaries below a root directory.
///
/// Tool distributions keep their executables in nested `bin/` folders, so
/// the search is recursive. Entries are visited in sorted order so the same
/// tree always resolves to the same binary.
#[derive(Debug, Clone)]
pub struct ProgramLocator {
    root: PathBuf,
}

impl ProgramLocator {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Resolve `program` (or `program.exe`) anywhere under the root.
    pub fn locate(&self, program: &str) -> Result<PathBuf, ProcessError> {
        let candidates = [program.to_string(), format!("{program}.exe")];
        for name in &candidates {
            if let Some(path) = find_file(&self.root, name) {
                log::debug!("Resolved {program} to {}", path.display());
                return Ok(path);
            }
        }
        Err(ProcessError::NotFound {
            program: program.to_string(),
            root: self.root.clone(),
        })
    }
}

fn find_file(dir: &Path, name: &str) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    if let Some(hit) = entries
        .iter()
        .find(|p| p.is_file() && p.file_name().is_some_and(|n| n == name))
    {
        return Some(hit.clone());
    }

    entries
        .iter()
        .filter(|p| p.is_dir())
        .find_map(|sub| find_file(sub, name))
}
