//! Lookup locations and candidate file enumeration

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::discovery::traits::ModuleLoader;

/// Locations to scan; an empty list means the current working directory
pub fn effective_locations(locations: &[PathBuf]) -> Vec<PathBuf> {
    if locations.is_empty() {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        debug!("No lookup locations configured, using {:?}", cwd);
        return vec![cwd];
    }
    locations.to_vec()
}

/// Candidate module files directly inside `location`, in lexical order
///
/// Subdirectories are not descended into. Files the loader does not
/// recognise as module artifacts are ignored.
pub fn candidate_files(location: &Path, loader: &dyn ModuleLoader) -> io::Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();

    for entry in fs::read_dir(location)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if loader.is_candidate(&path) {
            candidates.push(path);
        } else {
            trace!("Ignoring non-module file {:?}", path);
        }
    }

    candidates.sort();
    Ok(candidates)
}

/// Case-insensitive extension check
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}
