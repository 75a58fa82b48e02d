//! Module loading collaborators
//!
//! Candidate file enumeration and the descriptor-backed `ModuleLoader`.

pub mod manifest;
pub mod scan;

pub use manifest::{
    default_candidate_extensions, ManifestModuleLoader, ModuleHeader, ModuleManifest,
    TypeManifest, DESCRIPTOR_EXTENSION,
};
pub use scan::{candidate_files, effective_locations};
