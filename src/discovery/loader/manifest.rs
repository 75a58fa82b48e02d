//! Descriptor-backed module loader
//!
//! Module artifacts are opaque to this loader. What the host would learn by
//! loading the artifact (identity, declared dependencies, exposed types) is
//! read from a sidecar descriptor next to it: `render.so` is described by
//! `render.module.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::discovery::loader::scan::has_extension;
use crate::discovery::traits::{
    CandidateType, ContractId, DeclaredDependencies, LoadError, LoadedModule, ModuleId,
    ModuleLoader, PartialEnumeration, TypeKind, Visibility,
};
use crate::discovery::version::Version;

/// Extension of module descriptor files, replacing the artifact extension
pub const DESCRIPTOR_EXTENSION: &str = "module.toml";

/// Default module artifact extensions
pub fn default_candidate_extensions() -> Vec<String> {
    vec!["dll".to_string(), "so".to_string(), "dylib".to_string()]
}

/// Module header section of a descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleHeader {
    /// Module name (unique identifier)
    pub name: String,
    /// Module version
    pub version: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Modules this one was built against (name -> version)
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

/// One `[[types]]` entry of a descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeManifest {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Supertypes, nearest first
    #[serde(default)]
    pub extends: Vec<String>,
    /// Implemented interfaces
    #[serde(default)]
    pub implements: Vec<String>,
}

/// Full module descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleManifest {
    #[serde(flatten)]
    pub header: ModuleHeader,
    #[serde(default)]
    pub types: Vec<TypeManifest>,
}

impl ModuleManifest {
    /// Descriptor path for a module artifact
    pub fn descriptor_path(artifact: &Path) -> PathBuf {
        artifact.with_extension(DESCRIPTOR_EXTENSION)
    }

    /// Serialize and write the descriptor for `artifact`
    pub fn write_for(&self, artifact: &Path) -> Result<PathBuf, LoadError> {
        let path = Self::descriptor_path(artifact);
        let contents = toml::to_string_pretty(self).map_err(|e| LoadError::Malformed {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        std::fs::write(&path, contents).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Parsed descriptor: a valid header plus the raw `types` value
struct Descriptor {
    module: LoadedModule,
    types: Option<toml::Value>,
}

fn read_descriptor(artifact: &Path) -> Result<Descriptor, LoadError> {
    let path = ModuleManifest::descriptor_path(artifact);
    if !path.is_file() {
        return Err(LoadError::MissingDescriptor(path));
    }

    let contents = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    let malformed = |reason: String| LoadError::Malformed {
        path: path.clone(),
        reason,
    };

    let mut table: toml::Table = toml::from_str(&contents).map_err(|e| malformed(e.to_string()))?;
    let types = table.remove("types");

    let header: ModuleHeader = toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| malformed(e.to_string()))?;

    if !is_valid_name(&header.name) {
        return Err(malformed(format!("invalid module name {:?}", header.name)));
    }
    let version = Version::parse(&header.version).map_err(|e| malformed(e.to_string()))?;

    let mut dependencies = DeclaredDependencies::new();
    for (name, raw) in &header.dependencies {
        let declared = Version::parse(raw)
            .map_err(|e| malformed(format!("dependency {name}: {e}")))?;
        dependencies.insert(ModuleId::new(name.as_str()), declared);
    }

    Ok(Descriptor {
        module: LoadedModule {
            id: ModuleId::new(header.name),
            path: artifact.to_path_buf(),
            version,
            dependencies,
        },
        types,
    })
}

/// Module name: alphanumeric start, then alphanumerics, `-`, `_` or `.`
fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 128 {
        return false;
    }
    if !name.chars().next().map_or(false, |c| c.is_alphanumeric()) {
        return false;
    }
    name.chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// `ModuleLoader` reading sidecar TOML descriptors
#[derive(Debug, Clone)]
pub struct ManifestModuleLoader {
    extensions: Vec<String>,
    host_modules: BTreeMap<ModuleId, Version>,
}

impl Default for ManifestModuleLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestModuleLoader {
    pub fn new() -> Self {
        Self {
            extensions: default_candidate_extensions(),
            host_modules: BTreeMap::new(),
        }
    }

    /// Replace the recognised artifact extensions
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Declare the version of a module the host itself carries
    pub fn with_host_module(mut self, name: impl Into<ModuleId>, version: Version) -> Self {
        self.host_modules.insert(name.into(), version);
        self
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl ModuleLoader for ManifestModuleLoader {
    fn is_candidate(&self, path: &Path) -> bool {
        has_extension(path, &self.extensions)
    }

    fn load(&self, path: &Path) -> Result<LoadedModule, LoadError> {
        let descriptor = read_descriptor(path)?;
        debug!(
            "Loaded module {} {} from {:?}",
            descriptor.module.id, descriptor.module.version, path
        );
        Ok(descriptor.module)
    }

    fn enumerate_types(
        &self,
        module: &LoadedModule,
    ) -> Result<Vec<CandidateType>, PartialEnumeration> {
        let partial = |reason: String| PartialEnumeration {
            reason,
            dependencies: module.dependencies.clone(),
        };

        let descriptor = read_descriptor(&module.path).map_err(|e| partial(e.to_string()))?;
        let Some(raw) = descriptor.types else {
            return Ok(Vec::new());
        };
        let entries: Vec<TypeManifest> = raw
            .try_into()
            .map_err(|e: toml::de::Error| partial(format!("cannot enumerate types: {e}")))?;

        Ok(entries
            .into_iter()
            .map(|entry| CandidateType {
                name: entry.name,
                module: module.id.clone(),
                visibility: entry.visibility,
                kind: entry.kind,
                is_abstract: entry.is_abstract,
                base_types: entry.extends.into_iter().map(ContractId::new).collect(),
                interfaces: entry.implements.into_iter().map(ContractId::new).collect(),
            })
            .collect())
    }

    fn actual_version(&self, module: &ModuleId) -> Option<Version> {
        self.host_modules.get(module).copied()
    }
}
