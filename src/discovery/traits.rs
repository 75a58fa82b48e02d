//! Discovery engine traits and shared types
//!
//! Defines the collaborator interfaces the engine consumes (module loading,
//! type introspection, default construction) and the error taxonomy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::discovery::contract::Contract;
use crate::discovery::instance::PluginInstance;
use crate::discovery::version::{Version, VersionRange};

/// Identity of a loadable module (its declared name)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ModuleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Capability identifier a contract is keyed on
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(String);

impl ContractId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContractId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ContractId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Declared dependencies of a module: referenced module -> version built against
pub type DeclaredDependencies = BTreeMap<ModuleId, Version>;

/// A successfully loaded candidate module
#[derive(Debug, Clone)]
pub struct LoadedModule {
    /// Module identity
    pub id: ModuleId,
    /// Artifact path the module was loaded from
    pub path: PathBuf,
    /// The module's own version
    pub version: Version,
    /// Modules this one was built against
    pub dependencies: DeclaredDependencies,
}

/// Type visibility as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Internal,
}

/// Shape of an exposed type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
}

/// Description of one type exposed by a loaded module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateType {
    /// Type name, unique within its module
    pub name: String,
    /// Module that exposes the type
    pub module: ModuleId,
    pub visibility: Visibility,
    pub kind: TypeKind,
    pub is_abstract: bool,
    /// Supertypes, nearest first
    pub base_types: Vec<ContractId>,
    /// Implemented capability interfaces
    pub interfaces: Vec<ContractId>,
}

impl CandidateType {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Concrete class that default construction can activate
    pub fn is_instantiable(&self) -> bool {
        self.kind == TypeKind::Class && !self.is_abstract
    }
}

/// Type enumeration failed after the module itself loaded
///
/// Still carries the dependency list so version checks can run.
#[derive(Debug, Clone)]
pub struct PartialEnumeration {
    pub reason: String,
    pub dependencies: DeclaredDependencies,
}

/// Outright module load failure (the file is skipped)
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("module descriptor not found: {0}")]
    MissingDescriptor(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed module descriptor {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// Default construction failure
#[derive(Debug, Error)]
pub enum InstantiationError {
    #[error("no parameterless constructor registered for {type_name} under {contract}")]
    NoConstructor {
        type_name: String,
        contract: ContractId,
    },

    #[error("constructor for {type_name} failed: {reason}")]
    ConstructorFailed { type_name: String, reason: String },
}

/// Discovery engine errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Contract already registered: {0}")]
    DuplicateContract(ContractId),

    #[error("Invalid version: {0:?}")]
    InvalidVersion(String),

    #[error("Invalid version range: max {max} is below min {min}")]
    InvalidVersionRange { min: Version, max: Version },

    #[error(
        "Module {module} was built against version {declared} of {contract}, allowed range is {range}"
    )]
    IncompatibleVersion {
        module: ModuleId,
        contract: ContractId,
        declared: Version,
        range: VersionRange,
    },

    #[error(
        "Module {module} does not reference {origin}, the origin of {contract} (allowed range {range})"
    )]
    UnresolvedDependency {
        module: ModuleId,
        contract: ContractId,
        origin: ModuleId,
        range: VersionRange,
    },

    #[error("Failed to instantiate {type_name} from {module}: {source}")]
    Instantiation {
        module: ModuleId,
        type_name: String,
        #[source]
        source: InstantiationError,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Host dynamic-loading and type-introspection capability
///
/// Implementations adapt whatever the host uses to load compiled units.
/// Only `is_candidate`, `load`, `enumerate_types` and `actual_version` are
/// required; the remaining methods default to the descriptor data carried by
/// `LoadedModule` and `CandidateType`.
pub trait ModuleLoader {
    /// Whether a file in a lookup location is a loadable module artifact
    fn is_candidate(&self, path: &Path) -> bool;

    /// Load a module artifact
    fn load(&self, path: &Path) -> Result<LoadedModule, LoadError>;

    /// List the types a loaded module exposes
    fn enumerate_types(
        &self,
        module: &LoadedModule,
    ) -> Result<Vec<CandidateType>, PartialEnumeration>;

    /// Version of `module` that the running host actually carries
    fn actual_version(&self, module: &ModuleId) -> Option<Version>;

    /// Declared dependency list of a module
    fn declared_dependencies(&self, module: &LoadedModule) -> DeclaredDependencies {
        module.dependencies.clone()
    }

    /// Version of `origin` that `module` was built against
    fn referenced_version(&self, module: &LoadedModule, origin: &ModuleId) -> Option<Version> {
        module.dependencies.get(origin).copied()
    }

    /// Proper subtype relation
    fn is_subtype_of(&self, ty: &CandidateType, contract: &ContractId) -> bool {
        ty.base_types.iter().any(|base| base == contract)
    }

    /// Capability-interface relation
    fn implements(&self, ty: &CandidateType, contract: &ContractId) -> bool {
        ty.interfaces.iter().any(|iface| iface == contract)
    }
}

/// Default-construction capability
pub trait Instantiator {
    /// Activate `ty` for `contract` through its parameterless constructor
    fn create_default_instance(
        &self,
        ty: &CandidateType,
        contract: &Contract,
    ) -> Result<PluginInstance, InstantiationError>;
}
