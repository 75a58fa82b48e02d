//! Configuration management for plugin-discovery
//!
//! Handles configuration loading, validation, and conversion into the
//! engine's contract set, options and descriptor loader.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::discovery::loader::default_candidate_extensions;
use crate::discovery::{
    Contract, ContractSet, DiscoveryError, DiscoveryOptions, ManifestModuleLoader, Version,
    VersionRange,
};

/// One contract the host wants extended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Capability identifier
    pub id: String,

    /// Module that defines the capability
    pub origin: String,

    /// Lowest accepted version of `origin` (inclusive)
    #[serde(default = "default_min_version")]
    pub min_version: String,

    /// Highest accepted version of `origin` (inclusive), unbounded if absent
    #[serde(default)]
    pub max_version: Option<String>,
}

fn default_min_version() -> String {
    "0.0".to_string()
}

impl ContractConfig {
    /// Parse into an engine contract
    pub fn to_contract(&self) -> Result<Contract, DiscoveryError> {
        let min = Version::parse(&self.min_version)?;
        let max = self.max_version.as_deref().map(Version::parse).transpose()?;
        Ok(Contract::new(
            self.id.as_str(),
            self.origin.as_str(),
            VersionRange::new(min, max)?,
        ))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "plugin_discovery=debug"); RUST_LOG wins
    #[serde(default)]
    pub filter: Option<String>,

    /// Emit JSON lines (requires the `json-logging` feature)
    #[serde(default)]
    pub json_format: bool,
}

/// Discovery configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Ordered lookup locations (empty = current directory)
    #[serde(default)]
    pub lookup_locations: Vec<PathBuf>,

    /// Module artifact extensions
    #[serde(default = "default_candidate_extensions")]
    pub candidate_extensions: Vec<String>,

    /// Abort discovery on the first incompatible module
    #[serde(default = "default_true")]
    pub fatal_on_incompatible: bool,

    /// Only consider public types
    #[serde(default = "default_true")]
    pub public_only: bool,

    /// Versions of modules the host itself carries (name -> version)
    #[serde(default)]
    pub host_modules: BTreeMap<String, String>,

    /// Contracts to discover
    #[serde(default)]
    pub contracts: Vec<ContractConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

fn default_true() -> bool {
    true
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            lookup_locations: Vec::new(),
            candidate_extensions: default_candidate_extensions(),
            fatal_on_incompatible: true,
            public_only: true,
            host_modules: BTreeMap::new(),
            contracts: Vec::new(),
            logging: None,
        }
    }
}

impl DiscoveryConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        Self::from_toml_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.candidate_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "candidate_extensions must list at least one artifact extension"
            ));
        }
        if let Some(ext) = self
            .candidate_extensions
            .iter()
            .find(|ext| ext.trim_start_matches('.').is_empty())
        {
            return Err(anyhow::anyhow!("Invalid candidate extension {:?}", ext));
        }

        for (name, version) in &self.host_modules {
            Version::parse(version)
                .map_err(|e| anyhow::anyhow!("host module {}: {}", name, e))?;
        }

        let mut seen = HashSet::new();
        for contract in &self.contracts {
            if contract.id.is_empty() || contract.origin.is_empty() {
                return Err(anyhow::anyhow!(
                    "Contract entries need a non-empty id and origin"
                ));
            }
            if !seen.insert(contract.id.as_str()) {
                return Err(DiscoveryError::DuplicateContract(contract.id.as_str().into()).into());
            }
            contract
                .to_contract()
                .map_err(|e| anyhow::anyhow!("contract {}: {}", contract.id, e))?;
        }

        Ok(())
    }

    /// Build the contract set
    pub fn contract_set(&self) -> Result<ContractSet, DiscoveryError> {
        let mut builder = ContractSet::builder();
        for contract in &self.contracts {
            builder = builder.register_contract(contract.to_contract()?)?;
        }
        Ok(builder.build())
    }

    pub fn options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            fatal_on_incompatible: self.fatal_on_incompatible,
            public_only: self.public_only,
        }
    }

    /// Build the descriptor loader for this configuration
    pub fn loader(&self) -> Result<ManifestModuleLoader, DiscoveryError> {
        let mut loader =
            ManifestModuleLoader::new().with_extensions(self.candidate_extensions.iter().cloned());
        for (name, version) in &self.host_modules {
            loader = loader.with_host_module(name.as_str(), Version::parse(version)?);
        }
        Ok(loader)
    }
}
