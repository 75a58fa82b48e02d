//! Plugin Discovery - runtime extension discovery for host applications
//!
//! A host declares the capabilities it wants extended (contracts), points the
//! engine at one or more lookup locations, and gets back default-constructed
//! instances of every compatible implementation found in the modules there.
//!
//! ## Design Principles
//!
//! 1. **Explicit registration**: contracts are registered through a builder
//!    before discovery runs; nothing is implicit or global
//! 2. **Version safety**: a module built against a version of a contract's
//!    origin outside the accepted range never contributes instances
//! 3. **Host neutrality**: loading and construction are collaborator traits,
//!    with a descriptor-backed loader shipped in-crate
//!
//! ## Example
//!
//! ```rust,no_run
//! use plugin_discovery::{
//!     Contract, DescriptorInstantiator, Discovery, DiscoveryOptions, ManifestModuleLoader,
//!     Version, VersionRange,
//! };
//!
//! # fn main() -> Result<(), plugin_discovery::DiscoveryError> {
//! let contracts = plugin_discovery::ContractSet::builder()
//!     .register_contract(Contract::new(
//!         "IRenderer",
//!         "render-api",
//!         VersionRange::at_least(Version::new(1, 0, 0)),
//!     ))?
//!     .build();
//!
//! let discovery = Discovery::new(ManifestModuleLoader::new(), DescriptorInstantiator)
//!     .with_locations(["plugins"]);
//! let registry = discovery.run(&contracts, DiscoveryOptions::default())?;
//! for plugin in registry.plugins(&"IRenderer".into()).iter() {
//!     println!("{} from {}", plugin.type_name(), plugin.module());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discovery;
pub mod utils;

pub use config::{ContractConfig, DiscoveryConfig, LoggingConfig};
pub use discovery::{
    Capability, Contract, ContractId, ContractRegistry, ContractSet, DescriptorInstantiator,
    Discovery, DiscoveryError, DiscoveryEvent, DiscoveryOptions, FactoryInstantiator,
    ManifestModuleLoader, ModuleId, PluginHost, PluginInstance, ScanSummary, Version,
    VersionRange,
};
