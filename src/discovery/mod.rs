//! Plugin discovery engine
//!
//! Scans lookup locations for loadable modules, matches the types they expose
//! against a set of registered contracts, checks the version each module was
//! built against, and keeps default-constructed instances per contract.
//!
//! ## Architecture
//!
//! - **Contracts**: capability id, origin module and accepted version range,
//!   registered up front through a `ContractSet` builder
//! - **Registry**: arena of contracts indexed by id, each owning its
//!   discovered instances in discovery order
//! - **Collaborators**: host loading and introspection (`ModuleLoader`) and
//!   default construction (`Instantiator`) are traits
//! - **Events**: `PluginFound` and `PluginIncompatibleVersion`, delivered
//!   synchronously to callbacks and channel subscribers
//! - **Failure policy**: module-local failures are skipped; version failures
//!   are fatal unless discovery runs in lenient mode

pub mod contract;
pub mod events;
pub mod instance;
pub mod loader;
pub mod matcher;
pub mod orchestrator;
pub mod registry;
pub mod resolver;
pub mod traits;
pub mod version;

pub use contract::{Capability, Contract, ContractSet, ContractSetBuilder};
pub use events::{DiscoveryEvent, EventManager};
pub use instance::{DescriptorInstantiator, FactoryInstantiator, PluginInstance};
pub use loader::ManifestModuleLoader;
pub use matcher::TypeMatcher;
pub use orchestrator::{Discovery, DiscoveryOptions, PluginHost, ScanSummary};
pub use registry::{ContractRegistry, Plugins};
pub use resolver::{Compatibility, VersionResolver};
pub use traits::{
    CandidateType, ContractId, DiscoveryError, InstantiationError, Instantiator, LoadError,
    LoadedModule, ModuleId, ModuleLoader, PartialEnumeration, TypeKind, Visibility,
};
pub use version::{Version, VersionRange};
