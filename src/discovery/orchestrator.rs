//! Discovery orchestration
//!
//! Drives one discovery run: every lookup location, every candidate module,
//! every eligible type, every matching contract. Module-local failures are
//! logged and skipped; version failures abort the run in fatal mode.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::discovery::contract::{Capability, Contract};
use crate::discovery::events::{DiscoveryEvent, EventManager};
use crate::discovery::instance::PluginInstance;
use crate::discovery::loader::scan::{candidate_files, effective_locations};
use crate::discovery::matcher::TypeMatcher;
use crate::discovery::registry::{ContractRegistry, Plugins};
use crate::discovery::resolver::VersionResolver;
use crate::discovery::traits::{
    CandidateType, ContractId, DiscoveryError, Instantiator, LoadedModule, ModuleLoader,
    PartialEnumeration,
};
use crate::discovery::version::Version;

/// Per-run discovery switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Abort the run on the first incompatible version
    pub fatal_on_incompatible: bool,
    /// Only consider public types
    pub public_only: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            fatal_on_incompatible: true,
            public_only: true,
        }
    }
}

impl DiscoveryOptions {
    /// Best-effort discovery: incompatibilities are reported, not fatal
    pub fn lenient() -> Self {
        Self {
            fatal_on_incompatible: false,
            ..Self::default()
        }
    }
}

/// Counters for a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub locations_scanned: usize,
    pub locations_skipped: usize,
    pub modules_loaded: usize,
    pub modules_skipped: usize,
    pub partial_modules: usize,
    pub plugins_found: usize,
    pub incompatible: usize,
}

/// Discovery engine bound to its collaborators and lookup locations
#[derive(Debug)]
pub struct Discovery<L, I> {
    locations: Vec<PathBuf>,
    loader: L,
    instantiator: I,
    events: EventManager,
}

impl<L, I> Discovery<L, I>
where
    L: ModuleLoader,
    I: Instantiator,
{
    pub fn new(loader: L, instantiator: I) -> Self {
        Self {
            locations: Vec::new(),
            loader,
            instantiator,
            events: EventManager::new(),
        }
    }

    /// Set the ordered lookup locations (empty = current directory)
    pub fn with_locations<It, P>(mut self, locations: It) -> Self
    where
        It: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    pub fn locations(&self) -> &[PathBuf] {
        &self.locations
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn events(&self) -> &EventManager {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventManager {
        &mut self.events
    }

    /// Run discovery into a fresh registry seeded from `contracts`
    pub fn run<'c, C>(
        &self,
        contracts: C,
        options: DiscoveryOptions,
    ) -> Result<ContractRegistry, DiscoveryError>
    where
        C: IntoIterator<Item = &'c Contract>,
    {
        let mut registry = ContractRegistry::new();
        for contract in contracts {
            registry.register(contract.clone())?;
        }
        self.discover_into(&mut registry, options)?;
        Ok(registry)
    }

    /// Clear `registry`'s instances and repopulate them from a full scan
    ///
    /// On a fatal error the registry is left with no instances at all.
    pub fn discover_into(
        &self,
        registry: &mut ContractRegistry,
        options: DiscoveryOptions,
    ) -> Result<ScanSummary, DiscoveryError> {
        registry.clear_instances();
        info!(
            "Discovering plugins for {} contract(s) (fatal_on_incompatible={}, public_only={})",
            registry.len(),
            options.fatal_on_incompatible,
            options.public_only
        );

        match self.scan(registry, options) {
            Ok(summary) => {
                info!(
                    "Discovery completed: {} plugin(s) from {} module(s), {} incompatible, {} skipped",
                    summary.plugins_found,
                    summary.modules_loaded,
                    summary.incompatible,
                    summary.modules_skipped
                );
                Ok(summary)
            }
            Err(e) => {
                registry.clear_instances();
                warn!("Discovery aborted: {}", e);
                Err(e)
            }
        }
    }

    fn scan(
        &self,
        registry: &mut ContractRegistry,
        options: DiscoveryOptions,
    ) -> Result<ScanSummary, DiscoveryError> {
        let resolver =
            VersionResolver::new(&self.loader, &self.events, options.fatal_on_incompatible);
        let mut summary = ScanSummary::default();

        for location in effective_locations(&self.locations) {
            let files = match candidate_files(&location, &self.loader) {
                Ok(files) => files,
                Err(e) => {
                    warn!("Skipping lookup location {:?}: {}", location, e);
                    summary.locations_skipped += 1;
                    continue;
                }
            };
            debug!("Scanning {:?}: {} candidate(s)", location, files.len());
            summary.locations_scanned += 1;

            for path in files {
                self.scan_file(&path, registry, &resolver, options, &mut summary)?;
            }
        }

        Ok(summary)
    }

    fn scan_file(
        &self,
        path: &Path,
        registry: &mut ContractRegistry,
        resolver: &VersionResolver<'_>,
        options: DiscoveryOptions,
        summary: &mut ScanSummary,
    ) -> Result<(), DiscoveryError> {
        let module = match self.loader.load(path) {
            Ok(module) => module,
            Err(e) => {
                warn!("Skipping {:?}: {}", path, e);
                summary.modules_skipped += 1;
                return Ok(());
            }
        };
        summary.modules_loaded += 1;

        let types = match self.loader.enumerate_types(&module) {
            Ok(types) => types,
            Err(partial) => {
                summary.partial_modules += 1;
                return self.check_dependencies_only(&module, &partial, registry, resolver, summary);
            }
        };

        let matcher = TypeMatcher::new(&self.loader);
        for ty in types.iter().filter(|ty| is_eligible(ty, options)) {
            let matched: Vec<Contract> =
                matcher.matches(ty, registry).into_iter().cloned().collect();

            for contract in matched {
                if !resolver.check_module(&contract, &module)?.is_compatible() {
                    summary.incompatible += 1;
                    continue;
                }

                let instance = self
                    .instantiator
                    .create_default_instance(ty, &contract)
                    .map_err(|source| DiscoveryError::Instantiation {
                        module: module.id.clone(),
                        type_name: ty.name.clone(),
                        source,
                    })?;

                info!(
                    "Found plugin {} in {} for {}",
                    ty.name,
                    module.id,
                    contract.id()
                );
                registry.add_instance(contract.id(), instance.clone());
                summary.plugins_found += 1;
                self.events.publish(DiscoveryEvent::PluginFound {
                    contract: contract.id().clone(),
                    module: module.id.clone(),
                    instance,
                });
            }
        }

        Ok(())
    }

    /// Version-check a module whose types could not be enumerated
    ///
    /// Every contract whose origin the module declares a dependency on is
    /// checked, so incompatibilities still surface even though no type can
    /// be matched. The loader's declared dependencies take precedence over
    /// those carried by the enumeration failure.
    fn check_dependencies_only(
        &self,
        module: &LoadedModule,
        partial: &PartialEnumeration,
        registry: &ContractRegistry,
        resolver: &VersionResolver<'_>,
        summary: &mut ScanSummary,
    ) -> Result<(), DiscoveryError> {
        warn!(
            "Module {} loaded but its types could not be enumerated: {}",
            module.id, partial.reason
        );

        let mut dependencies = self.loader.declared_dependencies(module);
        for (origin, version) in &partial.dependencies {
            dependencies.entry(origin.clone()).or_insert(*version);
        }

        for contract in registry.contracts() {
            let Some(declared) = dependencies.get(contract.origin()) else {
                continue;
            };
            if !resolver
                .check(contract, &module.id, Some(*declared))?
                .is_compatible()
            {
                summary.incompatible += 1;
            }
        }
        Ok(())
    }
}

/// Concrete class, and public unless public-only filtering is off
fn is_eligible(ty: &CandidateType, options: DiscoveryOptions) -> bool {
    if !ty.is_instantiable() {
        return false;
    }
    !options.public_only || ty.is_public()
}

/// Fluent host façade: register contracts, discover, query
#[derive(Debug)]
pub struct PluginHost<L, I> {
    discovery: Discovery<L, I>,
    registry: ContractRegistry,
}

impl<L, I> PluginHost<L, I>
where
    L: ModuleLoader,
    I: Instantiator,
{
    pub fn new(discovery: Discovery<L, I>) -> Self {
        Self {
            discovery,
            registry: ContractRegistry::new(),
        }
    }

    /// Register a typed capability; fails on a duplicate id
    pub fn register<C: Capability>(
        &mut self,
        min: Version,
        max: Option<Version>,
    ) -> Result<&mut Self, DiscoveryError> {
        if self.registry.is_registered(&C::contract_id()) {
            return Err(DiscoveryError::DuplicateContract(C::contract_id()));
        }
        self.register_contract(Contract::of::<C>(min, max)?)
    }

    pub fn register_contract(&mut self, contract: Contract) -> Result<&mut Self, DiscoveryError> {
        self.registry.register(contract)?;
        Ok(self)
    }

    /// Full re-scan; previously discovered instances are discarded first
    pub fn discover(&mut self, options: DiscoveryOptions) -> Result<&mut Self, DiscoveryError> {
        self.discovery.discover_into(&mut self.registry, options)?;
        Ok(self)
    }

    pub fn discovery(&self) -> &Discovery<L, I> {
        &self.discovery
    }

    pub fn events_mut(&mut self) -> &mut EventManager {
        self.discovery.events_mut()
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    pub fn get_plugins(&self, id: &ContractId) -> Plugins<'_, fn(&PluginInstance) -> bool> {
        self.registry.plugins(id)
    }

    pub fn get_plugins_where<P>(&self, id: &ContractId, predicate: P) -> Plugins<'_, P>
    where
        P: Fn(&PluginInstance) -> bool,
    {
        self.registry.plugins_where(id, predicate)
    }

    pub fn has_plugins(&self, id: &ContractId) -> bool {
        self.registry.has_plugins(id)
    }

    pub fn has_plugins_where<P>(&self, id: &ContractId, predicate: P) -> bool
    where
        P: Fn(&PluginInstance) -> bool,
    {
        self.registry.has_plugins_where(id, predicate)
    }

    pub fn plugins_of<C: Capability>(&self) -> impl Iterator<Item = &C::Handle> + Clone + '_ {
        self.registry.plugins_of::<C>()
    }

    pub fn has_plugins_of<C: Capability>(&self) -> bool {
        self.registry.has_plugins_of::<C>()
    }
}
