//! Declared dependency version resolution
//!
//! Decides whether a module built against some version of a contract's
//! origin module may provide implementations of that contract.

use tracing::{debug, warn};

use crate::discovery::contract::Contract;
use crate::discovery::events::{DiscoveryEvent, EventManager};
use crate::discovery::traits::{DiscoveryError, LoadedModule, ModuleId, ModuleLoader};
use crate::discovery::version::Version;

/// Outcome of a non-fatal version check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    Compatible,
    Incompatible,
}

impl Compatibility {
    pub fn is_compatible(self) -> bool {
        self == Self::Compatible
    }
}

/// Version checker for (contract, inspected module) pairs
pub struct VersionResolver<'a> {
    loader: &'a dyn ModuleLoader,
    events: &'a EventManager,
    fatal_on_incompatible: bool,
}

impl<'a> VersionResolver<'a> {
    pub fn new(
        loader: &'a dyn ModuleLoader,
        events: &'a EventManager,
        fatal_on_incompatible: bool,
    ) -> Self {
        Self {
            loader,
            events,
            fatal_on_incompatible,
        }
    }

    /// Check a loaded module against a contract
    pub fn check_module(
        &self,
        contract: &Contract,
        module: &LoadedModule,
    ) -> Result<Compatibility, DiscoveryError> {
        let declared = self.loader.referenced_version(module, contract.origin());
        self.check(contract, &module.id, declared)
    }

    /// Check an already resolved declared version
    ///
    /// `declared` is `None` when the module does not reference the contract's
    /// origin. That case follows the incompatible path: the observers are
    /// notified and, in fatal mode, the error aborts discovery.
    pub fn check(
        &self,
        contract: &Contract,
        module: &ModuleId,
        declared: Option<Version>,
    ) -> Result<Compatibility, DiscoveryError> {
        let range = *contract.range();

        let Some(declared) = declared else {
            warn!(
                "Module {} does not reference {} (origin of {})",
                module,
                contract.origin(),
                contract.id()
            );
            self.notify(contract, module, None);
            if self.fatal_on_incompatible {
                return Err(DiscoveryError::UnresolvedDependency {
                    module: module.clone(),
                    contract: contract.id().clone(),
                    origin: contract.origin().clone(),
                    range,
                });
            }
            return Ok(Compatibility::Incompatible);
        };

        // Built against the exact build the host carries
        if self.loader.actual_version(contract.origin()) == Some(declared) {
            debug!(
                "Module {} built against current {} {}",
                module,
                contract.origin(),
                declared
            );
            return Ok(Compatibility::Compatible);
        }

        if range.contains(&declared) {
            debug!(
                "Module {} declares {} {} within {}",
                module,
                contract.origin(),
                declared,
                range
            );
            return Ok(Compatibility::Compatible);
        }

        warn!(
            "Module {} declares {} {} outside {} for {}",
            module,
            contract.origin(),
            declared,
            range,
            contract.id()
        );
        self.notify(contract, module, Some(declared));
        if self.fatal_on_incompatible {
            return Err(DiscoveryError::IncompatibleVersion {
                module: module.clone(),
                contract: contract.id().clone(),
                declared,
                range,
            });
        }
        Ok(Compatibility::Incompatible)
    }

    fn notify(&self, contract: &Contract, module: &ModuleId, declared: Option<Version>) {
        self.events.publish(DiscoveryEvent::PluginIncompatibleVersion {
            module: module.clone(),
            contract: contract.id().clone(),
            declared,
            min: contract.range().min(),
            max: contract.range().max(),
        });
    }
}
