//! Contracts and the contract set builder
//!
//! A contract names a capability the host wants implementations of, the
//! module that defines it, and the range of that module's versions plugins
//! may have been built against.

use std::collections::HashSet;

use crate::discovery::traits::{ContractId, DiscoveryError, ModuleId};
use crate::discovery::version::{Version, VersionRange};

/// A registered capability plus its allowed version range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    id: ContractId,
    origin: ModuleId,
    range: VersionRange,
}

impl Contract {
    pub fn new(id: impl Into<ContractId>, origin: impl Into<ModuleId>, range: VersionRange) -> Self {
        Self {
            id: id.into(),
            origin: origin.into(),
            range,
        }
    }

    /// Contract for a statically known capability
    pub fn of<C: Capability>(min: Version, max: Option<Version>) -> Result<Self, DiscoveryError> {
        Ok(Self::new(
            ContractId::new(C::ID),
            ModuleId::new(C::ORIGIN),
            VersionRange::new(min, max)?,
        ))
    }

    pub fn id(&self) -> &ContractId {
        &self.id
    }

    /// Module defining the capability type
    pub fn origin(&self) -> &ModuleId {
        &self.origin
    }

    pub fn range(&self) -> &VersionRange {
        &self.range
    }
}

/// A capability known to the host at compile time
///
/// `Handle` is what plugin instances for this capability hold, typically an
/// `Arc<dyn Trait>`.
///
/// ```rust
/// use std::sync::Arc;
/// use plugin_discovery::Capability;
///
/// pub trait Renderer: Send + Sync {
///     fn render(&self) -> Vec<u8>;
/// }
///
/// pub struct RendererCapability;
///
/// impl Capability for RendererCapability {
///     const ID: &'static str = "IRenderer";
///     const ORIGIN: &'static str = "render-api";
///     type Handle = Arc<dyn Renderer>;
/// }
/// ```
pub trait Capability: 'static {
    const ID: &'static str;
    const ORIGIN: &'static str;
    type Handle: Clone + Send + Sync + 'static;

    fn contract_id() -> ContractId {
        ContractId::new(Self::ID)
    }
}

/// Immutable, duplicate-free set of contracts in registration order
#[derive(Debug, Clone, Default)]
pub struct ContractSet {
    contracts: Vec<Contract>,
}

impl ContractSet {
    pub fn builder() -> ContractSetBuilder {
        ContractSetBuilder::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contract> {
        self.contracts.iter()
    }

    pub fn get(&self, id: &ContractId) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.id() == id)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl<'a> IntoIterator for &'a ContractSet {
    type Item = &'a Contract;
    type IntoIter = std::slice::Iter<'a, Contract>;

    fn into_iter(self) -> Self::IntoIter {
        self.contracts.iter()
    }
}

/// Builder collecting contracts; rejects duplicates at the register call
#[derive(Debug, Default)]
pub struct ContractSetBuilder {
    contracts: Vec<Contract>,
    seen: HashSet<ContractId>,
}

impl ContractSetBuilder {
    /// Register a typed capability
    pub fn register<C: Capability>(
        self,
        min: Version,
        max: Option<Version>,
    ) -> Result<Self, DiscoveryError> {
        if self.seen.contains(&C::contract_id()) {
            return Err(DiscoveryError::DuplicateContract(C::contract_id()));
        }
        self.register_contract(Contract::of::<C>(min, max)?)
    }

    /// Register an already built contract
    pub fn register_contract(mut self, contract: Contract) -> Result<Self, DiscoveryError> {
        if !self.seen.insert(contract.id().clone()) {
            return Err(DiscoveryError::DuplicateContract(contract.id().clone()));
        }
        self.contracts.push(contract);
        Ok(self)
    }

    pub fn build(self) -> ContractSet {
        ContractSet {
            contracts: self.contracts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Renderer;

    impl Capability for Renderer {
        const ID: &'static str = "IRenderer";
        const ORIGIN: &'static str = "render-api";
        type Handle = Arc<str>;
    }

    #[test]
    fn test_typed_contract_carries_identity() {
        let contract = Contract::of::<Renderer>(Version::new(1, 0, 0), None).unwrap();
        assert_eq!(contract.id().as_str(), "IRenderer");
        assert_eq!(contract.origin().as_str(), "render-api");
        assert_eq!(contract.range().max(), None);
    }

    #[test]
    fn test_builder_preserves_registration_order() {
        let set = ContractSet::builder()
            .register_contract(Contract::new(
                "B",
                "origin",
                VersionRange::at_least(Version::new(1, 0, 0)),
            ))
            .unwrap()
            .register::<Renderer>(Version::new(1, 0, 0), None)
            .unwrap()
            .build();

        let ids: Vec<&str> = set.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, vec!["B", "IRenderer"]);
        assert!(set.get(&ContractId::new("IRenderer")).is_some());
    }

    #[test]
    fn test_duplicate_rejected_regardless_of_versions() {
        let err = ContractSet::builder()
            .register::<Renderer>(Version::new(1, 0, 0), None)
            .unwrap()
            .register::<Renderer>(Version::new(5, 0, 0), Some(Version::new(6, 0, 0)))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::DuplicateContract(id) if id.as_str() == "IRenderer"));
    }

    #[test]
    fn test_duplicate_with_inverted_bounds_is_still_duplicate() {
        let err = ContractSet::builder()
            .register::<Renderer>(Version::new(1, 0, 0), None)
            .unwrap()
            .register::<Renderer>(Version::new(2, 0, 0), Some(Version::new(1, 0, 0)))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::DuplicateContract(_)));
    }

    #[test]
    fn test_inverted_bounds_rejected_at_registration() {
        let err = ContractSet::builder()
            .register::<Renderer>(Version::new(2, 0, 0), Some(Version::new(1, 0, 0)))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidVersionRange { .. }));
    }
}
