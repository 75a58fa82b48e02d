//! Contract registry and the read-only query interface
//!
//! Each contract owns one record (range plus discovered instances), stored in
//! an arena indexed by contract id. Records persist across discovery runs;
//! instance sequences are cleared at the start of every run.

use std::collections::HashMap;

use crate::discovery::contract::{Capability, Contract, ContractSet};
use crate::discovery::instance::PluginInstance;
use crate::discovery::traits::{ContractId, DiscoveryError};
use crate::discovery::version::VersionRange;

#[derive(Debug, Clone)]
struct ContractRecord {
    contract: Contract,
    instances: Vec<PluginInstance>,
}

/// Registry of contracts and the instances discovered for them
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    records: Vec<ContractRecord>,
    index: HashMap<ContractId, usize>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a registry with every contract of a set (empty instance lists)
    pub fn from_set(contracts: &ContractSet) -> Self {
        let mut registry = Self::new();
        for contract in contracts {
            registry.insert(contract.clone());
        }
        registry
    }

    /// Add a contract with an empty instance sequence
    pub fn register(&mut self, contract: Contract) -> Result<(), DiscoveryError> {
        if self.index.contains_key(contract.id()) {
            return Err(DiscoveryError::DuplicateContract(contract.id().clone()));
        }
        self.insert(contract);
        Ok(())
    }

    /// Append a record for a contract whose id is not yet indexed
    fn insert(&mut self, contract: Contract) {
        self.index.insert(contract.id().clone(), self.records.len());
        self.records.push(ContractRecord {
            contract,
            instances: Vec::new(),
        });
    }

    /// Drop every discovered instance; contracts remain registered
    pub fn clear_instances(&mut self) {
        for record in &mut self.records {
            record.instances.clear();
        }
    }

    /// Append an instance to a contract's sequence
    ///
    /// Returns `false` when the contract is not registered.
    pub fn add_instance(&mut self, id: &ContractId, instance: PluginInstance) -> bool {
        match self.index.get(id) {
            Some(&slot) => {
                self.records[slot].instances.push(instance);
                true
            }
            None => false,
        }
    }

    pub fn lookup(&self, id: &ContractId) -> Option<&VersionRange> {
        self.record(id).map(|record| record.contract.range())
    }

    pub fn contract(&self, id: &ContractId) -> Option<&Contract> {
        self.record(id).map(|record| &record.contract)
    }

    /// Registered contracts in registration order
    pub fn contracts(&self) -> impl Iterator<Item = &Contract> {
        self.records.iter().map(|record| &record.contract)
    }

    pub fn is_registered(&self, id: &ContractId) -> bool {
        self.index.contains_key(id)
    }

    /// Discovered instances for a contract, in discovery order
    pub fn instances_of(&self, id: &ContractId) -> &[PluginInstance] {
        self.record(id)
            .map(|record| record.instances.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of discovered instances across all contracts
    pub fn instance_count(&self) -> usize {
        self.records.iter().map(|record| record.instances.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record(&self, id: &ContractId) -> Option<&ContractRecord> {
        self.index.get(id).map(|&slot| &self.records[slot])
    }

    /// All plugins discovered for a contract
    pub fn plugins(&self, id: &ContractId) -> Plugins<'_, fn(&PluginInstance) -> bool> {
        Plugins {
            instances: self.instances_of(id),
            predicate: accept_all,
        }
    }

    /// Plugins discovered for a contract that satisfy `predicate`
    pub fn plugins_where<P>(&self, id: &ContractId, predicate: P) -> Plugins<'_, P>
    where
        P: Fn(&PluginInstance) -> bool,
    {
        Plugins {
            instances: self.instances_of(id),
            predicate,
        }
    }

    pub fn has_plugins(&self, id: &ContractId) -> bool {
        !self.instances_of(id).is_empty()
    }

    pub fn has_plugins_where<P>(&self, id: &ContractId, predicate: P) -> bool
    where
        P: Fn(&PluginInstance) -> bool,
    {
        self.plugins_where(id, predicate).iter().next().is_some()
    }

    /// Typed handles for a capability, in discovery order
    pub fn plugins_of<C: Capability>(&self) -> impl Iterator<Item = &C::Handle> + Clone + '_ {
        self.instances_of(&C::contract_id())
            .iter()
            .filter_map(PluginInstance::handle::<C>)
    }

    pub fn has_plugins_of<C: Capability>(&self) -> bool {
        self.plugins_of::<C>().next().is_some()
    }
}

fn accept_all(_: &PluginInstance) -> bool {
    true
}

/// Lazy, restartable view over a contract's instances
///
/// Nothing is evaluated until iterated; `iter` can be called repeatedly and
/// always starts from the first instance.
#[derive(Clone, Copy)]
pub struct Plugins<'a, P> {
    instances: &'a [PluginInstance],
    predicate: P,
}

impl<'a, P> Plugins<'a, P>
where
    P: Fn(&PluginInstance) -> bool,
{
    pub fn iter(&self) -> impl Iterator<Item = &'a PluginInstance> + '_ {
        self.instances
            .iter()
            .filter(move |instance| (self.predicate)(*instance))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a, 'p, P> IntoIterator for &'p Plugins<'a, P>
where
    P: Fn(&PluginInstance) -> bool,
{
    type Item = &'a PluginInstance;
    type IntoIter = Box<dyn Iterator<Item = &'a PluginInstance> + 'p>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
