//! Plugin instances and default-construction adapters

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::discovery::contract::{Capability, Contract};
use crate::discovery::traits::{
    CandidateType, ContractId, InstantiationError, Instantiator, ModuleId,
};

/// A live object activated for one contract
///
/// Cloning shares the underlying object; every contract match produces its
/// own instance through a separate constructor call.
#[derive(Clone)]
pub struct PluginInstance {
    contract: ContractId,
    module: ModuleId,
    type_name: String,
    object: Arc<dyn Any + Send + Sync>,
}

impl PluginInstance {
    pub fn new<T: Any + Send + Sync>(
        contract: ContractId,
        module: ModuleId,
        type_name: impl Into<String>,
        object: T,
    ) -> Self {
        Self {
            contract,
            module,
            type_name: type_name.into(),
            object: Arc::new(object),
        }
    }

    /// Contract this instance was created for
    pub fn contract(&self) -> &ContractId {
        &self.contract
    }

    /// Module the instance's type came from
    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }

    /// Typed handle for a capability
    pub fn handle<C: Capability>(&self) -> Option<&C::Handle> {
        self.downcast_ref::<C::Handle>()
    }

    /// Whether both values share the same underlying object
    pub fn same_object(&self, other: &PluginInstance) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("contract", &self.contract)
            .field("module", &self.module)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

type Constructor =
    Box<dyn Fn() -> Result<Arc<dyn Any + Send + Sync>, String> + Send + Sync + 'static>;

/// Instantiator backed by in-process constructors
///
/// Constructors are keyed by contract id and type name. A matched type with
/// no registered constructor has no parameterless constructor and fails to
/// activate.
#[derive(Default)]
pub struct FactoryInstantiator {
    constructors: HashMap<(ContractId, String), Constructor>,
}

impl FactoryInstantiator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the constructor for `type_name` under capability `C`
    pub fn register<C, F>(&mut self, type_name: impl Into<String>, constructor: F) -> &mut Self
    where
        C: Capability,
        F: Fn() -> C::Handle + Send + Sync + 'static,
    {
        self.register_fallible::<C, _>(type_name, move || Ok(constructor()))
    }

    /// Register a constructor that may fail
    pub fn register_fallible<C, F>(
        &mut self,
        type_name: impl Into<String>,
        constructor: F,
    ) -> &mut Self
    where
        C: Capability,
        F: Fn() -> Result<C::Handle, String> + Send + Sync + 'static,
    {
        let boxed: Constructor = Box::new(move || {
            constructor().map(|handle| Arc::new(handle) as Arc<dyn Any + Send + Sync>)
        });
        self.constructors
            .insert((C::contract_id(), type_name.into()), boxed);
        self
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for FactoryInstantiator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryInstantiator")
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

impl Instantiator for FactoryInstantiator {
    fn create_default_instance(
        &self,
        ty: &CandidateType,
        contract: &Contract,
    ) -> Result<PluginInstance, InstantiationError> {
        let key = (contract.id().clone(), ty.name.clone());
        let constructor =
            self.constructors
                .get(&key)
                .ok_or_else(|| InstantiationError::NoConstructor {
                    type_name: ty.name.clone(),
                    contract: contract.id().clone(),
                })?;

        let object = constructor().map_err(|reason| InstantiationError::ConstructorFailed {
            type_name: ty.name.clone(),
            reason,
        })?;

        debug!("Constructed {} for {}", ty.name, contract.id());
        Ok(PluginInstance {
            contract: contract.id().clone(),
            module: ty.module.clone(),
            type_name: ty.name.clone(),
            object,
        })
    }
}

/// Instantiator that wraps the type descriptor itself
///
/// Used for dry-run listing where no in-process constructors exist. The
/// instance downcasts to `CandidateType`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescriptorInstantiator;

impl Instantiator for DescriptorInstantiator {
    fn create_default_instance(
        &self,
        ty: &CandidateType,
        contract: &Contract,
    ) -> Result<PluginInstance, InstantiationError> {
        Ok(PluginInstance::new(
            contract.id().clone(),
            ty.module.clone(),
            ty.name.clone(),
            ty.clone(),
        ))
    }
}
