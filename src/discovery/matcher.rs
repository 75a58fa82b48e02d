//! Type matching against registered contracts
//!
//! The subtype and interface relations themselves come from the loader; the
//! matcher only walks the registry and collects every contract a type
//! satisfies.

use tracing::trace;

use crate::discovery::contract::Contract;
use crate::discovery::registry::ContractRegistry;
use crate::discovery::traits::{CandidateType, ModuleLoader};

/// Collects the contracts a candidate type satisfies
pub struct TypeMatcher<'a> {
    loader: &'a dyn ModuleLoader,
}

impl<'a> TypeMatcher<'a> {
    pub fn new(loader: &'a dyn ModuleLoader) -> Self {
        Self { loader }
    }

    /// Whether `ty` satisfies `contract` by subtype or interface relation
    pub fn satisfies(&self, ty: &CandidateType, contract: &Contract) -> bool {
        self.loader.is_subtype_of(ty, contract.id()) || self.loader.implements(ty, contract.id())
    }

    /// Every registered contract `ty` satisfies, in registration order
    pub fn matches<'r>(
        &self,
        ty: &CandidateType,
        registry: &'r ContractRegistry,
    ) -> Vec<&'r Contract> {
        let matched: Vec<&Contract> = registry
            .contracts()
            .filter(|contract| self.satisfies(ty, contract))
            .collect();

        trace!(
            "Type {}::{} matched {} contract(s)",
            ty.module,
            ty.name,
            matched.len()
        );
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::traits::{
        ContractId, LoadError, LoadedModule, ModuleId, PartialEnumeration, TypeKind, Visibility,
    };
    use crate::discovery::version::{Version, VersionRange};
    use std::path::Path;

    struct DescriptorOnly;

    impl ModuleLoader for DescriptorOnly {
        fn is_candidate(&self, _path: &Path) -> bool {
            false
        }

        fn load(&self, path: &Path) -> Result<LoadedModule, LoadError> {
            Err(LoadError::MissingDescriptor(path.to_path_buf()))
        }

        fn enumerate_types(
            &self,
            _module: &LoadedModule,
        ) -> Result<Vec<CandidateType>, PartialEnumeration> {
            Ok(Vec::new())
        }

        fn actual_version(&self, _module: &ModuleId) -> Option<Version> {
            None
        }
    }

    fn registry(ids: &[&str]) -> ContractRegistry {
        let mut registry = ContractRegistry::new();
        for id in ids {
            registry
                .register(Contract::new(
                    *id,
                    "api",
                    VersionRange::at_least(Version::new(1, 0, 0)),
                ))
                .unwrap();
        }
        registry
    }

    fn ty(base_types: &[&str], interfaces: &[&str]) -> CandidateType {
        CandidateType {
            name: "Widget".to_string(),
            module: ModuleId::new("widgets"),
            visibility: Visibility::Public,
            kind: TypeKind::Class,
            is_abstract: false,
            base_types: base_types.iter().map(|s| ContractId::new(*s)).collect(),
            interfaces: interfaces.iter().map(|s| ContractId::new(*s)).collect(),
        }
    }

    #[test]
    fn test_matches_by_base_type() {
        let registry = registry(&["Renderer", "IExporter"]);
        let matcher = TypeMatcher::new(&DescriptorOnly);
        let matched = matcher.matches(&ty(&["Renderer"], &[]), &registry);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id().as_str(), "Renderer");
    }

    #[test]
    fn test_matches_every_satisfied_contract() {
        let registry = registry(&["IRenderer", "IExporter", "IUnrelated"]);
        let matcher = TypeMatcher::new(&DescriptorOnly);
        let matched = matcher.matches(&ty(&[], &["IExporter", "IRenderer"]), &registry);
        let ids: Vec<&str> = matched.iter().map(|c| c.id().as_str()).collect();
        // Registration order, not declaration order
        assert_eq!(ids, vec!["IRenderer", "IExporter"]);
    }

    #[test]
    fn test_no_match() {
        let registry = registry(&["IRenderer"]);
        let matcher = TypeMatcher::new(&DescriptorOnly);
        assert!(matcher.matches(&ty(&["Object"], &["IDisposable"]), &registry).is_empty());
    }
}
