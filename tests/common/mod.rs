//! Test utilities for discovery integration tests
//!
//! Builds lookup locations in a temporary directory, populated with module
//! artifacts and their sidecar descriptors.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use plugin_discovery::discovery::loader::{ModuleHeader, ModuleManifest, TypeManifest};
use plugin_discovery::discovery::{TypeKind, Visibility};
use plugin_discovery::discovery::EventManager;
use plugin_discovery::{Capability, Contract, ContractSet, DiscoveryEvent, Version, VersionRange};

pub trait Renderer: Send + Sync {
    fn format(&self) -> &'static str;
}

pub struct RendererCapability;

impl Capability for RendererCapability {
    const ID: &'static str = "IRenderer";
    const ORIGIN: &'static str = "render-api";
    type Handle = Arc<dyn Renderer>;
}

pub trait Exporter: Send + Sync {
    fn target(&self) -> &'static str;
}

pub struct ExporterCapability;

impl Capability for ExporterCapability {
    const ID: &'static str = "IExporter";
    const ORIGIN: &'static str = "export-api";
    type Handle = Arc<dyn Exporter>;
}

pub struct PngRenderer;

impl Renderer for PngRenderer {
    fn format(&self) -> &'static str {
        "png"
    }
}

/// Test fixture owning a temporary plugin tree
pub struct PluginFixture {
    pub temp_dir: TempDir,
    /// Default lookup location
    pub plugins_dir: PathBuf,
}

impl PluginFixture {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let plugins_dir = temp_dir.path().join("plugins");
        std::fs::create_dir_all(&plugins_dir)?;
        Ok(Self {
            temp_dir,
            plugins_dir,
        })
    }

    /// Create (or reuse) another lookup location under the fixture root
    pub fn location(&self, name: &str) -> PathBuf {
        let dir = self.temp_dir.path().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write an artifact plus descriptor into the default location
    pub fn module(&self, file: &str) -> ModuleBuilder {
        ModuleBuilder::new(self.plugins_dir.join(file))
    }

    /// Write an artifact plus a raw descriptor body
    pub fn raw_module(&self, dir: &Path, file: &str, descriptor: &str) -> PathBuf {
        let artifact = dir.join(file);
        std::fs::write(&artifact, b"\0").unwrap();
        std::fs::write(ModuleManifest::descriptor_path(&artifact), descriptor).unwrap();
        artifact
    }
}

/// Fluent descriptor writer
pub struct ModuleBuilder {
    artifact: PathBuf,
    manifest: ModuleManifest,
}

impl ModuleBuilder {
    fn new(artifact: PathBuf) -> Self {
        let name = artifact
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("module")
            .to_string();
        Self {
            artifact,
            manifest: ModuleManifest {
                header: ModuleHeader {
                    name,
                    version: "1.0".to_string(),
                    description: None,
                    dependencies: Default::default(),
                },
                types: Vec::new(),
            },
        }
    }

    pub fn in_dir(mut self, dir: &Path) -> Self {
        let file = self.artifact.file_name().map(|f| f.to_owned());
        if let Some(file) = file {
            self.artifact = dir.join(file);
        }
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.manifest.header.name = name.to_string();
        self
    }

    pub fn depends_on(mut self, module: &str, version: &str) -> Self {
        self.manifest
            .header
            .dependencies
            .insert(module.to_string(), version.to_string());
        self
    }

    pub fn implementing(self, name: &str, interfaces: &[&str]) -> Self {
        self.with_type(name, |ty| {
            ty.implements = interfaces.iter().map(|s| s.to_string()).collect();
        })
    }

    pub fn with_type(mut self, name: &str, configure: impl FnOnce(&mut TypeManifest)) -> Self {
        let mut ty = TypeManifest {
            name: name.to_string(),
            visibility: Visibility::Public,
            kind: TypeKind::Class,
            is_abstract: false,
            extends: Vec::new(),
            implements: Vec::new(),
        };
        configure(&mut ty);
        self.manifest.types.push(ty);
        self
    }

    pub fn write(self) -> PathBuf {
        std::fs::write(&self.artifact, b"\0").unwrap();
        self.manifest.write_for(&self.artifact).unwrap();
        self.artifact
    }
}

pub fn v(raw: &str) -> Version {
    Version::parse(raw).unwrap()
}

pub fn renderer_contracts(min: &str, max: Option<&str>) -> ContractSet {
    ContractSet::builder()
        .register_contract(Contract::new(
            RendererCapability::ID,
            RendererCapability::ORIGIN,
            VersionRange::new(v(min), max.map(v)).unwrap(),
        ))
        .unwrap()
        .build()
}

/// Collects every published event
pub fn record_events(events: &mut EventManager) -> Arc<Mutex<Vec<DiscoveryEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    events.on_event(move |event| sink.lock().unwrap().push(event.clone()));
    seen
}
