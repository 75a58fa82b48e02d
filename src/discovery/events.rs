//! Discovery event notification
//!
//! Observers either register a synchronous callback or subscribe to an
//! unbounded channel. Events are published in discovery order before the
//! discovery call returns; with no observers publishing is a no-op.

use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::debug;

use crate::discovery::instance::PluginInstance;
use crate::discovery::traits::{ContractId, ModuleId};
use crate::discovery::version::Version;

/// Event emitted while scanning
#[derive(Debug, Clone)]
pub enum DiscoveryEvent {
    /// A compatible type was instantiated for a contract
    PluginFound {
        contract: ContractId,
        module: ModuleId,
        instance: PluginInstance,
    },
    /// A module's declared dependency falls outside a contract's range
    ///
    /// `declared` is `None` when the module does not reference the
    /// contract's origin module at all.
    PluginIncompatibleVersion {
        module: ModuleId,
        contract: ContractId,
        declared: Option<Version>,
        min: Version,
        max: Option<Version>,
    },
}

impl DiscoveryEvent {
    pub fn contract(&self) -> &ContractId {
        match self {
            Self::PluginFound { contract, .. } => contract,
            Self::PluginIncompatibleVersion { contract, .. } => contract,
        }
    }

    pub fn module(&self) -> &ModuleId {
        match self {
            Self::PluginFound { module, .. } => module,
            Self::PluginIncompatibleVersion { module, .. } => module,
        }
    }
}

type Callback = Box<dyn Fn(&DiscoveryEvent) + Send + Sync + 'static>;

/// Event fan-out to callbacks and channel subscribers
#[derive(Default)]
pub struct EventManager {
    callbacks: Vec<Callback>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<DiscoveryEvent>>>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked synchronously for every event
    pub fn on_event<F>(&mut self, callback: F)
    where
        F: Fn(&DiscoveryEvent) + Send + Sync + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Subscribe to an event stream
    ///
    /// Dropping the receiver unsubscribes; the sender is pruned on the next
    /// subscribe or publish.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<DiscoveryEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscribers = self
            .subscribers
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.push(tx);
        rx
    }

    pub fn has_observers(&self) -> bool {
        !self.callbacks.is_empty() || self.subscribers().iter().any(|tx| !tx.is_closed())
    }

    /// Deliver an event to every observer
    pub fn publish(&self, event: DiscoveryEvent) {
        for callback in &self.callbacks {
            callback(&event);
        }
        self.subscribers().retain(|tx| {
            let delivered = tx.send(event.clone()).is_ok();
            if !delivered {
                debug!("Pruning closed event subscriber");
            }
            delivered
        });
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<DiscoveryEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("callbacks", &self.callbacks.len())
            .field("subscribers", &self.subscribers().len())
            .finish()
    }
}
