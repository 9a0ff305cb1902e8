//! Registries — how a hosting runtime discovers the adapters and
//! transports compiled into the process.
//!
//! Adapter crates call `AdapterRegistry::register` at startup; the runtime
//! resolves a factory per route and hands the built adapter its record
//! stream. Registries are shared read-mostly maps, never mutated after
//! boot registration in practice.

use std::pin::Pin;
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use tokio_stream::Stream;
use tracing::debug;

use crate::error::AdapterError;
use crate::message::Message;
use crate::route::Route;

/// A log stream handed to an adapter: sequential, unbounded, closed only
/// by its producer.
pub type LogStream = Pin<Box<dyn Stream<Item = Message> + Send>>;

/// One adapter instance bound to a route.
///
/// Object-safe thanks to the `Pin<Box<…>>` future return. `stream`
/// consumes the adapter: each instance drives exactly one stream to
/// completion and owns its writer for that whole lifetime.
pub trait LogAdapter: Send + std::fmt::Debug {
    fn stream(
        self: Box<Self>,
        logstream: LogStream,
    ) -> Pin<Box<dyn std::future::Future<Output = ()> + Send>>;
}

/// Builds adapter instances for routes that name this adapter.
pub trait AdapterFactory: Send + Sync {
    fn new_adapter<'a>(
        &'a self,
        route: &'a Route,
    ) -> Pin<
        Box<
            dyn std::future::Future<Output = Result<Box<dyn LogAdapter>, AdapterError>>
                + Send
                + 'a,
        >,
    >;
}

/// Adapter factories keyed by adapter name.
#[derive(Default)]
pub struct AdapterRegistry {
    factories: DashMap<String, Arc<dyn AdapterFactory>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str, factory: Arc<dyn AdapterFactory>) {
        debug!("registering adapter factory: {}", name);
        self.factories.insert(name.to_string(), factory);
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn AdapterFactory>> {
        self.factories.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Build an adapter for `route`, resolving the factory from the
    /// route's adapter type.
    pub async fn new_adapter(&self, route: &Route) -> Result<Box<dyn LogAdapter>, AdapterError> {
        let name = route.adapter_type();
        let factory = self
            .lookup(name)
            .ok_or_else(|| AdapterError::UnknownAdapter(name.to_string()))?;
        factory.new_adapter(route).await
    }
}

/// Transports the runtime has made available to adapters.
///
/// Adapters that manage their own connection (GELF over UDP does) only
/// check availability here; the runtime dials registered transports for
/// raw-stream adapters elsewhere.
#[derive(Default)]
pub struct TransportRegistry {
    names: DashSet<String>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str) {
        debug!("registering adapter transport: {}", name);
        self.names.insert(name.to_string());
    }

    pub fn lookup(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// The registration surface a hosting runtime exposes to adapter crates
/// at startup.
#[derive(Default)]
pub struct Registries {
    pub adapters: AdapterRegistry,
    pub transports: Arc<TransportRegistry>,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }
}
