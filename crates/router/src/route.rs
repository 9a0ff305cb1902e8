//! Route — one routing-table entry: which adapter handles records and
//! where it should deliver them.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Route {
    pub id: String,
    /// Adapter selector, optionally carrying a transport suffix
    /// ("gelf", "gelf+udp", "gelf+tcp").
    pub adapter: String,
    /// Delivery target, host:port.
    pub address: String,
    /// Free-form per-route options from the runtime's routing config.
    pub options: HashMap<String, String>,
}

impl Route {
    /// Adapter name without any transport suffix.
    pub fn adapter_type(&self) -> &str {
        self.adapter.split('+').next().unwrap_or(&self.adapter)
    }

    /// Transport requested for this route.
    ///
    /// The suffix in the adapter selector wins; `default` applies when the
    /// selector carries none.
    pub fn adapter_transport<'a>(&'a self, default: &'a str) -> &'a str {
        match self.adapter.split_once('+') {
            Some((_, transport)) if !transport.is_empty() => transport,
            _ => default,
        }
    }
}
