//! Message — one unit of container log output plus its source metadata.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Cluster node that scheduled the container, present when the runtime
/// runs against a swarm.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SwarmNode {
    pub name: String,
}

/// Container metadata the routing runtime attaches to every log record.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContainerInfo {
    pub id: String,
    /// As reported by the runtime; may carry a leading `/`.
    pub name: String,
    /// Image hash the container was created from.
    pub image_id: String,
    /// Image reference name ("nginx:1.24").
    pub image_name: String,
    pub command: Vec<String>,
    pub created: DateTime<Utc>,
    pub labels: HashMap<String, String>,
    pub node: Option<SwarmNode>,
}

impl ContainerInfo {
    /// Label value, or `None` when the label is not set.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// One log record emitted by a monitored container.
///
/// Read-only to adapters; the routing runtime owns discovery and delivery
/// of these records.
#[derive(Debug, Clone)]
pub struct Message {
    /// Origin stream designation ("stdout" or "stderr").
    pub source: String,
    /// Raw payload text, one line.
    pub data: String,
    /// Emission timestamp.
    pub time: DateTime<Utc>,
    pub container: ContainerInfo,
}
