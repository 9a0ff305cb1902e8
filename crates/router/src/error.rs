//! AdapterError — construction and delivery failures surfaced by adapters.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("no adapter registered under: {0}")]
    UnknownAdapter(String),
    #[error("unable to find adapter transport: {0}")]
    MissingTransport(String),
    #[error("invalid target address: {0}")]
    InvalidAddress(String),
    #[error("message serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("send failed: {0}")]
    Io(#[from] std::io::Error),
}
