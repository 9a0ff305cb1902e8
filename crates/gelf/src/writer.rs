//! MessageWriter — the opaque send-one-message capability the adapter
//! writes to.
//!
//! Chunking, compression, and wire framing are the implementation's
//! concern; callers only see success or failure per message.

use std::pin::Pin;

use router::error::AdapterError;

use crate::message::GelfMessage;

/// Sends one message to the delivery endpoint.
///
/// Object-safe thanks to the `Pin<Box<…>>` future return, so an adapter
/// can own `Box<dyn MessageWriter>` regardless of the transport behind it.
pub trait MessageWriter: Send + Sync {
    fn write_message<'a>(
        &'a self,
        msg: &'a GelfMessage,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), AdapterError>> + Send + 'a>>;
}
