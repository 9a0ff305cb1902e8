//! UDP writer — one datagram per message, no chunking or compression.

use std::pin::Pin;

use tokio::net::UdpSocket;
use tracing::debug;

use router::error::AdapterError;

use crate::message::GelfMessage;
use crate::writer::MessageWriter;

#[derive(Debug)]
pub struct UdpWriter {
    socket: UdpSocket,
}

impl UdpWriter {
    /// Bind an ephemeral local socket and connect it to `address`
    /// (host:port).
    ///
    /// Resolution and connect failures are construction-time errors; an
    /// adapter is never built around a writer that could not be dialed.
    pub async fn connect(address: &str) -> Result<Self, AdapterError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket
            .connect(address)
            .await
            .map_err(|e| AdapterError::InvalidAddress(format!("{}: {}", address, e)))?;
        debug!("udp writer connected to {}", address);
        Ok(Self { socket })
    }
}

impl MessageWriter for UdpWriter {
    fn write_message<'a>(
        &'a self,
        msg: &'a GelfMessage,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), AdapterError>> + Send + 'a>> {
        Box::pin(async move {
            let buf = msg.encode()?;
            self.socket.send(&buf).await?;
            Ok(())
        })
    }
}
