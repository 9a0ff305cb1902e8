//! GELF adapter — maps container log records onto GELF messages and
//! streams them to a writer.

use std::pin::Pin;
use std::sync::Arc;

use tokio_stream::StreamExt;
use tracing::warn;

use router::error::AdapterError;
use router::message::Message;
use router::registry::{AdapterFactory, LogAdapter, LogStream, Registries, TransportRegistry};
use router::route::Route;

use crate::fields;
use crate::identity::ProcessIdentity;
use crate::message::{GelfLevel, GelfMessage};
use crate::udp::UdpWriter;
use crate::writer::MessageWriter;

/// Name this adapter registers under.
pub const ADAPTER_NAME: &str = "gelf";
/// Transport required when the route does not name one.
const DEFAULT_TRANSPORT: &str = "udp";
/// Container label naming the container's logical host.
const CONTAINER_NAME_LABEL: &str = "io.rancher.container.name";

/// Register the GELF adapter factory with a hosting runtime's registries.
///
/// `identity` must already be resolved; every adapter built from this
/// factory reads it without ever writing it.
pub fn register(registries: &Registries, identity: Arc<ProcessIdentity>) {
    registries.adapters.register(
        ADAPTER_NAME,
        Arc::new(GelfFactory {
            transports: Arc::clone(&registries.transports),
            identity,
        }),
    );
}

/// Builds `GelfAdapter` instances for routes targeting `"gelf"`.
pub struct GelfFactory {
    transports: Arc<TransportRegistry>,
    identity: Arc<ProcessIdentity>,
}

impl AdapterFactory for GelfFactory {
    fn new_adapter<'a>(
        &'a self,
        route: &'a Route,
    ) -> Pin<
        Box<
            dyn std::future::Future<Output = Result<Box<dyn LogAdapter>, AdapterError>>
                + Send
                + 'a,
        >,
    > {
        Box::pin(async move {
            let adapter =
                GelfAdapter::new(route, &self.transports, Arc::clone(&self.identity)).await?;
            Ok(Box::new(adapter) as Box<dyn LogAdapter>)
        })
    }
}

/// One adapter instance: owns its writer, consumes one record stream to
/// completion.
pub struct GelfAdapter {
    writer: Box<dyn MessageWriter>,
    identity: Arc<ProcessIdentity>,
}

impl std::fmt::Debug for GelfAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GelfAdapter")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl GelfAdapter {
    /// Build an adapter for `route`.
    ///
    /// The route's transport (default "udp") must be registered and the
    /// target address dialable; both are construction-time errors and no
    /// partial adapter is returned.
    pub async fn new(
        route: &Route,
        transports: &TransportRegistry,
        identity: Arc<ProcessIdentity>,
    ) -> Result<Self, AdapterError> {
        let transport = route.adapter_transport(DEFAULT_TRANSPORT);
        if !transports.lookup(transport) {
            return Err(AdapterError::MissingTransport(transport.to_string()));
        }

        let writer = UdpWriter::connect(&route.address).await?;
        Ok(Self::with_writer(Box::new(writer), identity))
    }

    /// Adapter over an arbitrary writer; the seam hosting runtimes and
    /// tests use to swap the delivery capability.
    pub fn with_writer(writer: Box<dyn MessageWriter>, identity: Arc<ProcessIdentity>) -> Self {
        Self { writer, identity }
    }

    /// Map one record to its protocol message.
    ///
    /// Never fails on its own; the only error source is extra-field
    /// serialization, surfaced unchanged.
    fn map(&self, message: &Message) -> Result<GelfMessage, serde_json::Error> {
        let level = if message.source == "stderr" {
            GelfLevel::Error
        } else {
            GelfLevel::Informational
        };

        let raw_extra = fields::extra_fields(message, &self.identity)?;

        let host = message
            .container
            .label(CONTAINER_NAME_LABEL)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.identity.hostname().to_string());

        Ok(GelfMessage {
            version: GelfMessage::VERSION,
            host,
            short_message: message.data.clone(),
            // Millisecond precision on purpose; sub-millisecond digits are
            // truncated before the division.
            time_unix: message.time.timestamp_millis() as f64 / 1000.0,
            level,
            raw_extra,
        })
    }
}

impl LogAdapter for GelfAdapter {
    /// Consume `logstream` to completion, one send per record, in arrival
    /// order.
    ///
    /// A failing record is logged and dropped; the stream itself is never
    /// aborted. The loop ends only when the producer closes the stream.
    fn stream(
        self: Box<Self>,
        mut logstream: LogStream,
    ) -> Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        Box::pin(async move {
            while let Some(record) = logstream.next().await {
                let msg = match self.map(&record) {
                    Ok(msg) => msg,
                    Err(e) => {
                        warn!("Graylog: dropping record from {}: {}", record.container.id, e);
                        continue;
                    }
                };

                if let Err(e) = self.writer.write_message(&msg).await {
                    warn!("Graylog: send failed for {}: {}", record.container.id, e);
                    continue;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{TimeZone, Utc};
    use tokio::sync::Mutex;

    use router::message::ContainerInfo;

    // ── Test doubles ─────────────────────────────────────────────

    /// Captures every sent message in memory.
    #[derive(Default)]
    struct FakeWriter {
        sent: Arc<Mutex<Vec<GelfMessage>>>,
    }

    impl MessageWriter for FakeWriter {
        fn write_message<'a>(
            &'a self,
            msg: &'a GelfMessage,
        ) -> Pin<Box<dyn std::future::Future<Output = Result<(), AdapterError>> + Send + 'a>>
        {
            Box::pin(async move {
                self.sent.lock().await.push(msg.clone());
                Ok(())
            })
        }
    }

    /// Fails the n-th send (0-based), captures the rest.
    struct FlakyWriter {
        sent: Arc<Mutex<Vec<GelfMessage>>>,
        fail_on: usize,
        calls: AtomicUsize,
    }

    impl MessageWriter for FlakyWriter {
        fn write_message<'a>(
            &'a self,
            msg: &'a GelfMessage,
        ) -> Pin<Box<dyn std::future::Future<Output = Result<(), AdapterError>> + Send + 'a>>
        {
            Box::pin(async move {
                let call = self.calls.fetch_add(1, Ordering::SeqCst);
                if call == self.fail_on {
                    return Err(AdapterError::Io(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "datagram refused",
                    )));
                }
                self.sent.lock().await.push(msg.clone());
                Ok(())
            })
        }
    }

    fn sample_message(data: &str) -> Message {
        Message {
            source: "stdout".to_string(),
            data: data.to_string(),
            time: Utc.with_ymd_and_hms(2017, 7, 14, 2, 40, 0).unwrap(),
            container: ContainerInfo {
                id: "abc123".to_string(),
                name: "/web-1".to_string(),
                image_id: "sha256:deadbeef".to_string(),
                image_name: "nginx:1.24".to_string(),
                command: vec!["nginx".to_string()],
                created: Utc.with_ymd_and_hms(2017, 7, 1, 12, 0, 0).unwrap(),
                labels: HashMap::new(),
                node: None,
            },
        }
    }

    fn adapter_with(writer: Box<dyn MessageWriter>, identity: &str) -> GelfAdapter {
        GelfAdapter::with_writer(writer, Arc::new(ProcessIdentity::new(identity)))
    }

    fn capture() -> (Arc<Mutex<Vec<GelfMessage>>>, Box<FakeWriter>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let writer = Box::new(FakeWriter {
            sent: Arc::clone(&sent),
        });
        (sent, writer)
    }

    // ── Mapping ──────────────────────────────────────────────────

    #[test]
    fn map_stderr_to_error_level() {
        let (_, writer) = capture();
        let adapter = adapter_with(writer, "rack-7");
        let mut record = sample_message("boom");
        record.source = "stderr".to_string();
        assert_eq!(adapter.map(&record).unwrap().level, GelfLevel::Error);
    }

    #[test]
    fn map_any_other_source_to_info_level() {
        let (_, writer) = capture();
        let adapter = adapter_with(writer, "rack-7");
        for source in ["stdout", "stdin", "weird"] {
            let mut record = sample_message("ok");
            record.source = source.to_string();
            assert_eq!(
                adapter.map(&record).unwrap().level,
                GelfLevel::Informational,
                "source {:?} must map to info",
                source
            );
        }
    }

    #[test]
    fn map_short_message_is_payload_verbatim() {
        let (_, writer) = capture();
        let adapter = adapter_with(writer, "rack-7");
        let record = sample_message("  raw payload, untouched\t");
        assert_eq!(
            adapter.map(&record).unwrap().short_message,
            "  raw payload, untouched\t"
        );
    }

    #[test]
    fn map_truncates_timestamp_to_milliseconds() {
        let (_, writer) = capture();
        let adapter = adapter_with(writer, "rack-7");
        let mut record = sample_message("tick");
        record.time = Utc.timestamp_opt(1_500_000_000, 123_456_789).unwrap();
        assert_eq!(adapter.map(&record).unwrap().time_unix, 1500000000.123);
    }

    #[test]
    fn map_host_prefers_container_name_label() {
        let (_, writer) = capture();
        let adapter = adapter_with(writer, "rack-7");
        let mut record = sample_message("hello");
        record.container.labels.insert(
            "io.rancher.container.name".to_string(),
            "web-1".to_string(),
        );
        assert_eq!(adapter.map(&record).unwrap().host, "web-1");
    }

    #[test]
    fn map_host_falls_back_to_identity() {
        let (_, writer) = capture();
        let adapter = adapter_with(writer, "rack-7");
        let record = sample_message("hello");
        assert_eq!(adapter.map(&record).unwrap().host, "rack-7");
    }

    #[test]
    fn map_empty_label_value_falls_back_to_identity() {
        let (_, writer) = capture();
        let adapter = adapter_with(writer, "rack-7");
        let mut record = sample_message("hello");
        record
            .container
            .labels
            .insert("io.rancher.container.name".to_string(), String::new());
        assert_eq!(adapter.map(&record).unwrap().host, "rack-7");
    }

    #[test]
    fn map_tolerates_empty_identity() {
        let (_, writer) = capture();
        let adapter = adapter_with(writer, "");
        let record = sample_message("hello");
        let msg = adapter.map(&record).unwrap();
        assert_eq!(msg.host, "");
        // and the wire encoding simply omits the host member
        let wire: serde_json::Value = serde_json::from_slice(&msg.encode().unwrap()).unwrap();
        assert!(wire.get("host").is_none());
    }

    #[test]
    fn map_same_record_twice_is_identical() {
        let (_, writer) = capture();
        let adapter = adapter_with(writer, "rack-7");
        let record = sample_message("hello");
        // Both calls resolve _logspout_instance on the same machine, so the
        // two messages must match byte for byte.
        assert_eq!(adapter.map(&record).unwrap(), adapter.map(&record).unwrap());
    }

    // ── Stream consumption ───────────────────────────────────────

    #[tokio::test]
    async fn stream_sends_records_in_arrival_order() {
        crate::boot::init_logging();
        let (sent, writer) = capture();
        let adapter = adapter_with(writer, "rack-7");

        let records = vec![
            sample_message("one"),
            sample_message("two"),
            sample_message("three"),
        ];
        Box::new(adapter)
            .stream(Box::pin(tokio_stream::iter(records)))
            .await;

        let sent = sent.lock().await;
        let shorts: Vec<&str> = sent.iter().map(|m| m.short_message.as_str()).collect();
        assert_eq!(shorts, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn stream_send_failure_does_not_stop_the_stream() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let writer = Box::new(FlakyWriter {
            sent: Arc::clone(&sent),
            fail_on: 1,
            calls: AtomicUsize::new(0),
        });
        let adapter = adapter_with(writer, "rack-7");

        let records = vec![
            sample_message("one"),
            sample_message("two"),
            sample_message("three"),
        ];
        Box::new(adapter)
            .stream(Box::pin(tokio_stream::iter(records)))
            .await;

        let sent = sent.lock().await;
        let shorts: Vec<&str> = sent.iter().map(|m| m.short_message.as_str()).collect();
        assert_eq!(
            shorts,
            ["one", "three"],
            "the failed record is dropped, later records still go out"
        );
    }

    #[tokio::test]
    async fn stream_ends_when_producer_closes() {
        let (sent, writer) = capture();
        let adapter = adapter_with(writer, "rack-7");
        Box::new(adapter)
            .stream(Box::pin(tokio_stream::iter(Vec::<Message>::new())))
            .await;
        assert!(sent.lock().await.is_empty());
    }

    // ── Construction & registration ──────────────────────────────

    fn gelf_route(adapter: &str, address: &str) -> Route {
        Route {
            id: "r0".to_string(),
            adapter: adapter.to_string(),
            address: address.to_string(),
            options: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn new_requires_udp_transport() {
        let transports = TransportRegistry::new();
        let err = GelfAdapter::new(
            &gelf_route("gelf", "127.0.0.1:12201"),
            &transports,
            Arc::new(ProcessIdentity::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AdapterError::MissingTransport(name) if name == "udp"));
    }

    #[tokio::test]
    async fn new_respects_route_transport_suffix() {
        let transports = TransportRegistry::new();
        transports.register("udp");
        let err = GelfAdapter::new(
            &gelf_route("gelf+tcp", "127.0.0.1:12201"),
            &transports,
            Arc::new(ProcessIdentity::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AdapterError::MissingTransport(name) if name == "tcp"));
    }

    #[tokio::test]
    async fn register_makes_factory_reachable_by_route() {
        let registries = Registries::new();
        registries.transports.register("udp");
        register(&registries, Arc::new(ProcessIdentity::new("rack-7")));

        // Real local endpoint so writer construction succeeds
        let receiver = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let address = receiver.local_addr().unwrap().to_string();

        let adapter = registries
            .adapters
            .new_adapter(&gelf_route("gelf", &address))
            .await;
        assert!(adapter.is_ok());
    }

    #[tokio::test]
    async fn register_leaves_other_adapters_unknown() {
        let registries = Registries::new();
        registries.transports.register("udp");
        register(&registries, Arc::new(ProcessIdentity::default()));

        let err = registries
            .adapters
            .new_adapter(&gelf_route("raw", "127.0.0.1:12201"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::UnknownAdapter(name) if name == "raw"));
    }
}
