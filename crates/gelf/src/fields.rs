//! Extra-field extraction — the structured side channel attached to every
//! outgoing message.

use serde_json::{json, Map};

use router::message::Message;

use crate::identity::{os_hostname, ProcessIdentity};

/// Container label carrying the logical stack/service name.
const STACK_SERVICE_LABEL: &str = "io.rancher.stack_service.name";
/// Labels with this prefix (matched case-insensitively) pass through as
/// extra fields.
const PASSTHROUGH_PREFIX: &str = "gelf_";

/// Build the serialized extra-field object for one record.
///
/// The key set is fixed apart from label pass-through; later inserts
/// overwrite earlier ones. `_logspout_instance` is looked up fresh on
/// every call rather than cached.
pub fn extra_fields(
    msg: &Message,
    identity: &ProcessIdentity,
) -> Result<Vec<u8>, serde_json::Error> {
    let container = &msg.container;
    let logspout_instance = os_hostname().unwrap_or_default();

    let mut extra = Map::new();
    extra.insert("_container_id".to_string(), json!(container.id));
    extra.insert(
        "_container_name".to_string(),
        json!(container.name.strip_prefix('/').unwrap_or(&container.name)),
    );
    extra.insert("_image_id".to_string(), json!(container.image_id));
    extra.insert("_image_name".to_string(), json!(container.image_name));
    extra.insert("_command".to_string(), json!(container.command.join(" ")));
    extra.insert("_created".to_string(), json!(container.created));
    extra.insert(
        "_rancher_stack_service".to_string(),
        json!(container.label(STACK_SERVICE_LABEL).unwrap_or_default()),
    );
    extra.insert("_rancher_host".to_string(), json!(identity.hostname()));
    extra.insert("_logspout_instance".to_string(), json!(logspout_instance));
    extra.insert("_logspout_source".to_string(), json!(msg.source));

    for (name, value) in &container.labels {
        // The prefix match is on five characters but the strip is four:
        // the emitted key keeps the underscore, `gelf_foo` → `_foo`.
        let matches_prefix = name.len() > PASSTHROUGH_PREFIX.len()
            && name
                .get(..PASSTHROUGH_PREFIX.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(PASSTHROUGH_PREFIX));
        if matches_prefix {
            if let Some(key) = name.get(PASSTHROUGH_PREFIX.len() - 1..) {
                extra.insert(key.to_string(), json!(value));
            }
        }
    }

    if let Some(node) = &container.node {
        extra.insert("_swarm_node".to_string(), json!(node.name));
    }

    serde_json::to_vec(&extra)
}
