//! GelfMessage — the GELF 1.1 envelope and its wire-JSON encoding.

use serde::{Serialize, Serializer};

/// Syslog-ordered severity. Lower values are more urgent; the adapter only
/// ever produces `Error` and `Informational`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GelfLevel {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Informational = 6,
    Debug = 7,
}

impl Serialize for GelfLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// One GELF protocol message.
///
/// `raw_extra` holds the pre-encoded side-channel field object; the wire
/// encoder splices it into the envelope rather than re-serializing a live
/// structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GelfMessage {
    pub version: &'static str,
    /// Origin host. Omitted from the wire JSON when empty (identity
    /// resolution can legitimately come up empty-handed).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host: String,
    pub short_message: String,
    /// Fractional Unix seconds, millisecond precision.
    #[serde(rename = "timestamp")]
    pub time_unix: f64,
    pub level: GelfLevel,
    /// Serialized JSON object of `_`-prefixed extra fields.
    #[serde(skip)]
    pub raw_extra: Vec<u8>,
}

impl GelfMessage {
    pub const VERSION: &'static str = "1.1";

    /// Final wire JSON: the envelope with the extra-field object spliced
    /// into its top level.
    ///
    /// The blob is merged byte-wise; it is trusted to be a JSON object
    /// because the field extractor built it.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut buf = serde_json::to_vec(self)?;
        // raw_extra is `{…}`; an empty object contributes nothing.
        if self.raw_extra.len() > 2 {
            let members = &self.raw_extra[1..self.raw_extra.len() - 1];
            buf.pop();
            buf.push(b',');
            buf.extend_from_slice(members);
            buf.push(b'}');
        }
        Ok(buf)
    }
}
