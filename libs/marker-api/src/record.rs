use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════
//  Marker Record
// ════════════════════════════════════════════════════════════════

/// Static metadata attached to every marker emitted by one process.
///
/// Serialized as the `properties` object of a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerContext {
    /// Platform tag reported to the collector (e.g. "roblox").
    pub sdk_platform: String,
    /// Place (application) id.
    pub place_id: i64,
    /// Place (application) version.
    pub place_version: i64,
    /// Origin tag, "sdk" for markers produced by this library.
    pub origin: String,
}

impl Default for MarkerContext {
    fn default() -> Self {
        Self {
            sdk_platform: "roblox".into(),
            place_id: 1,
            place_version: 1,
            origin: "sdk".into(),
        }
    }
}

/// One emitted telemetry event.
///
/// Built by the marker factory, owned by the event buffer until drained,
/// dropped once its batch has been handed to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    /// Random 128-bit id, lowercase hex without dashes.
    #[serde(rename = "markerId")]
    pub id: String,
    /// Creation time, Unix ms (UTC).
    pub timestamp: i64,
    /// Event type, never empty.
    #[serde(rename = "type")]
    pub name: String,
    /// Id of the emitting process / server instance.
    #[serde(rename = "serverId")]
    pub source_id: String,
    /// Structured payload: object, array or null.
    pub value: serde_json::Value,
    #[serde(rename = "properties")]
    pub context: MarkerContext,
}

/// Wire envelope: one outbound call carries exactly one envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkersEnvelope {
    pub markers: Vec<MarkerRecord>,
}

impl MarkersEnvelope {
    pub fn new(markers: Vec<MarkerRecord>) -> Self {
        Self { markers }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Encode as the JSON body of the outbound request.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
