use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// Gateway messages

/// One frame from the controller gateway. A frame carries a full snapshot of
/// the tracked fields, a partial update, or (from a permissive sender) both;
/// the snapshot is applied before the update.
#[derive(Debug, Default, Deserialize)]
pub struct ServerMessage {
    pub snapshot: Option<HashMap<String, Value>>,
    pub update: Option<HashMap<String, Value>>,
}

/// The merged view of the controller's tracked fields.
///
/// A snapshot replaces the whole map; an update overwrites only the keys it
/// names. Fields outside the configured catalog are kept as-is so a firmware
/// revision that reports more than we project does not lose data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteState {
    fields: HashMap<String, Value>,
}

impl RemoteState {
    pub fn apply(&mut self, message: ServerMessage) {
        if let Some(snapshot) = message.snapshot {
            self.fields = snapshot;
        }
        if let Some(update) = message.update {
            self.fields.extend(update);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Numeric field, `None` when absent or not a number.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(Value::as_f64)
    }

    /// Boolean field, `None` when absent or not a boolean.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.fields.get(name).and_then(Value::as_bool)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// Operator commands

/// Body of a write posted to the gateway's write endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct WriteRequest {
    pub name: String,
    pub value: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(raw: &str) -> ServerMessage {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn snapshot_replaces_previous_state_entirely() {
        let mut state = RemoteState::default();
        state.apply(frame(r#"{"snapshot": {"WS_LE1_VAL": 52, "enable_P1_cmd": true}}"#));
        state.apply(frame(r#"{"snapshot": {"WS_PE1_VAL": 2.6}}"#));

        assert_eq!(state.number("WS_PE1_VAL"), Some(2.6));
        // Fields from the old snapshot must not survive the new one.
        assert_eq!(state.get("WS_LE1_VAL"), None);
        assert_eq!(state.get("enable_P1_cmd"), None);
    }

    #[test]
    fn update_overwrites_named_keys_and_nothing_else() {
        let mut state = RemoteState::default();
        state.apply(frame(
            r#"{"snapshot": {"WS_LE1_VAL": 52, "WS_PE1_VAL": 2.6, "enable_P1_cmd": false}}"#,
        ));
        state.apply(frame(r#"{"update": {"WS_LE1_VAL": 48}}"#));

        assert_eq!(state.number("WS_LE1_VAL"), Some(48.0));
        assert_eq!(state.number("WS_PE1_VAL"), Some(2.6));
        assert_eq!(state.flag("enable_P1_cmd"), Some(false));
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn update_on_empty_state_just_inserts() {
        let mut state = RemoteState::default();
        state.apply(frame(r#"{"update": {"WS_PE1_VAL": 3.1}}"#));

        assert_eq!(state.number("WS_PE1_VAL"), Some(3.1));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn frame_with_both_parts_applies_snapshot_first() {
        let mut state = RemoteState::default();
        state.apply(frame(
            r#"{"snapshot": {"WS_LE1_VAL": 10}, "update": {"WS_LE1_VAL": 20}}"#,
        ));

        assert_eq!(state.number("WS_LE1_VAL"), Some(20.0));
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let mut state = RemoteState::default();
        state.apply(frame(r#"{"snapshot": {"WS_FUTURE_SENSOR": 7}}"#));
        state.apply(frame(r#"{"update": {"WS_LE1_VAL": 48}}"#));

        assert_eq!(state.get("WS_FUTURE_SENSOR"), Some(&json!(7)));
    }

    #[test]
    fn typed_accessors_reject_mismatched_values() {
        let mut state = RemoteState::default();
        state.apply(frame(r#"{"snapshot": {"WS_LE1_VAL": true, "enable_P1_cmd": 1}}"#));

        assert_eq!(state.number("WS_LE1_VAL"), None);
        assert_eq!(state.flag("enable_P1_cmd"), None);
    }

    #[test]
    fn write_request_serializes_to_the_wire_shape() {
        let request = WriteRequest {
            name: "enable_P1_cmd".to_string(),
            value: json!(true),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"name": "enable_P1_cmd", "value": true})
        );
    }
}
