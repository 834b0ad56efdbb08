use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Field used to wrap continuation tokens that are not valid JSON.
pub const RAW_CURSOR_FIELD: &str = "key";

/// An opaque continuation token as issued by the backend (a DynamoDB-style `lastEvaluatedKey`).
///
/// Cursors travel through the URL in string form. [`Cursor::to_token`] produces that form
/// canonically, and [`Cursor::from_token`] reads it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(Value);

impl Cursor {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Reads a cursor back from its URL form.
    /// A token that is not valid JSON is wrapped as `{"key": "<token>"}`.
    pub fn from_token(token: &str) -> Self {
        match serde_json::from_str(token) {
            Ok(value) => Self(value),
            Err(_) => {
                debug!(token, "cursor token is not JSON, wrapping raw value");
                let mut wrapped = Map::new();
                wrapped.insert(RAW_CURSOR_FIELD.to_string(), Value::String(token.to_string()));
                Self(Value::Object(wrapped))
            }
        }
    }

    /// A cursor signals another page only when it is a non-empty string or a non-empty object.
    pub fn is_present(&self) -> bool {
        match &self.0 {
            Value::String(s) => !s.is_empty(),
            Value::Object(map) => !map.is_empty(),
            _ => false,
        }
    }

    /// The canonical string form stored in the URL and in the cursor history.
    ///
    /// A string holding JSON is re-serialized so equal keys always produce equal tokens;
    /// any other string is kept verbatim.
    pub fn to_token(&self) -> String {
        match &self.0 {
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(parsed) => parsed.to_string(),
                Err(_) => s.clone(),
            },
            other => other.to_string(),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Cursor {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Self(Value::String(s.to_string()))
    }
}
