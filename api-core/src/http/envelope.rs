use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Decoded application-level response: `{status|success, message?, ...payload}`.
///
/// Decoding refuses bodies that carry no success indicator, so a payload is
/// never trusted without one.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    success: bool,
    message: Option<String>,
    payload: Map<String, Value>,
}

impl ResponseEnvelope {
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let Value::Object(mut payload) = value else {
            return Err(ApiError::Decode(
                "expected a JSON object envelope".to_string(),
            ));
        };

        let indicator = payload
            .remove("status")
            .or_else(|| payload.remove("success"))
            .ok_or_else(|| {
                ApiError::Decode("envelope has no status or success indicator".to_string())
            })?;

        let message = match payload.remove("message") {
            Some(Value::String(message)) => Some(message),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        Ok(Self {
            success: is_truthy(&indicator),
            message,
            payload,
        })
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Fails with `Rejected` unless the indicator says success.
    pub fn ensure_success(self) -> Result<Self, ApiError> {
        if self.success {
            Ok(self)
        } else {
            Err(ApiError::Rejected {
                message: self.message,
            })
        }
    }

    /// Extracts and decodes the payload stored under `key`.
    pub fn into_data<T: DeserializeOwned>(self, key: &str) -> Result<T, ApiError> {
        let mut envelope = self.ensure_success()?;
        let value = envelope
            .payload
            .remove(key)
            .ok_or_else(|| ApiError::Decode(format!("response has no `{}` field", key)))?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::Decode(format!("field `{}`: {}", key, e)))
    }

    /// Like [`into_data`](Self::into_data) but tolerates an absent or null
    /// field.
    pub fn optional<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ApiError> {
        match self.payload.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ApiError::Decode(format!("field `{}`: {}", key, e))),
        }
    }

    /// For endpoints whose only payload is the message.
    pub fn into_message(self) -> Result<Option<String>, ApiError> {
        self.ensure_success().map(|envelope| envelope.message)
    }
}

/// Bool-like success indicator: booleans, non-zero numbers, and
/// `true`/`1`/`ok`/`success` strings.
fn is_truthy(indicator: &Value) -> bool {
    match indicator {
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "ok" | "success"
        ),
        _ => false,
    }
}
