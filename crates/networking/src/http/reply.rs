//! Decoding of the backend's `{success, message, data}` envelope

use super::transport::ApiResponse;
use boxtrack_core::{Error, FieldErrors, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::error;

/// A domain reply with the HTTP status kept as data
#[derive(Debug, Clone)]
pub struct Reply<T> {
    pub status: u16,
    /// 2xx and not flagged `success: false`
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    /// Per-field messages of a rejected reply
    pub field_errors: FieldErrors,
}

impl<T: DeserializeOwned> Reply<T> {
    pub fn decode(response: ApiResponse) -> Result<Self> {
        let ApiResponse { status, mut body } = response;

        let flagged_failure = body.get("success").and_then(Value::as_bool) == Some(false);
        let success = (200..300).contains(&status) && !flagged_failure;
        let message = rejection_message(&body);
        let raw_data = body.get_mut("data").map(Value::take).unwrap_or(Value::Null);

        if !success {
            return Ok(Self {
                status,
                success,
                message,
                data: None,
                field_errors: FieldErrors::from_value(&raw_data),
            });
        }

        let data = if raw_data.is_null() {
            None
        } else {
            let decoded = serde_json::from_value(raw_data).map_err(|e| {
                error!("Failed to parse reply data (status {}): {}", status, e);
                Error::InvalidData(e.to_string())
            })?;
            Some(decoded)
        };

        Ok(Self {
            status,
            success,
            message,
            data,
            field_errors: FieldErrors::new(),
        })
    }
}

impl<T> Reply<T> {
    /// `DomainRejection` for a rejected reply, the data otherwise
    pub fn into_result(self) -> Result<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            Err(Error::DomainRejection {
                status: self.status,
                message: self.message,
                field_errors: self.field_errors,
            })
        }
    }

    /// Like [`Reply::into_result`], but a missing `data` is an error
    pub fn require_data(self) -> Result<T> {
        let status = self.status;
        self.into_result()?
            .ok_or_else(|| Error::InvalidData(format!("Reply (status {}) carried no data", status)))
    }
}

/// Human-readable message of a body: `message`, else `detail`, else empty
pub fn rejection_message(body: &Value) -> String {
    ["message", "detail"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .unwrap_or_default()
        .to_string()
}
