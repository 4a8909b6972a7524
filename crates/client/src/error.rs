use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use view::StateShapeError;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response: connection refused, timeout,
    /// broken body.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The solver answered with an `error` field.
    #[error("server error: {message}")]
    Server { message: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("state does not fit the environment: {0}")]
    InvalidState(#[from] StateShapeError),
}

impl ClientError {
    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        ClientError::Server {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

/// Decode a solver response body.
///
/// A body carrying an `error` key is a server-reported failure whatever the
/// status code; the init route answers 500 together with such a body.
///
/// # Errors
///
/// [`ClientError::Server`] for error bodies, [`ClientError::Status`] for other
/// non-2xx answers and [`ClientError::Decode`] when the payload does not match
/// `T`.
pub fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ClientError> {
    let success = (200..300).contains(&status);
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !success => return Err(ClientError::Status(status)),
        Err(err) => return Err(ClientError::Decode(err)),
    };

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = match error {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        return Err(ClientError::Server { message });
    }
    if !success {
        return Err(ClientError::Status(status));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{ResetResponse, StepResponse};

    #[test]
    fn error_body_wins_over_status() {
        let err = decode::<StepResponse>(500, r#"{"error": "bad env", "trace": "..."}"#)
            .unwrap_err();
        assert!(matches!(err, ClientError::Server { ref message } if message == "bad env"));

        let err = decode::<StepResponse>(200, r#"{"error": "Environment not initialized"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "server error: Environment not initialized");
    }

    #[test]
    fn non_json_failure_reports_the_status() {
        let err = decode::<ResetResponse>(502, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ClientError::Status(502)));
        assert!(!err.is_transport());
    }

    #[test]
    fn missing_fields_are_decode_errors() {
        let err = decode::<StepResponse>(200, r#"{"state": [0, 1]}"#).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
