//! Client error types
//!
//! Every failure the back-office client can surface is one of these variants.
//! Transport and HTTP status details are folded in by
//! [`crate::infrastructure::http::ApiClient`]; the variants carry only what the
//! caller needs to decide between an inline form error, a notice or a forced
//! logout.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Backend unreachable, timeout or broken connection
    #[error("network error: {0}")]
    Network(String),
    /// Required-field checks (local) or a 400/422 answer from the backend
    #[error("validation failed: {}", messages.join(", "))]
    Validation { messages: Vec<String> },
    /// 403 from the backend
    #[error("permission denied: {message}")]
    PermissionDenied {
        message: String,
        missing: Vec<String>,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    /// 401, or a stored token that is expired or cannot be decoded
    #[error("session expired")]
    SessionExpired,
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
    /// Response body did not match the expected shape
    #[error("decode error: {0}")]
    Decode(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("configuration error: {0}")]
    Config(String),
    /// The resource does not expose this operation
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    /// A workflow action that is not offered to the current identity
    #[error("action unavailable: {0}")]
    ActionUnavailable(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            messages: vec![message.into()],
        }
    }

    /// Forces the caller back to the login step.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    /// Errors that belong next to the form that produced them.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            ApiError::Validation { .. } | ApiError::Conflict(_) | ApiError::PermissionDenied { .. }
        )
    }

    /// Message shown to the operator. Spanish, like the backend's own messages.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "No se pudo conectar con el servidor (verifica que el backend esté corriendo)"
                    .to_string()
            }
            ApiError::Validation { messages } => messages.join(", "),
            ApiError::PermissionDenied { missing, .. } if !missing.is_empty() => format!(
                "Acceso denegado. Te faltan los permisos: {}",
                missing.join(", ")
            ),
            ApiError::PermissionDenied { .. } => {
                "No tienes permisos suficientes para realizar esta acción.".to_string()
            }
            ApiError::NotFound(msg) if !msg.is_empty() => msg.clone(),
            ApiError::NotFound(_) => "El registro solicitado no existe.".to_string(),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::SessionExpired => {
                "La sesión expiró. Inicia sesión nuevamente.".to_string()
            }
            ApiError::Server { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Server { status, .. } => format!("Error {} del servidor", status),
            ApiError::Decode(_) => "Respuesta inesperada del servidor.".to_string(),
            ApiError::Storage(msg) => format!("No se pudo guardar la sesión: {}", msg),
            ApiError::Config(msg) => msg.clone(),
            ApiError::Unsupported(msg) => msg.clone(),
            ApiError::ActionUnavailable(msg) => msg.clone(),
        }
    }
}

/// `message` arrives either as a single string or as a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    pub fn into_messages(self) -> Vec<String> {
        match self {
            ErrorMessage::One(m) => vec![m],
            ErrorMessage::Many(ms) => ms,
        }
    }
}

/// Error envelope returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: Option<ErrorMessage>,
    pub status_code: Option<u16>,
    pub error: Option<String>,
    #[serde(default)]
    pub permisos_faltantes: Vec<String>,
}

impl ErrorBody {
    fn messages(&self) -> Vec<String> {
        match &self.message {
            Some(m) => m.clone().into_messages(),
            None => self.error.iter().cloned().collect(),
        }
    }

    fn joined(&self) -> String {
        self.messages().join(", ")
    }

    /// Classify a non-success response.
    pub fn into_error(self, status: u16) -> ApiError {
        match status {
            400 | 422 => {
                let messages = self.messages();
                ApiError::Validation {
                    messages: if messages.is_empty() {
                        vec!["Datos inválidos".to_string()]
                    } else {
                        messages
                    },
                }
            }
            401 => ApiError::SessionExpired,
            403 => ApiError::PermissionDenied {
                message: self.joined(),
                missing: self.permisos_faltantes,
            },
            404 => ApiError::NotFound(self.joined()),
            409 => ApiError::Conflict(self.joined()),
            _ => ApiError::Server {
                status,
                message: self.joined(),
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: serde_json::Value) -> ErrorBody {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn array_message_becomes_validation_list() {
        let err = body(serde_json::json!({
            "message": ["nombre should not be empty", "codigo must be a string"],
            "statusCode": 400,
            "error": "Bad Request"
        }))
        .into_error(400);

        assert_eq!(
            err,
            ApiError::Validation {
                messages: vec![
                    "nombre should not be empty".to_string(),
                    "codigo must be a string".to_string()
                ]
            }
        );
        assert_eq!(
            err.user_message(),
            "nombre should not be empty, codigo must be a string"
        );
    }

    #[test]
    fn forbidden_carries_missing_permissions() {
        let err = body(serde_json::json!({
            "message": "No tienes permisos para esta acción",
            "permisosFaltantes": ["roles.crear", "roles.editar"]
        }))
        .into_error(403);

        assert_eq!(
            err.user_message(),
            "Acceso denegado. Te faltan los permisos: roles.crear, roles.editar"
        );
    }

    #[test]
    fn forbidden_without_list_uses_generic_message() {
        let err = body(serde_json::json!({ "message": "Forbidden resource" })).into_error(403);
        assert_eq!(
            err.user_message(),
            "No tienes permisos suficientes para realizar esta acción."
        );
    }

    #[test]
    fn status_classification() {
        assert!(ErrorBody::default().into_error(401).is_session_expired());
        assert!(matches!(
            body(serde_json::json!({ "message": "Código duplicado" })).into_error(409),
            ApiError::Conflict(m) if m == "Código duplicado"
        ));
        assert!(matches!(
            ErrorBody::default().into_error(503),
            ApiError::Server { status: 503, .. }
        ));
    }
}
