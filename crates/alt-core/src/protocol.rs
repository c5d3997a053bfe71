//! Wire protocol shared by the server and the bridge clients
//!
//! Requests are form-encoded key/value pairs selected by `action`;
//! responses are `{ "success": bool, "data": ... }` envelopes.

use crate::error::{BridgeError, RequestError};
use crate::types::{AssetId, ResolvedAsset};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Action name for resolving a locator
pub const ACTION_RESOLVE: &str = "get_attachment_id_from_url";

/// Action name for reading stored alt text
pub const ACTION_GET: &str = "get_attachment_alt_text";

/// Action name for updating alt text
pub const ACTION_UPDATE: &str = "update_attachment_alt_text";

/// Success message for updates
pub const UPDATE_OK_MESSAGE: &str = "Alt text updated successfully";

/// Flat form body as posted by clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AjaxForm {
    /// Operation selector
    #[serde(default)]
    pub action: String,
    /// Request token checked by the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Locator for resolve requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Asset id for update requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// New alt text for update requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl AjaxForm {
    /// Build a resolve form
    #[must_use]
    pub fn resolve(locator: &str, nonce: Option<&str>) -> Self {
        Self {
            action: ACTION_RESOLVE.to_string(),
            nonce: nonce.map(str::to_string),
            url: Some(locator.to_string()),
            ..Self::default()
        }
    }

    /// Build a read form
    #[must_use]
    pub fn get(id: AssetId, nonce: Option<&str>) -> Self {
        Self {
            action: ACTION_GET.to_string(),
            nonce: nonce.map(str::to_string),
            id: Some(id.to_string()),
            ..Self::default()
        }
    }

    /// Build an update form
    #[must_use]
    pub fn update(id: AssetId, alt_text: &str, nonce: Option<&str>) -> Self {
        Self {
            action: ACTION_UPDATE.to_string(),
            nonce: nonce.map(str::to_string),
            id: Some(id.to_string()),
            alt_text: Some(alt_text.to_string()),
            ..Self::default()
        }
    }

    /// Decode into a typed request
    ///
    /// A missing `alt_text` on update means the empty string.
    ///
    /// # Errors
    /// - `RequestError::UnknownAction` for unrecognised actions
    /// - `RequestError::MissingField` / `InvalidField` for bad parameters
    pub fn into_request(self) -> Result<AjaxRequest, RequestError> {
        match self.action.as_str() {
            ACTION_RESOLVE => {
                let url = self
                    .url
                    .filter(|u| !u.trim().is_empty())
                    .ok_or(RequestError::MissingField("url"))?;
                Ok(AjaxRequest::Resolve { url })
            }
            ACTION_GET => Ok(AjaxRequest::Get {
                id: parse_id(self.id)?,
            }),
            ACTION_UPDATE => Ok(AjaxRequest::Update {
                id: parse_id(self.id)?,
                alt_text: self.alt_text.unwrap_or_default(),
            }),
            other => Err(RequestError::UnknownAction(other.to_string())),
        }
    }
}

fn parse_id(raw: Option<String>) -> Result<AssetId, RequestError> {
    let raw = raw.ok_or(RequestError::MissingField("id"))?;
    raw.parse().map_err(|_| RequestError::InvalidField {
        field: "id",
        value: raw.clone(),
    })
}

/// Typed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AjaxRequest {
    /// Resolve a displayed locator to an asset
    Resolve {
        /// Image source locator
        url: String,
    },
    /// Read stored alt text
    Get {
        /// Target asset
        id: AssetId,
    },
    /// Write alt text for an asset
    Update {
        /// Target asset
        id: AssetId,
        /// New value, may be empty
        alt_text: String,
    },
}

/// Machine-readable failure class carried in error envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Asset or locator not found
    NotFound,
    /// Caller not authorized
    Forbidden,
    /// Malformed request
    InvalidRequest,
    /// Store refused the write
    WriteFailed,
}

/// `{ "message": ..., "code": ... }` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    /// Human-readable message
    pub message: String,
    /// Failure class, absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

/// Response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Whether the operation succeeded
    pub success: bool,
    /// Operation payload
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    /// Successful envelope around any serializable payload
    #[must_use]
    pub fn ok<T: Serialize>(data: &T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).unwrap_or(serde_json::Value::Null),
        }
    }

    /// Successful envelope with a message
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok(&MessageData {
            message: message.into(),
            code: None,
        })
    }

    /// Failed envelope
    #[must_use]
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: serde_json::to_value(MessageData {
                message: message.into(),
                code: Some(code),
            })
            .unwrap_or(serde_json::Value::Null),
        }
    }

    fn failure(&self) -> MessageData {
        serde_json::from_value(self.data.clone()).unwrap_or_else(|_| MessageData {
            message: match &self.data {
                serde_json::Value::String(s) => s.clone(),
                _ => "An error occurred. Please try again.".to_string(),
            },
            code: None,
        })
    }

    fn payload<T: DeserializeOwned>(&self) -> Result<T, BridgeError> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| BridgeError::Transport(format!("malformed response data: {e}")))
    }
}

fn parse_envelope(body: &str) -> Result<Envelope, BridgeError> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        BridgeError::Transport(format!("unparsable response ({e}): {preview}"))
    })
}

fn failure_to_error(data: MessageData, fallback: BridgeError) -> BridgeError {
    match data.code {
        Some(ErrorCode::Forbidden) => BridgeError::Authorization(data.message),
        Some(ErrorCode::WriteFailed | ErrorCode::InvalidRequest) => BridgeError::Write(data.message),
        Some(ErrorCode::NotFound) | None => fallback,
    }
}

/// Decode a resolve response body
///
/// # Errors
/// - `BridgeError::Transport` for unparsable bodies
/// - `BridgeError::ResolutionNotFound` for unknown or rejected locators
/// - `BridgeError::Authorization` / `Write` per failure code
pub fn decode_resolve(locator: &str, body: &str) -> Result<ResolvedAsset, BridgeError> {
    let envelope = parse_envelope(body)?;
    if envelope.success {
        return envelope.payload();
    }
    let failure = envelope.failure();
    let not_found = BridgeError::ResolutionNotFound {
        locator: locator.to_string(),
    };
    // a rejected locator is one that resolves to nothing
    if failure.code == Some(ErrorCode::InvalidRequest) {
        return Err(not_found);
    }
    Err(failure_to_error(failure, not_found))
}

/// Decode a read response body
///
/// # Errors
/// - `BridgeError::Transport` for unparsable bodies
/// - `BridgeError::PersistenceNotFound` / `Authorization` per failure code
pub fn decode_get(id: AssetId, body: &str) -> Result<String, BridgeError> {
    let envelope = parse_envelope(body)?;
    if envelope.success {
        return envelope.payload::<ResolvedAsset>().map(|a| a.alt_text);
    }
    Err(failure_to_error(
        envelope.failure(),
        BridgeError::PersistenceNotFound(id),
    ))
}

/// Decode an update response body
///
/// # Errors
/// - `BridgeError::Transport` for unparsable bodies
/// - `BridgeError::PersistenceNotFound` / `Authorization` / `Write` per failure code
pub fn decode_update(id: AssetId, body: &str) -> Result<(), BridgeError> {
    let envelope = parse_envelope(body)?;
    if envelope.success {
        return Ok(());
    }
    let data = envelope.failure();
    let fallback = match data.code {
        Some(ErrorCode::NotFound) => BridgeError::PersistenceNotFound(id),
        _ => BridgeError::Write(data.message.clone()),
    };
    Err(failure_to_error(data, fallback))
}
