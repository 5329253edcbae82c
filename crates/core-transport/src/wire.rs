//! JSON wire shapes exchanged with the reformat procedure.
//!
//! Request:  `{ "text": "...", "selectedFormat": { "type": "grammar" } }`
//! Response: `{ "data": { "formattedText": "...", "format": "grammar" } }`
//!           `data` may be absent or null (nothing to apply), or the whole
//!           envelope may instead carry `{ "error": { "message", "code" } }`.

use core_format::FormatKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReformatRequest {
    pub text: String,
    pub selected_format: SelectedFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFormat {
    #[serde(rename = "type")]
    pub kind: FormatKind,
}

impl ReformatRequest {
    pub fn new(text: impl Into<String>, kind: FormatKind) -> Self {
        Self {
            text: text.into(),
            selected_format: SelectedFormat { kind },
        }
    }

    pub fn requested(&self) -> FormatKind {
        self.selected_format.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedText {
    pub formatted_text: String,
    pub format: FormatKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReformatResponse {
    #[serde(default)]
    pub data: Option<FormattedText>,
}

impl ReformatResponse {
    pub fn formatted(text: impl Into<String>, format: FormatKind) -> Self {
        Self {
            data: Some(FormattedText {
                formatted_text: text.into(),
                format,
            }),
        }
    }

    /// Successful response that carries nothing to apply.
    pub fn empty() -> Self {
        Self { data: None }
    }

    /// The usable payload, if any. A present `data` with an empty
    /// `formattedText` counts as no payload.
    pub fn payload(&self) -> Option<&FormattedText> {
        self.data
            .as_ref()
            .filter(|data| !data.formatted_text.is_empty())
    }

    pub fn into_payload(self) -> Option<FormattedText> {
        self.data.filter(|data| !data.formatted_text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<FormattedText>,
    #[serde(default)]
    error: Option<WireError>,
}

pub fn encode_request(request: &ReformatRequest) -> Result<String, TransportError> {
    serde_json::to_string(request).map_err(TransportError::Codec)
}

/// Decode a response body. An `error` member wins over `data`.
pub fn decode_response(body: &str) -> Result<ReformatResponse, TransportError> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|e| {
        debug!(target: "transport", size_bytes = body.len(), error = %e, "decode_failed");
        TransportError::Codec(e)
    })?;
    if let Some(WireError { message, code }) = envelope.error {
        debug!(target: "transport", code = code.as_deref(), "error_envelope");
        return Err(TransportError::Rejected { message, code });
    }
    Ok(ReformatResponse {
        data: envelope.data,
    })
}
