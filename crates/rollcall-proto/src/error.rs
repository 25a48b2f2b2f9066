//! Decode errors.

use thiserror::Error;

/// Errors produced while decoding wire data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtoError {
    /// Input was not valid JSON, or did not match the expected shape.
    #[error("malformed JSON: {0}")]
    Malformed(String),

    /// Push frame carried no `type` field.
    #[error("push frame has no type tag")]
    MissingKind,

    /// Push frame `type` is not one this client understands.
    #[error("unknown push frame kind: {0}")]
    UnknownKind(String),
}

impl From<serde_json::Error> for ProtoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
