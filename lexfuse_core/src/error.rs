use thiserror::Error;

use crate::knowledge::KnowledgeType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown knowledge type: {0}")]
    UnknownKnowledgeType(String),

    #[error("no extractor registered for knowledge type: {0}")]
    UnknownExtractor(KnowledgeType),

    #[error("{kind} extractor failed: {message}")]
    ExtractorFailed { kind: KnowledgeType, message: String },

    #[error("malformed {kind} match '{text}': {reason}")]
    MalformedMatch {
        kind: KnowledgeType,
        text: String,
        reason: String,
    },
}

impl Error {
    /// Build a `MalformedMatch` for a span that could not become an item.
    pub fn malformed(kind: KnowledgeType, text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedMatch {
            kind,
            text: text.into(),
            reason: reason.into(),
        }
    }
}
