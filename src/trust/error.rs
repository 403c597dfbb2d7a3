// trust/error.rs - Trust Store Errors

use thiserror::Error;

use super::entity::EntityName;

/// Errors raised by trust store mutations
///
/// All of these are recoverable. A query never fails; "not trusted" is a
/// verdict.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TrustError {
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityName),

    #[error("Entity already registered: {0}")]
    DuplicateEntity(EntityName),

    #[error("Entity cannot assert trust in itself: {0}")]
    SelfAssertion(EntityName),

    #[error("Invalid assertion level: {0:?} (expected \"complete\" or \"partial\")")]
    InvalidLevel(String),
}

impl TrustError {
    /// Short machine-friendly label, used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            TrustError::UnknownEntity(_) => "unknown_entity",
            TrustError::DuplicateEntity(_) => "duplicate_entity",
            TrustError::SelfAssertion(_) => "self_assertion",
            TrustError::InvalidLevel(_) => "invalid_level",
        }
    }
}
