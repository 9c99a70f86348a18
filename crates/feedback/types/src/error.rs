/// Errors raised while decoding persisted failure classifications.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerError {
    #[error("failure layer out of range: {0} (expected 1-4)")]
    OutOfRange(u8),
    #[error("unknown failure type: {0}")]
    UnknownType(String),
    #[error("failure type {failure_type} belongs to layer {expected}, record says {found}")]
    Inconsistent {
        failure_type: String,
        expected: u8,
        found: u8,
    },
}
