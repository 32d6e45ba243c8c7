use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetaClassError {
    #[error("Malformed descriptor: {0:?}")]
    MalformedDescriptor(String),
    #[error("Malformed method descriptor {descriptor:?}: {reason}")]
    MalformedMethodDescriptor {
        descriptor: String,
        reason: &'static str,
    },
    #[error("Illegal projection state: {0}")]
    IllegalProjectionState(String),
    #[error("Unsupported conversion: {0}")]
    UnsupportedConversion(String),
}
