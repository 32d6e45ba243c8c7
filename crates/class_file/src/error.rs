use std::io;

use jace_metaclass::MetaClassError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error("The class file ends before a declared field or payload is complete")]
    TruncatedInput,
    #[error(transparent)]
    Io(io::Error),
    #[error("Invalid magic identifier: 0x{0:X}")]
    BadMagic(u32),
    #[error("Unrecognized constant tag: {0}")]
    UnknownConstantTag(u8),
    #[error("Expected the attribute name {expected}, found {found:?}")]
    AttributeNameMismatch {
        expected: &'static str,
        found: String,
    },
    #[error("The {name} attribute declares {declared} bytes, but its payload holds {actual}")]
    AttributeLengthMismatch {
        name: String,
        declared: u32,
        actual: u64,
    },
    #[error("The constant pool declares {declared} slots, but its entries span {actual}")]
    ConstantPoolCountMismatch { declared: usize, actual: usize },
    #[error("Expected {expected} at constant pool index {index}, found {found}")]
    WrongConstantKind {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    #[error("The {what} ({count}) does not fit in its class file field")]
    TooLarge { what: &'static str, count: usize },
    #[error(transparent)]
    MetaClass(#[from] MetaClassError),
}

impl From<io::Error> for ClassFileError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::UnexpectedEof => ClassFileError::TruncatedInput,
            _ => ClassFileError::Io(error),
        }
    }
}
