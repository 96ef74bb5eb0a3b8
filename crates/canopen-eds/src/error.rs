// crates/canopen-eds/src/error.rs

use crate::od::ObjectKey;
use alloc::fmt;
use alloc::string::String;

/// Errors that can occur while parsing an EDS document, querying the
/// resulting object dictionary, or emitting declarations from it.
#[derive(Debug)]
pub enum EdsError {
    /// The document could not be split into sections and entries.
    MalformedDocument { line: usize, reason: &'static str },

    /// A `DataType` code is outside the supported vocabulary (`code` is
    /// `Some`), or a variable reached emission without any resolved type
    /// (`code` is `None`).
    TypeResolution {
        index: u16,
        subindex: u8,
        code: Option<u16>,
    },

    /// A literal does not match the declared data type of its variable.
    ValueParse {
        index: u16,
        subindex: u8,
        field: &'static str,
        literal: String,
    },

    /// A lookup by index, name or subindex missed.
    NotFound(ObjectKey),

    /// Array element synthesis was requested for subindex 0, a subindex
    /// of 256 or more, or on an array without a subindex-1 template.
    InvalidSubindex {
        index: u16,
        subindex: u16,
        reason: &'static str,
    },

    /// The output location does not exist or cannot be written to.
    DestinationUnavailable { path: String, reason: String },

    /// Two different variables normalise to the same emitted identifier.
    DuplicateIdentifier {
        identifier: String,
        first: (u16, u8),
        second: (u16, u8),
    },

    /// An `EmitterConfig` field would not produce valid Rust.
    InvalidConfig { field: &'static str, value: String },

    /// Writing to the output sink failed.
    Fmt(fmt::Error),

    /// An I/O error while reading the source or writing the destination.
    #[cfg(feature = "std")]
    Io(std::io::Error),
}

impl From<fmt::Error> for EdsError {
    fn from(e: fmt::Error) -> Self {
        EdsError::Fmt(e)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for EdsError {
    fn from(e: std::io::Error) -> Self {
        EdsError::Io(e)
    }
}

impl fmt::Display for EdsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdsError::MalformedDocument { line, reason } => {
                write!(f, "Malformed EDS document at line {}: {}", line, reason)
            }
            EdsError::TypeResolution {
                index,
                subindex,
                code: Some(code),
            } => write!(
                f,
                "Unsupported data type {:#06x} for index 0x{:04X} subIndex 0x{:02X}",
                code, index, subindex
            ),
            EdsError::TypeResolution {
                index,
                subindex,
                code: None,
            } => write!(
                f,
                "No data type resolved for index 0x{:04X} subIndex 0x{:02X}",
                index, subindex
            ),
            EdsError::ValueParse {
                index,
                subindex,
                field,
                literal,
            } => write!(
                f,
                "Invalid {} '{}' for index 0x{:04X} subIndex 0x{:02X}",
                field, literal, index, subindex
            ),
            EdsError::NotFound(key) => write!(f, "{} was not found in Object Dictionary", key),
            EdsError::InvalidSubindex {
                index,
                subindex,
                reason,
            } => write!(
                f,
                "Invalid subIndex {} for array 0x{:04X}: {}",
                subindex, index, reason
            ),
            EdsError::DestinationUnavailable { path, reason } => {
                write!(f, "Destination '{}' is unavailable: {}", path, reason)
            }
            EdsError::DuplicateIdentifier {
                identifier,
                first,
                second,
            } => write!(
                f,
                "Identifier {} is produced by both 0x{:04X}sub{:02X} and 0x{:04X}sub{:02X}",
                identifier, first.0, first.1, second.0, second.1
            ),
            EdsError::InvalidConfig { field, value } => {
                write!(f, "Invalid emitter {} '{}'", field, value)
            }
            EdsError::Fmt(e) => write!(f, "Formatting error: {}", e),
            #[cfg(feature = "std")]
            EdsError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EdsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EdsError::Io(e) => Some(e),
            EdsError::Fmt(e) => Some(e),
            _ => None,
        }
    }
}
