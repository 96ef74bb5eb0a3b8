// crates/canopen-eds/src/types.rs

//! The closed CANopen data type vocabulary and the value/access primitives
//! shared by the parser, the model and the emitter.

use alloc::string::String;
use core::fmt;
use serde::Serialize;

// --- Data Types (Based on CiA 301 Table 44) ---

/// The standard primitive encodings a `Variable` may take.
///
/// The discriminant is the numeric code used by the `DataType` key of an EDS
/// section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[repr(u16)]
pub enum DataType {
    Boolean = 0x0001,
    Integer8 = 0x0002,
    Integer16 = 0x0003,
    Integer32 = 0x0004,
    Unsigned8 = 0x0005,
    Unsigned16 = 0x0006,
    Unsigned32 = 0x0007,
    Real32 = 0x0008,
    VisibleString = 0x0009,
    OctetString = 0x000A,
    UnicodeString = 0x000B,
    Domain = 0x000F,
    Real64 = 0x0011,
    Integer64 = 0x0015,
    Unsigned64 = 0x001B,
}

/// Signed integer types.
pub const SIGNED_TYPES: [DataType; 4] = [
    DataType::Integer8,
    DataType::Integer16,
    DataType::Integer32,
    DataType::Integer64,
];

/// Unsigned integer types.
pub const UNSIGNED_TYPES: [DataType; 4] = [
    DataType::Unsigned8,
    DataType::Unsigned16,
    DataType::Unsigned32,
    DataType::Unsigned64,
];

/// IEEE 754 floating point types.
pub const FLOAT_TYPES: [DataType; 2] = [DataType::Real32, DataType::Real64];

/// Types whose values are carried verbatim as text (plus the opaque DOMAIN).
pub const STRING_TYPES: [DataType; 4] = [
    DataType::VisibleString,
    DataType::OctetString,
    DataType::UnicodeString,
    DataType::Domain,
];

impl DataType {
    /// The numeric code of this type as written in an EDS file.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// The canonical upper-case name, used as the value tag in emitted code.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Integer8 => "INTEGER8",
            DataType::Integer16 => "INTEGER16",
            DataType::Integer32 => "INTEGER32",
            DataType::Unsigned8 => "UNSIGNED8",
            DataType::Unsigned16 => "UNSIGNED16",
            DataType::Unsigned32 => "UNSIGNED32",
            DataType::Real32 => "REAL32",
            DataType::VisibleString => "VISIBLE_STRING",
            DataType::OctetString => "OCTET_STRING",
            DataType::UnicodeString => "UNICODE_STRING",
            DataType::Domain => "DOMAIN",
            DataType::Real64 => "REAL64",
            DataType::Integer64 => "INTEGER64",
            DataType::Unsigned64 => "UNSIGNED64",
        }
    }

    pub fn is_signed(self) -> bool {
        SIGNED_TYPES.contains(&self)
    }

    pub fn is_unsigned(self) -> bool {
        UNSIGNED_TYPES.contains(&self)
    }

    pub fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub fn is_float(self) -> bool {
        FLOAT_TYPES.contains(&self)
    }

    pub fn is_string(self) -> bool {
        STRING_TYPES.contains(&self)
    }

    /// Inclusive numeric range of an integer type, widened to `i128`.
    /// Returns `None` for non-integer types.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        match self {
            DataType::Integer8 => Some((i8::MIN as i128, i8::MAX as i128)),
            DataType::Integer16 => Some((i16::MIN as i128, i16::MAX as i128)),
            DataType::Integer32 => Some((i32::MIN as i128, i32::MAX as i128)),
            DataType::Integer64 => Some((i64::MIN as i128, i64::MAX as i128)),
            DataType::Unsigned8 => Some((0, u8::MAX as i128)),
            DataType::Unsigned16 => Some((0, u16::MAX as i128)),
            DataType::Unsigned32 => Some((0, u32::MAX as i128)),
            DataType::Unsigned64 => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error type for a data type code outside the closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownDataType(pub u16);

impl fmt::Display for UnknownDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown data type code: {:#06x}", self.0)
    }
}

impl TryFrom<u16> for DataType {
    type Error = UnknownDataType;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            0x0001 => Ok(DataType::Boolean),
            0x0002 => Ok(DataType::Integer8),
            0x0003 => Ok(DataType::Integer16),
            0x0004 => Ok(DataType::Integer32),
            0x0005 => Ok(DataType::Unsigned8),
            0x0006 => Ok(DataType::Unsigned16),
            0x0007 => Ok(DataType::Unsigned32),
            0x0008 => Ok(DataType::Real32),
            0x0009 => Ok(DataType::VisibleString),
            0x000A => Ok(DataType::OctetString),
            0x000B => Ok(DataType::UnicodeString),
            0x000F => Ok(DataType::Domain),
            0x0011 => Ok(DataType::Real64),
            0x0015 => Ok(DataType::Integer64),
            0x001B => Ok(DataType::Unsigned64),
            other => Err(UnknownDataType(other)),
        }
    }
}

// --- Access Types ---

/// Defines the access rights for an Object Dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AccessType {
    /// read and write access
    #[default]
    ReadWrite,
    /// read only access
    ReadOnly,
    /// write only access
    WriteOnly,
    /// read only access, value is constant
    Constant,
}

impl AccessType {
    /// Parses an EDS `AccessType` value (case-insensitive).
    ///
    /// `rww` and `rwr` (read-write with a PDO direction hint) collapse to
    /// `ReadWrite`. Returns `None` for anything else.
    pub fn from_eds(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rw" | "rww" | "rwr" => Some(AccessType::ReadWrite),
            "ro" => Some(AccessType::ReadOnly),
            "wo" => Some(AccessType::WriteOnly),
            "const" => Some(AccessType::Constant),
            _ => None,
        }
    }

    /// The short EDS spelling (`rw`, `ro`, `wo`, `const`).
    pub fn as_str(self) -> &'static str {
        match self {
            AccessType::ReadWrite => "rw",
            AccessType::ReadOnly => "ro",
            AccessType::WriteOnly => "wo",
            AccessType::Constant => "const",
        }
    }
}

// --- Values ---

/// A typed literal attached to a `Variable` (min, max, default or value).
///
/// Which variant is produced is decided by the variable's `DataType`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Boolean(bool),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Returns the value as an `i128` if it is an integer or boolean.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Boolean(b) => Some(*b as i128),
            Value::Signed(v) => Some(*v as i128),
            Value::Unsigned(v) => Some(*v as i128),
            _ => None,
        }
    }
}
