// crates/canopen-eds/src/lib.rs

#![cfg_attr(not(feature = "std"), no_std)]
#![doc = "Parses CANopen EDS (Electronic Data Sheet) files and generates Rust declarations."]
#![doc = ""]
#![doc = "This `no_std + alloc` library provides:"]
#![doc = "- `parse_eds`: Parsing an EDS document into a typed `ObjectDictionary`."]
#![doc = "- `emit`: Serializing an `ObjectDictionary` as `const` declarations plus a builder function."]
#![doc = "- `generate`: File-to-file generation (requires the `std` feature)."]

extern crate alloc;

// --- Crate Modules ---

mod config;
mod emitter;
mod error;
#[cfg(feature = "std")]
mod generate;
pub mod od;
mod parser;
mod resolver;
pub mod types;

// --- Public API Re-exports ---

pub use config::EmitterConfig;
pub use emitter::{emit, identifier};
pub use error::EdsError;
#[cfg(feature = "std")]
pub use generate::generate;
pub use od::{Array, Object, ObjectDictionary, ObjectKey, Record, Variable};
pub use parser::parse_eds;
pub use types::{AccessType, DataType, Value};
