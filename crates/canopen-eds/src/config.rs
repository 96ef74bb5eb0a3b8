// crates/canopen-eds/src/config.rs

use alloc::string::String;
use serde::{Deserialize, Serialize};

/// Naming options for the emitted declarations.
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Prepended to every constant identifier.
    pub prefix: String,
    /// Module the emitted `use` line imports the object dictionary types from.
    pub module_path: String,
    /// Name of the emitted builder function.
    pub builder_name: String,
    /// Joins a Record or Array name with a member name when flattening.
    pub member_separator: String,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            prefix: "OD_".into(),
            module_path: "canopen::objectdictionary".into(),
            builder_name: "get_od".into(),
            member_separator: "_".into(),
        }
    }
}
