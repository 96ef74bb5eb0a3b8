// crates/canopen-eds/src/od/members.rs

//! Subindex-keyed storage shared by `Record` and `Array`.

use super::Variable;
use alloc::collections::BTreeMap;
use alloc::string::String;
use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub(super) struct Members {
    subindices: BTreeMap<u8, Variable>,
    #[serde(skip)]
    names: BTreeMap<String, u8>,
}

impl Members {
    /// Inserts `variable` at its own subindex. An occupied slot is
    /// overwritten. A name shared by several members resolves to the one
    /// inserted last, then to the highest subindex still carrying it.
    pub(super) fn insert(&mut self, index: u16, variable: Variable) {
        let subindex = variable.subindex;
        if let Some(previous) = self.subindices.remove(&subindex) {
            debug!(
                "Overwriting 0x{:04X}sub{:02X} ('{}' -> '{}')",
                index, subindex, previous.name, variable.name
            );
            if self.names.get(&previous.name) == Some(&subindex) {
                self.names.remove(&previous.name);
                let other = self
                    .subindices
                    .values()
                    .rev()
                    .find(|v| v.name == previous.name)
                    .map(|v| v.subindex);
                if let Some(other) = other {
                    self.names.insert(previous.name, other);
                }
            }
        }
        self.names.insert(variable.name.clone(), subindex);
        self.subindices.insert(subindex, variable);
    }

    pub(super) fn get(&self, subindex: u8) -> Option<&Variable> {
        self.subindices.get(&subindex)
    }

    pub(super) fn get_by_name(&self, name: &str) -> Option<&Variable> {
        self.names.get(name).and_then(|sub| self.subindices.get(sub))
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.subindices.values()
    }

    pub(super) fn len(&self) -> usize {
        self.subindices.len()
    }
}
