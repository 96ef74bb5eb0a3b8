// crates/canopen-eds/src/od/record.rs

use super::members::Members;
use super::{ObjectKey, Variable};
use crate::error::EdsError;
use alloc::string::String;
use serde::Serialize;

/// A fixed, explicitly enumerated group of variables sharing one index.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// 16-bit address of the record.
    pub index: u16,
    pub name: String,
    /// Description for the whole record.
    pub description: String,
    members: Members,
}

impl Record {
    pub fn new(name: impl Into<String>, index: u16) -> Self {
        Self {
            index,
            name: name.into(),
            description: String::new(),
            members: Members::default(),
        }
    }

    /// Adds a member at its own subindex (last write wins).
    pub fn add_member(&mut self, variable: Variable) {
        self.members.insert(self.index, variable);
    }

    /// Looks up a member by subindex.
    pub fn get(&self, subindex: u8) -> Result<&Variable, EdsError> {
        self.members.get(subindex).ok_or(EdsError::NotFound(ObjectKey::Member {
            index: self.index,
            subindex: subindex as u16,
        }))
    }

    /// Looks up a member by its `ParameterName`.
    pub fn get_by_name(&self, name: &str) -> Result<&Variable, EdsError> {
        self.members
            .get_by_name(name)
            .ok_or_else(|| EdsError::NotFound(ObjectKey::Name(name.into())))
    }

    /// Members in ascending subindex order.
    pub fn members(&self) -> impl Iterator<Item = &Variable> {
        self.members.iter()
    }

    pub fn contains(&self, subindex: u8) -> bool {
        self.members.get(subindex).is_some()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.len() == 0
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}
