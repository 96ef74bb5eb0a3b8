// crates/canopen-eds/src/od/variable.rs

use crate::types::{AccessType, DataType, Value};
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use serde::Serialize;

/// A single addressable parameter of the object dictionary.
///
/// Two variables are equal when they share the same `(index, subindex)`
/// address, regardless of their other attributes.
#[derive(Debug, Clone, Serialize)]
pub struct Variable {
    /// 16-bit address of the object in the dictionary.
    pub index: u16,
    /// 8-bit sub-index of the object in the dictionary.
    pub subindex: u8,
    pub name: String,
    /// `None` until the parser resolved a `DataType` for this entry.
    pub data_type: Option<DataType>,
    /// Physical unit.
    pub unit: String,
    /// Factor between the physical unit and the raw integer value.
    pub factor: f64,
    pub min: Option<Value>,
    pub max: Option<Value>,
    /// Value at start-up.
    pub default: Option<Value>,
    /// Configured value (`ParameterValue`), when the document carries one.
    pub value: Option<Value>,
    pub access_type: AccessType,
    pub description: String,
    /// Raw integer value -> human readable label.
    pub value_descriptions: BTreeMap<i64, String>,
    /// Bit-field name -> bit positions covered by the field.
    pub bit_definitions: BTreeMap<String, Vec<u8>>,
}

impl Variable {
    /// Creates a variable with every optional attribute unset, a factor of 1
    /// and read-write access.
    pub fn new(name: impl Into<String>, index: u16, subindex: u8) -> Self {
        Self {
            index,
            subindex,
            name: name.into(),
            data_type: None,
            unit: String::new(),
            factor: 1.0,
            min: None,
            max: None,
            default: None,
            value: None,
            access_type: AccessType::ReadWrite,
            description: String::new(),
            value_descriptions: BTreeMap::new(),
            bit_definitions: BTreeMap::new(),
        }
    }

    /// Associates a raw value with a label.
    pub fn add_value_description(&mut self, value: i64, description: impl Into<String>) {
        self.value_descriptions.insert(value, description.into());
    }

    /// Associates a set of bit positions with a field name.
    pub fn add_bit_definition(&mut self, name: impl Into<String>, bits: Vec<u8>) {
        self.bit_definitions.insert(name.into(), bits);
    }

    /// Builds a new element at `subindex` from this variable used as an array
    /// template.
    ///
    /// Only the type-dependent attributes are carried over; `value` is not.
    /// The name is `<template name>_<subindex in lower-case hex>`.
    pub fn clone_for_subindex(&self, subindex: u8) -> Variable {
        let mut var = Variable::new(format!("{}_{:x}", self.name, subindex), self.index, subindex);
        var.data_type = self.data_type;
        var.unit = self.unit.clone();
        var.factor = self.factor;
        var.min = self.min.clone();
        var.max = self.max.clone();
        var.default = self.default.clone();
        var.access_type = self.access_type;
        var.description = self.description.clone();
        var.value_descriptions = self.value_descriptions.clone();
        var.bit_definitions = self.bit_definitions.clone();
        var
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.subindex == other.subindex
    }
}

impl Eq for Variable {}
