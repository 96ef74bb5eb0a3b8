// crates/canopen-eds/src/od/mod.rs

//! The in-memory object dictionary built from an EDS document.

mod array;
mod members;
mod record;
mod variable;

pub use array::{Array, TEMPLATE_SUBINDEX};
pub use record::Record;
pub use variable::Variable;

use crate::error::EdsError;
use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;
use log::debug;
use serde::Serialize;

/// Key used to look up an entry, and reported back by `EdsError::NotFound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKey {
    Index(u16),
    Name(String),
    Member { index: u16, subindex: u16 },
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKey::Index(index) => write!(f, "0x{:X}", index),
            ObjectKey::Name(name) => f.write_str(name),
            ObjectKey::Member { index, subindex } => {
                write!(f, "Subindex {} of 0x{:X}", subindex, index)
            }
        }
    }
}

impl From<u16> for ObjectKey {
    fn from(index: u16) -> Self {
        ObjectKey::Index(index)
    }
}

impl From<&str> for ObjectKey {
    fn from(name: &str) -> Self {
        ObjectKey::Name(name.into())
    }
}

impl From<String> for ObjectKey {
    fn from(name: String) -> Self {
        ObjectKey::Name(name)
    }
}

/// Represents a single top-level entry in the Object Dictionary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Object {
    Variable(Variable),
    Record(Record),
    Array(Array),
}

impl Object {
    pub fn index(&self) -> u16 {
        match self {
            Object::Variable(var) => var.index,
            Object::Record(record) => record.index,
            Object::Array(array) => array.index,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Object::Variable(var) => &var.name,
            Object::Record(record) => &record.name,
            Object::Array(array) => &array.name,
        }
    }
}

impl From<Variable> for Object {
    fn from(var: Variable) -> Self {
        Object::Variable(var)
    }
}

impl From<Record> for Object {
    fn from(record: Record) -> Self {
        Object::Record(record)
    }
}

impl From<Array> for Object {
    fn from(array: Array) -> Self {
        Object::Array(array)
    }
}

/// The root container: 16-bit index -> `Object`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ObjectDictionary {
    objects: BTreeMap<u16, Object>,
    #[serde(skip)]
    names: BTreeMap<String, u16>,
    /// Default bitrate in bit/s, if specified by the document.
    pub bitrate: Option<u32>,
    /// Node ID supplied by the caller of the parser.
    pub node_id: Option<u8>,
}

impl ObjectDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an object at its own index. An existing object at that index
    /// is replaced and returned; this is not an error.
    ///
    /// A name shared by several objects resolves to the one inserted last.
    /// When that one is replaced, the name falls back to the highest index
    /// still carrying it.
    pub fn add_object(&mut self, object: impl Into<Object>) -> Option<Object> {
        let object = object.into();
        let index = object.index();
        let previous = self.objects.remove(&index);
        if let Some(prev) = &previous {
            debug!(
                "Index 0x{:04X} redefined: '{}' replaced by '{}'",
                index,
                prev.name(),
                object.name()
            );
            if self.names.get(prev.name()) == Some(&index) {
                self.names.remove(prev.name());
                let other = self
                    .objects
                    .iter()
                    .rev()
                    .find(|(_, obj)| obj.name() == prev.name());
                if let Some((other, _)) = other {
                    self.names.insert(prev.name().into(), *other);
                }
            }
        }
        self.names.insert(object.name().into(), index);
        self.objects.insert(index, object);
        previous
    }

    /// Looks up an object by index or by name.
    pub fn get(&self, key: impl Into<ObjectKey>) -> Result<&Object, EdsError> {
        let key = key.into();
        let found = match &key {
            ObjectKey::Index(index) => self.objects.get(index),
            ObjectKey::Name(name) => self.names.get(name).and_then(|i| self.objects.get(i)),
            ObjectKey::Member { .. } => None,
        };
        found.ok_or(EdsError::NotFound(key))
    }

    /// Mutable lookup by index, used while the parser attaches members.
    pub fn get_mut(&mut self, index: u16) -> Result<&mut Object, EdsError> {
        self.objects
            .get_mut(&index)
            .ok_or(EdsError::NotFound(ObjectKey::Index(index)))
    }

    /// Resolves a single variable by `(index, subindex)`, synthesizing array
    /// elements where needed.
    pub fn get_variable(&self, index: u16, subindex: u16) -> Result<Cow<'_, Variable>, EdsError> {
        match self.get(index)? {
            Object::Variable(var) if subindex == 0 => Ok(Cow::Borrowed(var)),
            Object::Variable(_) => Err(EdsError::NotFound(ObjectKey::Member { index, subindex })),
            Object::Record(record) => u8::try_from(subindex)
                .ok()
                .and_then(|sub| record.get(sub).ok())
                .map(Cow::Borrowed)
                .ok_or(EdsError::NotFound(ObjectKey::Member { index, subindex })),
            Object::Array(array) => array.get(subindex),
        }
    }

    pub fn contains(&self, index: u16) -> bool {
        self.objects.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All objects in ascending index order.
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    /// Top-level variables in ascending index order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.objects.values().filter_map(|obj| match obj {
            Object::Variable(var) => Some(var),
            _ => None,
        })
    }

    /// Records in ascending index order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.objects.values().filter_map(|obj| match obj {
            Object::Record(record) => Some(record),
            _ => None,
        })
    }

    /// Arrays in ascending index order.
    pub fn arrays(&self) -> impl Iterator<Item = &Array> {
        self.objects.values().filter_map(|obj| match obj {
            Object::Array(array) => Some(array),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn sample_od() -> ObjectDictionary {
        let mut od = ObjectDictionary::new();
        od.add_object(Variable::new("Producer Heartbeat Time", 0x1017, 0));
        od.add_object(Record::new("Identity Object", 0x1018));
        od.add_object(Variable::new("Device Type", 0x1000, 0));
        od.add_object(Array::new("Pre-defined error field", 0x1003));
        od.add_object(Variable::new("Error Register", 0x1001, 0));
        od
    }

    #[test]
    fn test_views_are_sorted_by_index() {
        let od = sample_od();
        let vars: Vec<u16> = od.variables().map(|v| v.index).collect();
        assert_eq!(vars, [0x1000, 0x1001, 0x1017]);
        let records: Vec<u16> = od.records().map(|r| r.index).collect();
        assert_eq!(records, [0x1018]);
        let arrays: Vec<u16> = od.arrays().map(|a| a.index).collect();
        assert_eq!(arrays, [0x1003]);
        let all: Vec<u16> = od.objects().map(Object::index).collect();
        assert_eq!(all, [0x1000, 0x1001, 0x1003, 0x1017, 0x1018]);
    }

    #[test]
    fn test_views_reflect_later_mutation() {
        let mut od = sample_od();
        assert_eq!(od.variables().count(), 3);
        od.add_object(Variable::new("Manufacturer Device Name", 0x1008, 0));
        assert_eq!(od.variables().count(), 4);
        // Restartable: a second pass sees the same contents.
        assert_eq!(od.variables().count(), 4);
    }

    #[test]
    fn test_collision_keeps_last_object() {
        let mut od = ObjectDictionary::new();
        assert!(od.add_object(Variable::new("First", 0x2000, 0)).is_none());
        let replaced = od.add_object(Record::new("Second", 0x2000));

        assert_eq!(replaced.map(|o| String::from(o.name())), Some(String::from("First")));
        assert_eq!(od.len(), 1);
        assert!(matches!(od.get(0x2000), Ok(Object::Record(r)) if r.name == "Second"));
        assert!(od.get("First").is_err());
        assert!(od.get("Second").is_ok());
    }

    #[test]
    fn test_shared_name_falls_back_after_overwrite() {
        let mut od = ObjectDictionary::new();
        od.add_object(Variable::new("Spare", 0x2000, 0));
        od.add_object(Variable::new("Spare", 0x2001, 0));
        assert_eq!(od.get("Spare").unwrap().index(), 0x2001);

        od.add_object(Variable::new("Setpoint", 0x2001, 0));
        assert_eq!(od.get("Spare").unwrap().index(), 0x2000);
        assert_eq!(od.get("Setpoint").unwrap().index(), 0x2001);
    }

    #[test]
    fn test_get_by_name_and_index() {
        let od = sample_od();
        assert_eq!(od.get("Device Type").unwrap().index(), 0x1000);
        assert_eq!(od.get(0x1018).unwrap().name(), "Identity Object");
    }

    #[test]
    fn test_missing_key_is_reported() {
        let od = sample_od();
        assert!(matches!(od.get(0x6000), Err(EdsError::NotFound(ObjectKey::Index(0x6000)))));
        assert!(matches!(
            od.get("Nope"),
            Err(EdsError::NotFound(ObjectKey::Name(name))) if name == "Nope"
        ));
    }

    #[test]
    fn test_get_variable_dispatches_on_kind() {
        let mut od = sample_od();
        let mut template = Variable::new("Error", 0x1003, 1);
        template.data_type = Some(crate::types::DataType::Unsigned32);
        if let Ok(Object::Array(array)) = od.get_mut(0x1003) {
            array.add_member(template);
        }

        assert_eq!(od.get_variable(0x1000, 0).unwrap().name, "Device Type");
        assert!(od.get_variable(0x1000, 1).is_err());
        assert!(od.get_variable(0x1018, 1).is_err());
        assert_eq!(od.get_variable(0x1003, 4).unwrap().name, "Error_4");
    }
}
