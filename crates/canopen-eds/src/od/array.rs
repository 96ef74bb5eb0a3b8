// crates/canopen-eds/src/od/array.rs

use super::members::Members;
use super::{ObjectKey, Variable};
use crate::error::EdsError;
use alloc::borrow::Cow;
use alloc::string::String;
use log::trace;
use serde::Serialize;

/// Subindex of the element every synthesized element is cloned from.
pub const TEMPLATE_SUBINDEX: u8 = 1;

/// A homogeneous group of variables sharing one index.
///
/// Only some elements are stored. Any other element in `1..=255` is derived
/// on demand from the subindex-1 template, so the actual length of the
/// array is not known from the EDS alone.
#[derive(Debug, Clone, Serialize)]
pub struct Array {
    /// 16-bit address of the array.
    pub index: u16,
    pub name: String,
    /// Description for the whole array.
    pub description: String,
    members: Members,
}

impl Array {
    pub fn new(name: impl Into<String>, index: u16) -> Self {
        Self {
            index,
            name: name.into(),
            description: String::new(),
            members: Members::default(),
        }
    }

    /// Adds an explicit element at its own subindex (last write wins).
    pub fn add_member(&mut self, variable: Variable) {
        self.members.insert(self.index, variable);
    }

    /// The element new subindices are synthesized from, if present.
    pub fn template(&self) -> Option<&Variable> {
        self.members.get(TEMPLATE_SUBINDEX)
    }

    /// Returns the element at `subindex`.
    ///
    /// Stored elements are borrowed. Missing elements in `1..=255` are cloned
    /// from the template; subindex 0, subindices of 256 and above, and
    /// arrays without a template fail with `InvalidSubindex`.
    pub fn get(&self, subindex: u16) -> Result<Cow<'_, Variable>, EdsError> {
        if let Some(var) = u8::try_from(subindex).ok().and_then(|s| self.members.get(s)) {
            return Ok(Cow::Borrowed(var));
        }
        let sub = match u8::try_from(subindex) {
            Ok(0) | Err(_) => {
                return Err(EdsError::InvalidSubindex {
                    index: self.index,
                    subindex,
                    reason: "array elements are addressed by subindex 1 to 255",
                });
            }
            Ok(sub) => sub,
        };
        let template = self.template().ok_or(EdsError::InvalidSubindex {
            index: self.index,
            subindex,
            reason: "array has no subindex 1 template",
        })?;
        trace!(
            "Synthesizing 0x{:04X}sub{:02X} from '{}'",
            self.index, sub, template.name
        );
        Ok(Cow::Owned(template.clone_for_subindex(sub)))
    }

    /// Looks up an explicitly stored element by its `ParameterName`.
    pub fn get_by_name(&self, name: &str) -> Result<&Variable, EdsError> {
        self.members
            .get_by_name(name)
            .ok_or_else(|| EdsError::NotFound(ObjectKey::Name(name.into())))
    }

    /// Explicitly stored elements in ascending subindex order.
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

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Value};

    fn sensor_array() -> Array {
        let mut template = Variable::new("Sensor Status", 0x3004, 1);
        template.data_type = Some(DataType::Unsigned8);
        template.min = Some(Value::Unsigned(0));
        template.max = Some(Value::Unsigned(100));
        template.default = Some(Value::Unsigned(5));

        let mut array = Array::new("Sensor Status", 0x3004);
        array.add_member(template);
        array
    }

    #[test]
    fn test_stored_element_is_borrowed() {
        let array = sensor_array();
        let var = array.get(1).unwrap();
        assert!(matches!(var, Cow::Borrowed(_)));
        assert_eq!(var.name, "Sensor Status");
    }

    #[test]
    fn test_synthesized_element_copies_template() {
        let array = sensor_array();
        let var = array.get(3).unwrap();
        assert!(matches!(var, Cow::Owned(_)));
        assert_eq!(var.subindex, 3);
        assert_eq!(var.name, "Sensor Status_3");
        assert_eq!(var.data_type, Some(DataType::Unsigned8));
        assert_eq!(var.min, Some(Value::Unsigned(0)));
        assert_eq!(var.max, Some(Value::Unsigned(100)));
        assert_eq!(var.default, Some(Value::Unsigned(5)));
        // Synthesis does not store anything.
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn test_subindex_zero_and_256_are_rejected() {
        let array = sensor_array();
        for sub in [0u16, 256, 300] {
            assert!(matches!(
                array.get(sub),
                Err(EdsError::InvalidSubindex { index: 0x3004, subindex, .. }) if subindex == sub
            ));
        }
        assert!(array.get(255).is_ok());
    }

    #[test]
    fn test_missing_template_is_rejected() {
        let array = Array::new("Empty", 0x3003);
        assert!(matches!(
            array.get(1),
            Err(EdsError::InvalidSubindex { index: 0x3003, subindex: 1, .. })
        ));
        assert!(matches!(
            array.get(7),
            Err(EdsError::InvalidSubindex { .. })
        ));
    }

    #[test]
    fn test_explicit_number_of_entries_is_returned() {
        let mut array = sensor_array();
        array.add_member(Variable::new("Number of entries", 0x3004, 0));
        assert_eq!(array.get(0).unwrap().name, "Number of entries");
    }
}
