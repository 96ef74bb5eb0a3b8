// crates/canopen-eds/src/resolver/variable.rs

use super::value::{Site, parse_integer, parse_value};
use crate::error::EdsError;
use crate::od::Variable;
use crate::parser::{Document, Section};
use crate::types::{AccessType, DataType};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use log::{trace, warn};

/// Key prefix of value description entries: `ValueDescription.<raw>=<label>`.
pub(super) const VALUE_DESCRIPTION_PREFIX: &str = "ValueDescription.";
/// Key prefix of bit definition entries: `BitDefinition.<name>=<bit>,<bit>`.
pub(super) const BIT_DEFINITION_PREFIX: &str = "BitDefinition.";

/// Builds a `Variable` at `(index, subindex)` from the fields of `section`.
pub(super) fn build_variable(
    doc: &Document,
    section: &Section,
    index: u16,
    subindex: u8,
    node_id: Option<u8>,
) -> Result<Variable, EdsError> {
    let name = parameter_name(section);
    let mut var = Variable::new(name, index, subindex);
    let site = |field| Site {
        index,
        subindex,
        field,
    };

    var.data_type = resolve_data_type(doc, section, index, subindex)?;
    if var.data_type.is_none() {
        warn!(
            "[{}] '{}' has no DataType; it cannot be emitted",
            section.name, var.name
        );
    }

    if let Some(access) = section.get("AccessType") {
        var.access_type = AccessType::from_eds(access).ok_or_else(|| site("AccessType").error(access))?;
    }

    if let Some(data_type) = var.data_type {
        let typed = |field: &'static str| -> Result<_, EdsError> {
            section
                .get(field)
                .map(|literal| parse_value(site(field), data_type, literal, node_id))
                .transpose()
                .map(Option::flatten)
        };
        var.min = typed("LowLimit")?;
        var.max = typed("HighLimit")?;
        var.default = typed("DefaultValue")?;
        var.value = typed("ParameterValue")?;
        if data_type == DataType::Domain && section.contains("DefaultValue") {
            warn!(
                "[{}] DefaultValue ignored: DOMAIN objects carry no default",
                section.name
            );
        }
    } else if section.contains("DefaultValue") || section.contains("ParameterValue") {
        warn!("[{}] values ignored without a DataType", section.name);
    }

    if let Some(unit) = section.get("Unit") {
        var.unit = String::from(unit);
    }
    if let Some(factor) = section.get("Factor") {
        var.factor = factor
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(|| site("Factor").error(factor))?;
    }
    if let Some(description) = section.get("Description") {
        var.description = String::from(description);
    }

    for (raw, entry) in section.entries_with_prefix(VALUE_DESCRIPTION_PREFIX) {
        let value = parse_integer(raw, None)
            .and_then(|v| i64::try_from(v).ok())
            .ok_or_else(|| site("ValueDescription").error(raw))?;
        trace!("[{}] value {} => '{}'", section.name, value, entry.value);
        var.add_value_description(value, entry.value.as_str());
    }

    for (field_name, entry) in section.entries_with_prefix(BIT_DEFINITION_PREFIX) {
        let bits = entry
            .value
            .split(',')
            .map(|bit| bit.trim().parse::<u8>().ok().filter(|b| *b < 64))
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(|| site("BitDefinition").error(&entry.value))?;
        var.add_bit_definition(field_name, bits);
    }

    Ok(var)
}

/// The `ParameterName` of a section, or the section name if it has none.
pub(super) fn parameter_name(section: &Section) -> String {
    match section.get("ParameterName") {
        Some(name) => String::from(name),
        None => {
            warn!("[{}] has no ParameterName, using the section name", section.name);
            section.name.clone()
        }
    }
}

/// Resolves the `DataType` of a section.
///
/// Codes outside the vocabulary may refer to a custom type definition
/// section `[<code>sub1]` whose `DefaultValue` holds a standard code.
/// Returns `Ok(None)` if the section has no `DataType` at all.
fn resolve_data_type(
    doc: &Document,
    section: &Section,
    index: u16,
    subindex: u8,
) -> Result<Option<DataType>, EdsError> {
    let Some(literal) = section.get("DataType") else {
        return Ok(None);
    };
    let code = parse_type_code(literal).ok_or_else(|| {
        Site {
            index,
            subindex,
            field: "DataType",
        }
        .error(literal)
    })?;
    let unresolved = EdsError::TypeResolution {
        index,
        subindex,
        code: Some(code),
    };

    if let Ok(data_type) = DataType::try_from(code) {
        return Ok(Some(data_type));
    }

    let definition = doc
        .section(&format!("{:X}sub1", code))
        .or_else(|| doc.section(&format!("{:04X}sub1", code)))
        .and_then(|s| s.get("DefaultValue"))
        .and_then(parse_type_code);
    match definition.map(DataType::try_from) {
        Some(Ok(data_type)) => {
            trace!(
                "[{}] custom type {:#06x} resolved to {}",
                section.name, code, data_type
            );
            Ok(Some(data_type))
        }
        _ => Err(unresolved),
    }
}

fn parse_type_code(literal: &str) -> Option<u16> {
    parse_integer(literal, None).and_then(|v| u16::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use alloc::vec;

    fn build(text: &str, section: &str) -> Result<Variable, EdsError> {
        let doc = Document::parse(text).unwrap();
        let s = doc.section(section).unwrap();
        build_variable(&doc, s, 0x2000, 0, Some(2))
    }

    #[test]
    fn test_full_variable() {
        let var = build(
            "[2000]\nParameterName=Speed\nDataType=0x0006\nAccessType=ro\nLowLimit=0\nHighLimit=0x0FA0\nDefaultValue=100\nParameterValue=200\nUnit=rpm\nFactor=0.1\nDescription=Motor speed\n",
            "2000",
        )
        .unwrap();
        assert_eq!(var.name, "Speed");
        assert_eq!(var.data_type, Some(DataType::Unsigned16));
        assert_eq!(var.access_type, AccessType::ReadOnly);
        assert_eq!(var.min, Some(Value::Unsigned(0)));
        assert_eq!(var.max, Some(Value::Unsigned(4000)));
        assert_eq!(var.default, Some(Value::Unsigned(100)));
        assert_eq!(var.value, Some(Value::Unsigned(200)));
        assert_eq!(var.unit, "rpm");
        assert_eq!(var.factor, 0.1);
        assert_eq!(var.description, "Motor speed");
    }

    #[test]
    fn test_access_type_defaults_to_rw() {
        let var = build("[2000]\nParameterName=X\nDataType=0x0005\n", "2000").unwrap();
        assert_eq!(var.access_type, AccessType::ReadWrite);
    }

    #[test]
    fn test_unknown_access_type_fails() {
        let err = build("[2000]\nParameterName=X\nDataType=5\nAccessType=rx\n", "2000").unwrap_err();
        assert!(matches!(err, EdsError::ValueParse { field: "AccessType", .. }));
    }

    #[test]
    fn test_missing_data_type_is_left_unresolved() {
        let var = build("[2000]\nParameterName=X\nDefaultValue=1\n", "2000").unwrap();
        assert_eq!(var.data_type, None);
        assert_eq!(var.default, None);
    }

    #[test]
    fn test_unknown_data_type_fails() {
        let err = build("[2000]\nParameterName=X\nDataType=0x0010\n", "2000").unwrap_err();
        assert!(matches!(
            err,
            EdsError::TypeResolution {
                index: 0x2000,
                subindex: 0,
                code: Some(0x0010)
            }
        ));
    }

    #[test]
    fn test_custom_data_type_definition_is_followed() {
        let var = build(
            "[2000]\nParameterName=X\nDataType=0x00A0\n[A0sub1]\nDefaultValue=0x0007\n",
            "2000",
        )
        .unwrap();
        assert_eq!(var.data_type, Some(DataType::Unsigned32));
    }

    #[test]
    fn test_malformed_default_fails_with_site() {
        let err = build("[2000]\nParameterName=X\nDataType=0x0007\nDefaultValue=zz\n", "2000").unwrap_err();
        assert!(matches!(
            err,
            EdsError::ValueParse { index: 0x2000, subindex: 0, field: "DefaultValue", ref literal } if literal == "zz"
        ));
    }

    #[test]
    fn test_node_id_relative_default() {
        let var = build(
            "[2000]\nParameterName=COB-ID\nDataType=0x0007\nDefaultValue=$NODEID+0x180\n",
            "2000",
        )
        .unwrap();
        assert_eq!(var.default, Some(Value::Unsigned(0x182)));
    }

    #[test]
    fn test_domain_drops_default() {
        let var = build("[2000]\nParameterName=Blob\nDataType=0x000F\nDefaultValue=0x01\n", "2000").unwrap();
        assert_eq!(var.data_type, Some(DataType::Domain));
        assert_eq!(var.default, None);
    }

    #[test]
    fn test_value_descriptions_and_bit_definitions() {
        let var = build(
            "[2000]\nParameterName=State\nDataType=0x0005\nValueDescription.0=Idle\nValueDescription.0x10=Running\nBitDefinition.Ready=0\nBitDefinition.Mode=1, 2\n",
            "2000",
        )
        .unwrap();
        assert_eq!(var.value_descriptions.get(&0).map(String::as_str), Some("Idle"));
        assert_eq!(var.value_descriptions.get(&16).map(String::as_str), Some("Running"));
        assert_eq!(var.bit_definitions.get("Ready"), Some(&vec![0]));
        assert_eq!(var.bit_definitions.get("Mode"), Some(&vec![1, 2]));
    }

    #[test]
    fn test_bad_bit_definition_fails() {
        let err = build("[2000]\nParameterName=State\nDataType=5\nBitDefinition.Ready=x\n", "2000").unwrap_err();
        assert!(matches!(err, EdsError::ValueParse { field: "BitDefinition", .. }));
    }

    #[test]
    fn test_missing_parameter_name_uses_section_name() {
        let var = build("[2000]\nDataType=5\n", "2000").unwrap();
        assert_eq!(var.name, "2000");
    }
}
