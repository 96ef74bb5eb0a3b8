// crates/canopen-eds/src/emitter.rs

//! Serializes an `ObjectDictionary` into Rust declarations.
//!
//! Every variable, including each member of a Record or Array, becomes one
//! `pub const` item. A builder function then assembles those constants into
//! an `ObjectDictionary`. Members are flattened into the same namespace as
//! top-level variables by joining the parent name and the member name; the
//! joined name is derived on the fly, so the dictionary itself is left
//! untouched and emitting it twice yields identical text.

use crate::config::EmitterConfig;
use crate::error::EdsError;
use crate::od::{Object, ObjectDictionary, Variable};
use crate::types::{DataType, Value};
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;
use log::{debug, info};

/// Name of the value enum the emitted defaults are wrapped in.
const VALUE_TYPE: &str = "DataValue";

const HEADER: &str = "// This file is generated from an EDS file. Do not edit it by hand.\n";

/// One emitted constant.
struct Declaration<'a> {
    identifier: String,
    variable: &'a Variable,
}

/// One statement of the builder function.
enum Assembly {
    Variable(String),
    Record { index: u16, members: Vec<String> },
    Array { index: u16, members: Vec<String> },
}

/// Writes the declarations for `od` to `out`.
///
/// The whole text is rendered before anything is written, so `out` receives
/// either the complete output or nothing.
///
/// # Errors
/// Returns `EdsError::InvalidConfig` when `config.builder_name` or
/// `config.module_path` is not valid Rust, `EdsError::TypeResolution` for a
/// variable without a data type and `EdsError::DuplicateIdentifier` when two
/// variables normalize to the same identifier.
pub fn emit<W: Write>(
    od: &ObjectDictionary,
    config: &EmitterConfig,
    out: &mut W,
) -> Result<(), EdsError> {
    check_config(config)?;
    let (declarations, assembly) = project(od, config)?;

    let mut buffer = String::new();
    buffer.push_str(HEADER);
    writeln!(
        buffer,
        "\nuse {}::{{Array, {}, ObjectDictionary, Record, Variable}};\n",
        config.module_path, VALUE_TYPE
    )?;

    for decl in &declarations {
        let var = decl.variable;
        writeln!(buffer, "pub const {}: Variable =", decl.identifier)?;
        writeln!(
            buffer,
            "    Variable::new(0x{:04X}, 0x{:02X}, {});",
            var.index,
            var.subindex,
            default_literal(var)?
        )?;
    }

    writeln!(buffer, "\npub fn {}() -> ObjectDictionary {{", config.builder_name)?;
    writeln!(buffer, "    let mut od = ObjectDictionary::default();")?;
    for step in &assembly {
        match step {
            Assembly::Variable(identifier) => writeln!(buffer, "    od.add_variable({});", identifier)?,
            Assembly::Record { index, members } => write_group(&mut buffer, "record", "Record", *index, members)?,
            Assembly::Array { index, members } => write_group(&mut buffer, "array", "Array", *index, members)?,
        }
    }
    writeln!(buffer, "    od")?;
    writeln!(buffer, "}}")?;

    out.write_str(&buffer)?;
    info!(
        "Emitted {} declarations for {} objects",
        declarations.len(),
        assembly.len()
    );
    Ok(())
}

/// Derives the identifier of a flattened variable name.
///
/// The name is upper-cased, spaces and hyphens become `_`, and `(`, `)` and
/// `%` are dropped. Any other character that cannot appear in a Rust
/// identifier also becomes `_`. The prefix goes through the same mapping but
/// keeps its case. A result starting with a digit gets a leading `_`, and an
/// empty result or a lone `_` becomes `__`.
pub fn identifier(prefix: &str, name: &str) -> String {
    let mut id = String::with_capacity(prefix.len() + name.len() + 1);
    for c in prefix.chars() {
        push_identifier_char(&mut id, c);
    }
    for c in name.chars() {
        push_identifier_char(&mut id, c.to_ascii_uppercase());
    }
    if id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert(0, '_');
    }
    if id.is_empty() || id == "_" {
        id = String::from("__");
    }
    id
}

fn push_identifier_char(id: &mut String, c: char) {
    match c {
        '(' | ')' | '%' => {}
        c if c.is_ascii_alphanumeric() || c == '_' => id.push(c),
        _ => id.push('_'),
    }
}

/// Strict and reserved keywords of Rust 2024.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && s != "_"
}

/// Checks the config fields that are written into the output verbatim.
///
/// `builder_name` must be a non-keyword identifier. `module_path` is a
/// `::`-separated path whose segments are identifiers; `crate`, `self` and
/// `super` are allowed as its segments.
fn check_config(config: &EmitterConfig) -> Result<(), EdsError> {
    let builder = config.builder_name.as_str();
    if !is_plain_identifier(builder) || KEYWORDS.contains(&builder) {
        return Err(EdsError::InvalidConfig {
            field: "builder_name",
            value: config.builder_name.clone(),
        });
    }
    let path_ok = config.module_path.split("::").all(|segment| {
        is_plain_identifier(segment)
            && (!KEYWORDS.contains(&segment) || matches!(segment, "crate" | "self" | "super"))
    });
    if !path_ok {
        return Err(EdsError::InvalidConfig {
            field: "module_path",
            value: config.module_path.clone(),
        });
    }
    Ok(())
}

/// Flattens `od` into declarations and builder steps, in ascending index
/// order, checking every identifier for uniqueness.
fn project<'a>(
    od: &'a ObjectDictionary,
    config: &EmitterConfig,
) -> Result<(Vec<Declaration<'a>>, Vec<Assembly>), EdsError> {
    let mut declarations = Vec::new();
    let mut assembly = Vec::new();
    let mut seen: BTreeMap<String, (u16, u8)> = BTreeMap::new();

    let mut declare = |name: &str, variable: &'a Variable| -> Result<String, EdsError> {
        let id = identifier(&config.prefix, name);
        let here = (variable.index, variable.subindex);
        if let Some(first) = seen.insert(id.clone(), here) {
            return Err(EdsError::DuplicateIdentifier {
                identifier: id,
                first,
                second: here,
            });
        }
        declarations.push(Declaration {
            identifier: id.clone(),
            variable,
        });
        Ok(id)
    };

    for object in od.objects() {
        let step = match object {
            Object::Variable(var) => Assembly::Variable(declare(&var.name, var)?),
            Object::Record(record) => Assembly::Record {
                index: record.index,
                members: record
                    .members()
                    .map(|m| declare(member_name(&record.name, config, &m.name).as_str(), m))
                    .collect::<Result<_, _>>()?,
            },
            Object::Array(array) => Assembly::Array {
                index: array.index,
                members: array
                    .members()
                    .map(|m| declare(member_name(&array.name, config, &m.name).as_str(), m))
                    .collect::<Result<_, _>>()?,
            },
        };
        debug!("0x{:04X} '{}' projected", object.index(), object.name());
        assembly.push(step);
    }

    Ok((declarations, assembly))
}

fn member_name(parent: &str, config: &EmitterConfig, member: &str) -> String {
    format!("{}{}{}", parent, config.member_separator, member)
}

fn write_group(
    buffer: &mut String,
    method: &str,
    type_name: &str,
    index: u16,
    members: &[String],
) -> Result<(), EdsError> {
    writeln!(buffer, "    od.add_{}({} {{", method, type_name)?;
    writeln!(buffer, "        index: 0x{:04X},", index)?;
    if members.is_empty() {
        writeln!(buffer, "        members: vec![],")?;
    } else {
        writeln!(buffer, "        members: vec![")?;
        for member in members {
            writeln!(buffer, "            {},", member)?;
        }
        writeln!(buffer, "        ],")?;
    }
    writeln!(buffer, "    }});")?;
    Ok(())
}

/// Renders the default value of `var` as an `Option<DataValue>` expression.
fn default_literal(var: &Variable) -> Result<String, EdsError> {
    let data_type = var.data_type.ok_or(EdsError::TypeResolution {
        index: var.index,
        subindex: var.subindex,
        code: None,
    })?;
    let default = match &var.default {
        Some(value) if data_type != DataType::Domain => value,
        _ => return Ok("None".into()),
    };

    let tag = data_type.name();
    let body = match default {
        Value::Boolean(b) => format!("{}({})", tag, b),
        Value::Signed(v) if *v < 0 => format!("{}(-{:#x})", tag, v.unsigned_abs()),
        Value::Signed(v) => format!("{}({:#x})", tag, v),
        Value::Unsigned(v) => format!("{}({:#x})", tag, v),
        // `{:?}` always keeps a `.` or an exponent.
        Value::Float(f) => format!("Float({:?})", f),
        Value::Text(s) => format!("String({:?})", s),
    };
    Ok(format!("Some({}::{})", VALUE_TYPE, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::od::{Array, Record};

    fn var(name: &str, index: u16, subindex: u8, data_type: DataType, default: Option<Value>) -> Variable {
        let mut v = Variable::new(name, index, subindex);
        v.data_type = Some(data_type);
        v.default = default;
        v
    }

    fn render(od: &ObjectDictionary) -> Result<String, EdsError> {
        let mut out = String::new();
        emit(od, &EmitterConfig::default(), &mut out)?;
        Ok(out)
    }

    #[test]
    fn test_identifier_normalization() {
        assert_eq!(identifier("OD_", "Error Register"), "OD_ERROR_REGISTER");
        assert_eq!(identifier("OD_", "Vendor-ID (test)"), "OD_VENDOR_ID_TEST");
        assert_eq!(identifier("OD_", "Load 50%"), "OD_LOAD_50");
        assert_eq!(identifier("", "a.b/c"), "A_B_C");
    }

    #[test]
    fn test_identifier_is_always_a_rust_identifier() {
        assert_eq!(identifier("", "1018_Vendor ID"), "_1018_VENDOR_ID");
        assert_eq!(identifier("OD-", "1018_Vendor ID"), "OD_1018_VENDOR_ID");
        assert_eq!(identifier("od_", "Vendor ID"), "od_VENDOR_ID");
        assert_eq!(identifier("", "(%)"), "__");
        assert_eq!(identifier("", "-"), "__");
    }

    #[test]
    fn test_record_without_parameter_name_under_empty_prefix() {
        let mut record = Record::new("1018", 0x1018);
        record.add_member(var("Vendor ID", 0x1018, 1, DataType::Unsigned32, None));
        let mut od = ObjectDictionary::new();
        od.add_object(record);

        for prefix in ["", "OD-"] {
            let config = EmitterConfig {
                prefix: prefix.into(),
                ..EmitterConfig::default()
            };
            let mut text = String::new();
            emit(&od, &config, &mut text).unwrap();
            for line in text.lines().filter(|l| l.starts_with("pub const ")) {
                let id = &line["pub const ".len()..line.find(':').unwrap()];
                assert!(is_plain_identifier(id), "'{}' is not an identifier", id);
                assert!(!id.starts_with(|c: char| c.is_ascii_digit()));
            }
        }
    }

    #[test]
    fn test_invalid_builder_name_and_module_path_are_rejected() {
        let mut od = ObjectDictionary::new();
        od.add_object(var("Error Register", 0x1001, 0, DataType::Unsigned8, None));

        for builder_name in ["", "get od", "1od", "fn", "_"] {
            let config = EmitterConfig {
                builder_name: builder_name.into(),
                ..EmitterConfig::default()
            };
            let mut out = String::new();
            let err = emit(&od, &config, &mut out).unwrap_err();
            assert!(matches!(err, EdsError::InvalidConfig { field: "builder_name", .. }));
            assert!(out.is_empty());
        }
        for module_path in ["", "canopen::", "can-open", "a::fn::b"] {
            let config = EmitterConfig {
                module_path: module_path.into(),
                ..EmitterConfig::default()
            };
            let err = emit(&od, &config, &mut String::new()).unwrap_err();
            assert!(matches!(err, EdsError::InvalidConfig { field: "module_path", .. }));
        }

        let config = EmitterConfig {
            module_path: "super::od".into(),
            ..EmitterConfig::default()
        };
        assert!(emit(&od, &config, &mut String::new()).is_ok());
    }

    #[test]
    fn test_default_literals() {
        let literal = |dt, value| default_literal(&var("x", 0x2000, 0, dt, value)).unwrap();
        assert_eq!(
            literal(DataType::Unsigned32, Some(Value::Unsigned(10))),
            "Some(DataValue::UNSIGNED32(0xa))"
        );
        assert_eq!(
            literal(DataType::Integer8, Some(Value::Signed(-5))),
            "Some(DataValue::INTEGER8(-0x5))"
        );
        assert_eq!(
            literal(DataType::Boolean, Some(Value::Boolean(true))),
            "Some(DataValue::BOOLEAN(true))"
        );
        assert_eq!(
            literal(DataType::Real32, Some(Value::Float(100.0))),
            "Some(DataValue::Float(100.0))"
        );
        assert_eq!(
            literal(DataType::VisibleString, Some(Value::Text("abc".into()))),
            "Some(DataValue::String(\"abc\"))"
        );
        assert_eq!(
            literal(DataType::VisibleString, Some(Value::Text("say \"hi\"".into()))),
            "Some(DataValue::String(\"say \\\"hi\\\"\"))"
        );
        assert_eq!(literal(DataType::Unsigned8, None), "None");
    }

    #[test]
    fn test_domain_emits_none_even_with_default() {
        let blob = var("Blob", 0x2000, 0, DataType::Domain, Some(Value::Text("00".into())));
        assert_eq!(default_literal(&blob).unwrap(), "None");
    }

    #[test]
    fn test_unresolved_data_type_fails() {
        let mut od = ObjectDictionary::new();
        od.add_object(Variable::new("Untyped", 0x2000, 0));
        let mut out = String::new();
        let err = emit(&od, &EmitterConfig::default(), &mut out).unwrap_err();
        assert!(matches!(
            err,
            EdsError::TypeResolution {
                index: 0x2000,
                subindex: 0,
                code: None
            }
        ));
        assert!(out.is_empty(), "no partial output on failure");
    }

    #[test]
    fn test_record_members_are_flattened_in_order() {
        let mut record = Record::new("1018", 0x1018);
        record.add_member(var("Product Code", 0x1018, 2, DataType::Unsigned32, None));
        record.add_member(var("Vendor ID", 0x1018, 1, DataType::Unsigned32, Some(Value::Unsigned(0x123))));
        let mut od = ObjectDictionary::new();
        od.add_object(record);

        let text = render(&od).unwrap();
        assert!(text.contains(
            "pub const OD_1018_VENDOR_ID: Variable =\n    Variable::new(0x1018, 0x01, Some(DataValue::UNSIGNED32(0x123)));\n"
        ));
        assert!(text.contains(
            "pub const OD_1018_PRODUCT_CODE: Variable =\n    Variable::new(0x1018, 0x02, None);\n"
        ));
        assert!(text.contains(
            "    od.add_record(Record {\n        index: 0x1018,\n        members: vec![\n            OD_1018_VENDOR_ID,\n            OD_1018_PRODUCT_CODE,\n        ],\n    });\n"
        ));
        // The model keeps its own member names.
        let Ok(Object::Record(record)) = od.get(0x1018) else {
            panic!("0x1018 is not a record");
        };
        assert_eq!(record.get(1).unwrap().name, "Vendor ID");
    }

    #[test]
    fn test_objects_emitted_in_index_order() {
        let mut od = ObjectDictionary::new();
        od.add_object(var("Producer Heartbeat Time", 0x1017, 0, DataType::Unsigned16, None));
        let mut errors = Array::new("Errors", 0x1003);
        errors.add_member(var("Count", 0x1003, 0, DataType::Unsigned8, None));
        od.add_object(errors);
        od.add_object(var("Device Type", 0x1000, 0, DataType::Unsigned32, None));

        let text = render(&od).unwrap();
        let at = |needle: &str| text.find(needle).unwrap();
        assert!(at("OD_DEVICE_TYPE:") < at("OD_ERRORS_COUNT:"));
        assert!(at("OD_ERRORS_COUNT:") < at("OD_PRODUCER_HEARTBEAT_TIME:"));
        assert!(at("od.add_variable(OD_DEVICE_TYPE)") < at("od.add_array(Array {"));
        assert!(at("od.add_array(Array {") < at("od.add_variable(OD_PRODUCER_HEARTBEAT_TIME)"));
        assert!(text.starts_with(HEADER));
        assert!(text.ends_with("    od\n}\n"));
    }

    #[test]
    fn test_empty_array_emits_empty_member_list() {
        let mut od = ObjectDictionary::new();
        od.add_object(Array::new("Unused", 0x3003));
        let text = render(&od).unwrap();
        assert!(text.contains("        index: 0x3003,\n        members: vec![],\n"));
    }

    #[test]
    fn test_emission_is_repeatable() {
        let mut od = ObjectDictionary::new();
        let mut record = Record::new("Identity", 0x1018);
        record.add_member(var("Vendor ID", 0x1018, 1, DataType::Unsigned32, Some(Value::Unsigned(1))));
        od.add_object(record);
        od.add_object(var("Error Register", 0x1001, 0, DataType::Unsigned8, Some(Value::Unsigned(0))));
        assert_eq!(render(&od).unwrap(), render(&od).unwrap());
    }

    #[test]
    fn test_identifier_collision_is_rejected() {
        let mut od = ObjectDictionary::new();
        od.add_object(var("Error Register", 0x1001, 0, DataType::Unsigned8, None));
        od.add_object(var("Error-Register", 0x2001, 0, DataType::Unsigned8, None));
        let err = render(&od).unwrap_err();
        assert!(matches!(
            err,
            EdsError::DuplicateIdentifier { ref identifier, first: (0x1001, 0), second: (0x2001, 0) }
                if identifier == "OD_ERROR_REGISTER"
        ));
    }

    #[test]
    fn test_custom_config() {
        let config = EmitterConfig {
            prefix: "OBJ_".into(),
            module_path: "crate::od".into(),
            builder_name: "build".into(),
            member_separator: "__".into(),
        };
        let mut record = Record::new("Identity", 0x1018);
        record.add_member(var("Vendor ID", 0x1018, 1, DataType::Unsigned32, None));
        let mut od = ObjectDictionary::new();
        od.add_object(record);

        let mut text = String::new();
        emit(&od, &config, &mut text).unwrap();
        assert!(text.contains("use crate::od::{Array, DataValue, ObjectDictionary, Record, Variable};"));
        assert!(text.contains("pub const OBJ_IDENTITY__VENDOR_ID: Variable ="));
        assert!(text.contains("pub fn build() -> ObjectDictionary {"));
    }
}
