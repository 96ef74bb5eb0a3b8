// crates/canopen-eds/src/resolver/mod.rs

//! Turns a sectioned EDS `Document` into a typed `ObjectDictionary`.

mod value;
mod variable;

use crate::error::EdsError;
use crate::od::{Array, Object, ObjectDictionary, Record, TEMPLATE_SUBINDEX, Variable};
use crate::parser::{Document, Section};
use crate::types::{AccessType, DataType, Value};
use alloc::format;
use log::{debug, trace, warn};
use value::parse_integer;
use variable::{build_variable, parameter_name};

// --- ObjectType codes (CiA 306) ---
const OBJECT_TYPE_DOMAIN: i128 = 0x2;
const OBJECT_TYPE_VAR: i128 = 0x7;
const OBJECT_TYPE_RECORD: i128 = 0x8;
const OBJECT_TYPE_ARRAY: i128 = 0x9;

/// Highest `Dummy000i` entry of the `[DummyUsage]` section.
const DUMMY_TYPES: u16 = 7;

/// What a section name addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    /// `[1018]`
    Object(u16),
    /// `[1018sub1]`
    SubObject(u16, u8),
    /// `[1003Name]`, the member names of a compact array.
    NameList(u16),
    /// `[DummyUsage]`
    DummyUsage,
    /// `[DeviceComissioning]`
    Commissioning,
    Other,
}

/// Builds the object dictionary from all sections of `doc`.
///
/// Top-level objects are built first, then subindex sections are attached
/// to their parents, then compact name lists are expanded. Document order is
/// therefore irrelevant.
pub(crate) fn resolve_object_dictionary(
    doc: &Document,
    node_id: Option<u8>,
) -> Result<ObjectDictionary, EdsError> {
    let mut od = ObjectDictionary::new();
    od.node_id = node_id;

    let kinds = doc
        .sections
        .iter()
        .map(|s| classify(s).map(|kind| (s, kind)))
        .collect::<Result<alloc::vec::Vec<_>, _>>()?;

    for (section, kind) in &kinds {
        match kind {
            SectionKind::Commissioning => resolve_commissioning(section, &mut od)?,
            SectionKind::DummyUsage => resolve_dummy_usage(section, &mut od)?,
            SectionKind::Object(index) => resolve_object(doc, section, *index, node_id, &mut od)?,
            _ => {}
        }
    }

    for (section, kind) in &kinds {
        if let SectionKind::SubObject(index, subindex) = kind {
            resolve_sub_object(doc, section, *index, *subindex, node_id, &mut od)?;
        }
    }

    for (section, kind) in &kinds {
        if let SectionKind::NameList(index) = kind {
            resolve_name_list(section, *index, &mut od)?;
        }
    }

    Ok(od)
}

fn classify(section: &Section) -> Result<SectionKind, EdsError> {
    let name = section.name.as_str();
    let is_hex4 = |s: &str| s.len() == 4 && s.bytes().all(|b| b.is_ascii_hexdigit());

    if name.eq_ignore_ascii_case("DummyUsage") {
        return Ok(SectionKind::DummyUsage);
    }
    if name.eq_ignore_ascii_case("DeviceComissioning") {
        return Ok(SectionKind::Commissioning);
    }
    if is_hex4(name) {
        return Ok(SectionKind::Object(parse_hex_u16(name)));
    }
    if name.len() > 7 && name.is_char_boundary(4) && is_hex4(&name[..4]) {
        let (head, tail) = name.split_at(4);
        let index = parse_hex_u16(head);
        if let Some(sub) = tail.strip_prefix("sub").or_else(|| tail.strip_prefix("Sub")) {
            if !sub.is_empty() && sub.bytes().all(|b| b.is_ascii_hexdigit()) {
                let subindex = u8::from_str_radix(sub, 16).map_err(|_| EdsError::MalformedDocument {
                    line: section.line,
                    reason: "subindex section above 0xFF",
                })?;
                return Ok(SectionKind::SubObject(index, subindex));
            }
        }
        if tail == "Name" {
            return Ok(SectionKind::NameList(index));
        }
    }
    Ok(SectionKind::Other)
}

// Only called on four validated hex digits.
fn parse_hex_u16(s: &str) -> u16 {
    u16::from_str_radix(s, 16).unwrap_or_default()
}

fn resolve_object(
    doc: &Document,
    section: &Section,
    index: u16,
    node_id: Option<u8>,
    od: &mut ObjectDictionary,
) -> Result<(), EdsError> {
    let object_type = match section.entry("ObjectType") {
        // DS306 4.6.3.2: a missing ObjectType means VAR.
        None => OBJECT_TYPE_VAR,
        Some(entry) => parse_integer(&entry.value, None).ok_or(EdsError::MalformedDocument {
            line: entry.line,
            reason: "ObjectType is not an integer",
        })?,
    };

    let object = match object_type {
        OBJECT_TYPE_VAR | OBJECT_TYPE_DOMAIN => {
            Object::Variable(build_variable(doc, section, index, 0, node_id)?)
        }
        OBJECT_TYPE_RECORD | OBJECT_TYPE_ARRAY if section.contains("CompactSubObj") => {
            Object::Array(build_compact_array(doc, section, index, node_id)?)
        }
        OBJECT_TYPE_RECORD => {
            let mut record = Record::new(parameter_name(section), index);
            record.description = section.get("Description").unwrap_or_default().into();
            Object::Record(record)
        }
        OBJECT_TYPE_ARRAY => {
            let mut array = Array::new(parameter_name(section), index);
            array.description = section.get("Description").unwrap_or_default().into();
            Object::Array(array)
        }
        _ => {
            return Err(EdsError::MalformedDocument {
                line: section.entry("ObjectType").map_or(section.line, |e| e.line),
                reason: "unsupported ObjectType",
            });
        }
    };

    debug!("0x{:04X} '{}' built from [{}]", index, object.name(), section.name);
    od.add_object(object);
    Ok(())
}

/// An array declared with `CompactSubObj=N`: sub 0 holds the entry count and
/// sub 1, built from the section itself, is the template for the rest.
fn build_compact_array(
    doc: &Document,
    section: &Section,
    index: u16,
    node_id: Option<u8>,
) -> Result<Array, EdsError> {
    let mut array = Array::new(parameter_name(section), index);

    let mut count = Variable::new("Number of entries", index, 0);
    count.data_type = Some(DataType::Unsigned8);
    count.access_type = AccessType::ReadOnly;
    if let Some(entry) = section.entry("CompactSubObj") {
        let n = parse_integer(&entry.value, None)
            .and_then(|v| u8::try_from(v).ok())
            .ok_or(EdsError::MalformedDocument {
                line: entry.line,
                reason: "CompactSubObj is not a subindex count",
            })?;
        count.default = Some(Value::Unsigned(n as u64));
    }
    array.add_member(count);
    array.add_member(build_variable(doc, section, index, TEMPLATE_SUBINDEX, node_id)?);
    Ok(array)
}

fn resolve_sub_object(
    doc: &Document,
    section: &Section,
    index: u16,
    subindex: u8,
    node_id: Option<u8>,
    od: &mut ObjectDictionary,
) -> Result<(), EdsError> {
    // Build before borrowing the parent mutably.
    let var = build_variable(doc, section, index, subindex, node_id)?;
    match od.get_mut(index)? {
        Object::Record(record) => record.add_member(var),
        Object::Array(array) => array.add_member(var),
        Object::Variable(_) => {
            warn!(
                "[{}] ignored: 0x{:04X} is a plain variable",
                section.name, index
            );
            return Ok(());
        }
    }
    trace!("0x{:04X}sub{:02X} attached from [{}]", index, subindex, section.name);
    Ok(())
}

/// Expands `[xxxxName]` (`NrOfEntries=N`, `1=<name>` .. `N=<name>`) into
/// members cloned from subindex 1.
fn resolve_name_list(
    section: &Section,
    index: u16,
    od: &mut ObjectDictionary,
) -> Result<(), EdsError> {
    let entries = section
        .entry("NrOfEntries")
        .map(|entry| {
            parse_integer(&entry.value, None)
                .and_then(|v| u8::try_from(v).ok())
                .ok_or(EdsError::MalformedDocument {
                    line: entry.line,
                    reason: "NrOfEntries is not a subindex count",
                })
        })
        .transpose()?
        .unwrap_or(0);

    let template = match od.get(index)? {
        Object::Array(array) => array.get(TEMPLATE_SUBINDEX as u16)?.into_owned(),
        Object::Record(record) => record.get(TEMPLATE_SUBINDEX)?.clone(),
        Object::Variable(_) => {
            warn!("[{}] ignored: 0x{:04X} is a plain variable", section.name, index);
            return Ok(());
        }
    };

    for subindex in 1..=entries {
        let Some(name) = section.get(&format!("{}", subindex)) else {
            continue;
        };
        let mut var = template.clone();
        var.name = name.into();
        var.subindex = subindex;
        match od.get_mut(index)? {
            Object::Array(array) => array.add_member(var),
            Object::Record(record) => record.add_member(var),
            Object::Variable(_) => {}
        }
    }
    Ok(())
}

/// `[DeviceComissioning]`: `Baudrate` is given in kbit/s. `NodeID` is not
/// read, the node id comes from the caller.
fn resolve_commissioning(section: &Section, od: &mut ObjectDictionary) -> Result<(), EdsError> {
    if let Some(entry) = section.entry("Baudrate") {
        let kbit = parse_integer(&entry.value, None)
            .and_then(|v| u32::try_from(v * 1000).ok())
            .ok_or(EdsError::MalformedDocument {
                line: entry.line,
                reason: "Baudrate is not an integer",
            })?;
        od.bitrate = Some(kbit);
    }
    Ok(())
}

/// `[DummyUsage]`: `Dummy000i=1` publishes a constant object at index `i`
/// with data type code `i`, used as a placeholder in PDO mappings.
fn resolve_dummy_usage(section: &Section, od: &mut ObjectDictionary) -> Result<(), EdsError> {
    for i in 1..=DUMMY_TYPES {
        let key = format!("Dummy{:04}", i);
        let Some(entry) = section.entry(&key) else {
            continue;
        };
        if parse_integer(&entry.value, None) != Some(1) {
            continue;
        }
        let mut var = Variable::new(key, i, 0);
        var.data_type = DataType::try_from(i).ok();
        var.access_type = AccessType::Constant;
        od.add_object(var);
    }
    Ok(())
}
