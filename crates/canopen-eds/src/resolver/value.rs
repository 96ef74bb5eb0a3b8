// crates/canopen-eds/src/resolver/value.rs

//! Type-directed parsing of EDS literals.

use crate::error::EdsError;
use crate::types::{DataType, Value};
use alloc::string::{String, ToString};
use log::trace;

/// Where a literal came from, for error reporting.
#[derive(Debug, Clone, Copy)]
pub(super) struct Site {
    pub index: u16,
    pub subindex: u8,
    pub field: &'static str,
}

impl Site {
    pub(super) fn error(&self, literal: &str) -> EdsError {
        EdsError::ValueParse {
            index: self.index,
            subindex: self.subindex,
            field: self.field,
            literal: literal.to_string(),
        }
    }
}

/// Parses `literal` according to `data_type`.
///
/// Returns `Ok(None)` for DOMAIN (which never carries a value) and for an
/// empty literal on a numeric type.
pub(super) fn parse_value(
    site: Site,
    data_type: DataType,
    literal: &str,
    node_id: Option<u8>,
) -> Result<Option<Value>, EdsError> {
    if data_type == DataType::Domain {
        return Ok(None);
    }
    if data_type.is_string() {
        return Ok(Some(Value::Text(String::from(literal))));
    }
    if literal.trim().is_empty() {
        trace!(
            "Empty {} for 0x{:04X}sub{:02X} treated as absent",
            site.field, site.index, site.subindex
        );
        return Ok(None);
    }

    let parsed = match data_type {
        DataType::Boolean => parse_boolean(literal, node_id).map(Value::Boolean),
        dt if dt.is_float() => parse_float(literal, dt).map(Value::Float),
        dt => parse_integer(literal, node_id).and_then(|v| {
            let (min, max) = dt.integer_range()?;
            if v < min || v > max {
                None
            } else if dt.is_signed() {
                Some(Value::Signed(v as i64))
            } else {
                Some(Value::Unsigned(v as u64))
            }
        }),
    };
    parsed.map(Some).ok_or_else(|| site.error(literal))
}

/// Parses an integer literal in decimal or `0x` hexadecimal form, with an
/// optional sign and an optional `$NODEID+` term.
///
/// Whitespace anywhere in the literal is ignored. A `$NODEID` term without a
/// node id fails.
pub(crate) fn parse_integer(literal: &str, node_id: Option<u8>) -> Option<i128> {
    let compact: String = literal
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    let (expr, offset) = if let Some(rest) = compact.strip_prefix("$NODEID+") {
        (rest, Some(node_id? as i128))
    } else if let Some(rest) = compact.strip_suffix("+$NODEID") {
        (rest, Some(node_id? as i128))
    } else {
        (compact.as_str(), None)
    };

    let (negative, unsigned) = match expr.as_bytes().first() {
        Some(b'-') => (true, &expr[1..]),
        Some(b'+') => (false, &expr[1..]),
        _ => (false, expr),
    };
    let magnitude = match unsigned.strip_prefix("0X") {
        Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => u64::from_str_radix(hex, 16).ok()?,
        Some(_) => return None,
        None if unsigned.bytes().all(|b| b.is_ascii_digit()) => unsigned.parse::<u64>().ok()?,
        None => return None,
    } as i128;

    let value = if negative { -magnitude } else { magnitude };
    Some(value + offset.unwrap_or(0))
}

fn parse_boolean(literal: &str, node_id: Option<u8>) -> Option<bool> {
    match literal.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        other => match parse_integer(other, node_id)? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        },
    }
}

fn parse_float(literal: &str, data_type: DataType) -> Option<f64> {
    let value = literal.trim().parse::<f64>().ok()?;
    let finite = match data_type {
        DataType::Real32 => (value as f32).is_finite(),
        _ => value.is_finite(),
    };
    finite.then_some(value)
}
