// crates/canopen-eds/src/parser.rs

use crate::error::EdsError;
use crate::od::ObjectDictionary;
use crate::resolver;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use log::{info, trace};

/// Parses an EDS (Electronic Data Sheet) document into an `ObjectDictionary`.
///
/// `node_id` is not read from the document. It is stored on the resulting
/// dictionary and added to `$NODEID`-relative literals (e.g. COB-IDs).
///
/// # Errors
/// Returns `EdsError::MalformedDocument` if the text cannot be split into
/// sections, `EdsError::TypeResolution` for a `DataType` outside the supported
/// vocabulary, and `EdsError::ValueParse` for literals that do not match
/// their declared type.
pub fn parse_eds(document_text: &str, node_id: Option<u8>) -> Result<ObjectDictionary, EdsError> {
    let document = Document::parse(document_text)?;
    let od = resolver::resolve_object_dictionary(&document, node_id)?;
    info!(
        "Parsed EDS: {} sections, {} objects",
        document.sections.len(),
        od.len()
    );
    Ok(od)
}

/// One `key=value` line of a section.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    /// Key as written in the document. Lookups use the lower-cased form.
    pub key: String,
    pub value: String,
    pub line: usize,
}

/// A named `[section]` and its entries.
#[derive(Debug, Clone)]
pub(crate) struct Section {
    pub name: String,
    pub line: usize,
    entries: BTreeMap<String, Entry>,
}

impl Section {
    /// Case-insensitive key lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entry(key).map(|e| e.value.as_str())
    }

    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(&key.to_ascii_lowercase())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    /// Entries whose key starts with `prefix` (case-insensitive), paired with
    /// the remainder of the key in its original spelling.
    pub fn entries_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Entry)> + 'a {
        let lowered = prefix.to_ascii_lowercase();
        self.entries
            .iter()
            .filter(move |(k, _)| k.starts_with(lowered.as_str()))
            .map(move |(_, e)| (&e.key[prefix.len()..], e))
    }
}

/// An EDS file split into sections, in document order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Document {
    pub sections: Vec<Section>,
    by_name: BTreeMap<String, usize>,
}

impl Document {
    /// Splits `text` into sections.
    ///
    /// Lines starting with `;` or `#` are comments. Entries use `=` or `:`
    /// as delimiter, whichever comes first. Keys are case-insensitive, section
    /// names are not.
    pub fn parse(text: &str) -> Result<Self, EdsError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut doc = Document::default();

        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let name = rest
                    .rfind(']')
                    .map(|end| rest[..end].trim())
                    .ok_or(EdsError::MalformedDocument {
                        line,
                        reason: "unterminated section header",
                    })?;
                if name.is_empty() {
                    return Err(EdsError::MalformedDocument {
                        line,
                        reason: "empty section name",
                    });
                }
                if doc.by_name.contains_key(name) {
                    return Err(EdsError::MalformedDocument {
                        line,
                        reason: "duplicate section",
                    });
                }
                trace!("Section [{}] at line {}", name, line);
                doc.by_name.insert(name.to_string(), doc.sections.len());
                doc.sections.push(Section {
                    name: name.to_string(),
                    line,
                    entries: BTreeMap::new(),
                });
                continue;
            }

            let split_at = trimmed
                .find(['=', ':'])
                .ok_or(EdsError::MalformedDocument {
                    line,
                    reason: "expected 'key=value' or '[section]'",
                })?;
            let key = trimmed[..split_at].trim();
            let value = trimmed[split_at + 1..].trim();
            if key.is_empty() {
                return Err(EdsError::MalformedDocument {
                    line,
                    reason: "entry without a key",
                });
            }
            let section = doc.sections.last_mut().ok_or(EdsError::MalformedDocument {
                line,
                reason: "entry before the first section header",
            })?;
            let lowered = key.to_ascii_lowercase();
            if section.entries.contains_key(&lowered) {
                return Err(EdsError::MalformedDocument {
                    line,
                    reason: "duplicate key in section",
                });
            }
            section.entries.insert(
                lowered,
                Entry {
                    key: key.to_string(),
                    value: value.to_string(),
                    line,
                },
            );
        }

        if doc.sections.is_empty() {
            return Err(EdsError::MalformedDocument {
                line: 0,
                reason: "document contains no sections",
            });
        }
        Ok(doc)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.by_name.get(name).map(|&i| &self.sections[i])
    }
}
