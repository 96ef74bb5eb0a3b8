// crates/canopen-eds/src/generate.rs

use crate::config::EmitterConfig;
use crate::emitter::emit;
use crate::error::EdsError;
use crate::od::ObjectDictionary;
use crate::parser::parse_eds;
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Parses the EDS file at `source` and writes the generated declarations to
/// `destination`.
///
/// The directory containing `destination` must already exist; this is
/// checked before `source` is read. The output is rendered in memory first,
/// so a parse or emission error leaves `destination` untouched. An I/O error
/// while writing may leave a partial file behind.
///
/// Returns the parsed dictionary for inspection.
pub fn generate(
    source: &Path,
    destination: &Path,
    node_id: Option<u8>,
    config: &EmitterConfig,
) -> Result<ObjectDictionary, EdsError> {
    check_destination(destination)?;

    let text = fs::read_to_string(source)?;
    let od = parse_eds(&text, node_id)?;

    let mut rendered = String::new();
    emit(&od, config, &mut rendered)?;

    let file = File::create(destination).map_err(|e| EdsError::DestinationUnavailable {
        path: destination.display().to_string(),
        reason: e.to_string(),
    })?;
    let mut writer = BufWriter::new(file);
    writer.write_all(rendered.as_bytes())?;
    writer.flush()?;

    info!(
        "Generated {} from {} ({} objects)",
        destination.display(),
        source.display(),
        od.len()
    );
    Ok(od)
}

fn check_destination(destination: &Path) -> Result<(), EdsError> {
    let unavailable = |reason: &str| EdsError::DestinationUnavailable {
        path: destination.display().to_string(),
        reason: reason.to_string(),
    };
    if destination.is_dir() {
        return Err(unavailable("destination is a directory"));
    }
    // A bare file name has an empty parent: the current directory.
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(unavailable("parent directory does not exist"))
        }
        _ => Ok(()),
    }
}
