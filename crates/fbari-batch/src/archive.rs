//! ZIP packaging of batch results.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use fbari_models::{OutputFormat, PhotoRef};

use crate::error::{BatchError, BatchResult};

/// Archive entry name for one processed photo:
/// `<originalBaseName>_processed.<ext>`.
pub fn entry_name(photo: &PhotoRef, format: OutputFormat) -> String {
    format!("{}_processed.{}", photo.base_name(), format.extension())
}

/// Build an in-memory ZIP from named byte entries.
pub fn build_archive<'a>(
    entries: impl IntoIterator<Item = (String, &'a [u8])>,
) -> BatchResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in entries {
        writer
            .start_file(&name, options)
            .map_err(|e| BatchError::archive(format!("{name}: {e}")))?;
        writer.write_all(bytes)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| BatchError::archive(e.to_string()))?;
    Ok(cursor.into_inner())
}
