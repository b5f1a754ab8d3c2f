//! Unpacking of original-file downloads.

use crate::{GarminError, OriginalFile};
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

/// Locate the entry whose base name equals `activity_id` and return it.
///
/// Returns `Ok(None)` when the archive holds no such entry.
pub fn extract_activity_file(
    archive: &[u8],
    activity_id: u64,
) -> Result<Option<OriginalFile>, GarminError> {
    let wanted = activity_id.to_string();
    let mut zip = ZipArchive::new(Cursor::new(archive))?;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let (stem, extension) = {
            let path = Path::new(entry.name());
            (
                path.file_stem().and_then(|s| s.to_str()).map(str::to_owned),
                path.extension()
                    .and_then(|s| s.to_str())
                    .map(str::to_ascii_lowercase)
                    .unwrap_or_default(),
            )
        };
        if stem.as_deref() != Some(wanted.as_str()) {
            continue;
        }
        let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or_default());
        entry.read_to_end(&mut bytes)?;
        return Ok(Some(OriginalFile { extension, bytes }));
    }
    Ok(None)
}
