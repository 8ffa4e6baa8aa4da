//! publish::parts
//!
//! Encoding an artifact directory as definition parts.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::core::fsutil::{self, FsError};
use crate::workspace::DefinitionPart;

/// Every file under `dir`, sorted by relative path, base64-encoded.
pub fn collect_parts(dir: &Path) -> Result<Vec<DefinitionPart>, FsError> {
    fsutil::list_files(dir)?
        .into_iter()
        .map(|(relative, path)| {
            let bytes = fsutil::read_bytes(&path)?;
            Ok(DefinitionPart::inline_base64(relative, STANDARD.encode(bytes)))
        })
        .collect()
}
