use lumar_core::config::LumarConfig;

use crate::error::PersistError;
use crate::format::{SaveHeader, FORMAT_VERSION, MAGIC};

/// Validate a save file header and return any compatibility warnings.
///
/// Returns Ok(warnings) on success, Err on fatal errors.
/// A grid spacing mismatch produces a warning, not an error.
pub fn validate_header(
    header: &SaveHeader,
    config: &LumarConfig,
) -> Result<Vec<String>, PersistError> {
    if header.magic != MAGIC {
        return Err(PersistError::InvalidMagic);
    }

    if header.version != FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion(header.version));
    }

    let mut warnings = Vec::new();

    // Known sets computed on another grid are meaningless; they get dropped
    // and rebuilt on the observers' next update.
    if header.grid_spacing != config.grid_spacing {
        warnings.push(format!(
            "Grid spacing has changed since this save was created \
             (save: {}, current: {}). Stored known locations are discarded.",
            header.grid_spacing, config.grid_spacing
        ));
    }

    Ok(warnings)
}
