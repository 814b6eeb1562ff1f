//! JSON parameter files.
//!
//! Every field of [`ExposureBoundsParams`] is optional in the file; missing
//! fields keep their defaults.

use std::fs;
use std::path::Path;

use crate::core::ExposureBoundsParams;
use crate::error::CropError;

/// Load detector parameters from a JSON file and validate them.
pub fn load_params(path: impl AsRef<Path>) -> Result<ExposureBoundsParams, CropError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| CropError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let params = parse_params(&raw).map_err(|source| CropError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    params.validate().map_err(crate::core::DetectError::from)?;
    Ok(params)
}

fn parse_params(raw: &str) -> Result<ExposureBoundsParams, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Write parameters as pretty JSON.
pub fn write_params(
    params: &ExposureBoundsParams,
    path: impl AsRef<Path>,
) -> Result<(), CropError> {
    let path = path.as_ref();
    let to_io = |source| CropError::ReportWrite {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_string_pretty(params)
        .map_err(std::io::Error::from)
        .map_err(to_io)?;
    fs::write(path, json).map_err(to_io)
}
