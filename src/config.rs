//! Loading [`UploadCsv`] task definitions from YAML or JSON files.
//!
//! ```yaml
//! table:
//!   name: sales
//!   schema: main
//! index: rowid
//! sources:
//!   - glob: exports/**/*.csv
//!     header_length: auto
//!     remap:
//!       "Sales Amount": amount
//!   - glob: legacy/*.csv
//!     header_length: 4
//! read_csv_args:
//!   delimiter: ","
//!   dtypes:
//!     amount: float64
//! ```

use std::path::Path;

use crate::error::{UploadError, UploadResult};
use crate::upload::UploadCsv;

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Parse a config format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Load an upload task from `path`, choosing the format from its extension.
pub fn load_upload_config(path: impl AsRef<Path>) -> UploadResult<UploadCsv> {
    let path = path.as_ref();
    let format = infer_format_from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    parse_upload_config(&text, format)
}

/// Parse an upload task from in-memory text.
pub fn parse_upload_config(text: &str, format: ConfigFormat) -> UploadResult<UploadCsv> {
    let task = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(text)?,
        ConfigFormat::Json => serde_json::from_str(text)?,
    };
    Ok(task)
}

fn infer_format_from_path(path: &Path) -> UploadResult<ConfigFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| UploadError::Config {
            message: format!("cannot infer config format: path has no extension ({})", path.display()),
        })?;

    ConfigFormat::from_extension(ext).ok_or_else(|| UploadError::Config {
        message: format!(
            "cannot infer config format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}
