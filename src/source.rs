//! Source configuration and glob expansion.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use glob::MatchOptions;
use serde::Deserialize;
use tracing::debug;

use crate::error::{UploadError, UploadResult};
use crate::padded::{HeaderLength, PaddedCsvReader, padded_csv_reader};

/// A concrete padded CSV file plus how to read it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CsvSource {
    /// File to read.
    pub path: PathBuf,
    /// Where the CSV header starts.
    pub header_length: HeaderLength,
    /// Column renames applied after parsing (`original -> new`). Absent columns are ignored.
    #[serde(default)]
    pub remap: BTreeMap<String, String>,
}

impl CsvSource {
    /// Open the file and position a reader on its data region.
    ///
    /// The file handle lives inside the returned reader and is closed when it is dropped.
    pub fn open(&self) -> UploadResult<PaddedCsvReader<BufReader<File>>> {
        let file = File::open(&self.path).map_err(|source| UploadError::SourceOpen {
            path: self.path.clone(),
            source,
        })?;
        padded_csv_reader(BufReader::new(file), self.header_length)
    }
}

/// A glob pattern whose matches share one header policy and rename map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CsvSourceGlob {
    /// Pattern such as `exports/**/*.csv`.
    pub glob: String,
    pub header_length: HeaderLength,
    #[serde(default)]
    pub remap: BTreeMap<String, String>,
}

impl CsvSourceGlob {
    pub fn new(glob: impl Into<String>, header_length: HeaderLength) -> Self {
        Self {
            glob: glob.into(),
            header_length,
            remap: BTreeMap::new(),
        }
    }

    /// Builder-style rename map.
    pub fn with_remap<K, V>(mut self, remap: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.remap = remap.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Resolve the pattern against the filesystem now.
    ///
    /// Matches are produced lazily in traversal order (`**` recurses); each becomes a
    /// [`CsvSource`] sharing this glob's header policy and rename map. No match is not an
    /// error. A malformed pattern fails immediately; an unreadable directory surfaces as an
    /// error item. As in a shell, `*`, `?` and `**` never match a leading `.`, so hidden files
    /// such as `._report.csv` are only picked up when the pattern names the dot literally.
    pub fn expand(&self) -> UploadResult<impl Iterator<Item = UploadResult<CsvSource>> + '_> {
        let options = MatchOptions {
            require_literal_leading_dot: true,
            ..MatchOptions::new()
        };
        let paths = glob::glob_with(&self.glob, options)?;
        Ok(paths.map(move |entry| {
            let path = entry?;
            debug!(pattern = %self.glob, path = %path.display(), "expanded source");
            Ok(CsvSource {
                path,
                header_length: self.header_length,
                remap: self.remap.clone(),
            })
        }))
    }
}
