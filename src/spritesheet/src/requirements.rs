//! Sheet allow-list
//!
//! The requirements file is a flat JSON array of sheet names produced by a
//! separate label-correlation step. When it is missing the export falls back
//! to every sheet, and says so in the log.

use std::collections::HashSet;
use std::path::Path;

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Requirements {
    /// No allow-list in effect, every sheet is exported
    #[default]
    All,
    /// Only sheets whose name is in the set; an empty set exports nothing
    Only(HashSet<String>),
}

impl Requirements {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Requirements::Only(names.into_iter().map(Into::into).collect())
    }

    /// Load the allow-list from `path`
    ///
    /// A missing or unreadable file, or a JSON `null`, degrades to
    /// [`Requirements::All`] with a warning. Malformed JSON is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "no requirements file found, exporting all sheets"
                );
                return Ok(Requirements::All);
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "requirements file unreadable, exporting all sheets"
                );
                return Ok(Requirements::All);
            }
        };

        let names: Option<Vec<String>> =
            serde_json::from_str(&contents).map_err(|source| Error::Json {
                path: path.to_path_buf(),
                source,
            })?;

        match names {
            Some(names) => {
                tracing::info!(
                    path = %path.display(),
                    count = names.len(),
                    "loaded sheet requirements"
                );
                Ok(Requirements::only(names))
            }
            None => {
                tracing::warn!(
                    path = %path.display(),
                    "requirements file is null, exporting all sheets"
                );
                Ok(Requirements::All)
            }
        }
    }

    /// Exact, case-sensitive membership
    pub fn allows(&self, sheet_name: &str) -> bool {
        match self {
            Requirements::All => true,
            Requirements::Only(names) => names.contains(sheet_name),
        }
    }

    pub fn is_filtering(&self) -> bool {
        matches!(self, Requirements::Only(_))
    }
}
