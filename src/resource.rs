//! Packaged resources and raw files
//!
//! Packaged resources live under a single root directory; their paths are
//! taken relative to it whether or not they start with `/`. "Not found" is
//! `Ok(None)`; any other I/O failure is a configuration defect.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{BindingError, Result};

/// Where a path points once classified by schema version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Relative to the resource root
    Resource(String),
    /// Raw filesystem path
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ResourceLoader {
    root: PathBuf,
}

impl ResourceLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path backing a resource name
    pub fn locate(&self, name: &str) -> PathBuf {
        self.root.join(name.trim_start_matches('/'))
    }

    fn path_of(&self, location: &Location) -> PathBuf {
        match location {
            Location::Resource(name) => self.locate(name),
            Location::File(path) => path.clone(),
        }
    }

    /// Full text of a resource or file
    pub fn read_to_string(&self, location: &Location) -> Result<Option<String>> {
        let path = self.path_of(location);
        debug!(path = %path.display(), "reading");
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(BindingError::ResourceRead { path, source }),
        }
    }

    /// First line of a resource or file, without its line terminator
    ///
    /// An empty file has no first line and yields `None`.
    pub fn read_first_line(&self, location: &Location) -> Result<Option<String>> {
        let path = self.path_of(location);
        debug!(path = %path.display(), "reading first line");
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(BindingError::ResourceRead { path, source }),
        };

        let mut line = String::new();
        let read = BufReader::new(file)
            .read_line(&mut line)
            .map_err(|source| BindingError::ResourceRead {
                path: path.clone(),
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }

        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    /// Parse a packaged resource as JSON
    pub fn read_json(&self, name: &str) -> Result<Option<Value>> {
        let Some(text) = self.read_to_string(&Location::Resource(name.to_string()))? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| BindingError::MappingParse {
                path: name.to_string(),
                source,
            })
    }
}
