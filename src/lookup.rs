//! Mapping from schema names to schema locations.

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{Result, SchemaError};
use crate::location;

/// Resolves a short schema name, such as `person`, to a location.
pub trait SchemaLookup {
    fn schema_url(&self, name: &str) -> Result<Url>;
}

/// Looks schemas up as files under a base directory.
///
/// `person` resolves to `<base>/person`, or `<base>/person.json` when the
/// bare name does not exist.
#[derive(Debug, Clone)]
pub struct DirectorySchemaLookup {
    base_dir: PathBuf,
}

impl DirectorySchemaLookup {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl SchemaLookup for DirectorySchemaLookup {
    fn schema_url(&self, name: &str) -> Result<Url> {
        let candidates = [
            self.base_dir.join(name),
            self.base_dir.join(format!("{}.json", name)),
        ];

        candidates
            .iter()
            .find(|path| path.is_file())
            .and_then(|path| file_url(path))
            .ok_or_else(|| SchemaError::SchemaNotFound {
                location: self.base_dir.join(name).display().to_string(),
            })
    }
}

/// Turn a command-line schema argument into a location.
///
/// Absolute URLs are taken as they are, existing files become `file:` URLs,
/// and anything else is handed to `lookup` as a name.
pub fn resolve_location(input: &str, lookup: Option<&dyn SchemaLookup>) -> Result<Url> {
    if let Ok(url) = Url::parse(input)
        && location::SUPPORTED_SCHEMES.contains(&url.scheme())
    {
        return Ok(location::normalize(url));
    }

    let path = Path::new(input);
    if path.is_file() {
        return file_url(path).ok_or_else(|| SchemaError::SchemaNotFound {
            location: input.to_string(),
        });
    }

    match lookup {
        Some(lookup) => lookup.schema_url(input),
        None => Err(SchemaError::SchemaNotFound {
            location: input.to_string(),
        }),
    }
}

fn file_url(path: &Path) -> Option<Url> {
    let absolute = std::fs::canonicalize(path).ok()?;
    Url::from_file_path(absolute).ok()
}
