//! Schema locations: absolute URLs without fragment.

use url::Url;

use crate::error::{Result, SchemaError};

/// Schemes a [`SchemaFetcher`](crate::fetcher::SchemaFetcher) can load.
pub const SUPPORTED_SCHEMES: [&str; 3] = ["file", "http", "https"];

/// Drop the fragment; two locations naming the same document must share a key.
pub fn normalize(mut location: Url) -> Url {
    location.set_fragment(None);
    location
}

/// Resolve a `$ref` value relative to the document that contains it.
pub fn resolve_reference(base: &Url, reference: &str) -> Result<Url> {
    let malformed = |reason: String| SchemaError::MalformedReference {
        location: base.to_string(),
        reference: reference.to_string(),
        reason,
    };

    let resolved = base.join(reference).map_err(|e| malformed(e.to_string()))?;
    if !SUPPORTED_SCHEMES.contains(&resolved.scheme()) {
        return Err(malformed(format!(
            "unsupported scheme '{}'",
            resolved.scheme()
        )));
    }
    Ok(normalize(resolved))
}
