use std::sync::{Arc, Weak};

use moka::sync::Cache;
use url::Url;

use crate::compiler::SchemaCompiler;
use crate::error::Result;
use crate::fetcher::{DefaultFetcher, SchemaFetcher};
use crate::location;
use crate::schema::SchemaNode;

struct CacheInner {
    schemas: Cache<String, Arc<SchemaNode>>,
    fetcher: Box<dyn SchemaFetcher>,
}

/// Registry of compiled schemas keyed by location.
///
/// This cache stores compiled schema graphs ready for validation. It uses
/// `moka` for concurrent access, and is unbounded so a node that another node
/// refers to is never evicted. A location is registered at most once: when two
/// compilations race, the first registration wins and later ones are dropped.
///
/// Cloning is cheap and yields a handle to the same registry.
#[derive(Clone)]
pub struct SchemaCache {
    inner: Arc<CacheInner>,
}

/// Non-owning handle held by [`SchemaReference`](crate::schema::SchemaReference)
/// nodes.
#[derive(Clone)]
pub struct WeakSchemaCache {
    inner: Weak<CacheInner>,
}

impl WeakSchemaCache {
    pub fn upgrade(&self) -> Option<SchemaCache> {
        self.inner.upgrade().map(|inner| SchemaCache { inner })
    }
}

impl SchemaCache {
    pub fn new(fetcher: Box<dyn SchemaFetcher>) -> Self {
        let schemas = Cache::builder().build();

        Self {
            inner: Arc::new(CacheInner { schemas, fetcher }),
        }
    }

    /// Get a compiled schema, compiling it (and everything it refers to) if
    /// it is not registered yet.
    pub fn get_schema(&self, location: &Url) -> Result<Arc<SchemaNode>> {
        let location = location::normalize(location.clone());
        if let Some(schema) = self.lookup(&location) {
            return Ok(schema);
        }
        SchemaCompiler::new(self).compile(&location)
    }

    pub fn has_schema(&self, location: &Url) -> bool {
        self.inner.schemas.contains_key(key(location).as_str())
    }

    /// The registered node, without compiling on a miss.
    pub fn lookup(&self, location: &Url) -> Option<Arc<SchemaNode>> {
        self.inner.schemas.get(key(location).as_str())
    }

    /// Register `schema` unless the location already has one.
    ///
    /// Returns whether this call's schema is the one now registered.
    pub fn register_schema(&self, location: &Url, schema: Arc<SchemaNode>) -> bool {
        let entry = self.inner.schemas.entry(key(location)).or_insert(schema);
        if !entry.is_fresh() {
            tracing::warn!(%location, "schema already registered, keeping existing compilation");
        }
        entry.is_fresh()
    }

    /// Number of registered schemas
    pub fn entry_count(&self) -> u64 {
        // Flush pending bookkeeping so the count is exact
        self.inner.schemas.run_pending_tasks();
        self.inner.schemas.entry_count()
    }

    pub fn fetcher(&self) -> &dyn SchemaFetcher {
        self.inner.fetcher.as_ref()
    }

    pub fn downgrade(&self) -> WeakSchemaCache {
        WeakSchemaCache {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new(Box::new(DefaultFetcher::default()))
    }
}

fn key(location: &Url) -> String {
    location::normalize(location.clone()).into()
}
