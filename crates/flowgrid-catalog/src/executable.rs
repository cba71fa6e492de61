//! Parsed executables, derived from stored resources on first access.
//!
//! Parsing is owned by the caller through [`ProcessParser`]. The catalog
//! memoizes the result in an [`ExecutableCache`] keyed by
//! `(tenant, process_key)`; the cache never writes to the store and any
//! entry can be dropped and rebuilt from the resource bytes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::types::PersistedProcess;

/// Turns a deployed resource into an executable form.
///
/// Implementations must be deterministic: the same bytes always yield an
/// equivalent executable.
pub trait ProcessParser: Send + Sync {
    type Executable: Send + Sync;

    fn parse(&self, resource_name: &str, resource: &[u8]) -> Result<Self::Executable, String>;
}

type CacheKey = (String, u64);

/// Read-through cache of parsed executables.
pub struct ExecutableCache<E> {
    entries: RwLock<HashMap<CacheKey, Arc<E>>>,
    capacity: usize,
}

impl<E> ExecutableCache<E> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Return the cached executable for `process`, parsing it on a miss.
    pub fn get_or_parse<P>(&self, parser: &P, process: &PersistedProcess) -> CatalogResult<Arc<E>>
    where
        P: ProcessParser<Executable = E> + ?Sized,
    {
        let key = (process.tenant_id.clone(), process.key);
        {
            let entries = self.entries.read().expect("executable cache lock");
            if let Some(executable) = entries.get(&key) {
                return Ok(Arc::clone(executable));
            }
        }

        let executable = parser
            .parse(&process.resource_name, &process.resource)
            .map_err(|reason| CatalogError::Parse {
                resource: process.resource_name.clone(),
                reason,
            })?;
        let executable = Arc::new(executable);

        let mut entries = self.entries.write().expect("executable cache lock");
        if entries.len() >= self.capacity {
            debug!(capacity = self.capacity, "executable cache full, flushing");
            entries.clear();
        }
        entries.insert(key, Arc::clone(&executable));
        debug!(key = process.key, tenant = %process.tenant_id, "executable parsed");
        Ok(executable)
    }

    /// Drop the entry for `(tenant, key)`, if any.
    pub fn invalidate(&self, tenant: &str, key: u64) {
        let mut entries = self.entries.write().expect("executable cache lock");
        entries.remove(&(tenant.to_string(), key));
    }

    pub fn clear(&self) {
        self.entries.write().expect("executable cache lock").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("executable cache lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_core::ProcessRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts parse calls; the executable is the resource length.
    #[derive(Default)]
    struct CountingParser {
        calls: AtomicUsize,
    }

    impl ProcessParser for CountingParser {
        type Executable = usize;

        fn parse(&self, _name: &str, resource: &[u8]) -> Result<usize, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if resource.is_empty() {
                return Err("empty resource".to_string());
            }
            Ok(resource.len())
        }
    }

    fn process(key: u64, resource: &[u8]) -> PersistedProcess {
        let record = ProcessRecord::new(key, "p", 1).with_resource("p.bpmn", resource.to_vec());
        PersistedProcess::from_record(key, &record)
    }

    #[test]
    fn parses_once_then_hits() {
        let parser = CountingParser::default();
        let cache = ExecutableCache::new(8);
        let p = process(1, b"abc");

        let first = cache.get_or_parse(&parser, &p).unwrap();
        let second = cache.get_or_parse(&parser, &p).unwrap();

        assert_eq!(*first, 3);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(parser.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalidate_forces_reparse() {
        let parser = CountingParser::default();
        let cache = ExecutableCache::new(8);
        let p = process(1, b"abc");

        cache.get_or_parse(&parser, &p).unwrap();
        cache.invalidate(&p.tenant_id, p.key);
        assert!(cache.is_empty());
        cache.get_or_parse(&parser, &p).unwrap();

        assert_eq!(parser.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn parse_failure_is_reported_and_not_cached() {
        let parser = CountingParser::default();
        let cache = ExecutableCache::new(8);

        let err = cache.get_or_parse(&parser, &process(1, b"")).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn flushes_when_full() {
        let parser = CountingParser::default();
        let cache = ExecutableCache::new(2);

        cache.get_or_parse(&parser, &process(1, b"a")).unwrap();
        cache.get_or_parse(&parser, &process(2, b"b")).unwrap();
        assert_eq!(cache.len(), 2);
        cache.get_or_parse(&parser, &process(3, b"c")).unwrap();
        assert_eq!(cache.len(), 1);
    }
}
