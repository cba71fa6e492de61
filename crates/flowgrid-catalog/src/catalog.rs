//! ProcessCatalog: redb-backed, versioned process-definition catalog.
//!
//! One definitions table plus five hand-maintained indices (see
//! [`crate::tables`]). Every mutation opens a single write transaction,
//! touches all affected tables and commits once, so a crash never leaves
//! the indices disagreeing with each other. Reads run against redb's
//! snapshot read transactions.
//!
//! The catalog expects one ordered writer. It does no locking of its own
//! beyond what redb and the executable cache need.

use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use flowgrid_core::{CatalogConfig, DeploymentRecord, ProcessKey, ProcessRecord, ProcessState};
use redb::{Database, ReadableDatabase, ReadableTable, Table, WriteTransaction};
use tracing::{debug, warn};

use crate::command::CatalogCommand;
use crate::error::{CatalogError, CatalogResult};
use crate::executable::{ExecutableCache, ProcessParser};
use crate::keys;
use crate::tables::*;
use crate::types::PersistedProcess;

/// Convert any `Display` error into a `CatalogError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| CatalogError::$variant(e.to_string())
    };
}

/// Versioned catalog of deployed process definitions.
///
/// Cheap to clone; clones share the database and the executable cache.
pub struct ProcessCatalog<P: ProcessParser> {
    db: Arc<Database>,
    parser: Arc<P>,
    cache: Arc<ExecutableCache<P::Executable>>,
}

impl<P: ProcessParser> Clone for ProcessCatalog<P> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            parser: Arc::clone(&self.parser),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<P: ProcessParser> ProcessCatalog<P> {
    /// Open (or create) a persistent catalog at the given path.
    pub fn open(path: &Path, parser: P) -> CatalogResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let catalog = Self::with_database(db, parser, CatalogConfig::default().max_executables())?;
        debug!(?path, "process catalog opened");
        Ok(catalog)
    }

    /// Create an ephemeral in-memory catalog (for testing).
    pub fn open_in_memory(parser: P) -> CatalogResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let catalog = Self::with_database(db, parser, CatalogConfig::default().max_executables())?;
        debug!("in-memory process catalog opened");
        Ok(catalog)
    }

    /// Open the catalog described by `config`.
    pub fn from_config(config: &CatalogConfig, parser: P) -> CatalogResult<Self> {
        let db = if config.is_in_memory() {
            Database::builder()
                .create_with_backend(redb::backends::InMemoryBackend::new())
                .map_err(map_err!(Open))?
        } else {
            let path = config.db_path();
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir).map_err(map_err!(Open))?;
            }
            Database::create(&path).map_err(map_err!(Open))?
        };
        let catalog = Self::with_database(db, parser, config.max_executables())?;
        debug!(
            in_memory = config.is_in_memory(),
            max_executables = config.max_executables(),
            "process catalog opened from config"
        );
        Ok(catalog)
    }

    fn with_database(db: Database, parser: P, cache_capacity: usize) -> CatalogResult<Self> {
        let catalog = Self {
            db: Arc::new(db),
            parser: Arc::new(parser),
            cache: Arc::new(ExecutableCache::new(cache_capacity)),
        };
        catalog.ensure_tables()?;
        Ok(catalog)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> CatalogResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(DEFINITIONS).map_err(map_err!(Table))?;
        txn.open_table(VERSIONS).map_err(map_err!(Table))?;
        txn.open_table(LATEST).map_err(map_err!(Table))?;
        txn.open_table(DIGESTS).map_err(map_err!(Table))?;
        txn.open_table(NEXT_VERSION).map_err(map_err!(Table))?;
        txn.open_table(DEPLOYMENTS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Writes ─────────────────────────────────────────────────────

    /// Store every process embedded in `deployment`, in one transaction.
    ///
    /// Keys and versions must already be assigned by the caller.
    pub fn put_deployment(&self, deployment: &DeploymentRecord) -> CatalogResult<()> {
        let records = deployment
            .processes
            .iter()
            .map(|metadata| {
                deployment.process_record(metadata).ok_or_else(|| {
                    CatalogError::InvalidRecord(format!(
                        "deployment {} has no resource named '{}'",
                        deployment.key, metadata.resource_name
                    ))
                })
            })
            .collect::<CatalogResult<Vec<_>>>()?;
        for record in &records {
            validate(record)?;
        }

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut tables = WriteTables::open(&txn)?;
            for record in &records {
                tables.put(record.key, record)?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        for record in &records {
            self.cache.invalidate(&record.tenant_id, record.key);
        }
        debug!(
            deployment_key = deployment.key,
            tenant = %deployment.tenant_id,
            processes = records.len(),
            "deployment stored"
        );
        Ok(())
    }

    /// Insert or overwrite the definition stored under `key` and update
    /// the version index, latest pointer, digest and version counter.
    ///
    /// `key` must equal `record.key`. Rewriting a stored key is allowed only
    /// when the process id, version and deployment key stay the same.
    pub fn put_definition(&self, key: ProcessKey, record: &ProcessRecord) -> CatalogResult<()> {
        if key != record.key {
            return Err(CatalogError::InvalidRecord(format!(
                "process {} cannot be stored under key {key}",
                record.key
            )));
        }
        validate(record)?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut tables = WriteTables::open(&txn)?;
            tables.put(key, record)?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        self.cache.invalidate(&record.tenant_id, key);
        debug!(
            key,
            tenant = %record.tenant_id,
            process_id = %record.bpmn_process_id,
            version = record.version,
            "process definition stored"
        );
        Ok(())
    }

    /// Remove a definition from every index. Returns true if it existed.
    ///
    /// If it was the latest version, the pointer and digest move to the
    /// highest surviving version below it, or are cleared. The version
    /// counter is left alone so deleted versions are never reassigned.
    pub fn delete_definition(&self, record: &ProcessRecord) -> CatalogResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut tables = WriteTables::open(&txn)?;
            existed = tables.delete(record)?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        self.cache.invalidate(&record.tenant_id, record.key);
        debug!(
            key = record.key,
            tenant = %record.tenant_id,
            process_id = %record.bpmn_process_id,
            version = record.version,
            existed,
            "process definition deleted"
        );
        Ok(existed)
    }

    /// Rewrite the lifecycle state of a stored definition. Returns true if
    /// the definition existed.
    pub fn update_state(&self, record: &ProcessRecord, state: ProcessState) -> CatalogResult<bool> {
        let def_key = keys::definition_key(&record.tenant_id, record.key);
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(DEFINITIONS).map_err(map_err!(Table))?;
            let stored = read_definition(&table, &def_key)?;
            existed = stored.is_some();
            if let Some(mut process) = stored {
                process.state = state;
                let value = serde_json::to_vec(&process).map_err(map_err!(Serialize))?;
                table
                    .insert(def_key.as_slice(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        if existed {
            debug!(key = record.key, tenant = %record.tenant_id, ?state, "process state updated");
        } else {
            warn!(key = record.key, tenant = %record.tenant_id, ?state, "state update for unknown process");
        }
        Ok(existed)
    }

    /// Apply one command from the ordered log.
    pub fn apply(&self, command: &CatalogCommand) -> CatalogResult<()> {
        debug!(kind = command.kind(), "applying catalog command");
        match command {
            CatalogCommand::PutDeployment { deployment } => self.put_deployment(deployment),
            CatalogCommand::PutProcess { key, record } => self.put_definition(*key, record),
            CatalogCommand::DeleteProcess { record } => self.delete_definition(record).map(|_| ()),
            CatalogCommand::UpdateProcessState { record, state } => {
                self.update_state(record, *state).map(|_| ())
            }
        }
    }

    // ── Point lookups ──────────────────────────────────────────────

    /// Get a definition by tenant and key.
    pub fn get_by_key(&self, tenant: &str, key: ProcessKey) -> CatalogResult<Option<PersistedProcess>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(DEFINITIONS).map_err(map_err!(Table))?;
        read_definition(&table, &keys::definition_key(tenant, key))
    }

    /// Get the definition holding `version` of a process, via the version index.
    pub fn get_by_id_and_version(
        &self,
        tenant: &str,
        process_id: &str,
        version: u32,
    ) -> CatalogResult<Option<PersistedProcess>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let versions = txn.open_table(VERSIONS).map_err(map_err!(Table))?;
        let vkey = keys::version_key(tenant, process_id, version);
        let key = match versions.get(vkey.as_slice()).map_err(map_err!(Read))? {
            Some(guard) => guard.value(),
            None => return Ok(None),
        };
        let definitions = txn.open_table(DEFINITIONS).map_err(map_err!(Table))?;
        read_definition(&definitions, &keys::definition_key(tenant, key))
    }

    /// Get the definition a deployment created for a process. Definitions
    /// stored with deployment key 0 are not reachable here.
    pub fn get_by_id_and_deployment_key(
        &self,
        tenant: &str,
        process_id: &str,
        deployment_key: u64,
    ) -> CatalogResult<Option<PersistedProcess>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let deployments = txn.open_table(DEPLOYMENTS).map_err(map_err!(Table))?;
        let dkey = keys::deployment_key(tenant, process_id, deployment_key);
        let key = match deployments.get(dkey.as_slice()).map_err(map_err!(Read))? {
            Some(guard) => guard.value(),
            None => return Ok(None),
        };
        let definitions = txn.open_table(DEFINITIONS).map_err(map_err!(Table))?;
        read_definition(&definitions, &keys::definition_key(tenant, key))
    }

    /// Get the highest surviving version of a process, via the latest pointer.
    pub fn get_latest_by_id(
        &self,
        tenant: &str,
        process_id: &str,
    ) -> CatalogResult<Option<PersistedProcess>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let latest = txn.open_table(LATEST).map_err(map_err!(Table))?;
        let id = keys::id_key(tenant, process_id);
        let (key, _) = match latest.get(id.as_slice()).map_err(map_err!(Read))? {
            Some(guard) => guard.value(),
            None => return Ok(None),
        };
        let definitions = txn.open_table(DEFINITIONS).map_err(map_err!(Table))?;
        read_definition(&definitions, &keys::definition_key(tenant, key))
    }

    // ── Scans ──────────────────────────────────────────────────────

    /// All surviving versions of a process, ascending by version.
    pub fn get_all_by_id(&self, tenant: &str, process_id: &str) -> CatalogResult<Vec<PersistedProcess>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let versions = txn.open_table(VERSIONS).map_err(map_err!(Table))?;
        let definitions = txn.open_table(DEFINITIONS).map_err(map_err!(Table))?;
        let range = keys::all_versions(tenant, process_id);
        let mut results = Vec::new();
        for entry in versions
            .range(range.start().as_slice()..=range.end().as_slice())
            .map_err(map_err!(Read))?
        {
            let (_, key) = entry.map_err(map_err!(Read))?;
            let def_key = keys::definition_key(tenant, key.value());
            if let Some(process) = read_definition(&definitions, &def_key)? {
                results.push(process);
            }
        }
        Ok(results)
    }

    /// All definitions of a tenant, ordered by key.
    pub fn get_all(&self, tenant: &str) -> CatalogResult<Vec<PersistedProcess>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(DEFINITIONS).map_err(map_err!(Table))?;
        let range = keys::tenant_definitions(tenant);
        let mut results = Vec::new();
        for entry in table
            .range(range.start().as_slice()..=range.end().as_slice())
            .map_err(map_err!(Read))?
        {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let process: PersistedProcess =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(process);
        }
        Ok(results)
    }

    /// Visit definitions of every tenant in storage order, starting
    /// strictly after `after` (a `(tenant, key)` cursor). The visitor
    /// returns `false` to stop early.
    pub fn for_each_process<F>(&self, after: Option<(&str, ProcessKey)>, mut visitor: F) -> CatalogResult<()>
    where
        F: FnMut(&PersistedProcess) -> bool,
    {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(DEFINITIONS).map_err(map_err!(Table))?;
        let cursor = after.map(|(tenant, key)| keys::definition_key(tenant, key));
        let start = match &cursor {
            Some(k) => Bound::Excluded(k.as_slice()),
            None => Bound::Unbounded,
        };
        for entry in table
            .range::<&[u8]>((start, Bound::Unbounded))
            .map_err(map_err!(Read))?
        {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let process: PersistedProcess =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            if !visitor(&process) {
                break;
            }
        }
        Ok(())
    }

    // ── Versions & digests ─────────────────────────────────────────

    /// Version referenced by the latest pointer, or 0.
    pub fn get_latest_version(&self, tenant: &str, process_id: &str) -> CatalogResult<u32> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let latest = txn.open_table(LATEST).map_err(map_err!(Table))?;
        let id = keys::id_key(tenant, process_id);
        Ok(latest
            .get(id.as_slice())
            .map_err(map_err!(Read))?
            .map_or(0, |guard| guard.value().1))
    }

    /// Version the next deployment of this process should receive.
    pub fn get_next_version(&self, tenant: &str, process_id: &str) -> CatalogResult<u32> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let counters = txn.open_table(NEXT_VERSION).map_err(map_err!(Table))?;
        let id = keys::id_key(tenant, process_id);
        Ok(counters
            .get(id.as_slice())
            .map_err(map_err!(Read))?
            .map_or(1, |guard| guard.value()))
    }

    /// Greatest surviving version strictly below `version`.
    ///
    /// Returns `None` when there is no such version, and also when
    /// `version` itself is not a surviving version of the process.
    pub fn find_version_before(
        &self,
        tenant: &str,
        process_id: &str,
        version: u32,
    ) -> CatalogResult<Option<u32>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let versions = txn.open_table(VERSIONS).map_err(map_err!(Table))?;
        let vkey = keys::version_key(tenant, process_id, version);
        if versions.get(vkey.as_slice()).map_err(map_err!(Read))?.is_none() {
            return Ok(None);
        }
        Ok(previous_version(&versions, tenant, process_id, version)?.map(|(v, _)| v))
    }

    /// Checksum of the latest version's resource, if any version survives.
    pub fn get_latest_digest(&self, tenant: &str, process_id: &str) -> CatalogResult<Option<Vec<u8>>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let digests = txn.open_table(DIGESTS).map_err(map_err!(Table))?;
        let id = keys::id_key(tenant, process_id);
        Ok(digests
            .get(id.as_slice())
            .map_err(map_err!(Read))?
            .map(|guard| guard.value().to_vec()))
    }

    /// True if `checksum` matches the latest version's digest, i.e. a
    /// redeploy of these bytes would be a no-op.
    pub fn is_duplicate(&self, tenant: &str, process_id: &str, checksum: &[u8]) -> CatalogResult<bool> {
        Ok(self
            .get_latest_digest(tenant, process_id)?
            .is_some_and(|digest| digest == checksum))
    }

    // ── Executables ────────────────────────────────────────────────

    /// Parsed executable for `process`, memoized per `(tenant, key)`.
    pub fn executable(&self, process: &PersistedProcess) -> CatalogResult<Arc<P::Executable>> {
        self.cache.get_or_parse(self.parser.as_ref(), process)
    }

    /// Drop every cached executable. Stored definitions are untouched.
    pub fn clear_cache(&self) {
        self.cache.clear();
        debug!("executable cache cleared");
    }

    /// Number of executables currently held in the cache.
    pub fn cached_executables(&self) -> usize {
        self.cache.len()
    }
}

/// Reject records that break the write contract.
fn validate(record: &ProcessRecord) -> CatalogResult<()> {
    if record.tenant_id.is_empty() {
        return Err(CatalogError::InvalidRecord(format!(
            "process {} has no tenant",
            record.key
        )));
    }
    if record.bpmn_process_id.is_empty() {
        return Err(CatalogError::InvalidRecord(format!(
            "process {} has no process id",
            record.key
        )));
    }
    if record.version == 0 {
        return Err(CatalogError::InvalidRecord(format!(
            "process {} ('{}') has version 0",
            record.key, record.bpmn_process_id
        )));
    }
    Ok(())
}

fn read_definition<T>(table: &T, def_key: &[u8]) -> CatalogResult<Option<PersistedProcess>>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    match table.get(def_key).map_err(map_err!(Read))? {
        Some(guard) => {
            let process: PersistedProcess =
                serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
            Ok(Some(process))
        }
        None => Ok(None),
    }
}

/// Bounded reverse scan of the version index: the greatest version of
/// `(tenant, process_id)` strictly below `below`, with its process key.
fn previous_version<T>(
    versions: &T,
    tenant: &str,
    process_id: &str,
    below: u32,
) -> CatalogResult<Option<(u32, ProcessKey)>>
where
    T: ReadableTable<&'static [u8], u64>,
{
    let start = keys::version_key(tenant, process_id, 0);
    let end = keys::version_key(tenant, process_id, below);
    let mut range = versions
        .range(start.as_slice()..end.as_slice())
        .map_err(map_err!(Read))?;
    match range.next_back() {
        Some(entry) => {
            let (vkey, key) = entry.map_err(map_err!(Read))?;
            let (_, _, version) = keys::decode_version_key(vkey.value())?;
            Ok(Some((version, key.value())))
        }
        None => Ok(None),
    }
}

/// All catalog tables, opened once inside a write transaction.
struct WriteTables<'txn> {
    definitions: Table<'txn, &'static [u8], &'static [u8]>,
    versions: Table<'txn, &'static [u8], u64>,
    latest: Table<'txn, &'static [u8], (u64, u32)>,
    digests: Table<'txn, &'static [u8], &'static [u8]>,
    next_version: Table<'txn, &'static [u8], u32>,
    deployments: Table<'txn, &'static [u8], u64>,
}

impl<'txn> WriteTables<'txn> {
    fn open(txn: &'txn WriteTransaction) -> CatalogResult<Self> {
        Ok(Self {
            definitions: txn.open_table(DEFINITIONS).map_err(map_err!(Table))?,
            versions: txn.open_table(VERSIONS).map_err(map_err!(Table))?,
            latest: txn.open_table(LATEST).map_err(map_err!(Table))?,
            digests: txn.open_table(DIGESTS).map_err(map_err!(Table))?,
            next_version: txn.open_table(NEXT_VERSION).map_err(map_err!(Table))?,
            deployments: txn.open_table(DEPLOYMENTS).map_err(map_err!(Table))?,
        })
    }

    fn put(&mut self, key: ProcessKey, record: &ProcessRecord) -> CatalogResult<()> {
        let tenant = record.tenant_id.as_str();
        let process_id = record.bpmn_process_id.as_str();
        let def_key = keys::definition_key(tenant, key);
        let vkey = keys::version_key(tenant, process_id, record.version);

        // A key may be rewritten, but only with the same identity.
        if let Some(existing) = read_definition(&self.definitions, &def_key)? {
            if existing.bpmn_process_id != record.bpmn_process_id
                || existing.version != record.version
                || existing.deployment_key != record.deployment_key
            {
                return Err(CatalogError::InvalidRecord(format!(
                    "process {key} is stored as '{}' v{} (deployment {}), cannot rewrite it as '{}' v{} (deployment {})",
                    existing.bpmn_process_id,
                    existing.version,
                    existing.deployment_key,
                    record.bpmn_process_id,
                    record.version,
                    record.deployment_key
                )));
            }
        }
        let owner = self
            .versions
            .get(vkey.as_slice())
            .map_err(map_err!(Read))?
            .map(|guard| guard.value());
        if let Some(owner) = owner.filter(|owner| *owner != key) {
            return Err(CatalogError::InvalidRecord(format!(
                "'{process_id}' v{} already belongs to process {owner}, not {key}",
                record.version
            )));
        }

        let stored = PersistedProcess::from_record(key, record);
        let value = serde_json::to_vec(&stored).map_err(map_err!(Serialize))?;
        self.definitions
            .insert(def_key.as_slice(), value.as_slice())
            .map_err(map_err!(Write))?;

        self.versions
            .insert(vkey.as_slice(), key)
            .map_err(map_err!(Write))?;

        if record.deployment_key != 0 {
            self.deployments
                .insert(
                    keys::deployment_key(tenant, process_id, record.deployment_key).as_slice(),
                    key,
                )
                .map_err(map_err!(Write))?;
        }

        let id = keys::id_key(tenant, process_id);
        let current = self
            .latest
            .get(id.as_slice())
            .map_err(map_err!(Read))?
            .map(|guard| guard.value());
        if current.is_none_or(|(latest_key, latest_version)| {
            latest_key == key || record.version > latest_version
        }) {
            self.latest
                .insert(id.as_slice(), (key, record.version))
                .map_err(map_err!(Write))?;
            self.digests
                .insert(id.as_slice(), record.checksum.as_slice())
                .map_err(map_err!(Write))?;
        }

        let next = self
            .next_version
            .get(id.as_slice())
            .map_err(map_err!(Read))?
            .map_or(1, |guard| guard.value());
        let required = record.version.saturating_add(1);
        if required > next {
            self.next_version
                .insert(id.as_slice(), required)
                .map_err(map_err!(Write))?;
        }
        Ok(())
    }

    fn delete(&mut self, record: &ProcessRecord) -> CatalogResult<bool> {
        let tenant = record.tenant_id.as_str();
        let process_id = record.bpmn_process_id.as_str();

        let existed = self
            .definitions
            .remove(keys::definition_key(tenant, record.key).as_slice())
            .map_err(map_err!(Write))?
            .is_some();

        // Only drop index entries that still point at this key.
        let vkey = keys::version_key(tenant, process_id, record.version);
        let indexed = self
            .versions
            .get(vkey.as_slice())
            .map_err(map_err!(Read))?
            .map(|guard| guard.value());
        if indexed == Some(record.key) {
            self.versions
                .remove(vkey.as_slice())
                .map_err(map_err!(Write))?;
        }

        if record.deployment_key != 0 {
            let dkey = keys::deployment_key(tenant, process_id, record.deployment_key);
            let indexed = self
                .deployments
                .get(dkey.as_slice())
                .map_err(map_err!(Read))?
                .map(|guard| guard.value());
            if indexed == Some(record.key) {
                self.deployments
                    .remove(dkey.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }

        let id = keys::id_key(tenant, process_id);
        let current = self
            .latest
            .get(id.as_slice())
            .map_err(map_err!(Read))?
            .map(|guard| guard.value());
        let Some((latest_key, latest_version)) = current else {
            return Ok(existed);
        };
        if latest_key != record.key {
            return Ok(existed);
        }

        match previous_version(&self.versions, tenant, process_id, latest_version)? {
            Some((version, key)) => {
                let def_key = keys::definition_key(tenant, key);
                let previous = read_definition(&self.definitions, &def_key)?.ok_or_else(|| {
                    CatalogError::Read(format!(
                        "version index of '{process_id}' v{version} points at missing process {key}"
                    ))
                })?;
                self.latest
                    .insert(id.as_slice(), (key, version))
                    .map_err(map_err!(Write))?;
                self.digests
                    .insert(id.as_slice(), previous.checksum.as_slice())
                    .map_err(map_err!(Write))?;
                debug!(%process_id, version, key, "latest pointer moved back");
            }
            None => {
                self.latest
                    .remove(id.as_slice())
                    .map_err(map_err!(Write))?;
                self.digests
                    .remove(id.as_slice())
                    .map_err(map_err!(Write))?;
                debug!(%process_id, "latest pointer cleared");
            }
        }
        Ok(existed)
    }
}
