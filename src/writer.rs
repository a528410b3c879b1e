use std::cell::RefCell;
use std::path::Path;

use tracing::{info, warn};

use crate::config::WriterConfig;
use crate::db::{atomically, Database, LocationRole, SUPPORTED_DATABASE_VERSION};
use crate::error::{Result, WriterError};
use crate::identity::IdentityResolver;
use crate::name::NameHierarchy;
use crate::recorder::Recorder;
use crate::types::{
    DefinitionKind, FileId, LocalSymbolId, ReferenceId, ReferenceKind, ReferenceTarget,
    SourceRange, SymbolId, SymbolKind,
};

/// Version of this writer.
pub fn version_string() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Storage version this writer can open. No writer instance needed.
pub fn supported_database_version() -> i64 {
    SUPPORTED_DATABASE_VERSION
}

/// Owns the single database handle and the transaction state around it.
///
/// Lifecycle: closed → [`open`](Self::open) → ([`begin`](Self::begin) ⇄
/// [`commit`](Self::commit)/[`rollback`](Self::rollback))* →
/// [`close`](Self::close). Recording calls borrow the writer immutably, so the
/// builder layer can hold several handles at once. Every failed call also
/// leaves its message in [`last_error`](Self::last_error).
pub struct Writer {
    db: Option<Database>,
    config: WriterConfig,
    last_error: RefCell<Option<String>>,
}

impl std::fmt::Debug for Writer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Writer")
            .field("db", &self.db)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new(WriterConfig::default())
    }
}

impl Writer {
    pub fn new(config: WriterConfig) -> Self {
        Self {
            db: None,
            config,
            last_error: RefCell::new(None),
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Open a store, closing any store that is already open.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.close()?;
        let opened = Database::open(path, &self.config.storage);
        let db = self.track(opened)?;
        info!(
            path = %db.path(),
            version = db.loaded_version(),
            local_symbols = self.config.local_symbols.as_str(),
            "opened database"
        );
        self.db = Some(db);
        Ok(())
    }

    #[doc(hidden)]
    pub fn open_in_memory(&mut self) -> Result<()> {
        self.close()?;
        let opened = Database::open_memory();
        self.db = Some(self.track(opened)?);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.db.is_some()
    }

    /// Close the store. Safe to call in any state and any number of times; an
    /// active transaction is rolled back first.
    pub fn close(&mut self) -> Result<()> {
        let Some(db) = self.db.take() else {
            return Ok(());
        };
        if db.in_transaction() {
            warn!(path = %db.path(), "closing with an active transaction, rolling back");
            if let Err(err) = db.rollback() {
                warn!(error = %err, "rollback on close failed");
            }
        }
        let path = db.path().to_string();
        let closed = db.close();
        self.track(closed)?;
        info!(path = %path, "closed database");
        Ok(())
    }

    /// Truncate every table. Not allowed while a transaction is active.
    pub fn clear(&mut self) -> Result<()> {
        let cleared = self.idle_db().and_then(|db| db.clear());
        self.track(cleared)?;
        info!("cleared database");
        Ok(())
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.track(self.db().and_then(Database::is_empty))
    }

    /// Whether the open store matches the supported version. A closed writer
    /// is never compatible.
    pub fn is_compatible(&self) -> bool {
        self.loaded_database_version() == Some(SUPPORTED_DATABASE_VERSION)
    }

    pub fn loaded_database_version(&self) -> Option<i64> {
        self.db.as_ref().map(Database::loaded_version)
    }

    /// Reclaim unused space. Not allowed while a transaction is active.
    pub fn optimize_database_memory(&mut self) -> Result<()> {
        let vacuumed = self.idle_db().and_then(Database::vacuum);
        self.track(vacuumed)
    }

    /// Read access to the open store.
    pub fn database(&self) -> Result<&Database> {
        self.track(self.db())
    }

    // ── Transactions ──

    pub fn in_transaction(&self) -> bool {
        self.db.as_ref().is_some_and(Database::in_transaction)
    }

    pub fn begin(&mut self) -> Result<()> {
        let begun = self.idle_db().and_then(Database::begin);
        self.track(begun)
    }

    pub fn commit(&mut self) -> Result<()> {
        let committed = self.active_db().and_then(Database::commit);
        self.track(committed)?;
        info!("committed transaction");
        Ok(())
    }

    pub fn rollback(&mut self) -> Result<()> {
        let rolled_back = self.active_db().and_then(Database::rollback);
        self.track(rolled_back)?;
        warn!("rolled back transaction");
        Ok(())
    }

    /// Run `record` against a freshly opened store and always close it again.
    ///
    /// Depending on `config.session`, the store is cleared first and the
    /// callback runs inside one transaction, which is committed when the
    /// callback returns `Ok` and rolled back when it returns `Err` or panics.
    pub fn session<T, E>(
        path: impl AsRef<Path>,
        config: WriterConfig,
        record: impl FnOnce(&mut Writer) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<WriterError>,
    {
        let session = config.session;
        let mut writer = Writer::new(config);
        writer.open(path)?;
        if session.clear_on_open {
            writer.clear()?;
        }
        if session.wrap_in_transaction {
            writer.begin()?;
        }

        let outcome = record(&mut writer);
        if writer.in_transaction() {
            match &outcome {
                Ok(_) => writer.commit()?,
                Err(_) => {
                    if let Err(err) = writer.rollback() {
                        warn!(error = %err, "rollback after failed session");
                    }
                }
            }
        }
        writer.close()?;
        outcome
    }

    // ── Errors ──

    /// Message of the most recent failed call, until the next failure
    /// replaces it.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }

    pub fn clear_last_error(&self) {
        self.last_error.borrow_mut().take();
    }

    // ── Symbols ──

    /// Id for `name`, created on first sight and reused afterwards.
    pub fn record_symbol(&self, name: &NameHierarchy) -> Result<SymbolId> {
        self.track(
            self.db()
                .and_then(|db| self.resolver(db).resolve_symbol(name)),
        )
    }

    pub fn set_symbol_kind(&self, id: SymbolId, kind: SymbolKind) -> Result<()> {
        self.track(self.db().and_then(|db| Recorder::new(db).set_symbol_kind(id, kind)))
    }

    pub fn set_definition_kind(&self, id: SymbolId, kind: DefinitionKind) -> Result<()> {
        self.track(
            self.db()
                .and_then(|db| Recorder::new(db).set_definition_kind(id, kind)),
        )
    }

    pub fn set_symbol_location(&self, id: SymbolId, range: &SourceRange) -> Result<()> {
        self.symbol_location(id, LocationRole::Symbol, range)
    }

    pub fn set_scope_location(&self, id: SymbolId, range: &SourceRange) -> Result<()> {
        self.symbol_location(id, LocationRole::Scope, range)
    }

    pub fn set_qualifier_location(&self, id: SymbolId, range: &SourceRange) -> Result<()> {
        self.symbol_location(id, LocationRole::Qualifier, range)
    }

    pub fn set_signature_location(&self, id: SymbolId, range: &SourceRange) -> Result<()> {
        self.symbol_location(id, LocationRole::Signature, range)
    }

    fn symbol_location(&self, id: SymbolId, role: LocationRole, range: &SourceRange) -> Result<()> {
        self.track(
            self.db()
                .and_then(|db| Recorder::new(db).set_symbol_location(id, role, range)),
        )
    }

    // ── References ──

    /// Id for the `(context, target, kind)` edge. Both symbols must exist.
    pub fn create_reference(
        &self,
        context: SymbolId,
        target: SymbolId,
        kind: ReferenceKind,
    ) -> Result<ReferenceId> {
        self.track(self.db().and_then(|db| {
            self.resolver(db)
                .resolve_reference(context, ReferenceTarget::Symbol(target), kind)
        }))
    }

    /// Edge from `context` to the shared unsolved node. All unsolved uses of
    /// one kind from one context share that edge, so `location` joins its
    /// occurrence set instead of taking the single location slot.
    pub fn create_unsolved_reference(
        &self,
        context: SymbolId,
        kind: ReferenceKind,
        location: &SourceRange,
    ) -> Result<ReferenceId> {
        self.track(self.db().and_then(|db| {
            atomically(db.conn(), || {
                let id = self
                    .resolver(db)
                    .resolve_reference(context, ReferenceTarget::Unsolved, kind)?;
                Recorder::new(db).add_reference_occurrence(id, location)?;
                Ok(id)
            })
        }))
    }

    pub fn set_reference_location(&self, id: ReferenceId, range: &SourceRange) -> Result<()> {
        self.track(
            self.db()
                .and_then(|db| Recorder::new(db).set_reference_location(id, range)),
        )
    }

    pub fn mark_ambiguous(&self, id: ReferenceId) -> Result<()> {
        self.track(self.db().and_then(|db| Recorder::new(db).mark_ambiguous(id)))
    }

    // ── Local symbols ──

    pub fn record_local_symbol(&self, name: &str) -> Result<LocalSymbolId> {
        self.track(
            self.db()
                .and_then(|db| self.resolver(db).resolve_local_symbol(name, None)),
        )
    }

    /// Like [`record_local_symbol`](Self::record_local_symbol), keyed by
    /// `scope` as well when the writer is configured for scoped locals.
    pub fn record_scoped_local_symbol(&self, scope: SymbolId, name: &str) -> Result<LocalSymbolId> {
        self.track(
            self.db()
                .and_then(|db| self.resolver(db).resolve_local_symbol(name, Some(scope))),
        )
    }

    pub fn add_local_symbol_location(&self, id: LocalSymbolId, range: &SourceRange) -> Result<()> {
        self.track(
            self.db()
                .and_then(|db| Recorder::new(db).add_local_symbol_location(id, range)),
        )
    }

    // ── Files, ranges, diagnostics ──

    pub fn register_file(&self, path: &str) -> Result<FileId> {
        self.track(self.db().and_then(|db| self.resolver(db).resolve_file(path)))
    }

    pub fn set_file_language(&self, id: FileId, language: &str) -> Result<()> {
        self.track(
            self.db()
                .and_then(|db| Recorder::new(db).set_file_language(id, language)),
        )
    }

    pub fn record_atomic_source_range(&self, range: &SourceRange) -> Result<()> {
        self.track(
            self.db()
                .and_then(|db| Recorder::new(db).record_atomic_source_range(range)),
        )
    }

    pub fn record_diagnostic(
        &self,
        message: &str,
        fatal: bool,
        location: &SourceRange,
    ) -> Result<()> {
        self.track(
            self.db()
                .and_then(|db| Recorder::new(db).record_diagnostic(message, fatal, location)),
        )
    }

    // ── Internals ──

    fn db(&self) -> Result<&Database> {
        self.db.as_ref().ok_or(WriterError::NotOpen)
    }

    fn idle_db(&self) -> Result<&Database> {
        let db = self.db()?;
        if db.in_transaction() {
            return Err(WriterError::TransactionActive);
        }
        Ok(db)
    }

    fn active_db(&self) -> Result<&Database> {
        let db = self.db()?;
        if !db.in_transaction() {
            return Err(WriterError::NoTransaction);
        }
        Ok(db)
    }

    fn resolver<'a>(&self, db: &'a Database) -> IdentityResolver<'a> {
        IdentityResolver::new(db, self.config.local_symbols)
    }

    fn track<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            *self.last_error.borrow_mut() = Some(err.to_string());
        }
        result
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "failed to close database on drop");
        }
    }
}
