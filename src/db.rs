use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::error::{Result, WriterError};
use crate::types::{
    DefinitionKind, Diagnostic, FileId, FileInfo, LocalSymbolId, ReferenceId, ReferenceKind,
    ReferenceRecord, ReferenceTarget, SourceRange, SymbolId, SymbolKind, SymbolRecord,
};

/// Storage layout version this writer reads and writes. A store persisted
/// with any other version is refused, never migrated.
pub const SUPPORTED_DATABASE_VERSION: i64 = 25;

const VERSION_KEY: &str = "storage_version";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS elements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT NOT NULL UNIQUE,
    language TEXT
);

CREATE TABLE IF NOT EXISTS symbols (
    id INTEGER PRIMARY KEY,
    serialized_name TEXT NOT NULL UNIQUE,
    name_hierarchy TEXT NOT NULL,
    kind TEXT,
    definition_kind TEXT NOT NULL DEFAULT 'none',
    FOREIGN KEY (id) REFERENCES elements(id)
);

CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY,
    context_id INTEGER NOT NULL,
    target_id INTEGER,
    kind TEXT NOT NULL,
    ambiguous BOOLEAN NOT NULL DEFAULT FALSE,
    FOREIGN KEY (id) REFERENCES elements(id),
    FOREIGN KEY (context_id) REFERENCES symbols(id),
    FOREIGN KEY (target_id) REFERENCES symbols(id)
);

CREATE TABLE IF NOT EXISTS local_symbols (
    id INTEGER PRIMARY KEY,
    lookup_key TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    scope_id INTEGER,
    FOREIGN KEY (id) REFERENCES elements(id),
    FOREIGN KEY (scope_id) REFERENCES symbols(id)
);

CREATE TABLE IF NOT EXISTS locations (
    element_id INTEGER NOT NULL,
    role TEXT NOT NULL,
    file_id INTEGER NOT NULL,
    start_line INTEGER NOT NULL,
    start_column INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    end_column INTEGER NOT NULL,
    PRIMARY KEY (element_id, role),
    FOREIGN KEY (element_id) REFERENCES elements(id),
    FOREIGN KEY (file_id) REFERENCES files(id)
);

CREATE TABLE IF NOT EXISTS reference_occurrences (
    reference_id INTEGER NOT NULL,
    file_id INTEGER NOT NULL,
    start_line INTEGER NOT NULL,
    start_column INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    end_column INTEGER NOT NULL,
    UNIQUE (reference_id, file_id, start_line, start_column, end_line, end_column),
    FOREIGN KEY (reference_id) REFERENCES edges(id),
    FOREIGN KEY (file_id) REFERENCES files(id)
);

CREATE TABLE IF NOT EXISTS local_symbol_locations (
    local_symbol_id INTEGER NOT NULL,
    file_id INTEGER NOT NULL,
    start_line INTEGER NOT NULL,
    start_column INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    end_column INTEGER NOT NULL,
    UNIQUE (local_symbol_id, file_id, start_line, start_column, end_line, end_column),
    FOREIGN KEY (local_symbol_id) REFERENCES local_symbols(id),
    FOREIGN KEY (file_id) REFERENCES files(id)
);

CREATE TABLE IF NOT EXISTS atomic_ranges (
    file_id INTEGER NOT NULL,
    start_line INTEGER NOT NULL,
    start_column INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    end_column INTEGER NOT NULL,
    UNIQUE (file_id, start_line, start_column, end_line, end_column),
    FOREIGN KEY (file_id) REFERENCES files(id)
);

CREATE TABLE IF NOT EXISTS diagnostics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message TEXT NOT NULL,
    fatal BOOLEAN NOT NULL,
    file_id INTEGER NOT NULL,
    start_line INTEGER NOT NULL,
    start_column INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    end_column INTEGER NOT NULL,
    FOREIGN KEY (file_id) REFERENCES files(id)
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_edges_tuple ON edges(context_id, IFNULL(target_id, 0), kind);
CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_id);
CREATE INDEX IF NOT EXISTS idx_locations_file ON locations(file_id);
CREATE INDEX IF NOT EXISTS idx_local_locations_file ON local_symbol_locations(file_id);
CREATE INDEX IF NOT EXISTS idx_occurrences_file ON reference_occurrences(file_id);
CREATE INDEX IF NOT EXISTS idx_diagnostics_file ON diagnostics(file_id);
"#;

/// Entity tables in deletion order (children before parents).
const ENTITY_TABLES: &[&str] = &[
    "diagnostics",
    "atomic_ranges",
    "local_symbol_locations",
    "reference_occurrences",
    "locations",
    "local_symbols",
    "edges",
    "symbols",
    "elements",
    "files",
];

/// Which single-valued location slot of an element a range fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LocationRole {
    Symbol,
    Scope,
    Qualifier,
    Signature,
    Reference,
}

impl LocationRole {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Symbol => "symbol",
            Self::Scope => "scope",
            Self::Qualifier => "qualifier",
            Self::Signature => "signature",
            Self::Reference => "reference",
        }
    }
}

/// The single open SQLite handle, with the schema and version gate applied.
pub struct Database {
    conn: Connection,
    path: String,
    loaded_version: i64,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("loaded_version", &self.loaded_version)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Open or create the store at `path`.
    ///
    /// Takes an exclusive lock for the lifetime of the handle, then checks the
    /// persisted version. An incompatible store is left byte-for-byte as found.
    pub fn open(path: impl AsRef<Path>, storage: &StorageConfig) -> Result<Self> {
        let label = path.as_ref().display().to_string();
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(Duration::from_millis(storage.busy_timeout_ms))?;
        conn.execute_batch(
            "PRAGMA locking_mode=EXCLUSIVE;
             PRAGMA foreign_keys=ON;
             PRAGMA synchronous=NORMAL;
             PRAGMA temp_store=MEMORY;",
        )?;
        conn.execute_batch("BEGIN EXCLUSIVE; COMMIT;")
            .map_err(|e| lock_error(e, &label))?;
        Self::init(conn, label)
    }

    /// Open an in-memory store (for tests and benchmarks).
    #[doc(hidden)]
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::init(conn, ":memory:".to_string())
    }

    fn init(conn: Connection, path: String) -> Result<Self> {
        let loaded_version = match read_version(&conn)? {
            Some(found) if found == SUPPORTED_DATABASE_VERSION => found,
            Some(found) => {
                warn!(path = %path, found, "refusing incompatible database");
                return Err(WriterError::IncompatibleVersion {
                    found,
                    supported: SUPPORTED_DATABASE_VERSION,
                });
            }
            None => {
                let tx = conn.unchecked_transaction()?;
                conn.execute_batch(SCHEMA)?;
                conn.execute(
                    "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
                    params![VERSION_KEY, SUPPORTED_DATABASE_VERSION.to_string()],
                )?;
                tx.commit()?;
                info!(path = %path, version = SUPPORTED_DATABASE_VERSION, "created database");
                SUPPORTED_DATABASE_VERSION
            }
        };
        Ok(Self {
            conn,
            path,
            loaded_version,
        })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn loaded_version(&self) -> i64 {
        self.loaded_version
    }

    /// Release the handle, reporting any error SQLite raises while closing.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| WriterError::Storage(e))
    }

    // ── Transactions ──

    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    pub fn begin(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    pub fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn rollback(&self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    // ── Bulk maintenance ──

    /// Truncate every entity table and restart id allocation at 1.
    pub fn clear(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for table in ENTITY_TABLES {
            self.conn.execute(&format!("DELETE FROM {table}"), [])?;
        }
        self.conn.execute(
            "DELETE FROM sqlite_sequence WHERE name IN ('elements', 'files', 'diagnostics')",
            [],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Returns `true` if nothing has been recorded yet.
    pub fn is_empty(&self) -> Result<bool> {
        let any: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM elements
                 UNION ALL SELECT 1 FROM files
                 UNION ALL SELECT 1 FROM diagnostics
                 UNION ALL SELECT 1 FROM atomic_ranges
                 LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(any.is_none())
    }

    /// Rebuild the file to reclaim space left by a clear.
    pub fn vacuum(&self) -> Result<()> {
        self.conn.execute_batch("VACUUM")?;
        Ok(())
    }

    // ── Fetch ──

    pub fn file(&self, id: FileId) -> Result<Option<FileInfo>> {
        let row = self
            .conn
            .query_row(
                "SELECT path, language FROM files WHERE id = ?1",
                params![id.get()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)),
            )
            .optional()?;
        Ok(row.map(|(path, language)| FileInfo { id, path, language }))
    }

    pub fn symbol(&self, id: SymbolId) -> Result<Option<SymbolRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT serialized_name, kind, definition_kind FROM symbols WHERE id = ?1",
                params![id.get()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        let Some((serialized_name, kind, definition_kind)) = row else {
            return Ok(None);
        };

        let kind = kind.and_then(|k| match k.parse::<SymbolKind>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                warn!(kind = %k, "unknown symbol kind, leaving unset");
                None
            }
        });

        Ok(Some(SymbolRecord {
            id,
            serialized_name,
            kind,
            definition_kind: DefinitionKind::from_str_lossy(&definition_kind),
            location: self.location(id.get(), LocationRole::Symbol)?,
            scope_location: self.location(id.get(), LocationRole::Scope)?,
            qualifier_location: self.location(id.get(), LocationRole::Qualifier)?,
            signature_location: self.location(id.get(), LocationRole::Signature)?,
        }))
    }

    pub fn reference(&self, id: ReferenceId) -> Result<Option<ReferenceRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT context_id, target_id, kind, ambiguous FROM edges WHERE id = ?1",
                params![id.get()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, bool>(3)?,
                    ))
                },
            )
            .optional()?;
        let Some((context_id, target_id, kind, ambiguous)) = row else {
            return Ok(None);
        };

        let target = match target_id {
            Some(target) => ReferenceTarget::Symbol(SymbolId::new(target)?),
            None => ReferenceTarget::Unsolved,
        };

        Ok(Some(ReferenceRecord {
            id,
            context_id: SymbolId::new(context_id)?,
            target,
            kind: kind.parse::<ReferenceKind>()?,
            location: self.location(id.get(), LocationRole::Reference)?,
            occurrences: self.reference_occurrences(id)?,
            ambiguous,
        }))
    }

    /// All ranges recorded for a local symbol, ordered by position.
    pub fn local_symbol_locations(&self, id: LocalSymbolId) -> Result<Vec<SourceRange>> {
        let mut stmt = self.conn.prepare(
            "SELECT file_id, start_line, start_column, end_line, end_column
             FROM local_symbol_locations WHERE local_symbol_id = ?1
             ORDER BY file_id, start_line, start_column",
        )?;
        let rows = stmt
            .query_map(params![id.get()], row_to_range_parts)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(range_from_parts).collect()
    }

    /// Call sites collected for an unsolved reference, ordered by position.
    pub fn reference_occurrences(&self, id: ReferenceId) -> Result<Vec<SourceRange>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT file_id, start_line, start_column, end_line, end_column
             FROM reference_occurrences WHERE reference_id = ?1
             ORDER BY file_id, start_line, start_column",
        )?;
        let rows = stmt
            .query_map(params![id.get()], row_to_range_parts)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(range_from_parts).collect()
    }

    pub fn atomic_ranges(&self, file_id: FileId) -> Result<Vec<SourceRange>> {
        let mut stmt = self.conn.prepare(
            "SELECT file_id, start_line, start_column, end_line, end_column
             FROM atomic_ranges WHERE file_id = ?1
             ORDER BY start_line, start_column",
        )?;
        let rows = stmt
            .query_map(params![file_id.get()], row_to_range_parts)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(range_from_parts).collect()
    }

    /// Diagnostics in recording order.
    pub fn diagnostics(&self) -> Result<Vec<Diagnostic>> {
        let mut stmt = self.conn.prepare(
            "SELECT file_id, start_line, start_column, end_line, end_column, message, fatal
             FROM diagnostics ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row_to_range_parts(row)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, bool>(6)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(parts, message, fatal)| {
                Ok(Diagnostic {
                    message,
                    fatal,
                    location: range_from_parts(parts)?,
                })
            })
            .collect()
    }

    fn location(&self, element_id: i64, role: LocationRole) -> Result<Option<SourceRange>> {
        self.conn
            .prepare_cached(
                "SELECT file_id, start_line, start_column, end_line, end_column
                 FROM locations WHERE element_id = ?1 AND role = ?2",
            )?
            .query_row(params![element_id, role.as_str()], row_to_range_parts)
            .optional()?
            .map(range_from_parts)
            .transpose()
    }

    /// Row counts per table.
    pub fn stats(&self) -> Result<StoreStats> {
        let count = |sql: &str| -> Result<u32> {
            Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
        };

        let mut kind_stmt = self.conn.prepare(
            "SELECT COALESCE(kind, 'undefined'), COUNT(*) FROM symbols
             GROUP BY kind ORDER BY COUNT(*) DESC",
        )?;
        let symbol_kinds: Vec<(String, u32)> = kind_stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut ref_stmt = self
            .conn
            .prepare("SELECT kind, COUNT(*) FROM edges GROUP BY kind ORDER BY COUNT(*) DESC")?;
        let reference_kinds: Vec<(String, u32)> = ref_stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let stats = StoreStats {
            version: self.loaded_version,
            num_files: count("SELECT COUNT(*) FROM files")?,
            num_symbols: count("SELECT COUNT(*) FROM symbols")?,
            num_references: count("SELECT COUNT(*) FROM edges")?,
            num_unsolved: count("SELECT COUNT(*) FROM edges WHERE target_id IS NULL")?,
            num_ambiguous: count("SELECT COUNT(*) FROM edges WHERE ambiguous")?,
            num_local_symbols: count("SELECT COUNT(*) FROM local_symbols")?,
            num_atomic_ranges: count("SELECT COUNT(*) FROM atomic_ranges")?,
            num_errors: count("SELECT COUNT(*) FROM diagnostics")?,
            num_fatal_errors: count("SELECT COUNT(*) FROM diagnostics WHERE fatal")?,
            symbol_kinds,
            reference_kinds,
        };
        debug!(?stats, "computed store stats");
        Ok(stats)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub version: i64,
    pub num_files: u32,
    pub num_symbols: u32,
    pub num_references: u32,
    pub num_unsolved: u32,
    pub num_ambiguous: u32,
    pub num_local_symbols: u32,
    pub num_atomic_ranges: u32,
    pub num_errors: u32,
    pub num_fatal_errors: u32,
    pub symbol_kinds: Vec<(String, u32)>,
    pub reference_kinds: Vec<(String, u32)>,
}

/// Read the persisted version. `None` means a blank file that still needs a
/// schema; a store with tables but no version reads as version 0.
fn read_version(conn: &Connection) -> Result<Option<i64>> {
    let has_meta: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'meta'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    if has_meta.is_none() {
        let foreign_tables: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
            [],
            |row| row.get(0),
        )?;
        return Ok(if foreign_tables == 0 { None } else { Some(0) });
    }

    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = ?1",
            params![VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;
    Ok(Some(value.and_then(|v| v.parse().ok()).unwrap_or(0)))
}

/// Run `f` under a savepoint so a multi-statement write lands completely or
/// not at all, whether or not a transaction is already open.
pub(crate) fn atomically<T>(conn: &Connection, f: impl FnOnce() -> Result<T>) -> Result<T> {
    conn.execute_batch("SAVEPOINT record")?;
    match f() {
        Ok(value) => {
            conn.execute_batch("RELEASE record")?;
            Ok(value)
        }
        Err(err) => {
            conn.execute_batch("ROLLBACK TO record; RELEASE record")?;
            Err(err)
        }
    }
}

fn lock_error(err: rusqlite::Error, path: &str) -> WriterError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => WriterError::Locked {
            path: path.to_string(),
        },
        _ => WriterError::Storage(err),
    }
}

// ── Row Mapping Helpers ──

type RangeParts = (i64, u32, u32, u32, u32);

fn row_to_range_parts(row: &rusqlite::Row<'_>) -> rusqlite::Result<RangeParts> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn range_from_parts((file_id, sl, sc, el, ec): RangeParts) -> Result<SourceRange> {
    SourceRange::new(FileId::new(file_id)?, sl, sc, el, ec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_store_gets_schema_and_version() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.loaded_version(), SUPPORTED_DATABASE_VERSION);
        assert!(db.is_empty().unwrap());

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for table in ENTITY_TABLES {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn test_version_mismatch_refused_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(SCHEMA).unwrap();
            conn.execute(
                "INSERT INTO meta (key, value) VALUES (?1, '3')",
                params![VERSION_KEY],
            )
            .unwrap();
        }
        let before = std::fs::read(&path).unwrap();

        let err = Database::open(&path, &StorageConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            WriterError::IncompatibleVersion {
                found: 3,
                supported: SUPPORTED_DATABASE_VERSION
            }
        ));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_foreign_sqlite_file_is_incompatible() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE notes (body TEXT);").unwrap();
        }
        let err = Database::open(&path, &StorageConfig::default()).unwrap_err();
        assert!(matches!(err, WriterError::IncompatibleVersion { found: 0, .. }));
    }

    #[test]
    fn test_second_writer_is_locked_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.db");
        let first = Database::open(&path, &StorageConfig::default()).unwrap();

        let err = Database::open(&path, &StorageConfig::default()).unwrap_err();
        assert!(matches!(err, WriterError::Locked { .. }), "got {err:?}");

        first.close().unwrap();
        assert!(Database::open(&path, &StorageConfig::default()).is_ok());
    }

    #[test]
    fn test_clear_empties_every_table() {
        let db = Database::open_memory().unwrap();
        db.conn()
            .execute("INSERT INTO files (path) VALUES ('/a.cpp')", [])
            .unwrap();
        db.conn()
            .execute("INSERT INTO elements (category) VALUES ('symbol')", [])
            .unwrap();
        assert!(!db.is_empty().unwrap());

        db.clear().unwrap();
        assert!(db.is_empty().unwrap());
        let next: i64 = db
            .conn()
            .query_row(
                "INSERT INTO elements (category) VALUES ('symbol') RETURNING id",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(next, 1);
    }

    #[test]
    fn test_stats_on_empty_store() {
        let db = Database::open_memory().unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.num_symbols, 0);
        assert_eq!(stats.num_references, 0);
        assert_eq!(stats.version, SUPPORTED_DATABASE_VERSION);
        assert!(stats.symbol_kinds.is_empty());
    }
}
