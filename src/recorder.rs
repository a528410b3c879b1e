//! Attribute writers. Each call touches one attribute of one identity and
//! reports its own success, so unrelated passes can annotate the same symbol
//! without coordinating.

use rusqlite::{params, Connection};

use crate::db::{Database, LocationRole};
use crate::error::{Result, WriterError};
use crate::types::{
    DefinitionKind, FileId, LocalSymbolId, ReferenceId, SourceRange, SymbolId, SymbolKind,
};

const SQL_SET_LOCATION: &str = "INSERT OR REPLACE INTO locations
     (element_id, role, file_id, start_line, start_column, end_line, end_column)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

pub(crate) struct Recorder<'a> {
    conn: &'a Connection,
}

impl<'a> Recorder<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { conn: db.conn() }
    }

    // ── Symbols ──

    pub(crate) fn set_symbol_kind(&self, id: SymbolId, kind: SymbolKind) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE symbols SET kind = ?2 WHERE id = ?1",
            params![id.get(), kind.as_str()],
        )?;
        expect_row(updated, WriterError::UnknownSymbol(id.get()))
    }

    pub(crate) fn set_definition_kind(&self, id: SymbolId, kind: DefinitionKind) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE symbols SET definition_kind = ?2 WHERE id = ?1",
            params![id.get(), kind.as_str()],
        )?;
        expect_row(updated, WriterError::UnknownSymbol(id.get()))
    }

    /// Fill one of the symbol's location slots, replacing what was there.
    pub(crate) fn set_symbol_location(
        &self,
        id: SymbolId,
        role: LocationRole,
        range: &SourceRange,
    ) -> Result<()> {
        self.ensure_exists("symbols", id.get(), WriterError::UnknownSymbol(id.get()))?;
        self.set_location(id.get(), role, range)
    }

    // ── References ──

    pub(crate) fn set_reference_location(
        &self,
        id: ReferenceId,
        range: &SourceRange,
    ) -> Result<()> {
        self.ensure_exists("edges", id.get(), WriterError::UnknownReference(id.get()))?;
        self.set_location(id.get(), LocationRole::Reference, range)
    }

    /// Add a call site to an unsolved edge. Repeats are no-ops.
    pub(crate) fn add_reference_occurrence(
        &self,
        id: ReferenceId,
        range: &SourceRange,
    ) -> Result<()> {
        self.ensure_exists("edges", id.get(), WriterError::UnknownReference(id.get()))?;
        self.ensure_file(range.file_id)?;
        self.conn
            .prepare_cached(
                "INSERT OR IGNORE INTO reference_occurrences
                 (reference_id, file_id, start_line, start_column, end_line, end_column)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?
            .execute(params![
                id.get(),
                range.file_id.get(),
                range.start_line,
                range.start_column,
                range.end_line,
                range.end_column,
            ])?;
        Ok(())
    }

    /// Flag an edge as ambiguous. There is no way back.
    pub(crate) fn mark_ambiguous(&self, id: ReferenceId) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE edges SET ambiguous = TRUE WHERE id = ?1",
            params![id.get()],
        )?;
        expect_row(updated, WriterError::UnknownReference(id.get()))
    }

    // ── Local symbols ──

    /// Add a range to the local symbol's location set. Repeats are no-ops.
    pub(crate) fn add_local_symbol_location(
        &self,
        id: LocalSymbolId,
        range: &SourceRange,
    ) -> Result<()> {
        self.ensure_exists(
            "local_symbols",
            id.get(),
            WriterError::UnknownLocalSymbol(id.get()),
        )?;
        self.ensure_file(range.file_id)?;
        self.conn
            .prepare_cached(
                "INSERT OR IGNORE INTO local_symbol_locations
                 (local_symbol_id, file_id, start_line, start_column, end_line, end_column)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?
            .execute(params![
                id.get(),
                range.file_id.get(),
                range.start_line,
                range.start_column,
                range.end_line,
                range.end_column,
            ])?;
        Ok(())
    }

    // ── Files & ranges ──

    pub(crate) fn set_file_language(&self, id: FileId, language: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE files SET language = ?2 WHERE id = ?1",
            params![id.get(), language],
        )?;
        expect_row(updated, WriterError::UnknownFile(id.get()))
    }

    pub(crate) fn record_atomic_source_range(&self, range: &SourceRange) -> Result<()> {
        self.ensure_file(range.file_id)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO atomic_ranges
             (file_id, start_line, start_column, end_line, end_column)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                range.file_id.get(),
                range.start_line,
                range.start_column,
                range.end_line,
                range.end_column,
            ],
        )?;
        Ok(())
    }

    // ── Diagnostics ──

    pub(crate) fn record_diagnostic(
        &self,
        message: &str,
        fatal: bool,
        range: &SourceRange,
    ) -> Result<()> {
        self.ensure_file(range.file_id)?;
        self.conn.execute(
            "INSERT INTO diagnostics
             (message, fatal, file_id, start_line, start_column, end_line, end_column)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                message,
                fatal,
                range.file_id.get(),
                range.start_line,
                range.start_column,
                range.end_line,
                range.end_column,
            ],
        )?;
        Ok(())
    }

    fn set_location(&self, element_id: i64, role: LocationRole, range: &SourceRange) -> Result<()> {
        self.ensure_file(range.file_id)?;
        self.conn.prepare_cached(SQL_SET_LOCATION)?.execute(params![
            element_id,
            role.as_str(),
            range.file_id.get(),
            range.start_line,
            range.start_column,
            range.end_line,
            range.end_column,
        ])?;
        Ok(())
    }

    fn ensure_file(&self, id: FileId) -> Result<()> {
        self.ensure_exists("files", id.get(), WriterError::UnknownFile(id.get()))
    }

    fn ensure_exists(&self, table: &str, id: i64, missing: WriterError) -> Result<()> {
        let found: bool = self
            .conn
            .prepare_cached(&format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = ?1)"))?
            .query_row(params![id], |row| row.get(0))?;
        if found {
            Ok(())
        } else {
            Err(missing)
        }
    }
}

fn expect_row(updated: usize, missing: WriterError) -> Result<()> {
    if updated == 0 {
        Err(missing)
    } else {
        Ok(())
    }
}
