//! Canonical key → stable id.
//!
//! Every lookup is read-then-insert-if-absent on the writer's single
//! connection. Symbols, references and local symbols draw ids from the shared
//! `elements` table, so a symbol seen first as a reference target and later as
//! a definition gets the same id either way. Files have their own id space.

use rusqlite::{params, Connection, OptionalExtension, Params};
use tracing::debug;

use crate::config::LocalSymbolIdentity;
use crate::db::{atomically, Database};
use crate::error::{Result, WriterError};
use crate::name::NameHierarchy;
use crate::types::{FileId, LocalSymbolId, ReferenceId, ReferenceKind, ReferenceTarget, SymbolId};

pub(crate) struct IdentityResolver<'a> {
    conn: &'a Connection,
    local_symbols: LocalSymbolIdentity,
}

impl<'a> IdentityResolver<'a> {
    pub(crate) fn new(db: &'a Database, local_symbols: LocalSymbolIdentity) -> Self {
        Self {
            conn: db.conn(),
            local_symbols,
        }
    }

    pub(crate) fn resolve_symbol(&self, name: &NameHierarchy) -> Result<SymbolId> {
        if name.is_empty() {
            return Err(WriterError::EmptyName);
        }
        let key = name.canonical_key();
        if let Some(id) = self.lookup(
            "SELECT id FROM symbols WHERE serialized_name = ?1",
            params![key],
        )? {
            return SymbolId::new(id);
        }

        let hierarchy = serde_json::to_string(name)?;
        let id = atomically(self.conn, || {
            let id = self.allocate_element("symbol")?;
            self.conn.execute(
                "INSERT INTO symbols (id, serialized_name, name_hierarchy) VALUES (?1, ?2, ?3)",
                params![id, key, hierarchy],
            )?;
            Ok(id)
        })?;
        debug!(id, name = %key, "new symbol");
        SymbolId::new(id)
    }

    /// Both endpoints must already be recorded symbols.
    pub(crate) fn resolve_reference(
        &self,
        context: SymbolId,
        target: ReferenceTarget,
        kind: ReferenceKind,
    ) -> Result<ReferenceId> {
        self.ensure_symbol(context)?;
        if let Some(target) = target.symbol_id() {
            self.ensure_symbol(target)?;
        }
        let target_id = target.symbol_id().map(SymbolId::get);

        if let Some(id) = self.lookup(
            "SELECT id FROM edges WHERE context_id = ?1 AND target_id IS ?2 AND kind = ?3",
            params![context.get(), target_id, kind.as_str()],
        )? {
            return ReferenceId::new(id);
        }

        let id = atomically(self.conn, || {
            let id = self.allocate_element("reference")?;
            self.conn.execute(
                "INSERT INTO edges (id, context_id, target_id, kind) VALUES (?1, ?2, ?3, ?4)",
                params![id, context.get(), target_id, kind.as_str()],
            )?;
            Ok(id)
        })?;
        debug!(id, context = %context, to = ?target, kind = %kind, "new reference");
        ReferenceId::new(id)
    }

    /// A given scope must be a recorded symbol. Under `ByName` it is then
    /// ignored and locals are keyed by bare name.
    pub(crate) fn resolve_local_symbol(
        &self,
        name: &str,
        scope: Option<SymbolId>,
    ) -> Result<LocalSymbolId> {
        if let Some(scope) = scope {
            self.ensure_symbol(scope)?;
        }
        let scope = match self.local_symbols {
            LocalSymbolIdentity::ByName => None,
            LocalSymbolIdentity::ByScope => scope,
        };
        let key = match (self.local_symbols, scope) {
            (LocalSymbolIdentity::ByName, _) => name.to_string(),
            (LocalSymbolIdentity::ByScope, scope) => {
                format!("{}/{name}", scope.map_or(0, SymbolId::get))
            }
        };

        if let Some(id) = self.lookup(
            "SELECT id FROM local_symbols WHERE lookup_key = ?1",
            params![key],
        )? {
            return LocalSymbolId::new(id);
        }

        let scope_id = scope.map(SymbolId::get);
        let id = atomically(self.conn, || {
            let id = self.allocate_element("local_symbol")?;
            self.conn.execute(
                "INSERT INTO local_symbols (id, lookup_key, name, scope_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, key, name, scope_id],
            )?;
            Ok(id)
        })?;
        debug!(id, name, scope = ?scope_id, "new local symbol");
        LocalSymbolId::new(id)
    }

    pub(crate) fn resolve_file(&self, path: &str) -> Result<FileId> {
        if let Some(id) = self.lookup("SELECT id FROM files WHERE path = ?1", params![path])? {
            return FileId::new(id);
        }
        self.conn
            .execute("INSERT INTO files (path) VALUES (?1)", params![path])?;
        let id = self.conn.last_insert_rowid();
        debug!(id, path, "new file");
        FileId::new(id)
    }

    fn ensure_symbol(&self, id: SymbolId) -> Result<()> {
        self.lookup("SELECT id FROM symbols WHERE id = ?1", params![id.get()])?
            .map(|_| ())
            .ok_or(WriterError::UnknownSymbol(id.get()))
    }

    fn allocate_element(&self, category: &str) -> Result<i64> {
        self.conn
            .prepare_cached("INSERT INTO elements (category) VALUES (?1)")?
            .execute(params![category])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn lookup(&self, sql: &str, params: impl Params) -> Result<Option<i64>> {
        Ok(self
            .conn
            .prepare_cached(sql)?
            .query_row(params, |row| row.get(0))
            .optional()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::NameElement;

    fn resolver(db: &Database) -> IdentityResolver<'_> {
        IdentityResolver::new(db, LocalSymbolIdentity::ByName)
    }

    #[test]
    fn test_same_hierarchy_same_id() {
        let db = Database::open_memory().unwrap();
        let ids = resolver(&db);
        let name = NameHierarchy::with_delimiter("::", "std").child("vector");

        let first = ids.resolve_symbol(&name).unwrap();
        let again = ids.resolve_symbol(&name.clone()).unwrap();
        let other = ids.resolve_symbol(&NameHierarchy::with_delimiter("::", "std")).unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);
    }

    #[test]
    fn test_equivalent_shapes_share_identity() {
        let db = Database::open_memory().unwrap();
        let ids = resolver(&db);
        let a = ids
            .resolve_symbol(&NameHierarchy::from_prefix_name_postfix("void", "f", "()"))
            .unwrap();
        let b = ids
            .resolve_symbol(&NameHierarchy::from_elements(
                "",
                vec![NameElement::with_decoration("void", "f", "()")],
            ))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_hierarchy_rejected() {
        let db = Database::open_memory().unwrap();
        let err = resolver(&db)
            .resolve_symbol(&NameHierarchy::from_elements(".", vec![]))
            .unwrap_err();
        assert!(matches!(err, WriterError::EmptyName));
    }

    #[test]
    fn test_reference_tuple_dedup() {
        let db = Database::open_memory().unwrap();
        let ids = resolver(&db);
        let a = ids.resolve_symbol(&NameHierarchy::from_single_name("A")).unwrap();
        let b = ids.resolve_symbol(&NameHierarchy::from_single_name("B")).unwrap();

        let call = ids.resolve_reference(a, b.into(), ReferenceKind::Call).unwrap();
        let call_again = ids.resolve_reference(a, b.into(), ReferenceKind::Call).unwrap();
        let inherit = ids
            .resolve_reference(a, b.into(), ReferenceKind::Inheritance)
            .unwrap();
        let reverse = ids.resolve_reference(b, a.into(), ReferenceKind::Call).unwrap();

        assert_eq!(call, call_again);
        assert_ne!(call, inherit);
        assert_ne!(call, reverse);
    }

    #[test]
    fn test_unsolved_targets_collapse_per_context_and_kind() {
        let db = Database::open_memory().unwrap();
        let ids = resolver(&db);
        let a = ids.resolve_symbol(&NameHierarchy::from_single_name("A")).unwrap();

        let first = ids
            .resolve_reference(a, ReferenceTarget::Unsolved, ReferenceKind::Call)
            .unwrap();
        let second = ids
            .resolve_reference(a, ReferenceTarget::Unsolved, ReferenceKind::Call)
            .unwrap();
        let usage = ids
            .resolve_reference(a, ReferenceTarget::Unsolved, ReferenceKind::Usage)
            .unwrap();
        assert_eq!(first, second);
        assert_ne!(first, usage);
    }

    #[test]
    fn test_reference_needs_known_endpoints() {
        let db = Database::open_memory().unwrap();
        let ids = resolver(&db);
        let a = ids.resolve_symbol(&NameHierarchy::from_single_name("A")).unwrap();
        let ghost = SymbolId::new(99).unwrap();

        let err = ids
            .resolve_reference(a, ghost.into(), ReferenceKind::Usage)
            .unwrap_err();
        assert!(matches!(err, WriterError::UnknownSymbol(99)));
        assert!(ids
            .resolve_reference(ghost, a.into(), ReferenceKind::Usage)
            .is_err());
    }

    #[test]
    fn test_local_symbols_by_name_ignore_scope() {
        let db = Database::open_memory().unwrap();
        let ids = resolver(&db);
        let f = ids.resolve_symbol(&NameHierarchy::from_single_name("f")).unwrap();
        let g = ids.resolve_symbol(&NameHierarchy::from_single_name("g")).unwrap();

        let in_f = ids.resolve_local_symbol("i", Some(f)).unwrap();
        let in_g = ids.resolve_local_symbol("i", Some(g)).unwrap();
        assert_eq!(in_f, in_g);
    }

    #[test]
    fn test_unknown_scope_rejected_under_either_policy() {
        let db = Database::open_memory().unwrap();
        let ghost = SymbolId::new(999).unwrap();
        for policy in [LocalSymbolIdentity::ByName, LocalSymbolIdentity::ByScope] {
            let err = IdentityResolver::new(&db, policy)
                .resolve_local_symbol("i", Some(ghost))
                .unwrap_err();
            assert!(matches!(err, WriterError::UnknownSymbol(999)), "{policy:?}");
        }
        assert!(db.is_empty().unwrap());
    }

    #[test]
    fn test_local_symbols_by_scope_stay_apart() {
        let db = Database::open_memory().unwrap();
        let ids = IdentityResolver::new(&db, LocalSymbolIdentity::ByScope);
        let f = ids.resolve_symbol(&NameHierarchy::from_single_name("f")).unwrap();
        let g = ids.resolve_symbol(&NameHierarchy::from_single_name("g")).unwrap();

        let in_f = ids.resolve_local_symbol("i", Some(f)).unwrap();
        let in_g = ids.resolve_local_symbol("i", Some(g)).unwrap();
        let unscoped = ids.resolve_local_symbol("i", None).unwrap();

        assert_ne!(in_f, in_g);
        assert_ne!(in_f, unscoped);
        assert_eq!(in_f, ids.resolve_local_symbol("i", Some(f)).unwrap());
    }

    #[test]
    fn test_files_have_their_own_id_space() {
        let db = Database::open_memory().unwrap();
        let ids = resolver(&db);
        let file = ids.resolve_file("/src/a.cpp").unwrap();
        let sym = ids.resolve_symbol(&NameHierarchy::from_single_name("a")).unwrap();

        assert_eq!(file.get(), 1);
        assert_eq!(sym.get(), 1);
        assert_eq!(ids.resolve_file("/src/a.cpp").unwrap(), file);
        assert_ne!(ids.resolve_file("/src/b.cpp").unwrap(), file);
    }
}
