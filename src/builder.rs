//! Chainable handles over a [`Writer`].
//!
//! Each handle carries an id obtained from the writer; every setter records
//! one attribute and hands the handle back, so a whole declaration reads as
//! one chain:
//!
//! ```no_run
//! # use symtrail::{name::NameHierarchy, types::SymbolKind, writer::Writer};
//! # fn demo(writer: &Writer) -> symtrail::error::Result<()> {
//! let file = writer.create_file("/src/api.cpp")?.as_language("cpp")?;
//! let api = writer
//!     .create_symbol(NameHierarchy::with_delimiter(".", "api"))?
//!     .explicitly()?
//!     .of_type(SymbolKind::Namespace)?
//!     .at_location(file.at(8, 11, 8, 13)?)?;
//! api.create_child_symbol("MyType")?.of_type(SymbolKind::Class)?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::name::{NameElement, NameHierarchy};
use crate::types::{
    DefinitionKind, FileId, LocalSymbolId, ReferenceId, ReferenceKind, SourceRange, SymbolId,
    SymbolKind,
};
use crate::writer::Writer;

impl Writer {
    pub fn create_symbol(&self, name: NameHierarchy) -> Result<SymbolBuilder<'_>> {
        let id = self.record_symbol(&name)?;
        Ok(SymbolBuilder {
            writer: self,
            name,
            id,
        })
    }

    pub fn create_file(&self, path: &str) -> Result<FileBuilder<'_>> {
        let id = self.register_file(path)?;
        Ok(FileBuilder {
            writer: self,
            path: path.to_string(),
            id,
        })
    }

    pub fn create_local_symbol(&self, name: &str) -> Result<LocalSymbolBuilder<'_>> {
        let id = self.record_local_symbol(name)?;
        Ok(LocalSymbolBuilder { writer: self, id })
    }

    pub fn record_error(&self, message: &str, location: &SourceRange) -> Result<&Self> {
        self.record_diagnostic(message, false, location)?;
        Ok(self)
    }

    pub fn record_fatal_error(&self, message: &str, location: &SourceRange) -> Result<&Self> {
        self.record_diagnostic(message, true, location)?;
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct SymbolBuilder<'w> {
    writer: &'w Writer,
    name: NameHierarchy,
    id: SymbolId,
}

impl<'w> SymbolBuilder<'w> {
    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn name(&self) -> &NameHierarchy {
        &self.name
    }

    pub fn of_type(self, kind: SymbolKind) -> Result<Self> {
        self.writer.set_symbol_kind(self.id, kind)?;
        Ok(self)
    }

    pub fn with_definition(self, kind: DefinitionKind) -> Result<Self> {
        self.writer.set_definition_kind(self.id, kind)?;
        Ok(self)
    }

    pub fn explicitly(self) -> Result<Self> {
        self.with_definition(DefinitionKind::Explicit)
    }

    pub fn implicitly(self) -> Result<Self> {
        self.with_definition(DefinitionKind::Implicit)
    }

    pub fn at_location(self, range: SourceRange) -> Result<Self> {
        self.writer.set_symbol_location(self.id, &range)?;
        Ok(self)
    }

    /// Range highlighted while the symbol is active.
    pub fn with_scope(self, range: SourceRange) -> Result<Self> {
        self.writer.set_scope_location(self.id, &range)?;
        Ok(self)
    }

    pub fn with_qualifier(self, range: SourceRange) -> Result<Self> {
        self.writer.set_qualifier_location(self.id, &range)?;
        Ok(self)
    }

    /// Range shown as the symbol's signature in tooltips.
    pub fn with_signature(self, range: SourceRange) -> Result<Self> {
        self.writer.set_signature_location(self.id, &range)?;
        Ok(self)
    }

    /// Record the symbol one level below this one. This handle is unchanged.
    pub fn create_child_symbol(
        &self,
        element: impl Into<NameElement>,
    ) -> Result<SymbolBuilder<'w>> {
        self.writer.create_symbol(self.name.child(element))
    }

    /// Local symbol owned by this symbol, e.g. a parameter of a method.
    pub fn create_local_symbol(&self, name: &str) -> Result<LocalSymbolBuilder<'w>> {
        let id = self.writer.record_scoped_local_symbol(self.id, name)?;
        Ok(LocalSymbolBuilder {
            writer: self.writer,
            id,
        })
    }

    /// Edge from this symbol to `target`.
    pub fn references(
        &self,
        target: &SymbolBuilder<'_>,
        kind: ReferenceKind,
    ) -> Result<ReferenceBuilder<'w>> {
        let id = self.writer.create_reference(self.id, target.id, kind)?;
        Ok(ReferenceBuilder {
            writer: self.writer,
            id,
        })
    }

    /// Edge from `context` to this symbol.
    pub fn is_referenced_by(
        &self,
        context: &SymbolBuilder<'_>,
        kind: ReferenceKind,
    ) -> Result<ReferenceBuilder<'w>> {
        let id = self.writer.create_reference(context.id, self.id, kind)?;
        Ok(ReferenceBuilder {
            writer: self.writer,
            id,
        })
    }

    /// Edge from this symbol to a name the analyzer could not resolve.
    pub fn references_unsolved(
        &self,
        kind: ReferenceKind,
        location: SourceRange,
    ) -> Result<ReferenceBuilder<'w>> {
        let id = self
            .writer
            .create_unsolved_reference(self.id, kind, &location)?;
        Ok(ReferenceBuilder {
            writer: self.writer,
            id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceBuilder<'w> {
    writer: &'w Writer,
    id: ReferenceId,
}

impl<'w> ReferenceBuilder<'w> {
    pub fn id(&self) -> ReferenceId {
        self.id
    }

    pub fn at_location(self, range: SourceRange) -> Result<Self> {
        self.writer.set_reference_location(self.id, &range)?;
        Ok(self)
    }

    pub fn ambiguous(self) -> Result<Self> {
        self.writer.mark_ambiguous(self.id)?;
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct FileBuilder<'w> {
    writer: &'w Writer,
    path: String,
    id: FileId,
}

impl<'w> FileBuilder<'w> {
    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Language hint for syntax highlighting.
    pub fn as_language(self, language: &str) -> Result<Self> {
        self.writer.set_file_language(self.id, language)?;
        Ok(self)
    }

    /// A range in this file.
    pub fn at(
        &self,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Result<SourceRange> {
        SourceRange::new(self.id, start_line, start_column, end_line, end_column)
    }
}

#[derive(Debug, Clone)]
pub struct LocalSymbolBuilder<'w> {
    writer: &'w Writer,
    id: LocalSymbolId,
}

impl<'w> LocalSymbolBuilder<'w> {
    pub fn id(&self) -> LocalSymbolId {
        self.id
    }

    /// Add an occurrence. Repeated calls accumulate.
    pub fn at_location(self, range: SourceRange) -> Result<Self> {
        self.writer.add_local_symbol_location(self.id, &range)?;
        Ok(self)
    }
}
