use serde::Serialize;

use crate::error::{Result, WriterError};

macro_rules! element_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw id. Zero and negative values are never valid ids.
            pub fn new(value: i64) -> Result<Self> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(WriterError::InvalidId {
                        kind: $label,
                        value,
                    })
                }
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

element_id!(
    /// Identity of a symbol, keyed by its canonical name.
    SymbolId,
    "symbol"
);
element_id!(
    /// Identity of a `(context, target, kind)` edge.
    ReferenceId,
    "reference"
);
element_id!(
    /// Identity of a local symbol (parameter, local variable).
    LocalSymbolId,
    "local symbol"
);
element_id!(
    /// Identity of a registered source file.
    FileId,
    "file"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Type,
    BuiltinType,
    Module,
    Namespace,
    Package,
    Struct,
    Class,
    Interface,
    Annotation,
    GlobalVariable,
    Field,
    Function,
    Method,
    Enum,
    EnumConstant,
    Typedef,
    TypeParameter,
    Macro,
    Union,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::BuiltinType => "builtin_type",
            Self::Module => "module",
            Self::Namespace => "namespace",
            Self::Package => "package",
            Self::Struct => "struct",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Annotation => "annotation",
            Self::GlobalVariable => "global_variable",
            Self::Field => "field",
            Self::Function => "function",
            Self::Method => "method",
            Self::Enum => "enum",
            Self::EnumConstant => "enum_constant",
            Self::Typedef => "typedef",
            Self::TypeParameter => "type_parameter",
            Self::Macro => "macro",
            Self::Union => "union",
        }
    }
}

impl std::str::FromStr for SymbolKind {
    type Err = WriterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "type" => Ok(Self::Type),
            "builtin_type" => Ok(Self::BuiltinType),
            "module" => Ok(Self::Module),
            "namespace" => Ok(Self::Namespace),
            "package" => Ok(Self::Package),
            "struct" => Ok(Self::Struct),
            "class" => Ok(Self::Class),
            "interface" => Ok(Self::Interface),
            "annotation" => Ok(Self::Annotation),
            "global_variable" => Ok(Self::GlobalVariable),
            "field" => Ok(Self::Field),
            "function" => Ok(Self::Function),
            "method" => Ok(Self::Method),
            "enum" => Ok(Self::Enum),
            "enum_constant" => Ok(Self::EnumConstant),
            "typedef" => Ok(Self::Typedef),
            "type_parameter" => Ok(Self::TypeParameter),
            "macro" => Ok(Self::Macro),
            "union" => Ok(Self::Union),
            _ => Err(WriterError::UnknownKind {
                kind: "symbol kind",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a symbol came to be known. `None` until the analyzer says otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    #[default]
    None,
    Implicit,
    Explicit,
}

impl DefinitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Implicit => "implicit",
            Self::Explicit => "explicit",
        }
    }

    /// Parse a stored definition kind, defaulting to `None` for unknown values.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "implicit" => Self::Implicit,
            "explicit" => Self::Explicit,
            _ => Self::None,
        }
    }
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    TypeUsage,
    Usage,
    Call,
    Inheritance,
    Override,
    TypeArgument,
    TemplateSpecialization,
    Include,
    Import,
    MacroUsage,
    AnnotationUsage,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeUsage => "type_usage",
            Self::Usage => "usage",
            Self::Call => "call",
            Self::Inheritance => "inheritance",
            Self::Override => "override",
            Self::TypeArgument => "type_argument",
            Self::TemplateSpecialization => "template_specialization",
            Self::Include => "include",
            Self::Import => "import",
            Self::MacroUsage => "macro_usage",
            Self::AnnotationUsage => "annotation_usage",
        }
    }
}

impl std::str::FromStr for ReferenceKind {
    type Err = WriterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "type_usage" => Ok(Self::TypeUsage),
            "usage" => Ok(Self::Usage),
            "call" => Ok(Self::Call),
            "inheritance" => Ok(Self::Inheritance),
            "override" => Ok(Self::Override),
            "type_argument" => Ok(Self::TypeArgument),
            "template_specialization" => Ok(Self::TemplateSpecialization),
            "include" => Ok(Self::Include),
            "import" => Ok(Self::Import),
            "macro_usage" => Ok(Self::MacroUsage),
            "annotation_usage" => Ok(Self::AnnotationUsage),
            _ => Err(WriterError::UnknownKind {
                kind: "reference kind",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a reference points at. `Unsolved` stands for a name the analyzer
/// could not resolve; all unsolved targets share one synthetic node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTarget {
    Symbol(SymbolId),
    Unsolved,
}

impl ReferenceTarget {
    pub fn symbol_id(&self) -> Option<SymbolId> {
        match self {
            Self::Symbol(id) => Some(*id),
            Self::Unsolved => None,
        }
    }
}

impl From<SymbolId> for ReferenceTarget {
    fn from(id: SymbolId) -> Self {
        Self::Symbol(id)
    }
}

/// A span in a registered file. Lines and columns start at 1 and both ends
/// are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRange {
    pub file_id: FileId,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceRange {
    /// Build a range, rejecting zero coordinates and ranges that end before
    /// they start. A zero-width range (`start == end`) is valid.
    pub fn new(
        file_id: FileId,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Result<Self> {
        let invalid = |reason| WriterError::InvalidRange {
            start_line,
            start_column,
            end_line,
            end_column,
            reason,
        };
        if start_line == 0 || start_column == 0 || end_line == 0 || end_column == 0 {
            return Err(invalid("lines and columns start at 1"));
        }
        if end_line < start_line || (end_line == start_line && end_column < start_column) {
            return Err(invalid("range ends before it starts"));
        }
        Ok(Self {
            file_id,
            start_line,
            start_column,
            end_line,
            end_column,
        })
    }
}

impl std::fmt::Display for SourceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}-{}:{}",
            self.file_id, self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

/// A problem the analyzer found in the source. `fatal` marks results for
/// the affected region as incomplete; it does not stop recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub fatal: bool,
    pub location: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub id: FileId,
    pub path: String,
    pub language: Option<String>,
}

/// A symbol row as stored, with its overwritable attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolRecord {
    pub id: SymbolId,
    pub serialized_name: String,
    pub kind: Option<SymbolKind>,
    pub definition_kind: DefinitionKind,
    pub location: Option<SourceRange>,
    pub scope_location: Option<SourceRange>,
    pub qualifier_location: Option<SourceRange>,
    pub signature_location: Option<SourceRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceRecord {
    pub id: ReferenceId,
    pub context_id: SymbolId,
    pub target: ReferenceTarget,
    pub kind: ReferenceKind,
    pub location: Option<SourceRange>,
    /// Every site recorded through an unsolved reference. Empty for
    /// resolved edges.
    pub occurrences: Vec<SourceRange>,
    pub ambiguous: bool,
}
