//! Core abstractions for language front-ends.
//!
//! Defines the `LanguageFront` trait and its record types, the single seam
//! every per-language module (`rust`, `python`, `typescript`, `go`) plugs
//! into. Grounded on the teacher's `languages::traits::LanguageParser` — kept
//! as a sum-type-style static table (design note, spec.md §9) rather than a
//! trait-object hierarchy with shared mutable state.

use std::path::Path;

use anyhow::Result;

/// Standardized symbol kinds (spec.md §3). Extensible in principle; this
/// crate emits exactly these ten.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Interface,
    Struct,
    Type,
    Enum,
    Variable,
    Constant,
    Import,
    Export,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Struct => "struct",
            SymbolKind::Type => "type",
            SymbolKind::Enum => "enum",
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Import => "import",
            SymbolKind::Export => "export",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "function" => Some(SymbolKind::Function),
            "method" => Some(SymbolKind::Method),
            "class" => Some(SymbolKind::Class),
            "interface" => Some(SymbolKind::Interface),
            "struct" => Some(SymbolKind::Struct),
            "type" => Some(SymbolKind::Type),
            "enum" => Some(SymbolKind::Enum),
            "variable" => Some(SymbolKind::Variable),
            "constant" => Some(SymbolKind::Constant),
            "import" => Some(SymbolKind::Import),
            "export" => Some(SymbolKind::Export),
            _ => None,
        }
    }

    /// Whether a symbol of this kind may be a `parent_id` target (spec.md §3 invariant).
    pub fn is_class_like(&self) -> bool {
        matches!(
            self,
            SymbolKind::Class | SymbolKind::Interface | SymbolKind::Struct
        )
    }
}

/// Typed edges (spec.md §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeType {
    Call,
    Import,
    Instantiate,
    Access,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Call => "call",
            EdgeType::Import => "import",
            EdgeType::Instantiate => "instantiate",
            EdgeType::Access => "access",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "call" => Some(EdgeType::Call),
            "import" => Some(EdgeType::Import),
            "instantiate" => Some(EdgeType::Instantiate),
            "access" => Some(EdgeType::Access),
            _ => None,
        }
    }
}

/// A symbol as emitted by a front-end, before the indexer assigns it a store
/// id. `parent_index` is a list index into the same front-end's symbol
/// vector, resolved to a store id by C4 in its second insertion pass
/// (spec.md §4.4 steps 4-5).
#[derive(Debug, Clone)]
pub struct ExtractedSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub signature: Option<String>,
    pub parent_index: Option<usize>,
}

/// An edge as emitted by a front-end, before resolution. `from_symbol` is the
/// enclosing declaration's qualified name (or `<module>`); `to_symbol` is the
/// referenced name. `to_file` restricts resolution to the emitting file when
/// `Some` (self-references, local receivers); `None` opts into cross-file
/// alias resolution (spec.md §4.1, §4.4 step 7).
#[derive(Debug, Clone)]
pub struct ExtractedEdge {
    pub from_symbol: String,
    pub to_symbol: String,
    pub to_file: Option<String>,
    pub edge_type: EdgeType,
    pub provenance: String,
}

/// Configuration advertised by a front-end: display name and the file
/// extensions it claims.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

/// The seam every language front-end implements (spec.md §4.1).
///
/// Extraction proceeds in two phases so that parent (class/method) links are
/// available before edges are walked: callers always invoke
/// `extract_symbols` first and pass its result into `extract_edges`.
pub trait LanguageFront: Send + Sync {
    fn config(&self) -> LanguageConfig;

    /// Parse `source` (the file at `path`, used only for diagnostics) and
    /// emit its symbol declarations.
    fn extract_symbols(&self, source: &str, path: &str) -> Result<Vec<ExtractedSymbol>>;

    /// Given the symbols already extracted from the same source, emit the
    /// edges originating from reference sites in it.
    fn extract_edges(
        &self,
        source: &str,
        path: &str,
        symbols: &[ExtractedSymbol],
    ) -> Result<Vec<ExtractedEdge>>;

    fn handles_extension(&self, ext: &str) -> bool {
        self.config().extensions.contains(&ext)
    }
}

pub(crate) fn path_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
