//! Language front-ends (C1): one module per supported language, dispatched
//! through `ParserRegistry` by file extension.

pub mod go;
pub mod python;
pub mod registry;
pub mod rust;
pub mod traits;
pub mod typescript;

pub use registry::ParserRegistry;
pub(crate) use traits::path_display;
pub use traits::{
    EdgeType, ExtractedEdge, ExtractedSymbol, LanguageConfig, LanguageFront, SymbolKind,
};

/// Sentinel used when a reference site has no enclosing function/method/class.
/// Dropped at resolution time (spec.md §4.1, §4.4 step 7).
pub const MODULE_SENTINEL: &str = "<module>";

/// A frame pushed while walking into a function/method/class-like body, used
/// only to compute `enclosing_declaration` for reference sites beneath it.
#[derive(Debug, Clone)]
pub enum EnclosingFrame {
    Function { name: String },
    Method { class: String, name: String },
}

/// Compute the qualified name of the innermost enclosing declaration, walking
/// from the reference site outward through `ancestors` (innermost first).
/// Methods attribute to `"Class.method"`; anything else attributes to its own
/// name; an empty stack attributes to the module sentinel.
///
/// Grounded on the teacher's `narrowest_symbol_covering` (`util.rs`), adapted
/// to operate during the tree walk (on a stack of in-progress declaration
/// names) rather than post-hoc against stored rows.
pub fn enclosing_declaration(ancestors: &[EnclosingFrame]) -> String {
    match ancestors.last() {
        Some(EnclosingFrame::Method { class, name }) => format!("{class}.{name}"),
        Some(EnclosingFrame::Function { name }) => name.clone(),
        None => MODULE_SENTINEL.to_string(),
    }
}
