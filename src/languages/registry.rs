//! Parser registry for language dispatch by file extension.
//!
//! Grounded on the teacher's `languages::registry::ParserRegistry`: a static
//! `HashMap<extension, Box<dyn LanguageFront>>` rather than an if/else chain
//! or a visitor over a closed enum (design note, spec.md §9).

use std::collections::HashMap;
use std::path::Path;

use super::go::GoFront;
use super::python::PythonFront;
use super::rust::RustFront;
use super::traits::LanguageFront;
use super::typescript::TypeScriptFront;

pub struct ParserRegistry {
    fronts: HashMap<&'static str, Box<dyn LanguageFront>>,
}

impl ParserRegistry {
    /// Registry with all four built-in front-ends (spec.md §4.1 language set).
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(RustFront::new());
        registry.register(PythonFront::new());
        registry.register(TypeScriptFront::new());
        registry.register(GoFront::new());
        registry
    }

    pub fn empty() -> Self {
        Self {
            fronts: HashMap::new(),
        }
    }

    pub fn register<P: LanguageFront + 'static>(&mut self, front: P) {
        let front: std::sync::Arc<P> = std::sync::Arc::new(front);
        for ext in front.config().extensions {
            self.fronts.insert(ext, Box::new(ArcFront(front.clone())));
        }
    }

    pub fn get(&self, path: &Path) -> Option<&dyn LanguageFront> {
        let ext = path.extension()?.to_str()?;
        self.fronts.get(ext).map(|f| f.as_ref())
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    pub fn supported_extensions(&self) -> Vec<&'static str> {
        self.fronts.keys().copied().collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Thin wrapper so one `Arc<Front>` can be registered under several
/// extensions without re-parsing its config or cloning parser state.
struct ArcFront<P>(std::sync::Arc<P>);

impl<P: LanguageFront> LanguageFront for ArcFront<P> {
    fn config(&self) -> super::traits::LanguageConfig {
        self.0.config()
    }

    fn extract_symbols(
        &self,
        source: &str,
        path: &str,
    ) -> anyhow::Result<Vec<super::traits::ExtractedSymbol>> {
        self.0.extract_symbols(source, path)
    }

    fn extract_edges(
        &self,
        source: &str,
        path: &str,
        symbols: &[super::traits::ExtractedSymbol],
    ) -> anyhow::Result<Vec<super::traits::ExtractedEdge>> {
        self.0.extract_edges(source, path, symbols)
    }
}
