//! Indexer (C4): the linear build pipeline from discovered files to a
//! populated store (spec.md §4.4).
//!
//! Grounded on the teacher's `indexer.rs` for the overall shape (a
//! `build_*` entry point returning a summary struct, per-file error capture
//! that never aborts the build) and its `IndexProgress`/`IndexPhase`
//! reporting callback, generalized from the teacher's single-language,
//! single-pass indexing to the spec's explicit 9-step pipeline across four
//! front-ends.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use log::{debug, warn};

use crate::error::XrayError;
use crate::identity::{canonical_id, generate_aliases};
use crate::languages::{EdgeType, ExtractedEdge, ExtractedSymbol, LanguageFront, ParserRegistry, SymbolKind};
use crate::store::{IndexStore, PendingAlias, PendingSymbol, ResolvedEdge};
use crate::walker::discover_files;

/// Reported at each phase boundary so a boundary-layer progress bar (the
/// teacher's `indicatif` usage) can render something meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPhase {
    Discovering,
    Parsing,
    Resolving,
    Finalizing,
}

pub trait ProgressSink {
    fn phase(&mut self, phase: IndexPhase, total: usize) {
        let _ = (phase, total);
    }
    fn tick(&mut self) {}
}

/// A no-op sink for callers (and tests) that don't care about progress.
pub struct NullProgress;
impl ProgressSink for NullProgress {}

#[derive(Debug, Clone)]
pub struct FileError {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct IndexSummary {
    pub files_indexed: usize,
    pub symbols_indexed: usize,
    pub edges_created: usize,
    pub duration_ms: u128,
    pub errors: Vec<FileError>,
}

#[derive(Clone)]
struct StagedSymbol {
    pending: PendingSymbol,
    source_kind: SymbolKind,
}

/// Build (or rebuild) the index for `root` into `store`. This is a full
/// rebuild: the store is truncated transactionally before new rows land
/// (spec.md §4.4, last line).
pub fn build_full_index(
    root: &Path,
    store: &IndexStore,
    registry: &ParserRegistry,
    progress: &mut dyn ProgressSink,
) -> Result<IndexSummary> {
    if !root.is_dir() {
        bail!("invalid root path {}: not a directory", root.display());
    }
    let started = Instant::now();

    // Step 1: discover files (C6).
    progress.phase(IndexPhase::Discovering, 0);
    let files = discover_files(root, registry);

    store.clear()?;

    // Step 2: per file, invoke the matching front-end.
    progress.phase(IndexPhase::Parsing, files.len());
    let mut staged: Vec<StagedSymbol> = Vec::new();
    let mut staged_aliases: Vec<PendingAlias> = Vec::new();
    let mut staged_edges: Vec<ExtractedEdge> = Vec::new();
    let mut errors = Vec::new();

    for relative in &files {
        progress.tick();
        let absolute = root.join(relative);
        let file_display = crate::languages::path_display(relative);
        let front = match registry.get(relative) {
            Some(f) => f,
            None => continue,
        };
        let source = match std::fs::read_to_string(&absolute) {
            Ok(s) => s,
            Err(e) => {
                let typed = XrayError::ParseError {
                    file: file_display.clone(),
                    reason: e.to_string(),
                };
                errors.push(FileError {
                    file: file_display.clone(),
                    reason: typed.to_string(),
                });
                continue;
            }
        };
        match index_one_file(front, &source, &file_display) {
            Ok((symbols, edges)) => {
                let base = staged.len();
                for (i, sym) in symbols.iter().enumerate() {
                    let parent = sym.parent_index.and_then(|p| symbols.get(p)).cloned();
                    let canonical = canonical_id(sym, parent.as_ref(), &file_display);
                    let aliases = generate_aliases(sym, parent.as_ref(), &file_display);
                    for alias in aliases {
                        staged_aliases.push(PendingAlias {
                            symbol_list_index: base + i,
                            alias_type: alias.alias_type,
                            alias_name: alias.alias_name,
                            context_file: alias.context_file,
                        });
                    }
                    staged.push(StagedSymbol {
                        pending: PendingSymbol {
                            canonical_id: canonical,
                            name: sym.name.clone(),
                            kind: sym.kind,
                            file: file_display.clone(),
                            line: sym.line as i64,
                            column: sym.column as i64,
                            end_line: sym.end_line as i64,
                            signature: sym.signature.clone(),
                            parent_list_index: sym.parent_index.map(|p| base + p),
                        },
                        source_kind: sym.kind,
                    });
                }
                staged_edges.extend(edges);
            }
            Err(e) => {
                warn!("parse error in {file_display}: {e}");
                let typed = XrayError::ParseError {
                    file: file_display.clone(),
                    reason: e.to_string(),
                };
                errors.push(FileError {
                    file: file_display.clone(),
                    reason: typed.to_string(),
                });
            }
        }
    }

    // Steps 4-6: bulk insert symbols, patch parent ids, insert aliases.
    progress.phase(IndexPhase::Resolving, staged.len());
    let pending_symbols: Vec<PendingSymbol> = staged.iter().map(|s| s.pending.clone()).collect();
    let ids = store.insert_symbols(&pending_symbols)?;
    store.patch_parent_ids(&pending_symbols, &ids)?;
    store.insert_aliases(&staged_aliases, &ids)?;

    // Lookup tables served from this batch, so step 7's per-edge alias
    // lookup doesn't need a store round-trip per reference.
    let mut by_simple_name: HashMap<(String, String), Vec<i64>> = HashMap::new();
    let mut by_name: HashMap<String, Vec<i64>> = HashMap::new();
    let mut first_definition: HashMap<String, i64> = HashMap::new();
    for (staged_sym, &id) in staged.iter().zip(ids.iter()) {
        let key = (staged_sym.pending.file.clone(), staged_sym.pending.name.clone());
        by_simple_name.entry(key).or_default().push(id);
        by_name
            .entry(staged_sym.pending.name.clone())
            .or_default()
            .push(id);
        if staged_sym.source_kind != SymbolKind::Import {
            first_definition
                .entry(staged_sym.pending.name.clone())
                .or_insert(id);
        }
    }

    // Step 7: resolve edges to store ids. Drop edges whose endpoints can't be
    // resolved, are equal, or reference the module sentinel.
    let mut resolved = Vec::new();
    let mut resolution_misses = 0usize;
    for edge in &staged_edges {
        if edge.from_symbol == crate::languages::MODULE_SENTINEL
            || edge.to_symbol == crate::languages::MODULE_SENTINEL
        {
            resolution_misses += 1;
            continue;
        }
        let from_id = resolve_endpoint(&by_simple_name, &by_name, &edge.from_symbol, None);
        let to_id = resolve_endpoint(&by_simple_name, &by_name, &edge.to_symbol, edge.to_file.as_deref());
        match (from_id, to_id) {
            (Some(from_id), Some(to_id)) if from_id != to_id => {
                resolved.push(ResolvedEdge {
                    from_id,
                    to_id,
                    edge_type: edge.edge_type,
                    provenance: edge.provenance.clone(),
                });
            }
            _ => resolution_misses += 1,
        }
    }

    // Step 8: seed import-linkage edges — for every `import` symbol with
    // name N, link to the first non-import definition of N in another file.
    for (staged_sym, &id) in staged.iter().zip(ids.iter()) {
        if staged_sym.source_kind != SymbolKind::Import {
            continue;
        }
        if let Some(&definition_id) = first_definition.get(&staged_sym.pending.name) {
            if definition_id != id {
                resolved.push(ResolvedEdge {
                    from_id: id,
                    to_id: definition_id,
                    edge_type: EdgeType::Import,
                    provenance: format!("import {} -> definition", staged_sym.pending.name),
                });
            }
        }
    }

    dedup_edges(&mut resolved);
    store.insert_edges(&resolved)?;
    debug!("resolution misses this build: {resolution_misses}");

    // Step 9: record metadata.
    progress.phase(IndexPhase::Finalizing, 0);
    store.set_metadata("completed_at", &crate::util::now_rfc3339())?;
    store.set_metadata("files_indexed", &files.len().to_string())?;
    store.set_metadata("symbols_indexed", &staged.len().to_string())?;

    Ok(IndexSummary {
        files_indexed: files.len(),
        symbols_indexed: staged.len(),
        edges_created: resolved.len(),
        duration_ms: started.elapsed().as_millis(),
        errors,
    })
}

fn index_one_file(
    front: &dyn LanguageFront,
    source: &str,
    file_display: &str,
) -> Result<(Vec<ExtractedSymbol>, Vec<ExtractedEdge>)> {
    let symbols = front
        .extract_symbols(source, file_display)
        .with_context(|| format!("failed to parse {file_display}"))?;
    let edges = front
        .extract_edges(source, file_display, &symbols)
        .with_context(|| format!("failed to extract edges from {file_display}"))?;
    Ok((symbols, edges))
}

/// Resolve a reference-site name to a store id. `context_file = Some(f)`
/// restricts to definitions in `f`; `None` opts into the first cross-file
/// match by simple name (spec.md §4.4 step 7: "to_file = null -> no
/// context, allowing cross-file hits").
fn resolve_endpoint(
    by_simple_name: &HashMap<(String, String), Vec<i64>>,
    by_name: &HashMap<String, Vec<i64>>,
    name: &str,
    context_file: Option<&str>,
) -> Option<i64> {
    if let Some(file) = context_file {
        if let Some(ids) = by_simple_name.get(&(file.to_string(), name.to_string())) {
            return ids.first().copied();
        }
        return None;
    }
    by_name.get(name).and_then(|ids| ids.first().copied())
}

fn dedup_edges(edges: &mut Vec<ResolvedEdge>) {
    let mut seen = std::collections::HashSet::new();
    edges.retain(|e| seen.insert((e.from_id, e.to_id, e.edge_type)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::ParserRegistry;
    use crate::store::IndexStore;
    use std::fs;
    use tempfile::tempdir;

    const AUTH_PY: &str = r#"
class UserService:
    def authenticate_user(self, u, p):
        if validate_user(u):
            return check_password(p)
        return False

def validate_user(u):
    return u in get_users()

def check_password(p):
    return len(p) >= 8

def get_users():
    return ['admin']
"#;

    #[test]
    fn auth_py_scenario_indexes_five_symbols_and_at_least_three_edges() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("auth.py"), AUTH_PY).unwrap();
        let store = IndexStore::open(&dir.path().join(".xray/xray.db")).unwrap();
        let registry = ParserRegistry::new();
        let summary =
            build_full_index(dir.path(), &store, &registry, &mut NullProgress).unwrap();

        assert_eq!(summary.files_indexed, 1);
        assert_eq!(summary.symbols_indexed, 5);
        assert!(summary.edges_created >= 3);
        assert!(summary.errors.is_empty());
    }

    #[test]
    fn rebuild_is_idempotent() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("auth.py"), AUTH_PY).unwrap();
        let store = IndexStore::open(&dir.path().join(".xray/xray.db")).unwrap();
        let registry = ParserRegistry::new();

        let first = build_full_index(dir.path(), &store, &registry, &mut NullProgress).unwrap();
        let second = build_full_index(dir.path(), &store, &registry, &mut NullProgress).unwrap();

        assert_eq!(first.symbols_indexed, second.symbols_indexed);
        assert_eq!(first.edges_created, second.edges_created);
    }

    #[test]
    fn unsupported_file_contributes_no_symbols_but_does_not_abort_the_build() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("auth.py"), AUTH_PY).unwrap();
        fs::write(dir.path().join("notes.txt"), "not code").unwrap();
        let store = IndexStore::open(&dir.path().join(".xray/xray.db")).unwrap();
        let registry = ParserRegistry::new();
        let summary =
            build_full_index(dir.path(), &store, &registry, &mut NullProgress).unwrap();
        assert_eq!(summary.files_indexed, 1);
    }

    #[test]
    fn rejects_non_directory_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "x").unwrap();
        let store = IndexStore::open(&dir.path().join(".xray/xray.db")).unwrap();
        let registry = ParserRegistry::new();
        assert!(build_full_index(&file, &store, &registry, &mut NullProgress).is_err());
    }
}
