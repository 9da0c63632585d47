//! Rust front-end: the imperative, statically-typed systems language in the
//! spec's four-language set (spec.md §4.1).
//!
//! Grounded on the teacher's `languages/rust.rs`: an imperative recursive
//! descent over tree-sitter nodes (not `Query`/`QueryCursor`), carrying an
//! enclosing-container name down through `impl` blocks so methods get
//! `parent_id` and edges attribute to `Class.method`.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use tree_sitter::{Language, Node, Parser};

use super::traits::{EdgeType, ExtractedEdge, ExtractedSymbol, LanguageConfig, LanguageFront, SymbolKind};
use super::EnclosingFrame;

static RUST_LANGUAGE: Lazy<Language> = Lazy::new(|| tree_sitter_rust::LANGUAGE.into());

const PRIMITIVES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize", "f32",
    "f64", "bool", "char", "str", "String", "Self", "Vec", "Option", "Result", "Box",
];

#[derive(Default, Clone)]
pub struct RustFront;

impl RustFront {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageFront for RustFront {
    fn config(&self) -> LanguageConfig {
        LanguageConfig {
            name: "Rust",
            extensions: &["rs"],
        }
    }

    fn extract_symbols(&self, source: &str, _path: &str) -> Result<Vec<ExtractedSymbol>> {
        let tree = parse(source)?;
        let mut symbols = Vec::new();
        walk_symbols(&tree.root_node(), source, None, &mut symbols);
        Ok(symbols)
    }

    fn extract_edges(
        &self,
        source: &str,
        path: &str,
        symbols: &[ExtractedSymbol],
    ) -> Result<Vec<ExtractedEdge>> {
        let tree = parse(source)?;
        let mut edges = Vec::new();
        let mut stack = Vec::new();
        walk_edges(&tree.root_node(), source, path, symbols, &mut stack, &mut edges);
        Ok(edges)
    }
}

fn parse(source: &str) -> Result<tree_sitter::Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&RUST_LANGUAGE)
        .context("failed to set Rust language")?;
    parser.parse(source, None).context("failed to parse Rust source")
}

/// Walk declarations, tracking the name of the enclosing `impl <Type>` block
/// (if any) so that functions inside it become `method` symbols parented to
/// the matching struct/enum by list index.
fn walk_symbols(
    node: &Node,
    source: &str,
    container: Option<&ContainerRef>,
    out: &mut Vec<ExtractedSymbol>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "struct_item" | "enum_item" | "trait_item" => {
                let kind = match child.kind() {
                    "struct_item" => SymbolKind::Struct,
                    "enum_item" => SymbolKind::Enum,
                    _ => SymbolKind::Interface,
                };
                if let Some(name) = field_text(&child, "name", source) {
                    let idx = out.len();
                    out.push(symbol_from_node(&child, &name, kind, source));
                    walk_symbols(&child, source, container, out);
                    let _ = idx;
                }
            }
            "type_item" => {
                if let Some(name) = field_text(&child, "name", source) {
                    out.push(symbol_from_node(&child, &name, SymbolKind::Type, source));
                }
            }
            "const_item" | "static_item" => {
                if let Some(name) = field_text(&child, "name", source) {
                    let kind = if child.kind() == "const_item" {
                        SymbolKind::Constant
                    } else {
                        SymbolKind::Variable
                    };
                    out.push(symbol_from_node(&child, &name, kind, source));
                }
            }
            "function_item" => {
                if let Some(name) = field_text(&child, "name", source) {
                    let (kind, parent_index) = match container {
                        Some(c) => (SymbolKind::Method, Some(c.index)),
                        None => (SymbolKind::Function, None),
                    };
                    let mut sym = symbol_from_node(&child, &name, kind, source);
                    sym.parent_index = parent_index;
                    out.push(sym);
                }
            }
            "impl_item" => {
                let type_name = field_text(&child, "type", source);
                let found = type_name.and_then(|t| {
                    out.iter().position(|s| {
                        s.name == t && matches!(s.kind, SymbolKind::Struct | SymbolKind::Enum)
                    })
                });
                let new_container = found.map(|index| ContainerRef {
                    index,
                    name: out[index].name.clone(),
                });
                if let Some(body) = child.child_by_field_name("body") {
                    walk_symbols(&body, source, new_container.as_ref(), out);
                }
            }
            "mod_item" => {
                if let Some(body) = child.child_by_field_name("body") {
                    walk_symbols(&body, source, container, out);
                }
            }
            "use_declaration" => {
                for name in use_names(&child, source) {
                    let mut sym = symbol_from_node(&child, &name, SymbolKind::Import, source);
                    sym.signature = Some(slice(source, &child));
                    out.push(sym);
                }
            }
            _ => {}
        }
    }
}

struct ContainerRef {
    index: usize,
    name: String,
}

fn walk_edges(
    node: &Node,
    source: &str,
    path: &str,
    symbols: &[ExtractedSymbol],
    stack: &mut Vec<EnclosingFrame>,
    out: &mut Vec<ExtractedEdge>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "function_item" => {
                if let Some(name) = field_text(&child, "name", source) {
                    let frame = match enclosing_class(symbols, &name) {
                        Some(class) => EnclosingFrame::Method { class, name },
                        None => EnclosingFrame::Function { name },
                    };
                    stack.push(frame);
                    if let Some(body) = child.child_by_field_name("body") {
                        walk_edges(&body, source, path, symbols, stack, out);
                    }
                    stack.pop();
                    continue;
                }
            }
            "call_expression" => {
                if let Some(func) = child.child_by_field_name("function") {
                    emit_call_edges(&func, source, path, stack, out);
                }
            }
            "field_expression" => {
                if let (Some(value), Some(field)) = (
                    child.child_by_field_name("value"),
                    child.child_by_field_name("field"),
                ) {
                    if value.kind() == "identifier" {
                        let receiver = slice(source, &value);
                        let member = slice(source, &field);
                        push_edge(out, stack, &receiver, Some(path.to_string()), EdgeType::Access, path);
                        push_edge(out, stack, &member, None, EdgeType::Access, path);
                    }
                }
            }
            "struct_expression" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    let name = slice(source, &name_node);
                    push_edge(out, stack, &name, None, EdgeType::Instantiate, path);
                }
            }
            _ => {}
        }
        walk_edges(&child, source, path, symbols, stack, out);
    }
}

fn emit_call_edges(
    func: &Node,
    source: &str,
    path: &str,
    stack: &[EnclosingFrame],
    out: &mut Vec<ExtractedEdge>,
) {
    match func.kind() {
        "identifier" => {
            let name = slice(source, func);
            let edge_type = if starts_uppercase(&name) {
                EdgeType::Instantiate
            } else {
                EdgeType::Call
            };
            push_edge(out, stack, &name, None, edge_type, path);
        }
        "field_expression" => {
            if let (Some(value), Some(field)) = (
                func.child_by_field_name("value"),
                func.child_by_field_name("field"),
            ) {
                let member = slice(source, &field);
                push_edge(out, stack, &member, None, EdgeType::Call, path);
                if value.kind() == "identifier" {
                    let receiver = slice(source, &value);
                    push_edge(out, stack, &receiver, Some(path.to_string()), EdgeType::Access, path);
                }
            }
        }
        "scoped_identifier" => {
            if let (Some(ns), Some(name_node)) = (
                func.child_by_field_name("path"),
                func.child_by_field_name("name"),
            ) {
                let ns_name = slice(source, &ns);
                let member = slice(source, &name_node);
                let edge_type = if starts_uppercase(&member) {
                    EdgeType::Instantiate
                } else {
                    EdgeType::Call
                };
                push_edge(out, stack, &ns_name, Some(path.to_string()), EdgeType::Access, path);
                push_edge(out, stack, &member, None, edge_type, path);
            }
        }
        _ => {}
    }
}

fn push_edge(
    out: &mut Vec<ExtractedEdge>,
    stack: &[EnclosingFrame],
    to: &str,
    to_file: Option<String>,
    edge_type: EdgeType,
    _path: &str,
) {
    if to.is_empty() {
        return;
    }
    let from = super::enclosing_declaration(stack);
    out.push(ExtractedEdge {
        provenance: format!("{from} -> {to}"),
        from_symbol: from,
        to_symbol: to.to_string(),
        to_file,
        edge_type,
    });
}

fn enclosing_class(symbols: &[ExtractedSymbol], method_name: &str) -> Option<String> {
    let method = symbols
        .iter()
        .find(|s| s.kind == SymbolKind::Method && s.name == method_name)?;
    let parent_index = method.parent_index?;
    symbols.get(parent_index).map(|p| p.name.clone())
}

fn use_names(node: &Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut stack = vec![*node];
    while let Some(n) = stack.pop() {
        match n.kind() {
            "use_as_clause" => {
                if let Some(alias) = n.child_by_field_name("alias") {
                    names.push(slice(source, &alias));
                }
            }
            "scoped_identifier" | "identifier" => {
                if n.parent().map(|p| p.kind()) != Some("use_as_clause") {
                    let text = slice(source, &n);
                    let last = text.rsplit("::").next().unwrap_or(&text).to_string();
                    if !last.is_empty() && last != "crate" && last != "self" && last != "super" {
                        names.push(last);
                    }
                }
            }
            _ => {
                let mut cursor = n.walk();
                for child in n.children(&mut cursor) {
                    stack.push(child);
                }
            }
        }
    }
    names
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase()) && !PRIMITIVES.contains(&name)
}

fn symbol_from_node(node: &Node, name: &str, kind: SymbolKind, source: &str) -> ExtractedSymbol {
    let body_start = node
        .child_by_field_name("body")
        .map(|b| b.start_byte())
        .unwrap_or(node.end_byte());
    let signature = source
        .get(node.start_byte()..body_start)
        .map(|s| s.trim().trim_end_matches('{').trim().to_string())
        .filter(|s| !s.is_empty());
    ExtractedSymbol {
        name: name.to_string(),
        kind,
        line: node.start_position().row + 1,
        column: node.start_position().column + 1,
        end_line: node.end_position().row + 1,
        signature,
        parent_index: None,
    }
}

fn field_text(node: &Node, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field).map(|n| slice(source, &n))
}

fn slice(source: &str, node: &Node) -> String {
    source.get(node.byte_range()).unwrap_or_default().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_struct_and_method_with_parent() {
        let source = r#"
struct UserService;
impl UserService {
    fn authenticate_user(&self) -> bool {
        validate_user()
    }
}
fn validate_user() -> bool { true }
"#;
        let front = RustFront::new();
        let symbols = front.extract_symbols(source, "auth.rs").unwrap();
        let method = symbols
            .iter()
            .find(|s| s.name == "authenticate_user")
            .unwrap();
        assert_eq!(method.kind, SymbolKind::Method);
        let parent = &symbols[method.parent_index.unwrap()];
        assert_eq!(parent.name, "UserService");

        let edges = front.extract_edges(source, "auth.rs", &symbols).unwrap();
        assert!(edges
            .iter()
            .any(|e| e.from_symbol == "UserService.authenticate_user"
                && e.to_symbol == "validate_user"
                && e.edge_type == EdgeType::Call));
    }

    #[test]
    fn top_level_function_has_no_parent() {
        let front = RustFront::new();
        let symbols = front
            .extract_symbols("fn get_users() -> Vec<String> { vec![] }", "x.rs")
            .unwrap();
        let f = symbols.iter().find(|s| s.name == "get_users").unwrap();
        assert_eq!(f.kind, SymbolKind::Function);
        assert!(f.parent_index.is_none());
        assert!(f.signature.as_deref().unwrap().starts_with("fn get_users"));
    }

    #[test]
    fn use_declaration_emits_import_symbol() {
        let front = RustFront::new();
        let symbols = front
            .extract_symbols("use crate::store::IndexStore;", "x.rs")
            .unwrap();
        assert!(symbols
            .iter()
            .any(|s| s.kind == SymbolKind::Import && s.name == "IndexStore"));
    }

    #[test]
    fn constructor_call_is_instantiate_edge() {
        let front = RustFront::new();
        let source = "fn make() -> Thing { Thing::new() }";
        let symbols = front.extract_symbols(source, "x.rs").unwrap();
        let edges = front.extract_edges(source, "x.rs", &symbols).unwrap();
        assert!(edges
            .iter()
            .any(|e| e.to_symbol == "new" && e.edge_type == EdgeType::Call));
        assert!(edges
            .iter()
            .any(|e| e.to_symbol == "Thing" && e.edge_type == EdgeType::Access));
    }
}
