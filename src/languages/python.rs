//! Python front-end: the dynamically-typed scripting language in the spec's
//! four-language set (spec.md §4.1). Grounded on the teacher's
//! `languages/python.rs` node-kind walk, generalized to emit
//! `ExtractedSymbol`/`ExtractedEdge` instead of store-ready records.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use tree_sitter::{Language, Node, Parser};

use super::traits::{EdgeType, ExtractedEdge, ExtractedSymbol, LanguageConfig, LanguageFront, SymbolKind};
use super::EnclosingFrame;

static PYTHON_LANGUAGE: Lazy<Language> = Lazy::new(|| tree_sitter_python::LANGUAGE.into());

#[derive(Default, Clone)]
pub struct PythonFront;

impl PythonFront {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageFront for PythonFront {
    fn config(&self) -> LanguageConfig {
        LanguageConfig {
            name: "Python",
            extensions: &["py"],
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
        .set_language(&PYTHON_LANGUAGE)
        .context("failed to set Python language")?;
    parser.parse(source, None).context("failed to parse Python source")
}

fn walk_symbols(
    node: &Node,
    source: &str,
    container: Option<&ContainerRef>,
    out: &mut Vec<ExtractedSymbol>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let actual = if child.kind() == "decorated_definition" {
            child.child_by_field_name("definition").unwrap_or(child)
        } else {
            child
        };
        match actual.kind() {
            "class_definition" => {
                if let Some(name) = field_text(&actual, "name", source) {
                    let idx = out.len();
                    out.push(symbol_from_node(&child, &name, SymbolKind::Class, source));
                    if let Some(body) = actual.child_by_field_name("body") {
                        let container = ContainerRef {
                            index: idx,
                            name: name.clone(),
                        };
                        walk_symbols(&body, source, Some(&container), out);
                    }
                }
            }
            "function_definition" => {
                if let Some(name) = field_text(&actual, "name", source) {
                    let (kind, parent_index) = match container {
                        Some(c) => (SymbolKind::Method, Some(c.index)),
                        None => (SymbolKind::Function, None),
                    };
                    let mut sym = symbol_from_node(&child, &name, kind, source);
                    sym.parent_index = parent_index;
                    out.push(sym);
                }
            }
            "import_statement" => {
                for name in import_names(&actual, source) {
                    let mut sym = symbol_from_node(&child, &name, SymbolKind::Import, source);
                    sym.signature = Some(slice(source, &child));
                    out.push(sym);
                }
            }
            "import_from_statement" => {
                for name in import_from_names(&actual, source) {
                    let mut sym = symbol_from_node(&child, &name, SymbolKind::Import, source);
                    sym.signature = Some(slice(source, &child));
                    out.push(sym);
                }
            }
            "expression_statement" if container.is_none() => {
                if let Some(assign) = actual.child(0) {
                    if assign.kind() == "assignment" {
                        if let Some(target) = assign.child_by_field_name("left") {
                            if target.kind() == "identifier" {
                                let name = slice(source, &target);
                                let kind = if name.chars().all(|c| c.is_uppercase() || c == '_') {
                                    SymbolKind::Constant
                                } else {
                                    SymbolKind::Variable
                                };
                                out.push(symbol_from_node(&child, &name, kind, source));
                            }
                        }
                    }
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
        let actual = if child.kind() == "decorated_definition" {
            child.child_by_field_name("definition").unwrap_or(child)
        } else {
            child
        };
        match actual.kind() {
            "function_definition" => {
                if let Some(name) = field_text(&actual, "name", source) {
                    let frame = match enclosing_class(symbols, &name) {
                        Some(class) => EnclosingFrame::Method { class, name },
                        None => EnclosingFrame::Function { name },
                    };
                    stack.push(frame);
                    if let Some(body) = actual.child_by_field_name("body") {
                        walk_edges(&body, source, path, symbols, stack, out);
                    }
                    stack.pop();
                    continue;
                }
            }
            "class_definition" => {
                if let Some(body) = actual.child_by_field_name("body") {
                    walk_edges(&body, source, path, symbols, stack, out);
                }
                continue;
            }
            "call" => {
                if let Some(func) = actual.child_by_field_name("function") {
                    emit_call_edges(&func, source, path, stack, out);
                }
            }
            "attribute" if !attribute_parent_is_call(&child) => {
                if let (Some(obj), Some(attr)) = (
                    actual.child_by_field_name("object"),
                    actual.child_by_field_name("attribute"),
                ) {
                    if obj.kind() == "identifier" {
                        let receiver = slice(source, &obj);
                        let member = slice(source, &attr);
                        push_edge(out, stack, &receiver, Some(path.to_string()), EdgeType::Access, path);
                        push_edge(out, stack, &member, None, EdgeType::Access, path);
                    }
                }
            }
            _ => {}
        }
        walk_edges(&child, source, path, symbols, stack, out);
    }
}

fn attribute_parent_is_call(node: &Node) -> bool {
    node.parent()
        .map(|p| p.kind() == "call" && p.child_by_field_name("function") == Some(*node))
        .unwrap_or(false)
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
        "attribute" => {
            if let (Some(obj), Some(attr)) = (
                func.child_by_field_name("object"),
                func.child_by_field_name("attribute"),
            ) {
                let member = slice(source, &attr);
                let edge_type = if starts_uppercase(&member) {
                    EdgeType::Instantiate
                } else {
                    EdgeType::Call
                };
                push_edge(out, stack, &member, None, edge_type, path);
                if obj.kind() == "identifier" {
                    let receiver = slice(source, &obj);
                    push_edge(out, stack, &receiver, Some(path.to_string()), EdgeType::Access, path);
                }
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

fn import_names(node: &Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "aliased_import" => {
                if let Some(alias) = child.child_by_field_name("alias") {
                    names.push(slice(source, &alias));
                }
            }
            "dotted_name" => {
                let text = slice(source, &child);
                let top = text.split('.').next().unwrap_or(&text).to_string();
                if !top.is_empty() {
                    names.push(top);
                }
            }
            _ => {}
        }
    }
    names
}

fn import_from_names(node: &Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "aliased_import" => {
                if let Some(alias) = child.child_by_field_name("alias") {
                    names.push(slice(source, &alias));
                }
            }
            "dotted_name" | "identifier" => {
                let is_module_name = child
                    .parent()
                    .and_then(|p| p.child_by_field_name("module_name"))
                    == Some(child);
                if !is_module_name {
                    names.push(slice(source, &child));
                }
            }
            _ => {}
        }
    }
    names
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

fn symbol_from_node(node: &Node, name: &str, kind: SymbolKind, source: &str) -> ExtractedSymbol {
    let body_start = node
        .child_by_field_name("body")
        .map(|b| b.start_byte())
        .unwrap_or(node.end_byte());
    let signature = source
        .get(node.start_byte()..body_start)
        .map(|s| s.trim().trim_end_matches(':').trim().to_string())
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

    const AUTH_PY: &str = r#"
class UserService:
    def authenticate_user(self, name):
        return validate_user(name)

def validate_user(name):
    return True
"#;

    #[test]
    fn extracts_class_and_method_with_parent() {
        let front = PythonFront::new();
        let symbols = front.extract_symbols(AUTH_PY, "auth.py").unwrap();
        let class = symbols.iter().find(|s| s.name == "UserService").unwrap();
        assert_eq!(class.kind, SymbolKind::Class);
        let method = symbols
            .iter()
            .find(|s| s.name == "authenticate_user")
            .unwrap();
        assert_eq!(method.kind, SymbolKind::Method);
        assert_eq!(symbols[method.parent_index.unwrap()].name, "UserService");
    }

    #[test]
    fn call_edge_attributes_to_method() {
        let front = PythonFront::new();
        let symbols = front.extract_symbols(AUTH_PY, "auth.py").unwrap();
        let edges = front.extract_edges(AUTH_PY, "auth.py", &symbols).unwrap();
        assert!(edges.iter().any(|e| {
            e.from_symbol == "UserService.authenticate_user"
                && e.to_symbol == "validate_user"
                && e.edge_type == EdgeType::Call
        }));
    }

    #[test]
    fn import_from_statement_emits_import_symbols() {
        let front = PythonFront::new();
        let symbols = front
            .extract_symbols("from auth import UserService, validate_user", "main.py")
            .unwrap();
        assert!(symbols
            .iter()
            .any(|s| s.kind == SymbolKind::Import && s.name == "UserService"));
        assert!(symbols
            .iter()
            .any(|s| s.kind == SymbolKind::Import && s.name == "validate_user"));
    }

    #[test]
    fn module_level_call_attributes_to_module_sentinel() {
        let front = PythonFront::new();
        let source = "validate_user('x')\ndef validate_user(name):\n    return True\n";
        let symbols = front.extract_symbols(source, "main.py").unwrap();
        let edges = front.extract_edges(source, "main.py", &symbols).unwrap();
        assert!(edges
            .iter()
            .any(|e| e.from_symbol == "<module>" && e.to_symbol == "validate_user"));
    }
}
