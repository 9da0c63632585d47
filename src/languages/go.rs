//! Go front-end: the statically-typed, compiled systems language in the
//! spec's four-language set (spec.md §4.1). Go has no `impl` block; a
//! method's parent is found by matching its receiver type name against
//! already-extracted struct/interface symbols, mirroring how the Rust
//! front-end matches an `impl <Type>` block's type name.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use tree_sitter::{Language, Node, Parser};

use super::traits::{EdgeType, ExtractedEdge, ExtractedSymbol, LanguageConfig, LanguageFront, SymbolKind};
use super::EnclosingFrame;

static GO_LANGUAGE: Lazy<Language> = Lazy::new(|| tree_sitter_go::LANGUAGE.into());

#[derive(Default, Clone)]
pub struct GoFront;

impl GoFront {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageFront for GoFront {
    fn config(&self) -> LanguageConfig {
        LanguageConfig {
            name: "Go",
            extensions: &["go"],
        }
    }

    fn extract_symbols(&self, source: &str, _path: &str) -> Result<Vec<ExtractedSymbol>> {
        let tree = parse(source)?;
        let mut symbols = Vec::new();
        walk_types(&tree.root_node(), source, &mut symbols);
        walk_functions(&tree.root_node(), source, &mut symbols);
        walk_imports(&tree.root_node(), source, &mut symbols);
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
        .set_language(&GO_LANGUAGE)
        .context("failed to set Go language")?;
    parser.parse(source, None).context("failed to parse Go source")
}

/// First pass: struct and interface type declarations, so methods (walked
/// second) can find their parent by receiver type name.
fn walk_types(node: &Node, source: &str, out: &mut Vec<ExtractedSymbol>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "type_declaration" {
            let mut spec_cursor = child.walk();
            for spec in child.children(&mut spec_cursor) {
                if spec.kind() != "type_spec" {
                    continue;
                }
                let name = match field_text(&spec, "name", source) {
                    Some(n) => n,
                    None => continue,
                };
                let kind = match spec.child_by_field_name("type").map(|t| t.kind()) {
                    Some("struct_type") => SymbolKind::Struct,
                    Some("interface_type") => SymbolKind::Interface,
                    _ => SymbolKind::Type,
                };
                out.push(symbol_from_node(&child, &name, kind, source));
            }
        } else if child.kind() == "const_declaration" || child.kind() == "var_declaration" {
            let kind = if child.kind() == "const_declaration" {
                SymbolKind::Constant
            } else {
                SymbolKind::Variable
            };
            let mut spec_cursor = child.walk();
            for spec in child.children(&mut spec_cursor) {
                if spec.kind() != "const_spec" && spec.kind() != "var_spec" {
                    continue;
                }
                let mut name_cursor = spec.walk();
                for name_node in spec.children(&mut name_cursor) {
                    if name_node.kind() == "identifier" {
                        let name = slice(source, &name_node);
                        out.push(symbol_from_node(&child, &name, kind, source));
                    }
                }
            }
        }
    }
}

fn walk_functions(node: &Node, source: &str, out: &mut Vec<ExtractedSymbol>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "function_declaration" => {
                if let Some(name) = field_text(&child, "name", source) {
                    out.push(symbol_from_node(&child, &name, SymbolKind::Function, source));
                }
            }
            "method_declaration" => {
                if let Some(name) = field_text(&child, "name", source) {
                    let receiver_type = receiver_type_name(&child, source);
                    let parent_index = receiver_type.and_then(|rt| {
                        out.iter().position(|s| {
                            s.name == rt && matches!(s.kind, SymbolKind::Struct | SymbolKind::Interface)
                        })
                    });
                    let mut sym = symbol_from_node(&child, &name, SymbolKind::Method, source);
                    sym.parent_index = parent_index;
                    out.push(sym);
                }
            }
            _ => {}
        }
    }
}

fn walk_imports(node: &Node, source: &str, out: &mut Vec<ExtractedSymbol>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "import_declaration" {
            continue;
        }
        let mut spec_cursor = child.walk();
        for spec in child.children(&mut spec_cursor) {
            collect_import_specs(&spec, source, &child, out);
        }
    }
}

fn collect_import_specs(node: &Node, source: &str, decl: &Node, out: &mut Vec<ExtractedSymbol>) {
    match node.kind() {
        "import_spec" => {
            if let Some(alias) = node.child_by_field_name("name") {
                let name = slice(source, &alias);
                let mut sym = symbol_from_node(decl, &name, SymbolKind::Import, source);
                sym.signature = Some(slice(source, node));
                out.push(sym);
            } else if let Some(path_node) = node.child_by_field_name("path") {
                let raw = slice(source, &path_node);
                let trimmed = raw.trim_matches('"');
                let name = trimmed.rsplit('/').next().unwrap_or(trimmed).to_string();
                if !name.is_empty() {
                    let mut sym = symbol_from_node(decl, &name, SymbolKind::Import, source);
                    sym.signature = Some(slice(source, node));
                    out.push(sym);
                }
            }
        }
        "import_spec_list" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect_import_specs(&child, source, decl, out);
            }
        }
        _ => {}
    }
}

fn receiver_type_name(method: &Node, source: &str) -> Option<String> {
    let receiver = method.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    for param in receiver.children(&mut cursor) {
        if param.kind() == "parameter_declaration" {
            if let Some(ty) = param.child_by_field_name("type") {
                return Some(strip_pointer(&slice(source, &ty)));
            }
        }
    }
    None
}

fn strip_pointer(ty: &str) -> String {
    ty.trim_start_matches('*').to_string()
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
            "function_declaration" => {
                if let Some(name) = field_text(&child, "name", source) {
                    stack.push(EnclosingFrame::Function { name });
                    if let Some(body) = child.child_by_field_name("body") {
                        walk_edges(&body, source, path, symbols, stack, out);
                    }
                    stack.pop();
                    continue;
                }
            }
            "method_declaration" => {
                if let Some(name) = field_text(&child, "name", source) {
                    let frame = match enclosing_struct(symbols, &name) {
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
            "composite_literal" => {
                if let Some(type_node) = child.child_by_field_name("type") {
                    let name = slice(source, &type_node);
                    push_edge(out, stack, &name, None, EdgeType::Instantiate, path);
                }
            }
            "call_expression" => {
                if let Some(func) = child.child_by_field_name("function") {
                    emit_call_edges(&func, source, path, stack, out);
                }
            }
            "selector_expression" if !selector_parent_is_call(&child) => {
                if let (Some(operand), Some(field)) = (
                    child.child_by_field_name("operand"),
                    child.child_by_field_name("field"),
                ) {
                    if operand.kind() == "identifier" {
                        let receiver = slice(source, &operand);
                        let member = slice(source, &field);
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

fn selector_parent_is_call(node: &Node) -> bool {
    node.parent()
        .map(|p| p.kind() == "call_expression" && p.child_by_field_name("function") == Some(*node))
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
        "selector_expression" => {
            if let (Some(operand), Some(field)) = (
                func.child_by_field_name("operand"),
                func.child_by_field_name("field"),
            ) {
                let member = slice(source, &field);
                push_edge(out, stack, &member, None, EdgeType::Call, path);
                if operand.kind() == "identifier" {
                    let receiver = slice(source, &operand);
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

fn enclosing_struct(symbols: &[ExtractedSymbol], method_name: &str) -> Option<String> {
    let method = symbols
        .iter()
        .find(|s| s.kind == SymbolKind::Method && s.name == method_name)?;
    let parent_index = method.parent_index?;
    symbols.get(parent_index).map(|p| p.name.clone())
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
