//! TypeScript front-end, also used for the `js-family` extensions
//! (`.js`/`.jsx`) per spec.md §4.1/§6 — TSX's grammar parses plain
//! JS/JSX as a degenerate case, the same choice the teacher's front-end
//! makes, so one module covers both of the spec's extension groups.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use tree_sitter::{Language, Node, Parser};

use super::traits::{EdgeType, ExtractedEdge, ExtractedSymbol, LanguageConfig, LanguageFront, SymbolKind};
use super::EnclosingFrame;

static TSX_LANGUAGE: Lazy<Language> = Lazy::new(|| tree_sitter_typescript::LANGUAGE_TSX.into());

#[derive(Default, Clone)]
pub struct TypeScriptFront;

impl TypeScriptFront {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageFront for TypeScriptFront {
    fn config(&self) -> LanguageConfig {
        LanguageConfig {
            name: "TypeScript",
            extensions: &["ts", "tsx", "js", "jsx", "mjs", "cjs"],
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
        .set_language(&TSX_LANGUAGE)
        .context("failed to set TypeScript/TSX language")?;
    parser
        .parse(source, None)
        .context("failed to parse TypeScript source")
}

fn walk_symbols(
    node: &Node,
    source: &str,
    container: Option<&ContainerRef>,
    out: &mut Vec<ExtractedSymbol>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "export_statement" && child.child_by_field_name("source").is_some() {
            emit_reexport_symbols(&child, source, out);
            continue;
        }
        let actual = if child.kind() == "export_statement" {
            child.named_child(0).unwrap_or(child)
        } else {
            child
        };
        match actual.kind() {
            "class_declaration" | "abstract_class_declaration" => {
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
            "interface_declaration" => {
                if let Some(name) = field_text(&actual, "name", source) {
                    out.push(symbol_from_node(&child, &name, SymbolKind::Interface, source));
                }
            }
            "type_alias_declaration" => {
                if let Some(name) = field_text(&actual, "name", source) {
                    out.push(symbol_from_node(&child, &name, SymbolKind::Type, source));
                }
            }
            "enum_declaration" => {
                if let Some(name) = field_text(&actual, "name", source) {
                    out.push(symbol_from_node(&child, &name, SymbolKind::Enum, source));
                }
            }
            "function_declaration" => {
                if let Some(name) = field_text(&actual, "name", source) {
                    out.push(symbol_from_node(&child, &name, SymbolKind::Function, source));
                }
            }
            "method_definition" => {
                if let Some(name) = field_text(&actual, "name", source) {
                    let parent_index = container.map(|c| c.index);
                    let mut sym = symbol_from_node(&child, &name, SymbolKind::Method, source);
                    sym.parent_index = parent_index;
                    out.push(sym);
                }
            }
            "lexical_declaration" | "variable_declaration" if container.is_none() => {
                let is_const = actual.kind() == "lexical_declaration"
                    && slice(source, &actual).starts_with("const");
                let mut decl_cursor = actual.walk();
                for decl in actual.children(&mut decl_cursor) {
                    if decl.kind() == "variable_declarator" {
                        if let Some(name_node) = decl.child_by_field_name("name") {
                            if name_node.kind() == "identifier" {
                                let name = slice(source, &name_node);
                                let kind = if is_const { SymbolKind::Constant } else { SymbolKind::Variable };
                                out.push(symbol_from_node(&decl, &name, kind, source));
                            }
                        }
                    }
                }
            }
            "import_statement" => {
                for name in import_names(&actual, source) {
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
        let actual = if child.kind() == "export_statement" {
            child.named_child(0).unwrap_or(child)
        } else {
            child
        };
        match actual.kind() {
            "function_declaration" => {
                if let Some(name) = field_text(&actual, "name", source) {
                    stack.push(EnclosingFrame::Function { name });
                    emit_type_annotation_edges(&actual, source, path, stack, out);
                    if let Some(body) = actual.child_by_field_name("body") {
                        walk_edges(&body, source, path, symbols, stack, out);
                    }
                    stack.pop();
                    continue;
                }
            }
            "method_definition" => {
                if let Some(name) = field_text(&actual, "name", source) {
                    let frame = match enclosing_class(symbols, &name) {
                        Some(class) => EnclosingFrame::Method { class, name },
                        None => EnclosingFrame::Function { name },
                    };
                    stack.push(frame);
                    emit_type_annotation_edges(&actual, source, path, stack, out);
                    if let Some(body) = actual.child_by_field_name("body") {
                        walk_edges(&body, source, path, symbols, stack, out);
                    }
                    stack.pop();
                    continue;
                }
            }
            "public_field_definition" => {
                if let Some(ty) = actual.child_by_field_name("type") {
                    for name in type_reference_names(&ty, source) {
                        push_edge(out, stack, &name, None, EdgeType::Access, path);
                    }
                }
            }
            "class_declaration" | "abstract_class_declaration" => {
                if let Some(body) = actual.child_by_field_name("body") {
                    walk_edges(&body, source, path, symbols, stack, out);
                }
                continue;
            }
            "new_expression" => {
                if let Some(ctor) = actual.child_by_field_name("constructor") {
                    let name = slice(source, &ctor);
                    push_edge(out, stack, &name, None, EdgeType::Instantiate, path);
                }
            }
            "call_expression" => {
                if let Some(func) = actual.child_by_field_name("function") {
                    emit_call_edges(&func, source, path, stack, out);
                }
            }
            "member_expression" if !member_parent_is_call(&child) => {
                if let (Some(obj), Some(prop)) = (
                    actual.child_by_field_name("object"),
                    actual.child_by_field_name("property"),
                ) {
                    if obj.kind() == "identifier" {
                        let receiver = slice(source, &obj);
                        let member = slice(source, &prop);
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

fn member_parent_is_call(node: &Node) -> bool {
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
            push_edge(out, stack, &name, None, EdgeType::Call, path);
        }
        "member_expression" => {
            if let (Some(obj), Some(prop)) = (
                func.child_by_field_name("object"),
                func.child_by_field_name("property"),
            ) {
                let member = slice(source, &prop);
                push_edge(out, stack, &member, None, EdgeType::Call, path);
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

/// Parameter and return-type annotations resolve to `access` edges — a type
/// reference isn't a call or instantiation (spec.md §3's `access` catch-all).
fn emit_type_annotation_edges(
    declarator: &Node,
    source: &str,
    path: &str,
    stack: &[EnclosingFrame],
    out: &mut Vec<ExtractedEdge>,
) {
    if let Some(params) = declarator.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            if let Some(ty) = param.child_by_field_name("type") {
                for name in type_reference_names(&ty, source) {
                    push_edge(out, stack, &name, None, EdgeType::Access, path);
                }
            }
        }
    }
    if let Some(ret) = declarator.child_by_field_name("return_type") {
        for name in type_reference_names(&ret, source) {
            push_edge(out, stack, &name, None, EdgeType::Access, path);
        }
    }
}

/// Named type references (`type_identifier`) under a type annotation node,
/// e.g. `UserService` in `: UserService` or `: UserService | null`.
fn type_reference_names(ty: &Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut pending = vec![*ty];
    while let Some(n) = pending.pop() {
        if n.kind() == "type_identifier" {
            names.push(slice(source, &n));
        } else {
            let mut cursor = n.walk();
            for child in n.children(&mut cursor) {
                pending.push(child);
            }
        }
    }
    names
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
    let mut stack = vec![*node];
    while let Some(n) = stack.pop() {
        match n.kind() {
            "namespace_import" => {
                if let Some(ident) = n.named_child(0) {
                    names.push(slice(source, &ident));
                }
            }
            "import_specifier" => {
                let target = n.child_by_field_name("alias").or_else(|| n.child_by_field_name("name"));
                if let Some(t) = target {
                    names.push(slice(source, &t));
                }
            }
            "identifier" if n.parent().map(|p| p.kind()) == Some("import_clause") => {
                names.push(slice(source, &n));
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

/// Re-export forms (`export { Foo } from './bar'`, `export * from './mod'`)
/// emit a `SymbolKind::Export` symbol per named specifier, or one `*` symbol
/// for a wildcard re-export — spec.md §3's `export` kind.
fn emit_reexport_symbols(export_stmt: &Node, source: &str, out: &mut Vec<ExtractedSymbol>) {
    let source_module = export_stmt
        .child_by_field_name("source")
        .map(|n| slice(source, &n).trim_matches(|c| c == '\'' || c == '"').to_string())
        .unwrap_or_default();

    let mut cursor = export_stmt.walk();
    let clause = export_stmt.children(&mut cursor).find(|c| c.kind() == "export_clause");
    match clause {
        Some(clause) => {
            let mut spec_cursor = clause.walk();
            for spec in clause.named_children(&mut spec_cursor) {
                if spec.kind() != "export_specifier" {
                    continue;
                }
                let target = spec.child_by_field_name("alias").or_else(|| spec.child_by_field_name("name"));
                if let Some(name_node) = target {
                    let name = slice(source, &name_node);
                    let mut sym = symbol_from_node(&spec, &name, SymbolKind::Export, source);
                    sym.signature = Some(format!("from '{source_module}'"));
                    out.push(sym);
                }
            }
        }
        None => {
            // `export * from './mod'` — no named clause, re-exports everything.
            let mut sym = symbol_from_node(export_stmt, "*", SymbolKind::Export, source);
            sym.signature = Some(format!("from '{source_module}'"));
            out.push(sym);
        }
    }
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

    const AUTH_TS: &str = r#"
class UserService {
    authenticateUser(name: string): boolean {
        return validateUser(name);
    }
}

function validateUser(name: string): boolean {
    return true;
}
"#;

    #[test]
    fn extracts_class_and_method_with_parent() {
        let front = TypeScriptFront::new();
        let symbols = front.extract_symbols(AUTH_TS, "auth.ts").unwrap();
        let class = symbols.iter().find(|s| s.name == "UserService").unwrap();
        assert_eq!(class.kind, SymbolKind::Class);
        let method = symbols.iter().find(|s| s.name == "authenticateUser").unwrap();
        assert_eq!(method.kind, SymbolKind::Method);
        assert_eq!(symbols[method.parent_index.unwrap()].name, "UserService");
    }

    #[test]
    fn call_edge_attributes_to_method() {
        let front = TypeScriptFront::new();
        let symbols = front.extract_symbols(AUTH_TS, "auth.ts").unwrap();
        let edges = front.extract_edges(AUTH_TS, "auth.ts", &symbols).unwrap();
        assert!(edges.iter().any(|e| {
            e.from_symbol == "UserService.authenticateUser"
                && e.to_symbol == "validateUser"
                && e.edge_type == EdgeType::Call
        }));
    }

    #[test]
    fn new_expression_is_instantiate_edge() {
        let front = TypeScriptFront::new();
        let source = "function make() { return new UserService(); }";
        let symbols = front.extract_symbols(source, "x.ts").unwrap();
        let edges = front.extract_edges(source, "x.ts", &symbols).unwrap();
        assert!(edges
            .iter()
            .any(|e| e.to_symbol == "UserService" && e.edge_type == EdgeType::Instantiate));
    }

    #[test]
    fn named_import_emits_import_symbol() {
        let front = TypeScriptFront::new();
        let symbols = front
            .extract_symbols("import { UserService } from './auth';", "main.ts")
            .unwrap();
        assert!(symbols
            .iter()
            .any(|s| s.kind == SymbolKind::Import && s.name == "UserService"));
    }

    #[test]
    fn jsx_extension_is_handled_by_same_front() {
        let front = TypeScriptFront::new();
        assert!(front.handles_extension("jsx"));
        assert!(front.handles_extension("tsx"));
    }

    #[test]
    fn named_reexport_emits_export_symbol() {
        let front = TypeScriptFront::new();
        let symbols = front
            .extract_symbols("export { UserService } from './auth';", "index.ts")
            .unwrap();
        let export = symbols.iter().find(|s| s.name == "UserService").unwrap();
        assert_eq!(export.kind, SymbolKind::Export);
    }

    #[test]
    fn wildcard_reexport_emits_star_export_symbol() {
        let front = TypeScriptFront::new();
        let symbols = front.extract_symbols("export * from './auth';", "index.ts").unwrap();
        assert!(symbols
            .iter()
            .any(|s| s.name == "*" && s.kind == SymbolKind::Export));
    }

    #[test]
    fn parameter_type_annotation_emits_access_edge() {
        let front = TypeScriptFront::new();
        let source = "function make(svc: UserService): void {}";
        let symbols = front.extract_symbols(source, "x.ts").unwrap();
        let edges = front.extract_edges(source, "x.ts", &symbols).unwrap();
        assert!(edges
            .iter()
            .any(|e| e.to_symbol == "UserService" && e.edge_type == EdgeType::Access));
    }
}
