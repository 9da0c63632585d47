//! Identity service (C2): canonical IDs and alias generation for symbols.
//!
//! Pure functions over `(symbol, parent, declaring file)` — no state, no
//! cache. Per design note in `spec.md` §9, core operations stay pure over
//! explicit context rather than reaching for a process-wide singleton.

use crate::languages::{ExtractedSymbol, SymbolKind};

/// One row to be inserted into `symbol_aliases`, before the symbol has a
/// store id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSeed {
    pub alias_type: AliasType,
    pub alias_name: String,
    pub context_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AliasType {
    Canonical,
    Qualified,
    Simple,
    Import,
}

impl AliasType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AliasType::Canonical => "canonical",
            AliasType::Qualified => "qualified",
            AliasType::Simple => "simple",
            AliasType::Import => "import",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "canonical" => Some(AliasType::Canonical),
            "qualified" => Some(AliasType::Qualified),
            "simple" => Some(AliasType::Simple),
            "import" => Some(AliasType::Import),
            _ => None,
        }
    }

    /// Ranking order within a lookup bucket: canonical < qualified < simple < import.
    pub fn rank(&self) -> u8 {
        match self {
            AliasType::Canonical => 0,
            AliasType::Qualified => 1,
            AliasType::Simple => 2,
            AliasType::Import => 3,
        }
    }
}

/// `canonical_id(S) = F + ":" + (P.name + "." if P else "") + S.name` — spec.md §4.2.
pub fn canonical_id(symbol: &ExtractedSymbol, parent: Option<&ExtractedSymbol>, file: &str) -> String {
    match parent {
        Some(p) => format!("{file}:{}.{}", p.name, symbol.name),
        None => format!("{file}:{}", symbol.name),
    }
}

/// Full alias set for a symbol per spec.md §4.2:
/// - `canonical`: always, no context_file.
/// - `simple`: always, context_file = F.
/// - `qualified`: iff a parent is present, context_file = F.
/// - `import`: iff `kind == import`, context_file = F.
pub fn generate_aliases(
    symbol: &ExtractedSymbol,
    parent: Option<&ExtractedSymbol>,
    file: &str,
) -> Vec<AliasSeed> {
    let mut aliases = Vec::with_capacity(4);

    aliases.push(AliasSeed {
        alias_type: AliasType::Canonical,
        alias_name: canonical_id(symbol, parent, file),
        context_file: None,
    });

    aliases.push(AliasSeed {
        alias_type: AliasType::Simple,
        alias_name: symbol.name.clone(),
        context_file: Some(file.to_string()),
    });

    if let Some(p) = parent {
        aliases.push(AliasSeed {
            alias_type: AliasType::Qualified,
            alias_name: format!("{}.{}", p.name, symbol.name),
            context_file: Some(file.to_string()),
        });
    }

    if symbol.kind == SymbolKind::Import {
        aliases.push(AliasSeed {
            alias_type: AliasType::Import,
            alias_name: symbol.name.clone(),
            context_file: Some(file.to_string()),
        });
    }

    aliases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::ExtractedSymbol;

    fn sym(name: &str, kind: SymbolKind) -> ExtractedSymbol {
        ExtractedSymbol {
            name: name.to_string(),
            kind,
            line: 1,
            column: 0,
            end_line: 1,
            signature: None,
            parent_index: None,
        }
    }

    #[test]
    fn canonical_id_without_parent() {
        let s = sym("get_users", SymbolKind::Function);
        assert_eq!(canonical_id(&s, None, "auth.py"), "auth.py:get_users");
    }

    #[test]
    fn canonical_id_with_parent() {
        let parent = sym("UserService", SymbolKind::Class);
        let s = sym("authenticate_user", SymbolKind::Method);
        assert_eq!(
            canonical_id(&s, Some(&parent), "auth.py"),
            "auth.py:UserService.authenticate_user"
        );
    }

    #[test]
    fn method_gets_four_alias_kinds_when_also_import_flagged() {
        // methods never have kind=import in practice, but the generator
        // composes independently of kind-specific invariants.
        let parent = sym("UserService", SymbolKind::Class);
        let s = sym("authenticate_user", SymbolKind::Method);
        let aliases = generate_aliases(&s, Some(&parent), "auth.py");
        let kinds: Vec<_> = aliases.iter().map(|a| a.alias_type).collect();
        assert!(kinds.contains(&AliasType::Canonical));
        assert!(kinds.contains(&AliasType::Simple));
        assert!(kinds.contains(&AliasType::Qualified));
        assert_eq!(aliases.len(), 3);
    }

    #[test]
    fn plain_function_has_no_qualified_alias() {
        let s = sym("get_users", SymbolKind::Function);
        let aliases = generate_aliases(&s, None, "auth.py");
        assert_eq!(aliases.len(), 2);
        assert!(!aliases.iter().any(|a| a.alias_type == AliasType::Qualified));
    }

    #[test]
    fn import_symbol_gets_import_alias() {
        let s = sym("get_users", SymbolKind::Import);
        let aliases = generate_aliases(&s, None, "main.py");
        assert_eq!(aliases.len(), 3);
        assert!(aliases.iter().any(|a| a.alias_type == AliasType::Import));
    }

    #[test]
    fn alias_type_rank_orders_canonical_first() {
        assert!(AliasType::Canonical.rank() < AliasType::Qualified.rank());
        assert!(AliasType::Qualified.rank() < AliasType::Simple.rank());
        assert!(AliasType::Simple.rank() < AliasType::Import.rank());
    }
}
