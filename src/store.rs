//! Persistent store (C3): a single-file relational store over `symbols`,
//! `symbol_aliases`, `edges`, plus a small `metadata` table for the
//! completion-timestamp/counts recorded in §4.4 step 9.
//!
//! Grounded on the teacher's `store.rs`: `RefCell<Connection>` for interior
//! mutability behind a `&self` API, bulk insert inside one transaction, and
//! a dynamic WHERE-clause builder over `rusqlite::types::Value` for the
//! lookup methods with optional filters. `PRAGMA foreign_keys = ON` is new
//! here — the teacher's schema has no `ON DELETE CASCADE` edges to enforce.

use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::identity::AliasType;
use crate::languages::{EdgeType, SymbolKind};

#[derive(Debug, Clone)]
pub struct SymbolRow {
    pub id: i64,
    pub canonical_id: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    pub line: i64,
    pub column: i64,
    pub end_line: i64,
    pub signature: Option<String>,
    pub parent_id: Option<i64>,
}

/// A `find_by_alias` hit: the resolved symbol plus the alias that actually
/// matched the query, so callers can show provenance (spec.md §4.3).
#[derive(Debug, Clone)]
pub struct AliasMatch {
    pub symbol: SymbolRow,
    pub matched_alias: String,
    pub alias_type: AliasType,
}

impl SymbolRow {
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }

    pub fn display_text(&self) -> String {
        match &self.signature {
            Some(sig) if !sig.is_empty() => sig.clone(),
            _ => format!("{} {}", self.kind.as_str(), self.name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EdgeRow {
    pub from_id: i64,
    pub to_id: i64,
    pub edge_type: EdgeType,
    pub provenance: String,
}

/// A symbol staged for insertion: its front-end index stands in for the
/// store id until the bulk insert assigns one (spec.md §4.4 steps 3-5).
#[derive(Debug, Clone)]
pub struct PendingSymbol {
    pub canonical_id: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    pub line: i64,
    pub column: i64,
    pub end_line: i64,
    pub signature: Option<String>,
    pub parent_list_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct PendingAlias {
    pub symbol_list_index: usize,
    pub alias_type: AliasType,
    pub alias_name: String,
    pub context_file: Option<String>,
}

/// An edge staged before resolution: endpoints are alias names, not ids.
#[derive(Debug, Clone)]
pub struct PendingEdge {
    pub from_symbol: String,
    pub to_symbol: String,
    pub to_file: Option<String>,
    pub edge_type: EdgeType,
    pub provenance: String,
}

#[derive(Debug)]
pub struct IndexStore {
    conn: RefCell<Connection>,
    db_path: PathBuf,
}

impl IndexStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: RefCell::new(conn),
            db_path: path.to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.borrow().execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS symbols (
                id INTEGER PRIMARY KEY,
                canonical_id TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                file TEXT NOT NULL,
                line INTEGER NOT NULL,
                column INTEGER NOT NULL,
                end_line INTEGER NOT NULL,
                signature TEXT,
                parent_id INTEGER REFERENCES symbols(id)
            );
            CREATE INDEX IF NOT EXISTS symbols_canonical_idx ON symbols(canonical_id);
            CREATE INDEX IF NOT EXISTS symbols_name_idx ON symbols(name);
            CREATE INDEX IF NOT EXISTS symbols_file_idx ON symbols(file);
            CREATE INDEX IF NOT EXISTS symbols_kind_idx ON symbols(kind);
            CREATE INDEX IF NOT EXISTS symbols_file_line_idx ON symbols(file, line);

            CREATE TABLE IF NOT EXISTS symbol_aliases (
                id INTEGER PRIMARY KEY,
                symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
                alias_type TEXT NOT NULL,
                alias_name TEXT NOT NULL,
                context_file TEXT
            );
            CREATE INDEX IF NOT EXISTS aliases_name_idx ON symbol_aliases(alias_name);
            CREATE INDEX IF NOT EXISTS aliases_type_idx ON symbol_aliases(alias_type);
            CREATE INDEX IF NOT EXISTS aliases_context_idx ON symbol_aliases(context_file);

            CREATE TABLE IF NOT EXISTS edges (
                from_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
                to_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
                edge_type TEXT NOT NULL,
                provenance TEXT,
                PRIMARY KEY (from_id, to_id, edge_type)
            );
            CREATE INDEX IF NOT EXISTS edges_from_idx ON edges(from_id);
            CREATE INDEX IF NOT EXISTS edges_to_idx ON edges(to_id);
            CREATE INDEX IF NOT EXISTS edges_type_idx ON edges(edge_type);

            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Clear all rows transactionally (spec.md §4.3 "a rebuild clears the
    /// store transactionally before writing").
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.borrow();
        conn.execute_batch(
            "DELETE FROM edges; DELETE FROM symbol_aliases; DELETE FROM symbols;",
        )?;
        Ok(())
    }

    /// Bulk-insert staged symbols, returning their assigned store ids in the
    /// same order as `symbols` (spec.md §4.4 steps 3-4).
    pub fn insert_symbols(&self, symbols: &[PendingSymbol]) -> Result<Vec<i64>> {
        let conn = &mut *self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(symbols.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO symbols(canonical_id, name, kind, file, line, column, end_line, signature)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for sym in symbols {
                stmt.execute(params![
                    sym.canonical_id,
                    sym.name,
                    sym.kind.as_str(),
                    sym.file,
                    sym.line,
                    sym.column,
                    sym.end_line,
                    sym.signature,
                ])?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    /// Patch `parent_id` for every symbol with a parent, mapping front-end
    /// list indices to store ids (spec.md §4.4 step 5).
    pub fn patch_parent_ids(&self, symbols: &[PendingSymbol], ids: &[i64]) -> Result<()> {
        let conn = &mut *self.conn.borrow_mut();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("UPDATE symbols SET parent_id = ?1 WHERE id = ?2")?;
            for (sym, &id) in symbols.iter().zip(ids.iter()) {
                if let Some(parent_index) = sym.parent_list_index {
                    if let Some(&parent_id) = ids.get(parent_index) {
                        stmt.execute(params![parent_id, id])?;
                    }
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Bulk-insert aliases, mapping front-end list indices to store ids
    /// (spec.md §4.4 step 6).
    pub fn insert_aliases(&self, aliases: &[PendingAlias], ids: &[i64]) -> Result<()> {
        let conn = &mut *self.conn.borrow_mut();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO symbol_aliases(symbol_id, alias_type, alias_name, context_file)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for alias in aliases {
                if let Some(&symbol_id) = ids.get(alias.symbol_list_index) {
                    stmt.execute(params![
                        symbol_id,
                        alias.alias_type.as_str(),
                        alias.alias_name,
                        alias.context_file,
                    ])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Resolve `find_by_alias` for an already-known name/context and insert
    /// one edge row per successfully-resolved endpoint pair. Returns the
    /// count of edges whose destination could not be resolved
    /// (`ResolutionMiss`, spec.md §7 — tracked, never surfaced).
    pub fn insert_edges(&self, edges: &[ResolvedEdge]) -> Result<()> {
        let conn = &mut *self.conn.borrow_mut();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO edges(from_id, to_id, edge_type, provenance)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for edge in edges {
                if edge.from_id == edge.to_id {
                    continue;
                }
                stmt.execute(params![
                    edge.from_id,
                    edge.to_id,
                    edge.edge_type.as_str(),
                    edge.provenance,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.borrow().execute(
            "INSERT INTO metadata(key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT value FROM metadata WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        Ok(match rows.next()? {
            Some(row) => Some(row.get(0)?),
            None => None,
        })
    }

    /// Case-insensitive substring match over `symbol_aliases`, ranked per
    /// §4.3: exact match before prefix before substring, and within each
    /// tier, `canonical < qualified < simple < import`. `context_file`
    /// narrows the `simple`/`qualified`/`import` rows considered (invariant
    /// 6, spec.md §8): a row with a non-null `context_file` is only
    /// eligible when it equals the caller's file.
    pub fn find_by_alias(
        &self,
        query: &str,
        limit: usize,
        context_file: Option<&str>,
    ) -> Result<Vec<AliasMatch>> {
        let conn = self.conn.borrow();
        let needle = query.to_lowercase();
        let mut stmt = conn.prepare(
            "SELECT s.id, s.canonical_id, s.name, s.kind, s.file, s.line, s.column, s.end_line,
                    s.signature, s.parent_id, a.alias_type, a.alias_name, a.context_file
             FROM symbol_aliases a JOIN symbols s ON s.id = a.symbol_id
             WHERE lower(a.alias_name) LIKE ?1
               AND (a.context_file IS NULL OR a.context_file = ?2)",
        )?;
        let pattern = format!("%{needle}%");
        let ctx = context_file.unwrap_or("");
        let mut rows: Vec<(SymbolRow, String, String, u8)> = stmt
            .query_map(params![pattern, ctx], |row| {
                let kind_str: String = row.get(3)?;
                let alias_type_str: String = row.get(10)?;
                let alias_name: String = row.get(11)?;
                let symbol = SymbolRow {
                    id: row.get(0)?,
                    canonical_id: row.get(1)?,
                    name: row.get(2)?,
                    kind: SymbolKind::parse(&kind_str).unwrap_or(SymbolKind::Function),
                    file: row.get(4)?,
                    line: row.get(5)?,
                    column: row.get(6)?,
                    end_line: row.get(7)?,
                    signature: row.get(8)?,
                    parent_id: row.get(9)?,
                };
                Ok((symbol, alias_type_str, alias_name, 0u8))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for (_, alias_type_str, alias_name, tier) in rows.iter_mut() {
            let exact = alias_name.eq_ignore_ascii_case(query);
            let prefix = alias_name.to_lowercase().starts_with(&needle);
            *tier = if exact {
                0
            } else if prefix {
                1
            } else {
                2
            };
            let _ = alias_type_str;
        }

        // Tie-break by symbol name, not row id (spec.md §4.3: "within a
        // bucket, order by alias_type... then by symbol name"), matching
        // the original's `ORDER BY ..., a.alias_type, s.name`.
        rows.sort_by(|a, b| {
            a.3.cmp(&b.3)
                .then_with(|| alias_rank(&a.1).cmp(&alias_rank(&b.1)))
                .then_with(|| a.0.name.cmp(&b.0.name))
        });
        rows.dedup_by(|a, b| a.0.id == b.0.id);
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|(symbol, alias_type_str, alias_name, _)| AliasMatch {
                symbol,
                matched_alias: alias_name,
                alias_type: AliasType::parse(&alias_type_str).unwrap_or(AliasType::Simple),
            })
            .collect())
    }

    /// `symbol_at`: the innermost symbol whose `[line, end_line]` covers
    /// `line` in `file` (spec.md §4.4's location lookup).
    pub fn symbol_at(&self, file: &str, line: i64) -> Result<Option<SymbolRow>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT id, canonical_id, name, kind, file, line, column, end_line, signature, parent_id
             FROM symbols
             WHERE file = ?1 AND line <= ?2 AND ?2 <= MAX(line, end_line)
             ORDER BY (end_line - line) ASC
             LIMIT 1",
        )?;
        let mut rows = stmt.query_map(params![file, line], symbol_row_from_row)?;
        Ok(match rows.next() {
            Some(row) => Some(row?),
            None => None,
        })
    }

    pub fn symbol_by_canonical_id(&self, canonical_id: &str) -> Result<Option<SymbolRow>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT id, canonical_id, name, kind, file, line, column, end_line, signature, parent_id
             FROM symbols WHERE canonical_id = ?1",
        )?;
        let mut rows = stmt.query_map(params![canonical_id], symbol_row_from_row)?;
        Ok(match rows.next() {
            Some(row) => Some(row?),
            None => None,
        })
    }

    pub fn symbol_by_id(&self, id: i64) -> Result<Option<SymbolRow>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT id, canonical_id, name, kind, file, line, column, end_line, signature, parent_id
             FROM symbols WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], symbol_row_from_row)?;
        Ok(match rows.next() {
            Some(row) => Some(row?),
            None => None,
        })
    }

    pub fn symbols_by_ids(&self, ids: &[i64]) -> Result<Vec<SymbolRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, canonical_id, name, kind, file, line, column, end_line, signature, parent_id
             FROM symbols WHERE id IN ({placeholders})"
        );
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&sql)?;
        let values: Vec<Value> = ids.iter().map(|id| Value::from(*id)).collect();
        let rows = stmt
            .query_map(params_from_iter(values.iter()), symbol_row_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Direct dependencies: symbols `S` references, i.e. `edges.from_id = S.id`.
    pub fn dependencies(&self, symbol_id: i64) -> Result<Vec<EdgeRow>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT from_id, to_id, edge_type, provenance FROM edges WHERE from_id = ?1",
        )?;
        let rows = stmt
            .query_map(params![symbol_id], edge_row_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Direct dependents: symbols that reference `S`, i.e. `edges.to_id = S.id`.
    /// This is the BFS frontier expansion step for `impact` (spec.md §4.5).
    pub fn dependents(&self, symbol_id: i64) -> Result<Vec<EdgeRow>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT from_id, to_id, edge_type, provenance FROM edges WHERE to_id = ?1",
        )?;
        let rows = stmt
            .query_map(params![symbol_id], edge_row_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn fan_in(&self, symbol_id: i64) -> Result<i64> {
        let conn = self.conn.borrow();
        conn.query_row(
            "SELECT COUNT(*) FROM edges WHERE to_id = ?1",
            params![symbol_id],
            |row| row.get(0),
        )
        .map_err(Into::into)
    }

    pub fn fan_out(&self, symbol_id: i64) -> Result<i64> {
        let conn = self.conn.borrow();
        conn.query_row(
            "SELECT COUNT(*) FROM edges WHERE from_id = ?1",
            params![symbol_id],
            |row| row.get(0),
        )
        .map_err(Into::into)
    }

    pub fn symbol_count(&self) -> Result<i64> {
        let conn = self.conn.borrow();
        conn.query_row("SELECT COUNT(*) FROM symbols", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn edge_count(&self) -> Result<i64> {
        let conn = self.conn.borrow();
        conn.query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn file_count(&self) -> Result<i64> {
        let conn = self.conn.borrow();
        conn.query_row(
            "SELECT COUNT(DISTINCT file) FROM symbols",
            [],
            |row| row.get(0),
        )
        .map_err(Into::into)
    }

    /// Kind histogram for `stats` (spec.md §6).
    pub fn kind_histogram(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.conn.borrow();
        let mut stmt =
            conn.prepare("SELECT kind, COUNT(*) FROM symbols GROUP BY kind ORDER BY kind")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Fan-in per file, descending, for `overview`'s "hot files" (spec.md §6).
    pub fn hottest_files(&self, limit: usize) -> Result<Vec<(String, i64)>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT s.file, COUNT(*) as fan_in
             FROM edges e JOIN symbols s ON s.id = e.to_id
             GROUP BY s.file ORDER BY fan_in DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Symbol ids of a given kind, for `overview`'s fan-in ranking (spec.md §4.5).
    pub fn ids_by_kind(&self, kind: &str) -> Result<Vec<i64>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT id FROM symbols WHERE kind = ?1")?;
        let rows = stmt
            .query_map(params![kind], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

/// An edge with both endpoints already resolved to store ids.
#[derive(Debug, Clone)]
pub struct ResolvedEdge {
    pub from_id: i64,
    pub to_id: i64,
    pub edge_type: EdgeType,
    pub provenance: String,
}

fn alias_rank(alias_type: &str) -> u8 {
    AliasType::parse(alias_type).map(|t| t.rank()).unwrap_or(u8::MAX)
}

fn symbol_row_from_row(row: &rusqlite::Row) -> rusqlite::Result<SymbolRow> {
    let kind_str: String = row.get(3)?;
    Ok(SymbolRow {
        id: row.get(0)?,
        canonical_id: row.get(1)?,
        name: row.get(2)?,
        kind: SymbolKind::parse(&kind_str).unwrap_or(SymbolKind::Function),
        file: row.get(4)?,
        line: row.get(5)?,
        column: row.get(6)?,
        end_line: row.get(7)?,
        signature: row.get(8)?,
        parent_id: row.get(9)?,
    })
}

fn edge_row_from_row(row: &rusqlite::Row) -> rusqlite::Result<EdgeRow> {
    let edge_type_str: String = row.get(2)?;
    Ok(EdgeRow {
        from_id: row.get(0)?,
        to_id: row.get(1)?,
        edge_type: EdgeType::parse(&edge_type_str).unwrap_or(EdgeType::Call),
        provenance: row.get(3)?,
    })
}

pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_temp() -> (tempfile::TempDir, IndexStore) {
        let dir = tempdir().unwrap();
        let store = IndexStore::open(&dir.path().join("xray.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn insert_symbols_assigns_ids_and_patches_parent() {
        let (_dir, store) = open_temp();
        let symbols = vec![
            PendingSymbol {
                canonical_id: "auth.py:UserService".into(),
                name: "UserService".into(),
                kind: SymbolKind::Class,
                file: "auth.py".into(),
                line: 1,
                column: 0,
                end_line: 10,
                signature: None,
                parent_list_index: None,
            },
            PendingSymbol {
                canonical_id: "auth.py:UserService.authenticate_user".into(),
                name: "authenticate_user".into(),
                kind: SymbolKind::Method,
                file: "auth.py".into(),
                line: 2,
                column: 4,
                end_line: 5,
                signature: None,
                parent_list_index: Some(0),
            },
        ];
        let ids = store.insert_symbols(&symbols).unwrap();
        store.patch_parent_ids(&symbols, &ids).unwrap();

        let method = store.symbol_by_id(ids[1]).unwrap().unwrap();
        assert_eq!(method.parent_id, Some(ids[0]));
    }

    #[test]
    fn find_by_alias_respects_context_file() {
        let (_dir, store) = open_temp();
        let symbols = vec![PendingSymbol {
            canonical_id: "a.py:helper".into(),
            name: "helper".into(),
            kind: SymbolKind::Function,
            file: "a.py".into(),
            line: 1,
            column: 0,
            end_line: 1,
            signature: None,
            parent_list_index: None,
        }];
        let ids = store.insert_symbols(&symbols).unwrap();
        let aliases = vec![
            PendingAlias {
                symbol_list_index: 0,
                alias_type: AliasType::Canonical,
                alias_name: "a.py:helper".into(),
                context_file: None,
            },
            PendingAlias {
                symbol_list_index: 0,
                alias_type: AliasType::Simple,
                alias_name: "helper".into(),
                context_file: Some("a.py".into()),
            },
        ];
        store.insert_aliases(&aliases, &ids).unwrap();

        let found = store.find_by_alias("helper", 10, Some("b.py")).unwrap();
        assert!(found.is_empty());

        let found = store.find_by_alias("helper", 10, Some("a.py")).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn symbol_at_picks_innermost_covering_symbol() {
        let (_dir, store) = open_temp();
        let symbols = vec![
            PendingSymbol {
                canonical_id: "a.py:UserService".into(),
                name: "UserService".into(),
                kind: SymbolKind::Class,
                file: "a.py".into(),
                line: 1,
                column: 0,
                end_line: 10,
                signature: None,
                parent_list_index: None,
            },
            PendingSymbol {
                canonical_id: "a.py:UserService.authenticate_user".into(),
                name: "authenticate_user".into(),
                kind: SymbolKind::Method,
                file: "a.py".into(),
                line: 2,
                column: 4,
                end_line: 5,
                signature: None,
                parent_list_index: Some(0),
            },
        ];
        let ids = store.insert_symbols(&symbols).unwrap();
        store.patch_parent_ids(&symbols, &ids).unwrap();

        let found = store.symbol_at("a.py", 3).unwrap().unwrap();
        assert_eq!(found.name, "authenticate_user");
    }

    #[test]
    fn edges_with_equal_endpoints_are_skipped() {
        let (_dir, store) = open_temp();
        let symbols = vec![PendingSymbol {
            canonical_id: "a.py:f".into(),
            name: "f".into(),
            kind: SymbolKind::Function,
            file: "a.py".into(),
            line: 1,
            column: 0,
            end_line: 1,
            signature: None,
            parent_list_index: None,
        }];
        let ids = store.insert_symbols(&symbols).unwrap();
        store
            .insert_edges(&[ResolvedEdge {
                from_id: ids[0],
                to_id: ids[0],
                edge_type: EdgeType::Call,
                provenance: "f -> f".into(),
            }])
            .unwrap();
        assert_eq!(store.edge_count().unwrap(), 0);
    }

    #[test]
    fn clear_removes_all_rows() {
        let (_dir, store) = open_temp();
        let symbols = vec![PendingSymbol {
            canonical_id: "a.py:f".into(),
            name: "f".into(),
            kind: SymbolKind::Function,
            file: "a.py".into(),
            line: 1,
            column: 0,
            end_line: 1,
            signature: None,
            parent_list_index: None,
        }];
        store.insert_symbols(&symbols).unwrap();
        store.clear().unwrap();
        assert_eq!(store.symbol_count().unwrap(), 0);
    }
}
