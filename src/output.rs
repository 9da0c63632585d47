//! Output formatting for command results.
//!
//! This module handles serialization and formatting of query results across
//! all supported output formats (JSON, JSONL, CSV, TSV, text), one function
//! per core operation (spec.md §6's operation-contract table).

use anyhow::Result;

use xray_cli::indexer::IndexSummary;
use xray_cli::query::{
    DependencyResult, FoundSymbol, GraphEntry, ImpactResult, OverviewResult,
};
use xray_cli::store::SymbolRow;
use xray_cli::OutputFormat;

// ==================== Shared symbol row ====================

#[derive(serde::Serialize, Clone)]
pub struct SymbolOutput {
    pub name: String,
    pub kind: String,
    pub file: String,
    pub line: i64,
    pub column: i64,
    pub end_line: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub canonical_id: String,
}

impl From<&SymbolRow> for SymbolOutput {
    fn from(s: &SymbolRow) -> Self {
        Self {
            name: s.name.clone(),
            kind: s.kind.as_str().to_string(),
            file: s.file.clone(),
            line: s.line,
            column: s.column,
            end_line: s.end_line,
            signature: s.signature.clone(),
            canonical_id: s.canonical_id.clone(),
        }
    }
}

impl SymbolOutput {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.kind.clone(),
            format!("{}:{}", self.file, self.line),
            self.signature.clone().unwrap_or_default(),
        ]
    }
}

// ==================== build ====================

#[derive(serde::Serialize)]
struct BuildOutput<'a> {
    files_indexed: usize,
    symbols_indexed: usize,
    edges_created: usize,
    duration_ms: u128,
    errors: Vec<&'a str>,
}

pub fn output_build(summary: &IndexSummary, format: OutputFormat) -> Result<()> {
    let errors: Vec<&str> = summary.errors.iter().map(|e| e.file.as_str()).collect();
    let out = BuildOutput {
        files_indexed: summary.files_indexed,
        symbols_indexed: summary.symbols_indexed,
        edges_created: summary.edges_created,
        duration_ms: summary.duration_ms,
        errors,
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&out)?),
        OutputFormat::Jsonl => println!("{}", serde_json::to_string(&out)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["files_indexed", "symbols_indexed", "edges_created", "duration_ms"])?;
            wtr.write_record([
                out.files_indexed.to_string(),
                out.symbols_indexed.to_string(),
                out.edges_created.to_string(),
                out.duration_ms.to_string(),
            ])?;
            wtr.flush()?;
        }
        OutputFormat::Tsv => {
            println!("files_indexed\tsymbols_indexed\tedges_created\tduration_ms");
            println!(
                "{}\t{}\t{}\t{}",
                out.files_indexed, out.symbols_indexed, out.edges_created, out.duration_ms
            );
        }
        OutputFormat::Text => {
            println!(
                "Indexed {} files, {} symbols, {} edges in {}ms",
                out.files_indexed, out.symbols_indexed, out.edges_created, out.duration_ms
            );
            if !summary.errors.is_empty() {
                println!("\n{} files failed to parse:", summary.errors.len());
                for e in &summary.errors {
                    println!("  {}: {}", e.file, e.reason);
                }
            }
        }
    }
    Ok(())
}

// ==================== find ====================

/// A `find` hit: the symbol plus which alias matched, for provenance
/// (spec.md §4.3 — "callers can display [the] matching alias and its type").
#[derive(serde::Serialize)]
struct FindOutput {
    #[serde(flatten)]
    symbol: SymbolOutput,
    matched_alias: String,
    match_type: String,
}

impl FindOutput {
    fn to_row(&self) -> Vec<String> {
        let mut row = self.symbol.to_row();
        row.push(self.matched_alias.clone());
        row.push(self.match_type.clone());
        row
    }
}

pub fn output_find(results: &[FoundSymbol], format: OutputFormat) -> Result<()> {
    let outputs: Vec<FindOutput> = results
        .iter()
        .map(|r| FindOutput {
            symbol: SymbolOutput::from(&r.symbol),
            matched_alias: r.matched_alias.clone(),
            match_type: r.match_type.clone(),
        })
        .collect();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outputs)?),
        OutputFormat::Jsonl => {
            for o in &outputs {
                println!("{}", serde_json::to_string(o)?);
            }
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["name", "kind", "location", "signature", "matched_alias", "match_type"])?;
            for o in &outputs {
                wtr.write_record(o.to_row())?;
            }
            wtr.flush()?;
        }
        OutputFormat::Tsv => {
            println!("name\tkind\tlocation\tsignature\tmatched_alias\tmatch_type");
            for o in &outputs {
                println!("{}", o.to_row().join("\t"));
            }
        }
        OutputFormat::Text => {
            if outputs.is_empty() {
                println!("No symbols found.");
            }
            for o in &outputs {
                println!(
                    "{:<10} {:<30} {}:{}  (matched '{}' as {})",
                    o.symbol.kind, o.symbol.name, o.symbol.file, o.symbol.line, o.matched_alias, o.match_type
                );
            }
        }
    }
    Ok(())
}

// ==================== symbol-at ====================

pub fn output_symbol_at(result: Option<SymbolRow>, format: OutputFormat) -> Result<()> {
    let out = result.as_ref().map(SymbolOutput::from);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&out)?),
        OutputFormat::Jsonl => println!("{}", serde_json::to_string(&out)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["name", "kind", "location", "signature"])?;
            if let Some(o) = &out {
                wtr.write_record(o.to_row())?;
            }
            wtr.flush()?;
        }
        OutputFormat::Tsv => {
            println!("name\tkind\tlocation\tsignature");
            if let Some(o) = &out {
                println!("{}", o.to_row().join("\t"));
            }
        }
        OutputFormat::Text => match &out {
            Some(o) => println!("{} {} {}:{}", o.kind, o.name, o.file, o.line),
            None => println!("No symbol covers that position."),
        },
    }
    Ok(())
}

// ==================== impact ====================

#[derive(serde::Serialize)]
struct ImpactOutput {
    seed: Option<SymbolOutput>,
    impacts: Vec<ImpactEntryOutput>,
    max_depth_reached: i64,
    reasoning: Vec<String>,
}

#[derive(serde::Serialize)]
struct ImpactEntryOutput {
    #[serde(flatten)]
    symbol: SymbolOutput,
    depth: i64,
    via_edge_type: String,
}

fn impact_output(result: &ImpactResult) -> ImpactOutput {
    ImpactOutput {
        seed: result.seed.as_ref().map(SymbolOutput::from),
        impacts: result
            .impacts
            .iter()
            .map(|e| ImpactEntryOutput {
                symbol: SymbolOutput::from(&e.symbol),
                depth: e.depth,
                via_edge_type: e.via_edge_type.clone(),
            })
            .collect(),
        max_depth_reached: result.max_depth_reached,
        reasoning: result.reasoning.clone(),
    }
}

pub fn output_impact(result: &ImpactResult, format: OutputFormat) -> Result<()> {
    let out = impact_output(result);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&out)?),
        OutputFormat::Jsonl => println!("{}", serde_json::to_string(&out)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["name", "kind", "location", "depth", "via_edge_type"])?;
            for e in &out.impacts {
                wtr.write_record([
                    e.symbol.name.clone(),
                    e.symbol.kind.clone(),
                    format!("{}:{}", e.symbol.file, e.symbol.line),
                    e.depth.to_string(),
                    e.via_edge_type.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Tsv => {
            println!("name\tkind\tlocation\tdepth\tvia_edge_type");
            for e in &out.impacts {
                println!(
                    "{}\t{}\t{}:{}\t{}\t{}",
                    e.symbol.name, e.symbol.kind, e.symbol.file, e.symbol.line, e.depth, e.via_edge_type
                );
            }
        }
        OutputFormat::Text => {
            for line in &out.reasoning {
                println!("{line}");
            }
            if !out.impacts.is_empty() {
                println!();
                for e in &out.impacts {
                    println!(
                        "  depth {} {:<10} {:<30} {}:{}",
                        e.depth, e.symbol.kind, e.symbol.name, e.symbol.file, e.symbol.line
                    );
                }
            }
        }
    }
    Ok(())
}

// ==================== dependencies ====================

#[derive(serde::Serialize)]
struct DependencyOutput {
    seed: Option<SymbolOutput>,
    dependencies: Vec<DependencyEntryOutput>,
    reasoning: Vec<String>,
}

#[derive(serde::Serialize)]
struct DependencyEntryOutput {
    #[serde(flatten)]
    symbol: SymbolOutput,
    edge_type: String,
}

fn dependency_output(result: &DependencyResult) -> DependencyOutput {
    DependencyOutput {
        seed: result.seed.as_ref().map(SymbolOutput::from),
        dependencies: result
            .dependencies
            .iter()
            .map(|d| DependencyEntryOutput {
                symbol: SymbolOutput::from(&d.symbol),
                edge_type: d.edge_type.clone(),
            })
            .collect(),
        reasoning: result.reasoning.clone(),
    }
}

pub fn output_dependencies(result: &DependencyResult, format: OutputFormat) -> Result<()> {
    let out = dependency_output(result);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&out)?),
        OutputFormat::Jsonl => println!("{}", serde_json::to_string(&out)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["name", "kind", "location", "edge_type"])?;
            for d in &out.dependencies {
                wtr.write_record([
                    d.symbol.name.clone(),
                    d.symbol.kind.clone(),
                    format!("{}:{}", d.symbol.file, d.symbol.line),
                    d.edge_type.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Tsv => {
            println!("name\tkind\tlocation\tedge_type");
            for d in &out.dependencies {
                println!(
                    "{}\t{}\t{}:{}\t{}",
                    d.symbol.name, d.symbol.kind, d.symbol.file, d.symbol.line, d.edge_type
                );
            }
        }
        OutputFormat::Text => {
            for line in &out.reasoning {
                println!("{line}");
            }
            if !out.dependencies.is_empty() {
                println!();
                for d in &out.dependencies {
                    println!(
                        "  {:<10} {:<30} {}:{} [{}]",
                        d.symbol.kind, d.symbol.name, d.symbol.file, d.symbol.line, d.edge_type
                    );
                }
            }
        }
    }
    Ok(())
}

// ==================== stats ====================

#[derive(serde::Serialize)]
pub struct StatsOutput {
    pub symbol_count: i64,
    pub edge_count: i64,
    pub file_count: i64,
    pub kind_histogram: Vec<(String, i64)>,
    pub db_size_bytes: u64,
    pub available: bool,
    pub completed_at: Option<String>,
}

pub fn output_stats(stats: &StatsOutput, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(stats)?),
        OutputFormat::Jsonl => println!("{}", serde_json::to_string(stats)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["kind", "count"])?;
            for (kind, count) in &stats.kind_histogram {
                wtr.write_record([kind, &count.to_string()])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Tsv => {
            println!("kind\tcount");
            for (kind, count) in &stats.kind_histogram {
                println!("{kind}\t{count}");
            }
        }
        OutputFormat::Text => {
            if !stats.available {
                println!("No index found. Run `xray build` first.");
                return Ok(());
            }
            println!(
                "{} symbols, {} edges, {} files ({} bytes)",
                stats.symbol_count, stats.edge_count, stats.file_count, stats.db_size_bytes
            );
            if let Some(at) = &stats.completed_at {
                println!("Last built: {at}");
            }
            println!();
            for (kind, count) in &stats.kind_histogram {
                println!("  {kind:<12} {count}");
            }
        }
    }
    Ok(())
}

// ==================== overview ====================

#[derive(serde::Serialize)]
struct OverviewOutput {
    critical_symbols: Vec<CriticalSymbolOutput>,
    hot_files: Vec<(String, i64)>,
    coupling_score: f64,
}

#[derive(serde::Serialize)]
struct CriticalSymbolOutput {
    #[serde(flatten)]
    symbol: SymbolOutput,
    impact_count: usize,
}

pub fn output_overview(result: &OverviewResult, format: OutputFormat) -> Result<()> {
    let out = OverviewOutput {
        critical_symbols: result
            .critical_symbols
            .iter()
            .map(|c| CriticalSymbolOutput {
                symbol: SymbolOutput::from(&c.symbol),
                impact_count: c.impact_count,
            })
            .collect(),
        hot_files: result.hot_files.clone(),
        coupling_score: result.coupling_score,
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&out)?),
        OutputFormat::Jsonl => println!("{}", serde_json::to_string(&out)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["name", "kind", "location", "impact_count"])?;
            for c in &out.critical_symbols {
                wtr.write_record([
                    c.symbol.name.clone(),
                    c.symbol.kind.clone(),
                    format!("{}:{}", c.symbol.file, c.symbol.line),
                    c.impact_count.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Tsv => {
            println!("name\tkind\tlocation\timpact_count");
            for c in &out.critical_symbols {
                println!(
                    "{}\t{}\t{}:{}\t{}",
                    c.symbol.name, c.symbol.kind, c.symbol.file, c.symbol.line, c.impact_count
                );
            }
        }
        OutputFormat::Text => {
            println!("Coupling score: {:.2}", out.coupling_score);
            println!("\nCritical symbols:");
            for c in &out.critical_symbols {
                println!(
                    "  {:<10} {:<30} {}:{} ({} dependents)",
                    c.symbol.kind, c.symbol.name, c.symbol.file, c.symbol.line, c.impact_count
                );
            }
            println!("\nHot files:");
            for (file, fan_in) in &out.hot_files {
                println!("  {file} ({fan_in} incoming edges)");
            }
        }
    }
    Ok(())
}

// ==================== batch-impact ====================

pub fn output_batch_impact(
    results: &std::collections::HashMap<String, ImpactResult>,
    format: OutputFormat,
) -> Result<()> {
    let outputs: std::collections::HashMap<String, ImpactOutput> = results
        .iter()
        .map(|(name, result)| (name.clone(), impact_output(result)))
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outputs)?),
        OutputFormat::Jsonl => {
            for (name, out) in &outputs {
                println!("{}", serde_json::to_string(&serde_json::json!({"name": name, "result": out}))?);
            }
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["seed", "name", "kind", "location", "depth"])?;
            for (name, out) in &outputs {
                for e in &out.impacts {
                    wtr.write_record([
                        name.clone(),
                        e.symbol.name.clone(),
                        e.symbol.kind.clone(),
                        format!("{}:{}", e.symbol.file, e.symbol.line),
                        e.depth.to_string(),
                    ])?;
                }
            }
            wtr.flush()?;
        }
        OutputFormat::Tsv => {
            println!("seed\tname\tkind\tlocation\tdepth");
            for (name, out) in &outputs {
                for e in &out.impacts {
                    println!(
                        "{}\t{}\t{}\t{}:{}\t{}",
                        name, e.symbol.name, e.symbol.kind, e.symbol.file, e.symbol.line, e.depth
                    );
                }
            }
        }
        OutputFormat::Text => {
            for (name, out) in &outputs {
                println!("== {name} ==");
                for line in &out.reasoning {
                    println!("{line}");
                }
                println!();
            }
        }
    }
    Ok(())
}

// ==================== dep-graph ====================

/// `dep_graph`'s per-name result (spec.md §6): direct dependencies, a
/// depth-3 impact, and the fan-in/fan-out/instability coupling metrics.
#[derive(serde::Serialize)]
struct GraphOutput {
    dependencies: DependencyOutput,
    impact: ImpactOutput,
    fan_in: usize,
    fan_out: usize,
    instability: f64,
}

pub fn output_dep_graph(
    results: &std::collections::HashMap<String, GraphEntry>,
    format: OutputFormat,
) -> Result<()> {
    let outputs: std::collections::HashMap<String, GraphOutput> = results
        .iter()
        .map(|(name, entry)| {
            (
                name.clone(),
                GraphOutput {
                    dependencies: dependency_output(&entry.dependencies),
                    impact: impact_output(&entry.impact),
                    fan_in: entry.fan_in,
                    fan_out: entry.fan_out,
                    instability: entry.instability,
                },
            )
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outputs)?),
        OutputFormat::Jsonl => {
            for (name, out) in &outputs {
                println!("{}", serde_json::to_string(&serde_json::json!({"name": name, "result": out}))?);
            }
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["name", "fan_in", "fan_out", "instability", "dependencies", "impacts"])?;
            for (name, out) in &outputs {
                wtr.write_record([
                    name.clone(),
                    out.fan_in.to_string(),
                    out.fan_out.to_string(),
                    out.instability.to_string(),
                    out.dependencies.dependencies.len().to_string(),
                    out.impact.impacts.len().to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Tsv => {
            println!("name\tfan_in\tfan_out\tinstability\tdependencies\timpacts");
            for (name, out) in &outputs {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    name,
                    out.fan_in,
                    out.fan_out,
                    out.instability,
                    out.dependencies.dependencies.len(),
                    out.impact.impacts.len()
                );
            }
        }
        OutputFormat::Text => {
            for (name, out) in &outputs {
                println!(
                    "{name}: fan_in={} fan_out={} instability={:.2}",
                    out.fan_in, out.fan_out, out.instability
                );
                for dep in &out.dependencies.dependencies {
                    println!("  depends on: {} ({})", dep.symbol.name, dep.edge_type);
                }
                for imp in &out.impact.impacts {
                    println!("  impacts: {} (depth {})", imp.symbol.name, imp.depth);
                }
            }
        }
    }
    Ok(())
}
