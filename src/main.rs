//! xray CLI - code-intelligence engine entry point.
//!
//! This is the entry point for the xray command-line interface.

use anyhow::Result;
use clap::Parser;

mod cli;
mod output;

use cli::{Cli, Commands};
use xray_cli::error::XrayError;
use xray_cli::indexer::{build_full_index, IndexPhase, NullProgress, ProgressSink};
use xray_cli::languages::ParserRegistry;
use xray_cli::query;
use xray_cli::store::IndexStore;
use xray_cli::workspace;
use xray_cli::ExitCode;

/// Renders index-build progress with a spinner during the scanning/resolving/
/// finalizing phases and a bar with a known length once parsing starts.
/// Grounded on the teacher's `run_indexing_with_progress` in `daemon.rs`.
struct IndicatifProgress {
    bar: indicatif::ProgressBar,
    phase: IndexPhase,
    done: u64,
}

impl IndicatifProgress {
    fn new() -> Self {
        let bar = indicatif::ProgressBar::new(0);
        bar.set_style(
            indicatif::ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        bar.set_message("scanning for files...");
        Self {
            bar,
            phase: IndexPhase::Discovering,
            done: 0,
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for IndicatifProgress {
    fn phase(&mut self, phase: IndexPhase, total: usize) {
        self.phase = phase;
        self.done = 0;
        match phase {
            IndexPhase::Discovering => {
                self.bar.set_message("scanning for files...");
            }
            IndexPhase::Parsing => {
                self.bar.set_length(total as u64);
                self.bar.set_position(0);
                self.bar.set_style(
                    indicatif::ProgressStyle::default_bar()
                        .template(
                            "{spinner:.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                        )
                        .unwrap()
                        .progress_chars("=>-"),
                );
                self.bar.set_message("parsing files");
            }
            IndexPhase::Resolving => {
                self.bar.set_style(
                    indicatif::ProgressStyle::default_spinner()
                        .template("{spinner:.cyan} {msg}")
                        .unwrap(),
                );
                self.bar.set_message(format!("resolving {total} symbols..."));
            }
            IndexPhase::Finalizing => {
                self.bar.set_message("finalizing index...");
            }
        }
    }

    fn tick(&mut self) {
        self.done += 1;
        if self.phase == IndexPhase::Parsing {
            self.bar.set_position(self.done);
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let format = cli.format;

    let workspace = match workspace::resolve_workspace(cli.workspace.as_deref()) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::Error.into();
        }
    };
    let db = workspace::resolve_db_path(cli.db.as_deref(), &workspace);
    workspace::set_env_for_children(&workspace, &db);

    let result = run(cli.command, &workspace, &db, format, cli.quiet);

    match result {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("error: {e}");
            // A lookup miss (symbol/location not found) gets its own exit
            // code so scripts can tell "nothing matched" from a real failure.
            let code = match e.downcast_ref::<XrayError>() {
                Some(XrayError::UnknownSymbol(_)) => ExitCode::NotFound,
                _ => ExitCode::Error,
            };
            code.into()
        }
    }
}

fn run(
    command: Commands,
    workspace: &std::path::Path,
    db: &std::path::Path,
    format: xray_cli::OutputFormat,
    quiet: bool,
) -> Result<ExitCode> {
    match command {
        Commands::Build { rebuild } => {
            let _ = rebuild; // build_full_index always truncates before rebuilding (spec.md §4.4)
            workspace::ensure_gitignore_entry(workspace)?;
            let store = IndexStore::open(db)?;
            let registry = ParserRegistry::new();
            let summary = if quiet {
                build_full_index(workspace, &store, &registry, &mut NullProgress)?
            } else {
                let mut progress = IndicatifProgress::new();
                let result = build_full_index(workspace, &store, &registry, &mut progress);
                progress.finish();
                result?
            };
            output::output_build(&summary, format)?;
            Ok(ExitCode::Success)
        }
        Commands::Find { query: q, limit } => {
            let store = open_store(db)?;
            let results = query::find(&store, &q, limit)?;
            let found = !results.is_empty();
            output::output_find(&results, format)?;
            if found {
                Ok(ExitCode::Success)
            } else {
                Err(XrayError::UnknownSymbol(q).into())
            }
        }
        Commands::SymbolAt { file, line } => {
            let (path, embedded_line) = xray_cli::util::parse_file_line(&file)?;
            let line = xray_cli::util::require_line(&file, line.or(embedded_line))?;
            let store = open_store(db)?;
            let file_rel = path.to_string_lossy().replace('\\', "/");
            let result = query::symbol_at(&store, &file_rel, line as i64)?;
            let found = result.is_some();
            output::output_symbol_at(result, format)?;
            if found {
                Ok(ExitCode::Success)
            } else {
                Err(XrayError::UnknownSymbol(format!("{file_rel}:{line}")).into())
            }
        }
        Commands::Impact { name, max_depth } => {
            let store = open_store(db)?;
            let result = query::impact(&store, &name, max_depth)?;
            let found = result.seed.is_some();
            output::output_impact(&result, format)?;
            if found {
                Ok(ExitCode::Success)
            } else {
                Err(XrayError::UnknownSymbol(name).into())
            }
        }
        Commands::Dependencies { name } => {
            let store = open_store(db)?;
            let result = query::dependencies(&store, &name)?;
            let found = result.seed.is_some();
            output::output_dependencies(&result, format)?;
            if found {
                Ok(ExitCode::Success)
            } else {
                Err(XrayError::UnknownSymbol(name).into())
            }
        }
        Commands::Stats => {
            let stats = collect_stats(db)?;
            output::output_stats(&stats, format)?;
            Ok(ExitCode::Success)
        }
        Commands::Overview { max_symbols } => {
            let store = open_store(db)?;
            let result = query::overview(&store, max_symbols)?;
            output::output_overview(&result, format)?;
            Ok(ExitCode::Success)
        }
        Commands::BatchImpact { names, max_depth } => {
            let store = open_store(db)?;
            let results = query::batch_impact(&store, &names, max_depth)?;
            output::output_batch_impact(&results, format)?;
            Ok(ExitCode::Success)
        }
        Commands::DepGraph { names } => {
            let store = open_store(db)?;
            let results = query::graph(&store, &names)?;
            output::output_dep_graph(&results, format)?;
            Ok(ExitCode::Success)
        }
    }
}

fn open_store(db: &std::path::Path) -> Result<IndexStore> {
    if !db.exists() {
        return Err(XrayError::StoreError(format!(
            "no index found at {}; run `xray build` first",
            db.display()
        ))
        .into());
    }
    IndexStore::open(db)
}

fn collect_stats(db: &std::path::Path) -> Result<output::StatsOutput> {
    if !db.exists() {
        return Ok(output::StatsOutput {
            symbol_count: 0,
            edge_count: 0,
            file_count: 0,
            kind_histogram: Vec::new(),
            db_size_bytes: 0,
            available: false,
            completed_at: None,
        });
    }
    let store = IndexStore::open(db)?;
    let db_size_bytes = std::fs::metadata(db).map(|m| m.len()).unwrap_or(0);
    Ok(output::StatsOutput {
        symbol_count: store.symbol_count()?,
        edge_count: store.edge_count()?,
        file_count: store.file_count()?,
        kind_histogram: store.kind_histogram()?,
        db_size_bytes,
        available: true,
        completed_at: store.get_metadata("completed_at")?,
    })
}

fn init_logging(verbosity: u8, quiet: bool) {
    let level = if quiet {
        "warn"
    } else {
        match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}
