//! CLI argument definitions using clap.
//!
//! This module defines the command-line interface schema for xray, one
//! subcommand per core operation (spec.md §6's operation-contract table).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use xray_cli::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "xray", version, about = "Code-intelligence CLI: symbol graph and impact analysis")]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output (for scripts). Errors still go to stderr.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format (text, json, jsonl, csv, tsv)
    #[arg(long, short = 'f', global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Workspace root (auto-detected from .xray/, .git/, Cargo.toml, etc. if not specified)
    #[arg(long, short = 'w', global = true, env = "XRAY_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Path to the SQLite index database (default: <workspace>/.xray/xray.db)
    #[arg(long, global = true, env = "XRAY_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build (or rebuild) the symbol graph for the workspace
    Build {
        /// Delete and recreate the index rather than reuse an existing one
        #[arg(long)]
        rebuild: bool,
    },
    /// Search for a symbol by name (substring match over aliases)
    Find {
        /// Name or substring to search for
        query: String,
        /// Maximum number of results
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Find the symbol that covers a given source position
    SymbolAt {
        /// File, optionally with an embedded line (path:line)
        file: String,
        /// 1-based line number (required if not embedded in `file`)
        #[arg(long)]
        line: Option<usize>,
    },
    /// Analyze what would break if a symbol changed
    Impact {
        /// Symbol name to analyze
        name: String,
        /// Maximum BFS depth (0 = seed only)
        #[arg(long, default_value = "5")]
        max_depth: i64,
    },
    /// List a symbol's direct dependencies
    Dependencies {
        /// Symbol name to analyze
        name: String,
    },
    /// Show index statistics
    Stats,
    /// Show the most depended-upon symbols and hottest files
    Overview {
        /// Number of critical symbols to report
        #[arg(long, default_value = "10")]
        max_symbols: usize,
    },
    /// Run `impact` over a batch of symbol names
    BatchImpact {
        /// Symbol names to analyze
        #[arg(required = true)]
        names: Vec<String>,
        /// Maximum BFS depth per symbol
        #[arg(long, default_value = "5")]
        max_depth: i64,
    },
    /// Show a dependency/impact graph (fan-in, fan-out, instability) for symbols
    DepGraph {
        /// Symbol names to analyze
        #[arg(required = true)]
        names: Vec<String>,
    },
}
