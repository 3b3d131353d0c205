//! CLI entry point for the puzzle solver.
//!
//! Usage:
//!   puzzle-search solve <puzzle.json> [options]
//!   puzzle-search solve --stdin [options]
//!   puzzle-search census <puzzle.json>
//!
//! Options:
//!   --mode <mode>   depth-first (default) or breadth-first
//!   --no-dedup      Disable duplicate detection in depth-first mode
//!
//! Log verbosity follows `RUST_LOG` (default: `puzzle_search=info`), and
//! logs go to stderr so stdout stays valid JSON.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use puzzle_search::{
    level_census, solve, CanonicalEncoding, LoadError, LoadedPuzzle, PuzzleFile, SearchError,
    SearchMode, SolverConfig,
};

#[derive(Parser)]
#[command(name = "puzzle-search")]
#[command(about = "Backtracking solver for peg solitaire, sudoku and bridges puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a solution and print it with search statistics
    Solve {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,

        /// Search strategy
        #[arg(long, value_enum, default_value_t = SearchMode::DepthFirst)]
        mode: SearchMode,

        /// Explore positions again even if reached through another move order
        #[arg(long)]
        no_dedup: bool,
    },
    /// Count the distinct positions first reached at each depth
    Census {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,
    },
}

/// Output format for a solve run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput<M> {
    solved: bool,
    kind: &'static str,
    mode: SearchMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<M>>,
    move_count: usize,
    nodes_expanded: usize,
    duplicates_pruned: usize,
    max_depth: usize,
    peak_frontier: usize,
    time_elapsed_ms: u64,
}

/// Output format for a census run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CensusOutput {
    kind: &'static str,
    layers: Vec<usize>,
    total: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("puzzle_search=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            stdin,
            mode,
            no_dedup,
        } => {
            let loaded = load_puzzle(file, stdin);
            let config = SolverConfig {
                mode,
                dedup: !no_dedup,
            };
            info!(kind = loaded.kind(), ?mode, dedup = config.dedup, "solving");

            let solved = match loaded {
                LoadedPuzzle::Peg(game, mut board) => run_solve(&game, &mut board, &config, "peg"),
                LoadedPuzzle::Sudoku(sudoku, mut grid) => {
                    run_solve(&sudoku, &mut grid, &config, "sudoku")
                }
                LoadedPuzzle::Bridges(bridges, mut state) => {
                    run_solve(&bridges, &mut state, &config, "bridges")
                }
            };

            process::exit(if solved { 0 } else { 1 });
        }
        Commands::Census { file, stdin } => {
            let loaded = load_puzzle(file, stdin);
            match loaded {
                LoadedPuzzle::Peg(game, board) => run_census(&game, &board, "peg"),
                LoadedPuzzle::Sudoku(sudoku, grid) => run_census(&sudoku, &grid, "sudoku"),
                LoadedPuzzle::Bridges(bridges, state) => run_census(&bridges, &state, "bridges"),
            }
        }
    }
}

/// Read, parse and build the puzzle, exiting on any failure
fn load_puzzle(file: Option<PathBuf>, stdin: bool) -> LoadedPuzzle {
    let parsed = if stdin {
        let mut buffer = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buffer) {
            eprintln!("Error reading from stdin: {}", e);
            process::exit(1);
        }
        PuzzleFile::from_json(&buffer)
    } else if let Some(path) = file {
        match PuzzleFile::load(&path) {
            Err(LoadError::Io(e)) => {
                eprintln!("Error reading file {:?}: {}", path, e);
                process::exit(1);
            }
            parsed => parsed,
        }
    } else {
        eprintln!("Error: Must provide either a file path or --stdin");
        process::exit(1);
    };

    let puzzle_file = match parsed {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error parsing puzzle JSON: {}", e);
            process::exit(1);
        }
    };

    match puzzle_file.build() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Invalid puzzle: {}", e);
            process::exit(1);
        }
    }
}

fn run_solve<P>(
    puzzle: &P,
    position: &mut P::Position,
    config: &SolverConfig,
    kind: &'static str,
) -> bool
where
    P: CanonicalEncoding,
    P::Move: Serialize,
{
    let result = match solve(puzzle, position, config) {
        Ok(result) => result,
        Err(e) => fail(e),
    };

    let solved = result.solved();
    let output = SolveOutput {
        solved,
        kind,
        mode: config.mode,
        move_count: result.solution.as_ref().map_or(0, Vec::len),
        moves: result.solution,
        nodes_expanded: result.stats.nodes_expanded,
        duplicates_pruned: result.stats.duplicates_pruned,
        max_depth: result.stats.max_depth,
        peak_frontier: result.stats.peak_frontier,
        time_elapsed_ms: result.stats.time_elapsed_ms,
    };
    print_json(&output);
    solved
}

fn run_census<P: CanonicalEncoding>(puzzle: &P, position: &P::Position, kind: &'static str) {
    let layers = match level_census(puzzle, position) {
        Ok(layers) => layers,
        Err(e) => fail(e),
    };
    let total = layers.iter().sum();
    print_json(&CensusOutput {
        kind,
        layers,
        total,
    });
}

fn fail(error: SearchError) -> ! {
    eprintln!("Search failed: {}", error);
    process::exit(1);
}

fn print_json<T: Serialize>(output: &T) {
    match serde_json::to_string_pretty(output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_puzzle_from_file() {
        let path = std::env::temp_dir().join(format!("puzzle-search-{}.json", process::id()));
        std::fs::write(&path, r#"{"kind": "bridges", "rows": ["2.2", "...", "2.2"]}"#).unwrap();

        let loaded = load_puzzle(Some(path.clone()), false);
        std::fs::remove_file(&path).unwrap();

        let LoadedPuzzle::Bridges(puzzle, mut state) = loaded else {
            panic!("expected bridges");
        };
        assert!(run_solve(&puzzle, &mut state, &SolverConfig::default(), "bridges"));
    }
}
