//! Minimum graph coloring as an integer linear program.
//!
//! A graph is colored with at most `K` colors so that no edge joins two
//! vertices of the same color, using as few colors as possible. The problem
//! is written as a binary program (see [`model`]), solved by an ILP solver
//! (see [`solver`]) and the solution is read back as a vertex → color map
//! (see [`decode`]).
//!
//! # Example
//! ```
//! use ilp_coloring::*;
//!
//! // A triangle with a pendant vertex.
//! let graph = Graph::from_edges(&[(1, 2), (2, 3), (3, 1), (3, 4)]);
//!
//! let mut f = ColoringSolver::new(graph, Palette::default_colors(4), "paw");
//! let solution = f.init().unwrap();
//! assert_eq!(solution.color_count(), 3);
//! assert_ne!(solution.color(3), solution.color(4));
//! ```
#![warn(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]

pub mod decode;
pub mod draw;
pub mod error;
pub mod graph;
pub mod model;
pub mod palette;
mod report;
pub mod solver;

pub use crate::decode::{decode, Solution};
pub use crate::error::{ColoringError, ParseGraphError, StructuralError};
pub use crate::graph::{Graph, Vertex};
pub use crate::model::{build, ColoringModelBuilder, Model, SelfLoopPolicy};
pub use crate::palette::{ColorLabel, Palette};
pub use crate::solver::{solve, ColoringSolver, FixedSolver, MilpSolver, Solver, Status};

use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

fn init_log(level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    // Fails only if a logger is already installed, which is fine.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

/// Log `info` messages and above on the terminal.
pub fn init_default_log() {
    init_log(LevelFilter::Info)
}

/// Log everything down to `debug` on the terminal.
pub fn init_debug_log() {
    init_log(LevelFilter::Debug)
}
