//! Errors raised while building, solving and decoding a coloring.

use crate::graph::Vertex;
use crate::solver::Status;
use std::io;
use thiserror::Error;

/// Malformed input, detected before any model is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("the graph has no vertex")]
    NoVertices,
    #[error("the palette has no color")]
    NoColors,
    #[error("the palette has {found} colors but the model was built with {expected}")]
    PaletteSize { expected: usize, found: usize },
    #[error("edge ({}, {}) references unknown vertex {vertex}", .edge.0, .edge.1)]
    UnknownVertex {
        edge: (Vertex, Vertex),
        vertex: Vertex,
    },
    #[error("self-loop on vertex {0}: a graph with a loop has no proper coloring")]
    SelfLoop(Vertex),
}

/// Error while reading a graph in edge-list format.
#[derive(Debug, Error)]
pub enum ParseGraphError {
    #[error("line {line}: expected `u v` or `v`, found {found:?}")]
    Syntax { line: usize, found: String },
    #[error("line {line}: invalid vertex {token:?}")]
    Vertex { line: usize, token: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Any failure of the build / solve / decode pipeline.
///
/// None of them is retried internally and no partial result is returned.
#[derive(Debug, Error)]
pub enum ColoringError {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error("solver terminated with status {0}")]
    SolveFailure(Status),
    #[error("vertex {vertex} has {} active color slots {active:?} (expected exactly one)", .active.len())]
    AssignmentInconsistency { vertex: Vertex, active: Vec<usize> },
    #[error("decoded coloring is not proper: both ends of edge ({}, {}) share a color", .edge.0, .edge.1)]
    Conflict { edge: (Vertex, Vertex) },
    #[error(transparent)]
    Parse(#[from] ParseGraphError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Encoding(#[from] bincode::Error),
}

/// Result type of this crate.
pub type Result<T> = std::result::Result<T, ColoringError>;
