//! Integer linear programs for minimum graph coloring.
//!
//! For a graph `G = (V, E)` and a palette of `K` slots, the model has a binary
//! variable `x[v][c]` for each vertex `v` and slot `c` (vertex `v` gets color
//! `c`), a binary variable `u[c]` per slot (slot `c` is used) and reads
//!
//! ```text
//! minimize    Σ_c u[c]
//! subject to  Σ_c x[v][c] = 1             for v in V
//!             x[v][c] + x[w][c] <= 1      for vw in E, c < K
//!             x[v][c] - u[c] <= 0         for v in V, c < K
//! ```
//!
//! The constraints are stored as a sparse matrix with one row per constraint.

use crate::error::StructuralError;
use crate::graph::{Graph, Vertex};
use log::{debug, info};
use ndarray::Array1;
use serde_derive::{Deserialize, Serialize};
use sprs::{CsMat, TriMat};
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Tolerance used when checking constraints against numeric values.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Handle on a variable of a [`Model`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variable(usize);

impl Variable {
    /// Column of the variable in the constraint matrix.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Meaning of a variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    /// `x[vertex][slot]`
    Assignment { vertex: Vertex, slot: usize },
    /// `u[slot]`
    Usage { slot: usize },
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assignment { vertex, slot } => write!(f, "x_{}_{}", vertex, slot),
            Self::Usage { slot } => write!(f, "u_{}", slot),
        }
    }
}

/// What to do with an edge `(v, v)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelfLoopPolicy {
    /// Refuse the graph with [`StructuralError::SelfLoop`].
    #[default]
    Reject,
    /// Emit `2 x[v][c] <= 1` for every slot. The model is then infeasible.
    Model,
}

/// Comparison of a constraint row with its right-hand side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    Eq,
    Le,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::Le => "<=",
        })
    }
}

/// Origin of a constraint row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowKind {
    /// `Σ_c x[v][c] = 1`
    OneColor(Vertex),
    /// `x[u][c] + x[v][c] <= 1`
    Edge { edge: (Vertex, Vertex), slot: usize },
    /// `x[v][c] - u[c] <= 0`
    Usage { vertex: Vertex, slot: usize },
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneColor(v) => write!(f, "one_color_{}", v),
            Self::Edge { edge: (u, v), slot } => write!(f, "edge_{}_{}_{}", u, v, slot),
            Self::Usage { vertex, slot } => write!(f, "usage_{}_{}", vertex, slot),
        }
    }
}

/// A constraint row, as returned by [`Model::rows`].
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    pub terms: Vec<(Variable, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

/// The coloring program of a graph.
///
/// Built by [`ColoringModelBuilder`]; immutable afterwards.
#[derive(Clone, Debug)]
pub struct Model {
    vertices: Vec<Vertex>,
    colors: usize,
    assignment: BTreeMap<(Vertex, usize), Variable>,
    usage: Vec<Variable>,
    kinds: Vec<VarKind>,
    matrix: CsMat<f64>,
    senses: Vec<Sense>,
    rhs: Array1<f64>,
    row_kinds: Vec<RowKind>,
    objective: Array1<f64>,
}

/// Builds a [`Model`] from a graph.
///
/// ```
/// use ilp_coloring::{ColoringModelBuilder, Graph, SelfLoopPolicy};
///
/// let triangle = Graph::from_edges(&[(1, 2), (2, 3), (1, 3)]);
/// let model = ColoringModelBuilder::new(3)
///     .self_loops(SelfLoopPolicy::Reject)
///     .build(&triangle)
///     .unwrap();
/// assert_eq!(model.num_variables(), 3 * 3 + 3);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ColoringModelBuilder {
    colors: usize,
    self_loops: SelfLoopPolicy,
}

/// Build the model of `graph` with `k` colors and the default options.
pub fn build(graph: &Graph, k: usize) -> Result<Model, StructuralError> {
    ColoringModelBuilder::new(k).build(graph)
}

// Rows accumulated as triplets before being packed into a sparse matrix.
#[derive(Default)]
struct Rows {
    row_inds: Vec<usize>,
    col_inds: Vec<usize>,
    data: Vec<f64>,
    senses: Vec<Sense>,
    rhs: Vec<f64>,
    kinds: Vec<RowKind>,
}

impl Rows {
    fn push(&mut self, kind: RowKind, terms: &[(Variable, f64)], sense: Sense, rhs: f64) {
        let row = self.kinds.len();
        for &(var, coeff) in terms {
            self.row_inds.push(row);
            self.col_inds.push(var.0);
            self.data.push(coeff);
        }
        self.senses.push(sense);
        self.rhs.push(rhs);
        self.kinds.push(kind);
    }
}

impl ColoringModelBuilder {
    /// Builder for models with `colors` slots, rejecting self-loops.
    pub fn new(colors: usize) -> Self {
        Self {
            colors,
            self_loops: SelfLoopPolicy::default(),
        }
    }

    pub fn self_loops(mut self, policy: SelfLoopPolicy) -> Self {
        self.self_loops = policy;
        self
    }

    pub fn colors(&self) -> usize {
        self.colors
    }

    pub fn policy(&self) -> SelfLoopPolicy {
        self.self_loops
    }

    /// Build the model of `graph`.
    ///
    /// # Errors
    /// Fails with a [`StructuralError`] if the palette is empty or if the graph
    /// does not pass [`Graph::check`] under the configured self-loop policy.
    pub fn build(&self, graph: &Graph) -> Result<Model, StructuralError> {
        let k = self.colors;
        if k == 0 {
            return Err(StructuralError::NoColors);
        }
        graph.check(self.self_loops)?;
        info!(
            "Building coloring model: {} vertices, {} edges, {} colors",
            graph.size(),
            graph.edge_count(),
            k
        );

        // Variables
        let vertices: Vec<Vertex> = graph.vertices().collect();
        let mut kinds = Vec::with_capacity((vertices.len() + 1) * k);
        let mut assignment = BTreeMap::new();
        for &vertex in &vertices {
            for slot in 0..k {
                let _ = assignment.insert((vertex, slot), Variable(kinds.len()));
                kinds.push(VarKind::Assignment { vertex, slot });
            }
        }
        let usage: Vec<Variable> = (0..k)
            .map(|slot| {
                kinds.push(VarKind::Usage { slot });
                Variable(kinds.len() - 1)
            })
            .collect();
        let x = |v: Vertex, c: usize| assignment[&(v, c)];

        // Constraints
        let mut rows = Rows::default();
        for &v in &vertices {
            let terms: Vec<_> = (0..k).map(|c| (x(v, c), 1.)).collect();
            rows.push(RowKind::OneColor(v), &terms, Sense::Eq, 1.);
        }
        for &(v1, v2) in graph.edges() {
            for slot in 0..k {
                let kind = RowKind::Edge {
                    edge: (v1, v2),
                    slot,
                };
                if v1 == v2 {
                    debug!("Self-loop on {}: slot {} is forbidden", v1, slot);
                    rows.push(kind, &[(x(v1, slot), 2.)], Sense::Le, 1.);
                } else {
                    let terms = [(x(v1, slot), 1.), (x(v2, slot), 1.)];
                    rows.push(kind, &terms, Sense::Le, 1.);
                }
            }
        }
        for &vertex in &vertices {
            for slot in 0..k {
                let terms = [(x(vertex, slot), 1.), (usage[slot], -1.)];
                rows.push(RowKind::Usage { vertex, slot }, &terms, Sense::Le, 0.);
            }
        }

        // Objective
        let mut objective = Array1::zeros(kinds.len());
        for u in &usage {
            objective[u.0] = 1.;
        }

        let shape = (rows.kinds.len(), kinds.len());
        let matrix: CsMat<f64> =
            TriMat::from_triplets(shape, rows.row_inds, rows.col_inds, rows.data).to_csr();
        debug!(
            "Model has {} variables, {} constraints, {} non-zeros",
            shape.1,
            shape.0,
            matrix.nnz()
        );
        Ok(Model {
            vertices,
            colors: k,
            assignment,
            usage,
            kinds,
            matrix,
            senses: rows.senses,
            rhs: Array1::from(rows.rhs),
            row_kinds: rows.kinds,
            objective,
        })
    }
}

impl Model {
    /// Vertices of the graph, in increasing order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Number of color slots.
    pub fn colors(&self) -> usize {
        self.colors
    }

    pub fn num_variables(&self) -> usize {
        self.kinds.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.row_kinds.len()
    }

    /// The variable `x[v][c]`, if `v` is a vertex and `c` a slot.
    pub fn assignment(&self, v: Vertex, c: usize) -> Option<Variable> {
        self.assignment.get(&(v, c)).copied()
    }

    /// The variable `u[c]`.
    pub fn usage(&self, c: usize) -> Option<Variable> {
        self.usage.get(c).copied()
    }

    pub fn kind(&self, var: Variable) -> VarKind {
        self.kinds[var.0]
    }

    /// All variables with their meaning.
    pub fn variables(&self) -> impl Iterator<Item = (Variable, VarKind)> + '_ {
        self.kinds.iter().enumerate().map(|(i, &k)| (Variable(i), k))
    }

    /// Objective coefficients, indexed by [`Variable::index`].
    pub fn objective(&self) -> &Array1<f64> {
        &self.objective
    }

    /// Constraint rows in order of creation.
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.matrix
            .outer_iterator()
            .enumerate()
            .map(move |(i, row)| Row {
                kind: self.row_kinds[i],
                terms: row.iter().map(|(j, &a)| (Variable(j), a)).collect(),
                sense: self.senses[i],
                rhs: self.rhs[i],
            })
    }

    /// Value of the objective for the variable values `values`.
    pub fn objective_value(&self, values: &Array1<f64>) -> f64 {
        self.objective.dot(values)
    }

    /// Indices of the constraints violated by `values`.
    ///
    /// # Panics
    /// Panics if `values` does not have one entry per variable.
    pub fn violations(&self, values: &Array1<f64>) -> Vec<usize> {
        assert_eq!(values.len(), self.num_variables());
        self.matrix
            .outer_iterator()
            .enumerate()
            .filter(|&(i, ref row)| {
                let lhs: f64 = row.iter().map(|(j, &a)| a * values[j]).sum();
                match self.senses[i] {
                    Sense::Eq => (lhs - self.rhs[i]).abs() > FEASIBILITY_TOLERANCE,
                    Sense::Le => lhs > self.rhs[i] + FEASIBILITY_TOLERANCE,
                }
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// The constraint of index `i`.
    pub fn row(&self, i: usize) -> Option<Row> {
        self.rows().nth(i)
    }

    fn write_linear<W: fmt::Write>(&self, w: &mut W, terms: &[(Variable, f64)]) -> fmt::Result {
        for (i, &(var, a)) in terms.iter().enumerate() {
            let sign = if a < 0. { "-" } else { "+" };
            match (i, a.abs()) {
                (0, m) if a >= 0. && m == 1. => write!(w, "{}", self.kind(var))?,
                (0, m) if a >= 0. => write!(w, "{} {}", m, self.kind(var))?,
                (_, m) if m == 1. => write!(w, " {} {}", sign, self.kind(var))?,
                (0, m) => write!(w, "- {} {}", m, self.kind(var))?,
                (_, m) => write!(w, " {} {} {}", sign, m, self.kind(var))?,
            }
        }
        Ok(())
    }

    fn write_constraints<W: fmt::Write>(&self, w: &mut W, indent: &str) -> fmt::Result {
        for row in self.rows() {
            write!(w, "{}{}: ", indent, row.kind)?;
            self.write_linear(w, &row.terms)?;
            writeln!(w, " {} {}", row.sense, row.rhs)?;
        }
        Ok(())
    }

    fn objective_terms(&self) -> Vec<(Variable, f64)> {
        self.usage.iter().map(|&u| (u, self.objective[u.0])).collect()
    }

    /// The model in CPLEX LP format.
    pub fn to_lp(&self) -> String {
        let mut s = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_lp_fmt(&mut s);
        s
    }

    fn write_lp_fmt<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        writeln!(w, "\\ minimum coloring with {} colors", self.colors)?;
        writeln!(w, "Minimize")?;
        write!(w, " colors: ")?;
        self.write_linear(w, &self.objective_terms())?;
        writeln!(w)?;
        writeln!(w, "Subject To")?;
        self.write_constraints(w, " ")?;
        writeln!(w, "Binary")?;
        for kind in &self.kinds {
            writeln!(w, " {}", kind)?;
        }
        writeln!(w, "End")
    }

    /// Write the model in CPLEX LP format to `path`, to be fed to an external solver.
    pub fn write_lp<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        info!("Writing model to {}", path.display());
        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(self.to_lp().as_bytes())?;
        file.flush()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MINIMIZE")?;
        self.write_linear(f, &self.objective_terms())?;
        writeln!(f)?;
        writeln!(f, "SUBJECT TO")?;
        self.write_constraints(f, "")?;
        let mut names = String::new();
        for kind in &self.kinds {
            write!(names, " {}", kind)?;
        }
        writeln!(f, "BINARY{}", names)
    }
}
