//! Solving coloring models.
//!
//! The [`Solver`] trait is the boundary with ILP solvers. [`MilpSolver`]
//! delegates to `good_lp` and its `microlp` backend; [`FixedSolver`] replays
//! predetermined values. [`ColoringSolver`] runs the whole build / solve /
//! decode pipeline for one named problem.

use crate::decode::{decode, Solution};
use crate::error::{ColoringError, Result};
use crate::graph::Graph;
use crate::model::{ColoringModelBuilder, Model, SelfLoopPolicy, Sense, Variable};
use crate::palette::Palette;
use good_lp::solvers::microlp::microlp;
use good_lp::{constraint, variable, Expression, ProblemVariables, ResolutionError, SolverModel};
use good_lp::Solution as _;
use log::{debug, info, warn};
use ndarray::Array1;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Termination status of a solver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Optimal,
    Infeasible,
    Unbounded,
    #[default]
    NotSolved,
    Undefined,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An ILP solver.
pub trait Solver {
    /// Solve `model` and return the termination status.
    fn solve(&mut self, model: &Model) -> Status;

    /// Value of `var` in the last solution, `NaN` if there is none.
    fn value(&self, var: Variable) -> f64;

    /// Values of all variables of `model`, indexed by [`Variable::index`].
    fn values(&self, model: &Model) -> Array1<f64> {
        model.variables().map(|(var, _)| self.value(var)).collect()
    }
}

impl<S: Solver + ?Sized> Solver for &mut S {
    fn solve(&mut self, model: &Model) -> Status {
        (**self).solve(model)
    }

    fn value(&self, var: Variable) -> f64 {
        (**self).value(var)
    }
}

/// Mixed integer solver backed by `good_lp` (`microlp` backend).
#[derive(Clone, Debug, Default)]
pub struct MilpSolver {
    values: Vec<f64>,
}

impl MilpSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Solver for MilpSolver {
    fn solve(&mut self, model: &Model) -> Status {
        self.values.clear();
        let mut vars = ProblemVariables::new();
        let columns: Vec<good_lp::Variable> = model
            .variables()
            .map(|(_, kind)| vars.add(variable().binary().name(kind.to_string())))
            .collect();
        let objective: Expression = model
            .objective()
            .indexed_iter()
            .filter(|&(_, &a)| a != 0.)
            .map(|(j, &a)| a * columns[j])
            .sum();
        let mut problem = vars.minimise(objective).using(microlp);
        for row in model.rows() {
            let lhs: Expression = row
                .terms
                .iter()
                .map(|&(var, a)| a * columns[var.index()])
                .sum();
            let rhs = row.rhs;
            let _ = problem.add_constraint(match row.sense {
                Sense::Eq => constraint!(lhs == rhs),
                Sense::Le => constraint!(lhs <= rhs),
            });
        }
        debug!("Handing {} constraints to microlp", model.num_constraints());
        match problem.solve() {
            Ok(solution) => {
                self.values = columns.iter().map(|&c| solution.value(c)).collect();
                Status::Optimal
            }
            Err(ResolutionError::Infeasible) => Status::Infeasible,
            Err(ResolutionError::Unbounded) => Status::Unbounded,
            Err(e) => {
                warn!("Solver failed: {}", e);
                Status::Undefined
            }
        }
    }

    fn value(&self, var: Variable) -> f64 {
        self.values.get(var.index()).copied().unwrap_or(f64::NAN)
    }
}

/// A solver that does not solve anything: it reports a fixed status and
/// fixed variable values.
///
/// Useful to replay values obtained elsewhere, or to test decoding.
#[derive(Clone, Debug)]
pub struct FixedSolver {
    status: Status,
    values: Array1<f64>,
}

impl FixedSolver {
    pub fn new(status: Status, values: Array1<f64>) -> Self {
        Self { status, values }
    }
}

impl Solver for FixedSolver {
    fn solve(&mut self, model: &Model) -> Status {
        if self.values.len() != model.num_variables() {
            warn!(
                "Fixed solver has {} values for {} variables",
                self.values.len(),
                model.num_variables()
            );
        }
        self.status
    }

    fn value(&self, var: Variable) -> f64 {
        self.values.get(var.index()).copied().unwrap_or(f64::NAN)
    }
}

/// Minimum coloring of a graph with a given palette.
///
/// Only an [`Status::Optimal`] answer of the solver is decoded; any other
/// status is returned as [`ColoringError::SolveFailure`].
pub fn solve<S: Solver + ?Sized>(
    graph: &Graph,
    palette: &Palette,
    policy: SelfLoopPolicy,
    solver: &mut S,
) -> Result<Solution> {
    let mut runner =
        ColoringSolver::with_solver(graph.clone(), palette.clone(), "coloring", solver)
            .self_loops(policy);
    let solution = runner.init()?.clone();
    Ok(solution)
}

/// Driver for one coloring problem.
///
/// ```no_run
/// use ilp_coloring::*;
///
/// let graph = Graph::petersen();
/// let mut f = ColoringSolver::new(graph, Palette::default_colors(4), "petersen");
/// f.init().unwrap();
/// f.print_report().unwrap(); // Writes petersen.html
/// assert_eq!(f.optimal_value, Some(3.));
/// ```
#[derive(Debug)]
pub struct ColoringSolver<S = MilpSolver> {
    pub(crate) graph: Graph,
    pub(crate) palette: Palette,
    pub(crate) name: String,
    policy: SelfLoopPolicy,
    solver: S,
    /// The model, once built.
    pub model: Option<Model>,
    /// Status of the last solve.
    pub status: Status,
    /// Objective value of the optimal solution (number of colors used).
    pub optimal_value: Option<f64>,
    pub solution: Option<Solution>,
}

impl ColoringSolver<MilpSolver> {
    /// Problem named `name`, solved with [`MilpSolver`].
    pub fn new(graph: Graph, palette: Palette, name: &str) -> Self {
        Self::with_solver(graph, palette, name, MilpSolver::new())
    }
}

impl<S: Solver> ColoringSolver<S> {
    pub fn with_solver(graph: Graph, palette: Palette, name: &str, solver: S) -> Self {
        Self {
            graph,
            palette,
            name: name.to_string(),
            policy: SelfLoopPolicy::default(),
            solver,
            model: None,
            status: Status::NotSolved,
            optimal_value: None,
            solution: None,
        }
    }

    /// Set the treatment of self-loops.
    pub fn self_loops(mut self, policy: SelfLoopPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Build the model, solve it and decode the solution.
    ///
    /// # Errors
    /// A [`ColoringError::Structural`] error if the graph or the palette is
    /// invalid, [`ColoringError::SolveFailure`] if the solver does not reach
    /// optimality, and a decoding error if the solver values do not describe
    /// a proper coloring.
    pub fn init(&mut self) -> Result<&Solution> {
        self.status = Status::NotSolved;
        self.optimal_value = None;
        self.solution = None;
        let model = ColoringModelBuilder::new(self.palette.len())
            .self_loops(self.policy)
            .build(&self.graph)?;
        info!("Solving {}", self.name);
        let status = self.solver.solve(&model);
        self.status = status;
        info!("Solver status: {}", status);
        if status != Status::Optimal {
            self.model = Some(model);
            return Err(ColoringError::SolveFailure(status));
        }

        let solution = decode(&model, &self.palette, &self.solver)?;
        solution.check(&self.graph)?;
        let values = self.solver.values(&model);
        let violated = model.violations(&values);
        if !violated.is_empty() {
            warn!("Solver values violate {} constraints", violated.len());
        }
        let objective = model.objective_value(&values);
        if (objective - solution.color_count() as f64).abs() > 0.5 {
            warn!(
                "Objective value {} differs from the {} colors used",
                objective,
                solution.color_count()
            );
        }
        info!("Optimal value: {}", objective);
        self.optimal_value = Some(objective);
        self.model = Some(model);
        Ok(self.solution.insert(solution))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructuralError;
    use approx::assert_abs_diff_eq;

    fn run(graph: &Graph, k: usize) -> Result<Solution> {
        solve(graph, &Palette::new(k), SelfLoopPolicy::Reject, &mut MilpSolver::new())
    }

    #[test]
    fn single_edge() {
        let g = Graph::from_edges(&[(1, 2)]);
        let sol = run(&g, 2).unwrap();
        assert_eq!(sol.color_count(), 2);
        assert_ne!(sol.color(1), sol.color(2));
    }

    #[test]
    fn triangle() {
        let g = Graph::from_edges(&[(1, 2), (2, 3), (1, 3)]);
        let mut f = ColoringSolver::new(g, Palette::new(3), "triangle");
        let sol = f.init().unwrap().clone();
        assert_eq!(sol.color_count(), 3);
        assert_eq!(f.status, Status::Optimal);
        assert_abs_diff_eq!(f.optimal_value.unwrap(), 3., epsilon = 1e-6);
        assert!(f.model.is_some());
    }

    #[test]
    fn star_needs_two_colors() {
        let g = Graph::from_edges(&[(1, 2), (1, 3), (1, 4), (1, 5)]);
        let sol = run(&g, 2).unwrap();
        assert_eq!(sol.color_count(), 2);
        let leaves: Vec<_> = (2..=5).map(|v| sol.color(v)).collect();
        assert!(leaves.iter().all(|&c| c == leaves[0]));
        assert_ne!(sol.color(1), leaves[0]);
    }

    #[test]
    fn more_colors_than_needed() {
        let g = Graph::from_edges(&[(1, 2), (1, 3), (1, 4), (1, 5)]);
        let mut f = ColoringSolver::new(g, Palette::new(4), "star");
        assert_eq!(f.init().unwrap().color_count(), 2);
        assert_abs_diff_eq!(f.optimal_value.unwrap(), 2., epsilon = 1e-6);
    }

    #[test]
    fn self_loop_is_rejected() {
        let g = Graph::from_edges(&[(1, 2), (2, 3), (3, 3)]);
        let mut f = ColoringSolver::new(g, Palette::new(3), "loop");
        assert!(matches!(
            f.init(),
            Err(ColoringError::Structural(StructuralError::SelfLoop(3)))
        ));
        assert_eq!(f.status, Status::NotSolved);
        assert!(f.model.is_none());
    }

    #[test]
    fn modeled_self_loop_is_infeasible() {
        let g = Graph::from_edges(&[(1, 2), (2, 3), (3, 3)]);
        let mut f =
            ColoringSolver::new(g, Palette::new(3), "loop").self_loops(SelfLoopPolicy::Model);
        assert!(matches!(
            f.init(),
            Err(ColoringError::SolveFailure(Status::Infeasible))
        ));
        assert_eq!(f.status, Status::Infeasible);
        assert!(f.solution.is_none());
    }

    #[test]
    fn too_few_colors() {
        let g = Graph::from_edges(&[(1, 2), (2, 3), (1, 3)]);
        assert!(matches!(
            run(&g, 2),
            Err(ColoringError::SolveFailure(Status::Infeasible))
        ));
    }

    #[test]
    fn failures_are_not_decoded() {
        let g = Graph::from_edges(&[(1, 2)]);
        let model = crate::model::build(&g, 2).unwrap();
        // Values that would not decode, behind a non-optimal status.
        let values = Array1::zeros(model.num_variables());
        for status in [Status::Infeasible, Status::Unbounded, Status::NotSolved, Status::Undefined] {
            let mut solver = FixedSolver::new(status, values.clone());
            match solve(&g, &Palette::new(2), SelfLoopPolicy::Reject, &mut solver) {
                Err(ColoringError::SolveFailure(s)) => assert_eq!(s, status),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn canned_values_are_decoded_and_checked() {
        let g = Graph::from_edges(&[(1, 2), (2, 3)]);
        let model = crate::model::build(&g, 2).unwrap();
        let mut values = Array1::zeros(model.num_variables());
        for (v, c) in [(1, 0), (2, 1), (3, 0)] {
            values[model.assignment(v, c).unwrap().index()] = 1.;
        }
        values[model.usage(0).unwrap().index()] = 1.;
        values[model.usage(1).unwrap().index()] = 1.;
        let mut f = ColoringSolver::with_solver(
            g.clone(),
            Palette::new(2),
            "path",
            FixedSolver::new(Status::Optimal, values.clone()),
        );
        assert_eq!(f.init().unwrap().color(3), Some(0));
        assert_eq!(f.optimal_value, Some(2.));

        // An "optimal" answer that is not a proper coloring.
        values[model.assignment(3, 0).unwrap().index()] = 0.;
        values[model.assignment(3, 1).unwrap().index()] = 1.;
        let mut solver = FixedSolver::new(Status::Optimal, values);
        assert!(matches!(
            solve(&g, &Palette::new(2), SelfLoopPolicy::Reject, &mut solver),
            Err(ColoringError::Conflict { edge: (2, 3) })
        ));
    }
}
