//! Turning solver output back into a coloring.

use crate::error::{ColoringError, Result, StructuralError};
use crate::graph::{Graph, Vertex};
use crate::model::Model;
use crate::palette::{ColorLabel, Palette};
use crate::solver::Solver;
use log::{debug, info};
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A binary variable whose value is at least this is considered set.
pub const ACTIVE_THRESHOLD: f64 = 0.5;

/// A color slot for each vertex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    palette: Palette,
    colors: BTreeMap<Vertex, usize>,
}

/// Read the coloring off the assignment variables of a solved model.
///
/// `palette` must be the palette the model was built with; it is only used
/// to name the colors.
///
/// # Errors
/// [`StructuralError::PaletteSize`] if `palette` and the model do not have
/// the same number of slots.
/// [`ColoringError::AssignmentInconsistency`] if some vertex has no active
/// slot or several of them. No slot is ever picked arbitrarily.
pub fn decode<S: Solver + ?Sized>(model: &Model, palette: &Palette, solver: &S) -> Result<Solution> {
    if palette.len() != model.colors() {
        return Err(StructuralError::PaletteSize {
            expected: model.colors(),
            found: palette.len(),
        }
        .into());
    }
    let mut colors = BTreeMap::new();
    for &vertex in model.vertices() {
        let active: Vec<usize> = (0..model.colors())
            .filter(|&c| {
                model
                    .assignment(vertex, c)
                    .map_or(false, |x| solver.value(x) >= ACTIVE_THRESHOLD)
            })
            .collect();
        if active.len() != 1 {
            return Err(ColoringError::AssignmentInconsistency { vertex, active });
        }
        let _ = colors.insert(vertex, active[0]);
    }
    let solution = Solution {
        palette: palette.clone(),
        colors,
    };
    debug!("Decoded {} vertices", solution.len());
    Ok(solution)
}

impl Solution {
    /// Build a solution directly from a mapping.
    pub fn new(palette: Palette, colors: BTreeMap<Vertex, usize>) -> Self {
        Self { palette, colors }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Number of colored vertices.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Slot of `v`.
    pub fn color(&self, v: Vertex) -> Option<usize> {
        self.colors.get(&v).copied()
    }

    /// Name of the color of `v`, or its slot if the palette is anonymous.
    pub fn label(&self, v: Vertex) -> Option<ColorLabel> {
        self.color(v).map(|c| self.palette.label(c))
    }

    /// `(vertex, slot)` pairs in increasing vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (Vertex, usize)> + '_ {
        self.colors.iter().map(|(&v, &c)| (v, c))
    }

    /// Slots used by at least one vertex.
    pub fn used_slots(&self) -> BTreeSet<usize> {
        self.colors.values().copied().collect()
    }

    /// Number of distinct colors.
    pub fn color_count(&self) -> usize {
        self.used_slots().len()
    }

    /// Edges of `graph` whose ends share a color. Self-loops always conflict.
    pub fn conflicts(&self, graph: &Graph) -> Vec<(Vertex, Vertex)> {
        graph
            .edges()
            .iter()
            .copied()
            .filter(|&(u, v)| match (self.color(u), self.color(v)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            })
            .collect()
    }

    /// Check that this is a proper coloring of `graph`.
    ///
    /// # Errors
    /// [`ColoringError::AssignmentInconsistency`] for an uncolored vertex,
    /// [`ColoringError::Conflict`] for a monochromatic edge.
    pub fn check(&self, graph: &Graph) -> Result<()> {
        if let Some(vertex) = graph.vertices().find(|&v| self.color(v).is_none()) {
            return Err(ColoringError::AssignmentInconsistency {
                vertex,
                active: Vec::new(),
            });
        }
        match self.conflicts(graph).first() {
            Some(&edge) => Err(ColoringError::Conflict { edge }),
            None => Ok(()),
        }
    }

    /// The coloring as a JSON object `{ "vertex": label }`.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .colors
            .iter()
            .map(|(v, &c)| {
                let label = match self.palette.label(c) {
                    ColorLabel::Named(name) => Value::from(name),
                    ColorLabel::Slot(i) => Value::from(i),
                };
                (v.to_string(), label)
            })
            .collect();
        Value::Object(map)
    }

    /// Save in binary form.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Saving solution to {}", path.display());
        let file = BufWriter::new(File::create(path)?);
        bincode::serialize_into(file, self)?;
        Ok(())
    }

    /// Load a solution written by [`Solution::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading solution from {}", path.display());
        let file = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build;
    use crate::solver::{FixedSolver, Status};
    use ndarray::Array1;
    use serde_json::json;

    fn triangle() -> Graph {
        Graph::from_edges(&[(1, 2), (2, 3), (1, 3)])
    }

    // A stub solver reporting `x[v][c] = value` for each entry of `set`.
    fn stub(model: &Model, set: &[(Vertex, usize, f64)]) -> FixedSolver {
        let mut values = Array1::zeros(model.num_variables());
        for &(v, c, value) in set {
            values[model.assignment(v, c).unwrap().index()] = value;
        }
        FixedSolver::new(Status::Optimal, values)
    }

    #[test]
    fn one_active_slot_per_vertex() {
        let g = triangle();
        let model = build(&g, 3).unwrap();
        let solver = stub(&model, &[(1, 2, 1.), (2, 0, 1.), (3, 1, 1.)]);
        let palette = Palette::named(&["red", "blue", "yellow"]);
        let sol = decode(&model, &palette, &solver).unwrap();
        assert_eq!(sol.color(1), Some(2));
        assert_eq!(sol.label(2), Some(ColorLabel::Named("red".into())));
        assert_eq!(sol.color_count(), 3);
        assert!(sol.check(&g).is_ok());
        assert_eq!(sol.to_json(), json!({"1": "yellow", "2": "red", "3": "blue"}));
    }

    #[test]
    fn numeric_noise_is_tolerated() {
        let model = build(&Graph::from_edges(&[(1, 2)]), 2).unwrap();
        let solver = stub(
            &model,
            &[(1, 0, 0.999_999_8), (1, 1, 1e-9), (2, 1, 1.000_000_2)],
        );
        let sol = decode(&model, &Palette::new(2), &solver).unwrap();
        assert_eq!(sol.iter().collect::<Vec<_>>(), vec![(1, 0), (2, 1)]);
        assert_eq!(sol.to_json(), json!({"1": 0, "2": 1}));
    }

    #[test]
    fn vertex_without_color_is_inconsistent() {
        let model = build(&triangle(), 3).unwrap();
        let solver = stub(&model, &[(1, 0, 1.), (3, 1, 1.), (2, 2, 0.4)]);
        match decode(&model, &Palette::new(3), &solver) {
            Err(ColoringError::AssignmentInconsistency { vertex, active }) => {
                assert_eq!(vertex, 2);
                assert!(active.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn vertex_with_two_colors_is_inconsistent() {
        let model = build(&triangle(), 3).unwrap();
        let solver = stub(&model, &[(1, 0, 1.), (1, 2, 0.5), (2, 1, 1.), (3, 2, 1.)]);
        match decode(&model, &Palette::new(3), &solver) {
            Err(ColoringError::AssignmentInconsistency { vertex, active }) => {
                assert_eq!(vertex, 1);
                assert_eq!(active, vec![0, 2]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn palette_must_match_the_model() {
        let model = build(&Graph::from_edges(&[(1, 2)]), 2).unwrap();
        let solver = stub(&model, &[(1, 0, 1.), (2, 1, 1.)]);
        assert!(matches!(
            decode(&model, &Palette::default_colors(3), &solver),
            Err(ColoringError::Structural(StructuralError::PaletteSize {
                expected: 2,
                found: 3
            }))
        ));
    }

    #[test]
    fn check_reports_conflicts() {
        let g = triangle();
        let colors = [(1, 0), (2, 1), (3, 1)].into_iter().collect();
        let sol = Solution::new(Palette::new(2), colors);
        assert_eq!(sol.conflicts(&g), vec![(2, 3)]);
        assert!(matches!(
            sol.check(&g),
            Err(ColoringError::Conflict { edge: (2, 3) })
        ));

        let mut bigger = g.clone();
        bigger.add_edge(3, 4);
        assert!(matches!(
            sol.check(&bigger),
            Err(ColoringError::AssignmentInconsistency { vertex: 4, .. })
        ));
    }

    #[test]
    fn save_and_load() {
        let colors = [(1, 0), (2, 1), (5, 0)].into_iter().collect();
        let sol = Solution::new(Palette::default_colors(2), colors);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sol.bin");
        sol.save(&path).unwrap();
        assert_eq!(Solution::load(&path).unwrap(), sol);
        assert!(Solution::load(dir.path().join("missing")).is_err());
    }
}
