//! SVG drawings of colored graphs.

use crate::decode::Solution;
use crate::graph::{Graph, Vertex};
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;
use std::io;
use std::path::Path;
use svg::node::element::{Circle, Group, Line, Text};
use svg::Document;

const SIZE: f64 = 400.;
const MARGIN: f64 = 40.;
const NODE_RADIUS: f64 = 14.;

/// Positions of the vertices evenly spaced on a circle, first vertex on top.
///
/// Edge endpoints missing from the vertex set are placed as well, so that
/// graphs rejected by [`Graph::check`] can still be drawn.
pub fn circular_layout(graph: &Graph) -> BTreeMap<Vertex, (f64, f64)> {
    let vertices: BTreeSet<Vertex> = graph
        .vertices()
        .chain(graph.edges().iter().flat_map(|&(u, v)| [u, v]))
        .collect();
    let n = vertices.len();
    let center = SIZE / 2.;
    let radius = if n > 1 { center - MARGIN } else { 0. };
    vertices
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            let angle = 2. * PI * (i as f64) / (n as f64) - PI / 2.;
            (v, (center + radius * angle.cos(), center + radius * angle.sin()))
        })
        .collect()
}

/// Draw `graph` on a circular layout, vertices filled with their color in `solution`.
pub fn draw(graph: &Graph, solution: Option<&Solution>) -> Document {
    let pos = circular_layout(graph);

    let mut edges = Group::new()
        .set("stroke", "black")
        .set("stroke-width", 1.5)
        .set("fill", "none");
    for &(u, v) in graph.edges() {
        let (x1, y1) = pos[&u];
        if u == v {
            // Loop: a small circle pushed outwards from the center (upwards for a lone vertex).
            let (dx, dy) = (x1 - SIZE / 2., y1 - SIZE / 2.);
            let norm = dx.hypot(dy);
            let (ux, uy) = if norm > 0. { (dx / norm, dy / norm) } else { (0., -1.) };
            edges = edges.add(
                Circle::new()
                    .set("cx", x1 + ux * NODE_RADIUS)
                    .set("cy", y1 + uy * NODE_RADIUS)
                    .set("r", NODE_RADIUS),
            );
        } else {
            let (x2, y2) = pos[&v];
            edges = edges.add(
                Line::new()
                    .set("x1", x1)
                    .set("y1", y1)
                    .set("x2", x2)
                    .set("y2", y2),
            );
        }
    }

    let mut nodes = Group::new()
        .set("stroke", "black")
        .set("font-family", "sans-serif")
        .set("font-size", 12)
        .set("text-anchor", "middle");
    for (&v, &(x, y)) in &pos {
        let fill = match solution.and_then(|s| s.color(v).map(|c| s.palette().fill(c))) {
            Some(color) => color,
            None => "white".to_string(),
        };
        nodes = nodes
            .add(
                Circle::new()
                    .set("cx", x)
                    .set("cy", y)
                    .set("r", NODE_RADIUS)
                    .set("fill", fill),
            )
            .add(
                Text::new()
                    .set("x", x)
                    .set("y", y + 4.)
                    .set("stroke", "none")
                    .add(svg::node::Text::new(v.to_string())),
            );
    }

    Document::new()
        .set("viewBox", (0., 0., SIZE, SIZE))
        .set("width", SIZE)
        .set("height", SIZE)
        .add(edges)
        .add(nodes)
}

/// Write the drawing of [`draw`] to `path`.
pub fn save_svg<P: AsRef<Path>>(path: P, graph: &Graph, solution: Option<&Solution>) -> io::Result<()> {
    svg::save(path, &draw(graph, solution))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;
    use approx::assert_abs_diff_eq;

    #[test]
    fn layout_is_circular() {
        let pos = circular_layout(&Graph::cycle(4));
        assert_abs_diff_eq!(pos[&0].0, 200., epsilon = 1e-9);
        assert_abs_diff_eq!(pos[&0].1, 40., epsilon = 1e-9);
        assert_abs_diff_eq!(pos[&2].1, 360., epsilon = 1e-9);
        assert_abs_diff_eq!(pos[&1].0, 360., epsilon = 1e-9);
        let single = circular_layout(&Graph::new([5], &[]));
        assert_eq!(single[&5], (200., 200.));
    }

    #[test]
    fn colored_drawing() {
        let g = Graph::from_edges(&[(1, 2), (2, 3)]);
        let colors = [(1, 0), (2, 1), (3, 0)].into_iter().collect();
        let sol = Solution::new(Palette::named(&["red", "blue"]), colors);
        let text = draw(&g, Some(&sol)).to_string();
        assert_eq!(text.matches("<line").count(), 2);
        assert_eq!(text.matches("fill=\"red\"").count(), 2);
        assert_eq!(text.matches("fill=\"blue\"").count(), 1);

        let plain = draw(&g, None).to_string();
        assert_eq!(plain.matches("fill=\"white\"").count(), 3);
    }

    #[test]
    fn unknown_endpoints_are_drawn() {
        let g = Graph::new([1, 2], &[(1, 2), (2, 9)]);
        let pos = circular_layout(&g);
        assert_eq!(pos.keys().copied().collect::<Vec<_>>(), vec![1, 2, 9]);
        let text = draw(&g, None).to_string();
        assert_eq!(text.matches("<line").count(), 2);
        assert_eq!(text.matches("fill=\"white\"").count(), 3);
    }

    #[test]
    fn save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.svg");
        save_svg(&path, &Graph::from_edges(&[(0, 0), (0, 1)]), None).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<svg"));
        assert_eq!(text.matches("<circle").count(), 3);
    }
}
