//! HTML and SVG output of a [`ColoringSolver`].

use crate::draw::{draw, save_svg};
use crate::solver::{ColoringSolver, Solver};
use log::info;
use std::fmt::Write as _;
use std::fs;
use std::io;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl<S: Solver> ColoringSolver<S> {
    /// The report as an HTML page.
    pub fn report(&self) -> String {
        let name = escape(&self.name);
        let mut html = String::new();
        let _ = writeln!(
            html,
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{0}</title></head>\n<body>\n<h1>{0}</h1>",
            name
        );
        let _ = writeln!(
            html,
            "<p>{} vertices, {} edges, {} available colors.</p>",
            self.graph.size(),
            self.graph.edge_count(),
            self.palette.len()
        );
        if let Some(model) = &self.model {
            let _ = writeln!(
                html,
                "<p>Model: {} binary variables, {} constraints.</p>",
                model.num_variables(),
                model.num_constraints()
            );
        }
        let _ = writeln!(html, "<p>Status: {}</p>", self.status);
        if let Some(value) = self.optimal_value {
            let _ = writeln!(html, "<p>Optimal value: {}</p>", value);
        }
        if let Some(solution) = &self.solution {
            let _ = writeln!(html, "<table>\n<tr><th>Vertex</th><th>Color</th></tr>");
            for (v, c) in solution.iter() {
                let label = escape(&solution.palette().label(c).to_string());
                let _ = writeln!(html, "<tr><td>{}</td><td>{}</td></tr>", v, label);
            }
            let _ = writeln!(html, "</table>");
        }
        let _ = writeln!(html, "{}", draw(&self.graph, self.solution.as_ref()));
        html.push_str("</body>\n</html>\n");
        html
    }

    /// Write the report in `<name>.html`.
    pub fn print_report(&self) -> io::Result<()> {
        let path = format!("{}.html", self.name);
        info!("Writing report to {}", path);
        fs::write(path, self.report())
    }

    /// Draw the graph, colored if solved, in `<name>.svg`.
    pub fn write_svg(&self) -> io::Result<()> {
        let path = format!("{}.svg", self.name);
        info!("Writing drawing to {}", path);
        save_svg(path, &self.graph, self.solution.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{ColoringError, StructuralError};
    use crate::graph::Graph;
    use crate::palette::Palette;
    use crate::solver::ColoringSolver;

    #[test]
    fn report_lists_the_coloring() {
        let g = Graph::from_edges(&[(1, 2), (2, 3)]);
        let mut f = ColoringSolver::new(g, Palette::named(&["red", "blue", "green"]), "a<b");
        let before = f.report();
        assert!(before.contains("<h1>a&lt;b</h1>"));
        assert!(before.contains("Status: NotSolved"));
        assert!(!before.contains("<table>"));

        let _ = f.init().unwrap();
        let after = f.report();
        assert!(after.contains("Status: Optimal"));
        assert!(after.contains("Optimal value: "));
        assert_eq!(after.matches("<tr><td>").count(), 3);
        assert!(after.contains("<svg"));
    }

    #[test]
    fn report_after_a_structural_error() {
        let g = Graph::new([1, 2], &[(1, 2), (2, 9)]);
        let mut f = ColoringSolver::new(g, Palette::new(2), "unknown");
        assert!(matches!(
            f.init(),
            Err(ColoringError::Structural(StructuralError::UnknownVertex { vertex: 9, .. }))
        ));
        let html = f.report();
        assert!(html.contains("Status: NotSolved"));
        assert!(!html.contains("<table>"));
        assert_eq!(html.matches("<line").count(), 2);
    }
}
