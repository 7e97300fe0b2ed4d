//! Undirected graphs given as a vertex set and an edge list.

use crate::error::{ParseGraphError, StructuralError};
use crate::model::SelfLoopPolicy;
use rand::Rng;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::str::FromStr;

/// Vertex identifier.
pub type Vertex = u32;

/// An undirected graph.
///
/// Edges are stored as `(min, max)` pairs, sorted and without duplicates.
/// Self-loops are kept as they are, so that [`Graph::check`] can report them.
/// Edges may refer to vertices outside of the vertex set; such graphs are
/// rejected by [`Graph::check`] as well.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    vertices: BTreeSet<Vertex>,
    edges: Vec<(Vertex, Vertex)>,
}

fn normalize((u, v): (Vertex, Vertex)) -> (Vertex, Vertex) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

impl Graph {
    /// Create a graph from a vertex set and a list of edges.
    ///
    /// ```
    /// use ilp_coloring::Graph;
    /// let g = Graph::new([1, 2, 3], &[(1, 2), (2, 1), (3, 2)]);
    /// assert_eq!(g.size(), 3);
    /// assert_eq!(g.edges(), &[(1, 2), (2, 3)]);
    /// ```
    pub fn new<I>(vertices: I, edges: &[(Vertex, Vertex)]) -> Self
    where
        I: IntoIterator<Item = Vertex>,
    {
        let mut edges: Vec<_> = edges.iter().copied().map(normalize).collect();
        edges.sort_unstable();
        edges.dedup();
        Self {
            vertices: vertices.into_iter().collect(),
            edges,
        }
    }

    /// Create a graph whose vertices are the endpoints of `edges`.
    pub fn from_edges(edges: &[(Vertex, Vertex)]) -> Self {
        let vertices = edges.iter().flat_map(|&(u, v)| [u, v]);
        Self::new(vertices, edges)
    }

    /// Add a vertex. Does nothing if it is already there.
    pub fn add_vertex(&mut self, v: Vertex) {
        let _ = self.vertices.insert(v);
    }

    /// Add an edge and its endpoints.
    pub fn add_edge(&mut self, u: Vertex, v: Vertex) {
        self.add_vertex(u);
        self.add_vertex(v);
        let e = normalize((u, v));
        if let Err(pos) = self.edges.binary_search(&e) {
            self.edges.insert(pos, e);
        }
    }

    /// Number of vertices.
    pub fn size(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges, self-loops included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Vertices in increasing order.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.vertices.iter().copied()
    }

    pub fn contains(&self, v: Vertex) -> bool {
        self.vertices.contains(&v)
    }

    /// Normalized edges in increasing order.
    pub fn edges(&self) -> &[(Vertex, Vertex)] {
        &self.edges
    }

    /// Returns `true` if `u` and `v` are adjacent.
    pub fn edge(&self, u: Vertex, v: Vertex) -> bool {
        self.edges.binary_search(&normalize((u, v))).is_ok()
    }

    /// Neighbors of `v`, excluding `v` itself.
    pub fn nbrs(&self, v: Vertex) -> Vec<Vertex> {
        self.edges
            .iter()
            .filter_map(|&(a, b)| match (a == v, b == v) {
                (true, false) => Some(b),
                (false, true) => Some(a),
                _ => None,
            })
            .collect()
    }

    pub fn degree(&self, v: Vertex) -> usize {
        self.nbrs(v).len()
    }

    pub fn max_degree(&self) -> usize {
        self.vertices().map(|v| self.degree(v)).max().unwrap_or(0)
    }

    /// Vertices carrying a self-loop.
    pub fn loops(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.edges.iter().filter(|(u, v)| u == v).map(|&(u, _)| u)
    }

    /// A number of colors that is always enough for a loop-free graph:
    /// `max_degree + 1`, capped by the number of vertices (and at least 1).
    pub fn color_bound(&self) -> usize {
        (self.max_degree() + 1).min(self.size()).max(1)
    }

    /// Check that the graph is a valid input for the model builder.
    ///
    /// # Errors
    /// Fails if the graph is empty, if an edge has an endpoint outside the
    /// vertex set, or if it has a self-loop and `policy` rejects them.
    pub fn check(&self, policy: SelfLoopPolicy) -> Result<(), StructuralError> {
        if self.vertices.is_empty() {
            return Err(StructuralError::NoVertices);
        }
        for &(u, v) in &self.edges {
            for w in [u, v] {
                if !self.contains(w) {
                    return Err(StructuralError::UnknownVertex {
                        edge: (u, v),
                        vertex: w,
                    });
                }
            }
            if u == v && policy == SelfLoopPolicy::Reject {
                return Err(StructuralError::SelfLoop(u));
            }
        }
        Ok(())
    }

    // ---------- Edge-list format

    /// Read a graph in edge-list format.
    ///
    /// Each line holds either an edge `u v` or a single vertex `v`.
    /// Everything after a `#` is a comment.
    pub fn read<R: BufRead>(reader: R) -> Result<Self, ParseGraphError> {
        let mut g = Self::default();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let content = line.split('#').next().unwrap_or("");
            let tokens: Vec<&str> = content.split_whitespace().collect();
            let parse = |token: &str| {
                token.parse::<Vertex>().map_err(|_| ParseGraphError::Vertex {
                    line: i + 1,
                    token: token.to_string(),
                })
            };
            match tokens[..] {
                [] => (),
                [v] => g.add_vertex(parse(v)?),
                [u, v] => g.add_edge(parse(u)?, parse(v)?),
                _ => {
                    return Err(ParseGraphError::Syntax {
                        line: i + 1,
                        found: content.trim().to_string(),
                    })
                }
            }
        }
        Ok(g)
    }

    /// Read a graph from a file in edge-list format.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseGraphError> {
        Self::read(BufReader::new(File::open(path)?))
    }

    /// Write the graph in edge-list format. Isolated vertices get their own line.
    pub fn write<W: Write>(&self, mut w: W) -> io::Result<()> {
        for v in self.vertices() {
            if self.edges.iter().all(|&(a, b)| a != v && b != v) {
                writeln!(w, "{}", v)?;
            }
        }
        for (u, v) in &self.edges {
            writeln!(w, "{} {}", u, v)?;
        }
        Ok(())
    }

    // ---------- Generators

    /// Path `0 - 1 - ... - (n-1)`.
    pub fn path(n: u32) -> Self {
        let edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
        Self::new(0..n, &edges)
    }

    /// Cycle on `n` vertices.
    pub fn cycle(n: u32) -> Self {
        let mut g = Self::path(n);
        if n > 2 {
            g.add_edge(n - 1, 0);
        }
        g
    }

    /// Complete graph on `n` vertices.
    pub fn complete(n: u32) -> Self {
        let edges: Vec<_> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();
        Self::new(0..n, &edges)
    }

    /// Star with center `0` and `leaves` leaves.
    pub fn star(leaves: u32) -> Self {
        let edges: Vec<_> = (1..=leaves).map(|i| (0, i)).collect();
        Self::new(0..=leaves, &edges)
    }

    /// The Petersen graph: outer 5-cycle `0..5`, inner pentagram `5..10`.
    pub fn petersen() -> Self {
        let mut edges = Vec::with_capacity(15);
        for i in 0..5 {
            edges.push((i, (i + 1) % 5));
            edges.push((i, i + 5));
            edges.push((i + 5, (i + 2) % 5 + 5));
        }
        Self::new(0..10, &edges)
    }

    /// Random graph `G(n, p)`: every edge is present independently with probability `p`.
    ///
    /// # Panics
    /// Panics if `p` is not in `[0, 1]`.
    pub fn gnp<R: Rng>(rng: &mut R, n: u32, p: f64) -> Self {
        assert!((0.0..=1.0).contains(&p), "p must be in [0, 1]");
        let mut g = Self::new(0..n, &[]);
        for i in 0..n {
            for j in i + 1..n {
                if rng.gen_bool(p) {
                    g.add_edge(i, j);
                }
            }
        }
        g
    }
}

impl FromStr for Graph {
    type Err = ParseGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::read(s.as_bytes())
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} vertices: ", self.size())?;
        for (u, v) in &self.edges {
            write!(f, "{}-{} ", u, v)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn edges_are_normalized() {
        let g = Graph::from_edges(&[(2, 1), (1, 2), (3, 3), (4, 1)]);
        assert_eq!(g.edges(), &[(1, 2), (1, 4), (3, 3)]);
        assert_eq!(g.size(), 4);
        assert!(g.edge(4, 1));
        assert!(!g.edge(2, 4));
        assert_eq!(g.loops().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn neighborhoods() {
        let g = Graph::star(4);
        assert_eq!(g.nbrs(0), vec![1, 2, 3, 4]);
        assert_eq!(g.nbrs(3), vec![0]);
        assert_eq!(g.max_degree(), 4);
        assert_eq!(g.color_bound(), 5);
        assert_eq!(Graph::path(4).color_bound(), 3);
        assert_eq!(Graph::new([7], &[]).color_bound(), 1);
    }

    #[test]
    fn generators() {
        assert_eq!(Graph::cycle(5).edge_count(), 5);
        assert_eq!(Graph::complete(5).edge_count(), 10);
        let p = Graph::petersen();
        assert_eq!(p.edge_count(), 15);
        assert!(p.vertices().all(|v| p.degree(v) == 3));
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(Graph::gnp(&mut rng, 6, 1.0), Graph::complete(6));
        assert_eq!(Graph::gnp(&mut rng, 6, 0.0).edge_count(), 0);
    }

    #[test]
    fn check() {
        assert_eq!(
            Graph::default().check(SelfLoopPolicy::Reject),
            Err(StructuralError::NoVertices)
        );
        let g = Graph::new([1, 2], &[(1, 3)]);
        assert_eq!(
            g.check(SelfLoopPolicy::Reject),
            Err(StructuralError::UnknownVertex {
                edge: (1, 3),
                vertex: 3
            })
        );
        let g = Graph::from_edges(&[(1, 2), (3, 3)]);
        assert_eq!(
            g.check(SelfLoopPolicy::Reject),
            Err(StructuralError::SelfLoop(3))
        );
        assert!(g.check(SelfLoopPolicy::Model).is_ok());
    }

    #[test]
    fn read_edge_list() {
        let g: Graph = "# a triangle\n1 2\n2 3 # closing\n\n3 1\n7\n".parse().unwrap();
        assert_eq!(g, Graph::new([1, 2, 3, 7], &[(1, 2), (2, 3), (1, 3)]));

        let mut out = Vec::new();
        g.write(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "7\n1 2\n1 3\n2 3\n");
    }

    #[test]
    fn read_errors() {
        match "1 2\n1 2 3\n".parse::<Graph>() {
            Err(ParseGraphError::Syntax { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {:?}", other),
        }
        match "1 -2\n".parse::<Graph>() {
            Err(ParseGraphError::Vertex { line, token }) => {
                assert_eq!(line, 1);
                assert_eq!(token, "-2");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
