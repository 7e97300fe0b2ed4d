use ilp_coloring::*;

pub fn main() {
    init_default_log();

    // Outer cycle 1..5, inner pentagram 6..10.
    let edges = [
        (1, 2), (2, 3), (3, 4), (4, 5), (5, 1),
        (6, 8), (7, 9), (8, 10), (9, 6), (10, 7),
        (1, 6), (2, 7), (3, 8), (4, 9), (5, 10),
    ];
    let graph = Graph::from_edges(&edges);

    let mut f = ColoringSolver::new(graph, Palette::default_colors(4), "petersen");
    let _ = f.init().expect("4 colors are enough");
    f.print_report().expect("Failed to write report");
    f.write_svg().expect("Failed to draw the graph");
    println!("Optimal value: {}", f.optimal_value.expect("Failed to get optimal value")); // Must be 3

    // Five pairwise adjacent vertices cannot share 4 colors.
    let k5 = Graph::complete(5);
    match solve(&k5, &Palette::default_colors(4), SelfLoopPolicy::Reject, &mut MilpSolver::new()) {
        Err(ColoringError::SolveFailure(status)) => println!("K5 with 4 colors: {}", status), // Infeasible
        other => println!("K5 with 4 colors: unexpected {:?}", other),
    }
}
