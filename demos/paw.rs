use ilp_coloring::*;

pub fn main() {
    init_default_log();

    // The graph:
    // 1-2-3
    //   |/
    //   4
    let graph = Graph::from_edges(&[(1, 2), (2, 3), (3, 4), (2, 4)]);

    // Print the program before solving it.
    let model = build(&graph, 3).expect("valid graph");
    println!("{}", model);

    let mut f = ColoringSolver::new(graph, Palette::default_colors(3), "paw");
    let solution = f.init().expect("3 colors are enough").clone();
    f.print_report().expect("Failed to write report"); // Write some informations in paw.html

    println!("{}", solution.to_json());
    println!("Optimal value: {}", f.optimal_value.expect("Failed to get optimal value")); // Must be 3
}
