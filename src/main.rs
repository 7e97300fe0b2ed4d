use ilp_coloring::{
    init_debug_log, init_default_log, ColoringSolver, Graph, Palette, SelfLoopPolicy,
};
use log::error;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;

#[derive(Debug, Default)]
struct Args {
    input: Option<String>,
    colors: Option<usize>,
    names: Option<Vec<String>>,
    self_loops: SelfLoopPolicy,
    svg: Option<PathBuf>,
    lp: Option<PathBuf>,
    save: Option<PathBuf>,
    debug: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let argv: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < argv.len() {
        let value = || argv.get(i + 1).cloned().unwrap_or_else(|| usage_and_exit(2));
        match argv[i].as_str() {
            "--colors" | "-k" => {
                args.colors = Some(value().parse().unwrap_or_else(|_| usage_and_exit(2)));
                i += 2;
            }
            "--names" => {
                args.names = Some(value().split(',').map(str::to_string).collect());
                i += 2;
            }
            "--svg" => {
                args.svg = Some(value().into());
                i += 2;
            }
            "--lp" => {
                args.lp = Some(value().into());
                i += 2;
            }
            "--save" => {
                args.save = Some(value().into());
                i += 2;
            }
            "--allow-self-loops" => {
                args.self_loops = SelfLoopPolicy::Model;
                i += 1;
            }
            "--debug" => {
                args.debug = true;
                i += 1;
            }
            "--help" | "-h" => usage_and_exit(0),
            s if args.input.is_none() && (s == "-" || !s.starts_with('-')) => {
                args.input = Some(s.to_string());
                i += 1;
            }
            _ => usage_and_exit(2),
        }
    }
    args
}

fn usage_and_exit(code: i32) -> ! {
    eprintln!(
        "Usage:\n  ilp-coloring [OPTIONS] FILE|-\n\n\
         Reads a graph in edge-list format (`u v` per line, `v` alone for an isolated vertex,\n\
         `#` for comments) and prints a minimum coloring as JSON.\n\n\
         Options:\n  \
         --colors/-k K          Number of available colors (default: max degree + 1)\n  \
         --names a,b,...        Color names (default: red,blue,yellow,...)\n  \
         --allow-self-loops     Model self-loops instead of rejecting them (always infeasible)\n  \
         --svg FILE             Draw the colored graph\n  \
         --lp FILE              Write the model in LP format\n  \
         --save FILE            Save the solution in binary form\n  \
         --debug                Verbose logging\n"
    );
    process::exit(code)
}

fn main() {
    let args = parse_args();
    if args.debug {
        init_debug_log()
    } else {
        init_default_log()
    }
    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), ilp_coloring::ColoringError> {
    let graph = match args.input.as_deref() {
        None => usage_and_exit(2),
        Some("-") => Graph::read(BufReader::new(io::stdin()))?,
        Some(path) => Graph::read_file(path)?,
    };
    let palette = match (&args.names, args.colors) {
        (Some(names), None) => Palette::named(names),
        (Some(names), Some(k)) => Palette::named(names).with_len(k),
        (None, k) => Palette::default_colors(k.unwrap_or_else(|| graph.color_bound())),
    };
    let mut f = ColoringSolver::new(graph, palette, "coloring").self_loops(args.self_loops);
    let result = f.init().map(|_| ());
    if let (Some(path), Some(model)) = (&args.lp, &f.model) {
        model.write_lp(path)?;
    }
    if let Some(path) = &args.svg {
        ilp_coloring::draw::save_svg(path, f.graph(), f.solution.as_ref())?;
    }
    result?;
    if let Some(solution) = &f.solution {
        if let Some(path) = &args.save {
            solution.save(path)?;
        }
        println!("{}", solution.to_json());
    }
    Ok(())
}
