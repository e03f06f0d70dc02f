use solver::{
    SolveResult,
    Solver,
};
use std::{
    fs,
    path::PathBuf,
    process,
    time::Instant,
};
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "cdcl-sat", about = "A conflict-driven clause learning SAT solver.")]
struct Opt {
    /// Path to the input DIMACS CNF file.
    #[structopt(name = "input .cnf file", parse(from_os_str))]
    input: PathBuf,

    /// Print the satisfying model when the instance is satisfiable.
    #[structopt(short = "m", long = "model")]
    print_model: bool,

    /// Print search statistics after solving.
    #[structopt(short = "s", long = "stats")]
    print_stats: bool,
}

fn main() {
    let opt = Opt::from_args();
    let cnf_contents = match fs::read(&opt.input) {
        Ok(contents) => contents,
        Err(error) => {
            eprintln!("error: couldn't read {:?}: {}", opt.input, error);
            process::exit(1);
        }
    };
    let mut solver = match Solver::from_cnf(&mut &cnf_contents[..]) {
        Ok(solver) => solver,
        Err(error) => {
            eprintln!("error: couldn't parse {:?} as DIMACS CNF: {:?}", opt.input, error);
            process::exit(1);
        }
    };
    let start = Instant::now();
    let result = solver.solve();
    let elapsed = start.elapsed();
    match result {
        SolveResult::Sat(sat) => {
            println!("Satisfiable");
            if opt.print_model {
                println!("{}", sat.model());
            }
        }
        SolveResult::Unsat => {
            println!("Unsatisfiable");
        }
    }
    if opt.print_stats {
        println!("time:            {:.3}s", elapsed.as_secs_f64());
        println!("{}", solver.stats());
    }
}
