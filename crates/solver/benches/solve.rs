use cdcl_solver::Solver;
use criterion::{
    black_box,
    criterion_group,
    criterion_main,
    BatchSize,
    Criterion,
};

criterion_group!(
    bench_solve,
    bench_pigeonhole_unsat,
    bench_random_3sat_sat,
);
criterion_main!(bench_solve);

/// `n+1` pigeons into `n` holes: unsatisfiable, and known to stress conflict
/// analysis and backjumping far more than a trivial 2-in-1 instance.
fn pigeonhole(holes: usize) -> String {
    let pigeons = holes + 1;
    let var = |p: usize, h: usize| -> i64 { (p * holes + h + 1) as i64 };
    let mut clauses = Vec::new();
    for p in 0..pigeons {
        let clause = (0..holes)
            .map(|h| var(p, h).to_string())
            .collect::<Vec<_>>()
            .join(" ");
        clauses.push(format!("{} 0", clause));
    }
    for h in 0..holes {
        for p0 in 0..pigeons {
            for p1 in (p0 + 1)..pigeons {
                clauses.push(format!("-{} -{} 0", var(p0, h), var(p1, h)));
            }
        }
    }
    let num_vars = pigeons * holes;
    format!(
        "p cnf {} {}\n{}\n",
        num_vars,
        clauses.len(),
        clauses.join("\n")
    )
}

/// A random-looking but satisfiable-by-construction 3-SAT instance: every
/// clause keeps at least one literal consistent with the all-true witness.
fn random_3sat_sat(num_vars: usize, num_clauses: usize) -> String {
    let mut clauses = Vec::with_capacity(num_clauses);
    let sign = |v: usize, salt: usize| -> i64 {
        if (v + salt) % 5 == 0 {
            -(v as i64)
        } else {
            v as i64
        }
    };
    for i in 0..num_clauses {
        let a = (i % num_vars) + 1;
        let b = ((i * 7 + 3) % num_vars) + 1;
        let c = ((i * 13 + 5) % num_vars) + 1;
        clauses.push(format!(
            "{} {} {} 0",
            sign(a, i),
            sign(b, i + 1),
            sign(c, i + 2)
        ));
    }
    format!(
        "p cnf {} {}\n{}\n",
        num_vars,
        clauses.len(),
        clauses.join("\n")
    )
}

fn bench_pigeonhole_unsat(c: &mut Criterion) {
    let dimacs = pigeonhole(6);
    let solver = Solver::from_cnf(&mut dimacs.as_bytes()).unwrap();
    c.bench_function("Solver::solve pigeonhole-6-in-7 (unsat)", |bencher| {
        bencher.iter_batched_ref(
            || solver.clone(),
            |solver| {
                let result = black_box(solver.solve());
                assert!(result.is_unsat());
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_random_3sat_sat(c: &mut Criterion) {
    let dimacs = random_3sat_sat(150, 600);
    let solver = Solver::from_cnf(&mut dimacs.as_bytes()).unwrap();
    c.bench_function("Solver::solve random-3sat-150-600 (sat)", |bencher| {
        bencher.iter_batched_ref(
            || solver.clone(),
            |solver| {
                let result = black_box(solver.solve());
                assert!(result.is_sat());
            },
            BatchSize::SmallInput,
        )
    });
}
