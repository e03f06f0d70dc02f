//! Property-based cross-validation of the solver against a brute-force
//! reference, over small randomly generated CNF formulas.

use crate::{
    Literal,
    SolveResult,
    Solver,
};
use proptest::prelude::*;

fn literal_strategy(num_vars: i32) -> impl Strategy<Value = i32> {
    (1..=num_vars).prop_flat_map(|v| prop_oneof![Just(v), Just(-v)])
}

fn clause_strategy(num_vars: i32) -> impl Strategy<Value = Vec<i32>> {
    proptest::collection::vec(literal_strategy(num_vars), 1..=3)
}

fn formula_strategy() -> impl Strategy<Value = (usize, Vec<Vec<i32>>)> {
    (1..=6i32).prop_flat_map(|num_vars| {
        proptest::collection::vec(clause_strategy(num_vars), 0..=10)
            .prop_map(move |clauses| (num_vars as usize, clauses))
    })
}

fn to_dimacs(num_vars: usize, clauses: &[Vec<i32>]) -> String {
    let mut out = format!("p cnf {} {}\n", num_vars, clauses.len());
    for clause in clauses {
        for literal in clause {
            out.push_str(&literal.to_string());
            out.push(' ');
        }
        out.push_str("0\n");
    }
    out
}

/// Exhaustively decides satisfiability by trying every assignment.
///
/// Only ever called with `num_vars <= 6`, so `2^num_vars` is small.
fn brute_force_is_sat(num_vars: usize, clauses: &[Vec<i32>]) -> bool {
    (0..(1u32 << num_vars)).any(|assignment| {
        clauses.iter().all(|clause| {
            clause.iter().any(|&literal| {
                let var = literal.unsigned_abs() as usize - 1;
                let value = (assignment >> var) & 1 == 1;
                if literal > 0 {
                    value
                } else {
                    !value
                }
            })
        })
    })
}

proptest! {
    /// Cross-validates the CDCL solver's verdict, and any model it produces,
    /// against exhaustive search on small instances.
    #[test]
    fn solver_agrees_with_brute_force((num_vars, clauses) in formula_strategy()) {
        let dimacs = to_dimacs(num_vars, &clauses);
        let mut solver = Solver::from_cnf(&mut dimacs.as_bytes()).expect("generated DIMACS is well-formed");
        let expected_sat = brute_force_is_sat(num_vars, &clauses);
        let result = solver.solve();
        prop_assert_eq!(result.is_sat(), expected_sat);
        if let SolveResult::Sat(sat) = result {
            let model = sat.model();
            for clause in &clauses {
                let satisfied = clause
                    .iter()
                    .any(|&literal| model.is_satisfied(Literal::from(literal)).unwrap_or(false));
                prop_assert!(satisfied, "model fails to satisfy clause {:?}", clause);
            }
        }
    }

    /// Solving the same instance twice must yield the same verdict.
    #[test]
    fn solving_is_idempotent_under_random_formulas((num_vars, clauses) in formula_strategy()) {
        let dimacs = to_dimacs(num_vars, &clauses);
        let mut solver = Solver::from_cnf(&mut dimacs.as_bytes()).expect("generated DIMACS is well-formed");
        let first = solver.solve().is_sat();
        let second = solver.solve().is_sat();
        prop_assert_eq!(first, second);
    }
}
