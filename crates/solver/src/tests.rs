use crate::Solver;

/// Parses the given DIMACS CNF source and returns the resulting solver.
fn solver_from(dimacs: &str) -> Solver {
    let bytes = dimacs.as_bytes();
    Solver::from_cnf(&mut &bytes[..]).expect("failed to parse DIMACS input")
}

#[test]
fn empty_formula_is_sat() {
    let mut solver = solver_from("p cnf 0 0\n");
    assert!(solver.solve().is_sat());
}

#[test]
fn formula_with_variables_but_no_clauses_is_sat() {
    let mut solver = solver_from("p cnf 5 0\n");
    assert!(solver.solve().is_sat());
}

#[test]
fn single_unit_clause_is_sat() {
    let mut solver = solver_from("p cnf 1 1\n1 0\n");
    let result = solver.solve();
    assert!(result.is_sat());
}

#[test]
fn contradictory_units_are_unsat() {
    let mut solver = solver_from("p cnf 1 2\n1 0\n-1 0\n");
    assert!(solver.solve().is_unsat());
}

#[test]
fn two_literal_clause_is_sat() {
    let mut solver = solver_from("p cnf 2 1\n1 2 0\n");
    let result = solver.solve();
    assert!(result.is_sat());
}

#[test]
fn three_clause_instance_is_sat() {
    let mut solver = solver_from("p cnf 3 3\n1 2 0\n-1 3 0\n-2 -3 0\n");
    assert!(solver.solve().is_sat());
}

#[test]
fn pigeonhole_two_in_one_is_unsat() {
    // Two pigeons (1, 2), one hole: both must be assigned True (forced by
    // the unit clauses), but the third clause forbids both being true.
    let mut solver = solver_from("p cnf 2 3\n1 0\n2 0\n-1 -2 0\n");
    assert!(solver.solve().is_unsat());
}

#[test]
fn all_eight_clauses_over_three_variables_is_unsat() {
    // Every sign combination over 3 variables is present, so no assignment
    // can satisfy all eight clauses simultaneously.
    let dimacs = "p cnf 3 8\n\
         1 2 3 0\n\
         1 2 -3 0\n\
         1 -2 3 0\n\
         1 -2 -3 0\n\
         -1 2 3 0\n\
         -1 2 -3 0\n\
         -1 -2 3 0\n\
         -1 -2 -3 0\n";
    let mut solver = solver_from(dimacs);
    assert!(solver.solve().is_unsat());
}

#[test]
fn empty_clause_is_unsat_without_entering_search() {
    let mut solver = solver_from("p cnf 1 1\n0\n");
    assert!(solver.solve().is_unsat());
    // No decisions should have been made; the empty clause short-circuits solve().
    assert_eq!(solver.stats().decisions, 0);
}

#[test]
fn satisfying_model_covers_every_original_clause() {
    let mut solver = solver_from("p cnf 4 4\n1 2 0\n-1 3 0\n-2 -3 4 0\n-4 1 0\n");
    match solver.solve() {
        crate::SolveResult::Sat(result) => {
            let model = result.model();
            for clause in [[1, 2], [-1, 3], [1, -4]].iter() {
                assert!(clause.iter().any(|&lit| model
                    .is_satisfied(crate::Literal::from(lit))
                    .unwrap()));
            }
        }
        crate::SolveResult::Unsat => panic!("expected formula to be satisfiable"),
    }
}

#[test]
fn solving_is_idempotent() {
    let mut solver = solver_from("p cnf 3 3\n1 2 0\n-1 3 0\n-2 -3 0\n");
    let first = solver.solve().is_sat();
    let second = solver.solve().is_sat();
    assert_eq!(first, second);
}

#[test]
fn conflict_analysis_learns_across_decisions() {
    // (1∨2)∧(1∨¬2) resolves to the unit "1"; (¬1∨3)∧(¬1∨¬3) resolves to the
    // unit "¬1". Whichever branch the search decides first, the other pair
    // of clauses forces the opposite polarity of variable 1, so conflict
    // analysis must learn a clause and the instance is UNSAT overall.
    let mut solver = solver_from(
        "p cnf 4 5\n\
         1 2 0\n\
         1 -2 0\n\
         -1 3 0\n\
         -1 -3 0\n\
         -1 4 0\n",
    );
    let result = solver.solve();
    assert!(result.is_unsat());
    assert!(solver.stats().conflicts >= 1);
    assert!(solver.stats().learned_clauses >= 1);
}

#[test]
fn random_3sat_satisfiable_by_construction() {
    // Built from a planted witness (all variables True) plus clauses each
    // containing at least one positive literal, so the all-true assignment
    // is guaranteed to satisfy every clause.
    let dimacs = "p cnf 6 6\n\
         1 2 3 0\n\
         -1 4 5 0\n\
         -2 -4 6 0\n\
         3 -5 6 0\n\
         1 -3 5 0\n\
         -6 2 4 0\n";
    let mut solver = solver_from(dimacs);
    let result = solver.solve();
    assert!(result.is_sat());
    if let crate::SolveResult::Sat(sat) = result {
        let model = sat.model();
        let clauses = [
            [1, 2, 3],
            [-1, 4, 5],
            [-2, -4, 6],
            [3, -5, 6],
            [1, -3, 5],
            [-6, 2, 4],
        ];
        for clause in clauses {
            assert!(clause.iter().any(|&lit| model
                .is_satisfied(crate::Literal::from(lit))
                .unwrap()));
        }
    }
}
