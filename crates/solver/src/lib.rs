#![deny(unsafe_code)]
#![warn(unsafe_op_in_unsafe_fn)]
#![allow(clippy::len_without_is_empty)]

extern crate alloc;

mod assignment;
mod builder;
pub mod clause_db;
mod config;
mod decider;
mod literal;
mod literal_chunk;
mod restart;
mod sanitizer;
mod stats;

#[cfg(test)]
mod property_tests;
#[cfg(test)]
mod tests;

use crate::{
    assignment::{
        Assignment,
        AssignmentError,
        DecisionLevel,
        LastModel,
        Model,
        PropagationResult,
    },
    builder::SolverBuilder,
    clause_db::ClauseDb,
    decider::Decider,
    restart::RestartPolicy,
    sanitizer::{
        ClauseSanitizer,
        SanitizedLiterals,
    },
};
pub use crate::{
    literal::{
        Literal,
        Sign,
        Variable,
    },
    literal_chunk::{
        LiteralChunk,
        LiteralChunkIter,
    },
    stats::Statistics,
};
pub use bounded::Bool;
use alloc::vec::Vec;
use bounded::Index as _;
use cnf_parser::{
    Error as CnfError,
    Input,
};
use core::{
    fmt,
    fmt::Display,
};

/// Errors that can occur while interacting with the solver's public API.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// A free-form error raised by CNF parsing callbacks.
    Other(&'static str),
    /// An error forwarded from the variable assignment.
    Assignment(AssignmentError),
    /// An error forwarded from a bounded collection.
    Bounded(bounded::OutOfBoundsAccess),
    /// The requested literal chunk would be out of the supported variable range.
    InvalidLiteralChunk,
}

impl From<bounded::OutOfBoundsAccess> for Error {
    fn from(err: bounded::OutOfBoundsAccess) -> Self {
        Self::Bounded(err)
    }
}

impl From<AssignmentError> for Error {
    fn from(err: AssignmentError) -> Self {
        Self::Assignment(err)
    }
}

impl From<&'static str> for Error {
    fn from(message: &'static str) -> Self {
        Self::Other(message)
    }
}

/// The satisfiable or unsatisfiable solution to a SAT instance.
///
/// # Note
///
/// If the solution is satisfiable it also contains a satisfying assignment.
#[derive(Debug)]
pub enum SolveResult<'a> {
    /// The SAT instance is unsatisfiable.
    Unsat,
    /// The SAT instance is satisfiable with the given satisfying assignment.
    Sat(SatResult<'a>),
}

impl<'a> SolveResult<'a> {
    fn sat(model: &'a Model) -> Self {
        Self::Sat(SatResult { model })
    }

    /// Returns `true` if the SAT instance was determined to be satisfiable.
    pub fn is_sat(&self) -> bool {
        matches!(self, SolveResult::Sat(_))
    }

    /// Returns `true` if the SAT instance was determined to be unsatisfiable.
    pub fn is_unsat(&self) -> bool {
        !self.is_sat()
    }
}

/// The satisfiable solution of a solved SAT instance.
#[derive(Debug)]
pub struct SatResult<'a> {
    /// The underlying complete variable assignment.
    model: &'a Model,
}

impl<'a> Display for SatResult<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.model.fmt(f)
    }
}

impl<'a> SatResult<'a> {
    /// The satisfying assignment of the satisfiable solution.
    pub fn model(&self) -> &'a Model {
        self.model
    }
}

/// The solver instance.
#[derive(Debug, Default, Clone)]
pub struct Solver {
    /// The number of registered variables.
    len_variables: usize,
    /// The clause database that stores all original and learned clauses.
    clauses: ClauseDb,
    /// The partial assignment of variables, the trail and the watch lists.
    assignment: Assignment,
    /// The VSIDS decision heuristic.
    decider: Decider,
    /// The Luby restart schedule.
    restarts: RestartPolicy,
    /// The last full assignment found by the solver upon SAT.
    last_model: LastModel,
    /// Sanitizes clauses before being fed to the solver.
    sanitizer: ClauseSanitizer,
    /// Yields `true` if `consume_clause` encountered the empty clause.
    encountered_empty_clause: bool,
    /// Unit clauses that have been fed to `consume_clause`.
    ///
    /// They are immediately propagated at the start of `solve`.
    hard_facts: Vec<Literal>,
    /// Counters describing the most recent (or ongoing) search.
    stats: Statistics,
}

impl Solver {
    /// Returns the number of currently registered variables.
    fn len_variables(&self) -> usize {
        self.len_variables
    }

    /// Registers the given number of additional variables.
    fn register_variables(&mut self, additional: usize) {
        self.assignment.register_new_variables(additional);
        self.decider.register_new_variables(additional);
        self.len_variables += additional;
    }

    /// Consumes the `.cnf` input and feeds it to the returned solver.
    ///
    /// # Errors
    ///
    /// - If the input is no valid `.cnf` format.
    /// - If the input encodes an invalid CNF formula.
    pub fn from_cnf<I>(input: &mut I) -> Result<Self, CnfError<Error>>
    where
        I: Input,
    {
        let mut builder = SolverBuilder::default();
        cnf_parser::parse_cnf(input, &mut builder)?;
        Ok(builder.finalize())
    }

    /// Consumes the given clause.
    ///
    /// Clauses with two or more distinct, non-tautological literals are
    /// stored in the clause database and watched immediately. Unit clauses
    /// are buffered as hard facts and propagated at the start of `solve`.
    /// Tautological clauses are dropped. An empty clause marks the whole
    /// instance unsatisfiable.
    ///
    /// # Panics
    ///
    /// If any of the literals has not been registered.
    pub fn consume_clause<I>(&mut self, literals: I)
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator<Item = Literal>,
    {
        match self.sanitizer.sanitize(literals) {
            SanitizedLiterals::Literals(literals) => {
                let clause = self.clauses.add_original(literals);
                self.assignment.initialize_watchers(clause);
                for literal in clause {
                    self.decider.bump_priority_by(literal.variable(), 1);
                }
            }
            SanitizedLiterals::UnitClause(unit) => {
                self.hard_facts.push(unit);
            }
            SanitizedLiterals::TautologicalClause => (),
            SanitizedLiterals::EmptyClause => {
                self.encountered_empty_clause = true;
            }
        }
    }

    /// Returns the next variable.
    fn new_variable(&mut self) -> Variable {
        let next_id = self.len_variables();
        self.register_variables(1);
        Variable::from_index(next_id)
    }

    /// Registers a new literal for the solver and returns it.
    ///
    /// # Note
    ///
    /// The returned literal has positive polarity.
    ///
    /// # Panics
    ///
    /// If more variables have been registered than supported by the solver limits.
    pub fn new_literal(&mut self) -> Literal {
        Literal::new(self.new_variable(), Sign::POS)
    }

    /// Allocates the given amount of new literals for the solver and returns them.
    ///
    /// # Note
    ///
    /// - The returned literals have positive polarity.
    /// - The returned literal chunk acts as an efficient iterator over the new literals.
    ///
    /// # Panics
    ///
    /// If more variables have been registered than supported by the solver limits.
    pub fn new_literal_chunk(&mut self, amount: usize) -> LiteralChunk {
        let first_index = self.len_variables();
        let chunk = LiteralChunk::new(first_index, amount).unwrap_or_else(|_| {
            panic!(
                "created invalid literal chunk of length {} starting at {}",
                amount, first_index,
            )
        });
        self.register_variables(amount);
        chunk
    }

    /// Returns the statistics gathered during the most recent (or ongoing) search.
    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Starts solving the loaded SAT instance.
    pub fn solve(&mut self) -> SolveResult {
        if self.encountered_empty_clause {
            return SolveResult::Unsat
        }
        if self.len_variables() == 0 {
            return SolveResult::sat(self.last_model.get())
        }
        if self.propagate_hard_facts().is_conflict() {
            return SolveResult::Unsat
        }
        let result = match self.search() {
            PropagationResult::Conflict(_) => SolveResult::Unsat,
            PropagationResult::Consistent => {
                self.last_model
                    .update(self.assignment.variable_assignment())
                    .expect("encountered unexpected indeterminate variable assignment");
                debug_assert!(
                    self.clauses.iter_original().all(|clause| clause
                        .into_iter()
                        .any(|literal| self
                            .last_model
                            .get()
                            .is_satisfied(literal)
                            .unwrap_or(false))),
                    "model returned on SAT leaves an original clause unsatisfied"
                );
                SolveResult::sat(self.last_model.get())
            }
        };
        self.stats.propagations = self.assignment.propagations();
        result
    }

    /// Propagates the hard facts (unit clauses) of the SAT instance.
    ///
    /// These are asserted at the root decision level, before any decision is made.
    fn propagate_hard_facts(&mut self) -> PropagationResult {
        for &hard_fact in &self.hard_facts {
            match self.assignment.enqueue_assumption(hard_fact) {
                Ok(()) | Err(AssignmentError::AlreadyAssigned) => (),
                Err(AssignmentError::Conflict) => return PropagationResult::Conflict,
                Err(_) => {
                    unreachable!("enqueueing a root-level hard fact cannot yield this error")
                }
            }
        }
        self.assignment.propagate(&mut self.clauses)
    }

    /// The main CDCL search loop.
    ///
    /// Alternates unit propagation with either conflict analysis and
    /// non-chronological backjumping (on conflict) or a new VSIDS-guided
    /// decision (once the propagation queue is exhausted without conflict),
    /// until the formula is fully assigned or a conflict survives at the
    /// root decision level.
    fn search(&mut self) -> PropagationResult {
        loop {
            let propagation_result = self.assignment.propagate(&mut self.clauses);
            if let PropagationResult::Conflict(conflicting_clause) = propagation_result {
                if self.assignment.current_decision_level() == DecisionLevel::ROOT {
                    return PropagationResult::Conflict
                }
                self.stats.conflict();
                self.decider.conflict_occurred();
                let (learned_literals, backjump_level) =
                    self.assignment.analyse_conflict(conflicting_clause, &self.clauses);
                for &variable in self.assignment.touched_variables() {
                    self.decider.informer().bump_activity(variable);
                }
                self.assignment
                    .pop_decision_level(backjump_level, self.decider.informer());
                self.assert_learned_clause(&learned_literals);
                self.stats.learned_clause();
                if self.restarts.conflict_occurred() {
                    self.stats.restart();
                    self.assignment
                        .pop_decision_level(DecisionLevel::ROOT, self.decider.informer());
                }
                continue
            }
            match self
                .decider
                .next_unassigned(self.assignment.variable_assignment())
            {
                None => return PropagationResult::Consistent,
                Some(variable) => {
                    self.stats.decision();
                    self.assignment.bump_decision_level();
                    let decision = Literal::new(variable, self.decider.phase_of(variable));
                    self.assignment
                        .enqueue_assumption(decision)
                        .expect("decision heuristic proposed an already assigned variable");
                }
            }
        }
    }

    /// Stores the learned clause (if non-unit) and asserts its first-UIP
    /// literal at the current (already backjumped-to) decision level.
    fn assert_learned_clause(&mut self, literals: &[Literal]) {
        let asserting = literals[0];
        if literals.len() == 1 {
            self.assignment
                .enqueue_assumption(asserting)
                .expect("asserting literal of a unit learned clause is already assigned");
            return
        }
        let clause_id = self.clauses.add_learned(literals);
        let clause = self
            .clauses
            .resolve(clause_id)
            .expect("failed to resolve just learned clause");
        self.assignment.initialize_watchers(clause);
        self.assignment
            .enqueue(asserting, Some(clause_id))
            .expect("asserting literal of a learned clause is already assigned");
    }
}
