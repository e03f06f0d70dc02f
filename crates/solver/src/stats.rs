use core::fmt;
use core::fmt::Display;

/// Counters tracked over the lifetime of a single [`Solver::solve`](crate::Solver::solve) call.
///
/// # Note
///
/// These are cumulative and are not reset by restarts; they describe the
/// whole search, not just the segment since the last restart.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    /// The number of branching decisions taken.
    pub decisions: u64,
    /// The number of literals assigned by unit propagation.
    pub propagations: u64,
    /// The number of conflicts encountered.
    pub conflicts: u64,
    /// The number of clauses learned via conflict analysis.
    pub learned_clauses: u64,
    /// The number of restarts performed.
    pub restarts: u64,
}

impl Statistics {
    pub(crate) fn decision(&mut self) {
        self.decisions += 1;
    }

    pub(crate) fn conflict(&mut self) {
        self.conflicts += 1;
    }

    pub(crate) fn learned_clause(&mut self) {
        self.learned_clauses += 1;
    }

    pub(crate) fn restart(&mut self) {
        self.restarts += 1;
    }
}

impl Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "decisions:       {}", self.decisions)?;
        writeln!(f, "propagations:    {}", self.propagations)?;
        writeln!(f, "conflicts:       {}", self.conflicts)?;
        writeln!(f, "learned clauses: {}", self.learned_clauses)?;
        write!(f, "restarts:        {}", self.restarts)?;
        Ok(())
    }
}
