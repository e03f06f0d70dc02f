use super::{
    AssignmentError,
    DecisionLevelsAndReasons,
    VariableAssignment,
};
use crate::{
    clause_db::ClauseId,
    decider::InformDecider,
    Literal,
    Variable,
};
use alloc::{
    vec,
    vec::Vec,
};
use bounded::{
    BoundedStack,
    Index,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TrailLimit(u32);

impl Index for TrailLimit {
    fn from_index(index: usize) -> Self {
        assert!(index <= Variable::MAX_LEN);
        Self(index as u32)
    }

    fn into_index(self) -> usize {
        self.0 as usize
    }
}

/// A concrete decision level in the trail.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct DecisionLevel(u32);

impl Index for DecisionLevel {
    fn from_index(index: usize) -> Self {
        assert!(index <= Variable::MAX_LEN);
        Self(index as u32)
    }

    fn into_index(self) -> usize {
        self.0 as usize
    }
}

impl DecisionLevel {
    /// The root decision level, before any decision has been made.
    pub const ROOT: Self = Self(0);
}

#[derive(Debug, Clone)]
pub struct TrailLimits {
    limits: Vec<TrailLimit>,
}

impl Default for TrailLimits {
    fn default() -> Self {
        Self {
            limits: vec![TrailLimit(0)],
        }
    }
}

impl TrailLimits {
    /// Pushes a new limit to the trail limits.
    pub fn push(&mut self, new_limit: TrailLimit) -> DecisionLevel {
        let index = self.limits.len();
        self.limits.push(new_limit);
        DecisionLevel::from_index(index)
    }

    /// Returns the last trail limit.
    pub fn last(&self) -> TrailLimit {
        *self
            .limits
            .last()
            .expect("encountered unexpected empty trail limits")
    }

    /// Shrinks the trail limits so that `level` becomes the current decision
    /// level, discarding the limits of every level above it.
    ///
    /// Returns the trail length marking the end of `level`'s own content, so
    /// that the caller can truncate the literal stack without discarding
    /// `level`'s decision and propagations along with it. Returns `None` if
    /// `level` was already the deepest level, in which case there is nothing
    /// above it to discard.
    pub fn pop_to_level(&mut self, level: DecisionLevel) -> Option<TrailLimit> {
        assert!(level.into_index() < self.limits.len());
        let content_end = self.limits.get(level.into_index() + 1).copied();
        self.limits.truncate(level.into_index() + 1);
        content_end
    }

    /// Returns the current decision level.
    ///
    /// `self.limits` always holds one more entry than the highest level it has
    /// recorded the start of (the entry for level 0 is seeded by `Default`),
    /// so the current level is `len - 1`.
    pub fn current_decision_level(&self) -> DecisionLevel {
        DecisionLevel::from_index(self.limits.len() - 1)
    }

    /// Returns the trail length marking the start of the given level, if the
    /// trail limits currently record one.
    pub fn limit_of(&self, level: DecisionLevel) -> Option<TrailLimit> {
        self.limits.get(level.into_index()).copied()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Trail {
    propagate_head: usize,
    decisions_and_implications: BoundedStack<Literal>,
    limits: TrailLimits,
    /// Cumulative count of literals pushed to the trail with a reason clause,
    /// i.e. assigned by unit propagation rather than decided or assumed.
    propagations: u64,
}

impl Trail {
    /// Returns the current number of variables.
    fn len_variables(&self) -> usize {
        self.decisions_and_implications.capacity()
    }

    /// Returns the cumulative number of literals assigned by unit propagation.
    pub fn propagations(&self) -> u64 {
        self.propagations
    }

    /// Registers the given number of additional variables.
    ///
    /// # Errors
    ///
    /// If the number of total variables is out of supported bounds.
    pub fn register_new_variables(&mut self, new_variables: usize) {
        let total_variables = self.len_variables() + new_variables;
        self.decisions_and_implications
            .resize_capacity(total_variables);
    }

    /// Pushes a new decision level and returns it.
    pub fn bump_decision_level(&mut self) -> DecisionLevel {
        let limit = TrailLimit::from_index(self.decisions_and_implications.len());
        self.limits.push(limit)
    }

    /// Returns the current decision level.
    pub fn current_decision_level(&self) -> DecisionLevel {
        self.limits.current_decision_level()
    }

    /// Returns `true` if the propagation queue is empty.
    fn is_propagation_queue_empty(&self) -> bool {
        if self.decisions_and_implications.is_empty() {
            return true
        }
        self.propagate_head == self.decisions_and_implications.len()
    }

    /// Returns the next literal from the propagation queue if any.
    pub fn pop_enqueued(&mut self) -> Option<Literal> {
        if self.is_propagation_queue_empty() {
            return None
        }
        let popped = self.decisions_and_implications[self.propagate_head];
        self.propagate_head += 1;
        Some(popped)
    }

    /// Pushes a new literal to the trail.
    ///
    /// This does not yet propagate the pushed literal.
    ///
    /// # Errors
    ///
    /// - If the pushed literal is in conflict with the current assignment.
    /// - If the literal has already been assigned.
    pub fn push(
        &mut self,
        literal: Literal,
        reason: Option<ClauseId>,
        assignment: &mut VariableAssignment,
        levels_and_reasons: &mut DecisionLevelsAndReasons,
    ) -> Result<(), AssignmentError> {
        match assignment.is_conflicting(literal) {
            Some(true) => return Err(AssignmentError::Conflict),
            Some(false) => return Err(AssignmentError::AlreadyAssigned),
            None => (),
        }
        self.decisions_and_implications
            .push(literal)
            .expect("encountered unexpected invalid variable");
        assignment.assign(literal.variable(), literal.sign());
        levels_and_reasons.update(literal.variable(), self.current_decision_level(), reason);
        if reason.is_some() {
            self.propagations += 1;
        }
        Ok(())
    }

    /// Backjumps the trail to the given decision level.
    ///
    /// Retains `level`'s own decision and propagations; only assignments made
    /// on levels strictly above `level` are undone.
    pub fn pop_to_level(
        &mut self,
        level: DecisionLevel,
        assignments: &mut VariableAssignment,
        mut inform_decider: InformDecider,
    ) {
        let content_end = match self.limits.pop_to_level(level) {
            Some(content_end) => content_end,
            None => return,
        };
        self.propagate_head = content_end.into_index();
        self.decisions_and_implications
            .pop_to(content_end.into_index(), |popped| {
                let variable = popped.variable();
                let last_sign = popped.sign();
                assignments.unassign(variable);
                inform_decider.restore_variable(variable, last_sign)
            });
    }

    /// Returns the literals assigned on the given decision level, including
    /// its decision literal.
    pub fn level_assignments(&self, level: DecisionLevel) -> &[Literal] {
        let start = self
            .limits
            .limit_of(level)
            .map(Index::into_index)
            .unwrap_or(0);
        let end = self
            .limits
            .limit_of(DecisionLevel::from_index(level.into_index() + 1))
            .map(Index::into_index)
            .unwrap_or_else(|| self.decisions_and_implications.len());
        &self.decisions_and_implications[start..end]
    }
}
