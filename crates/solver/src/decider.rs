use crate::{
    assignment::VariableAssignment,
    config,
    Variable,
};
use bounded::{
    Bool,
    BoundedBitmap,
    BoundedHeap,
    Index as _,
};
use core::{
    cmp::Ordering,
    ops::Add,
};

/// A VSIDS activity score.
///
/// Wraps an `f64` so it can be used as the weight of a [`BoundedHeap`], which
/// requires `Ord`. Activities are never `NaN`, so `f64::total_cmp` is a total
/// order over the values we actually store.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Activity(f64);

impl Activity {
    const ZERO: Self = Self(0.0);

    fn scale(self, factor: f64) -> Self {
        Self(self.0 * factor)
    }
}

impl Eq for Activity {}

impl PartialOrd for Activity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Activity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add<f64> for Activity {
    type Output = Self;

    fn add(self, rhs: f64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

/// Wrapper around the decider in order to inform it about propagation results.
///
/// This provides an encapsulated interface to the decider that provide access
/// only to the parts that informs it about the variable priorities and which
/// variables are still in need for propagation.
///
/// # Note
///
/// Currently mainly needed to inform the branching heuristic upon backtracking.
#[derive(Debug)]
pub struct InformDecider<'a> {
    /// The wrapped decider.
    decider: &'a mut Decider,
}

impl<'a> InformDecider<'a> {
    /// Wraps the given decider.
    pub(crate) fn new(decider: &'a mut Decider) -> Self {
        Self { decider }
    }

    /// Restores the given variable to the decision heap and saves its phase.
    ///
    /// Does nothing to the variable's activity; VSIDS scores survive backjumps
    /// and restarts unchanged.
    ///
    /// # Panics
    ///
    /// If the given variable index is out of bounds.
    pub fn restore_variable(&mut self, variable: Variable, last_value: crate::Sign) {
        self.decider.save_phase(variable, last_value);
        self.decider.restore_variable(variable);
    }

    /// Bumps the activity of the given variable, as visited during conflict analysis.
    pub fn bump_activity(&mut self, variable: Variable) {
        self.decider.bump_activity(variable);
    }
}

/// VSIDS (Variable State Independent Decaying Sum) branching heuristic.
///
/// Every variable touched during conflict analysis is bumped by the current
/// [`Self::increment`]. The increment itself grows after every conflict
/// (equivalent to periodically decaying every other score), and both are
/// rescaled together before they can overflow.
#[derive(Debug, Clone)]
pub struct Decider {
    len_variables: usize,
    activities: BoundedHeap<Variable, Activity>,
    /// Saved polarity of each variable, used for phase-saving decisions.
    phases: BoundedBitmap<Variable, bool>,
    /// The amount by which a bumped variable's activity increases.
    increment: f64,
    /// Conflicts seen since the increment was last grown.
    conflicts_since_decay: u64,
}

impl Default for Decider {
    fn default() -> Self {
        Self {
            len_variables: 0,
            activities: BoundedHeap::default(),
            phases: BoundedBitmap::default(),
            increment: 1.0,
            conflicts_since_decay: 0,
        }
    }
}

impl Decider {
    /// Creates a wrapper around the decider to allow to inform the decider
    /// about unit propagation results.
    pub fn informer(&mut self) -> InformDecider {
        InformDecider::new(self)
    }

    /// Returns the number of registered variables.
    fn len_variables(&self) -> usize {
        self.len_variables
    }

    /// Registers the given amount of new variables.
    ///
    /// # Panics
    ///
    /// If too many variables have been registered in total.
    pub fn register_new_variables(&mut self, new_variables: usize) {
        let total_variables = self.len_variables() + new_variables;
        self.activities.resize_capacity(total_variables);
        self.phases.resize_to_len(total_variables);
        for i in self.len_variables()..total_variables {
            let variable = Variable::from_index(i);
            self.activities
                .push_or_update(variable, core::convert::identity)
                .expect("unexpected variable index out of bounds");
            self.phases
                .set(variable, true)
                .expect("unexpected variable index out of bounds");
        }
        self.len_variables += new_variables;
    }

    /// Bumps the priority of the given variable by a fixed amount.
    ///
    /// Used when loading the original clauses: variables occurring in more
    /// clauses start out with a higher initial activity, independent of VSIDS.
    pub fn bump_priority_by(&mut self, variable: Variable, amount: u64) {
        self.activities
            .push_or_update(variable, |old| old + amount as f64)
            .expect("encountered unexpected out of bounds variable");
    }

    /// Bumps the activity of `variable` by the current VSIDS increment.
    pub fn bump_activity(&mut self, variable: Variable) {
        let increment = self.increment;
        self.activities
            .push_or_update(variable, |old| old + increment)
            .expect("encountered unexpected out of bounds variable");
    }

    /// Notifies the decider that a conflict has occurred.
    ///
    /// Grows the bump increment on the configured schedule and rescales all
    /// activities (and the increment itself) once the increment threatens to
    /// overflow.
    pub fn conflict_occurred(&mut self) {
        self.conflicts_since_decay += 1;
        if self.conflicts_since_decay < config::VSIDS_DECAY_INTERVAL {
            return
        }
        self.conflicts_since_decay = 0;
        self.increment /= config::VSIDS_DECAY;
        if self.increment > config::VSIDS_RESCALE_THRESHOLD {
            self.rescale();
        }
    }

    /// Divides every activity and the increment by a common factor.
    fn rescale(&mut self) {
        let factor = 1.0 / config::VSIDS_RESCALE_THRESHOLD;
        for variable_index in 0..self.len_variables() {
            let variable = Variable::from_index(variable_index);
            self.activities
                .push_or_update(variable, |old| old.scale(factor))
                .expect("encountered unexpected out of bounds variable during rescale");
        }
        self.increment *= factor;
    }

    /// Returns the next variable to decide on if any unassigned variable is left.
    ///
    /// This removes the variable from the priority queue. Variables with
    /// equal activity are broken by lowest variable index, since the
    /// underlying heap's weight comparison does so for equally-weighted keys.
    pub fn next_unassigned(
        &mut self,
        assignment: &VariableAssignment,
    ) -> Option<Variable> {
        loop {
            let next = self.activities.pop().map(|(variable, _activity)| variable);
            match next {
                Some(next) => {
                    if assignment.get(next).is_none() {
                        return Some(next)
                    }
                }
                None => return None,
            }
        }
    }

    /// Returns the saved phase (polarity) for the given variable.
    ///
    /// Initial phase is always `true`, per phase-saving's standard default.
    pub fn phase_of(&self, variable: Variable) -> crate::Sign {
        let saved = self
            .phases
            .get(variable)
            .expect("encountered unexpected invalid variable");
        Bool::from_bool(saved)
    }

    /// Saves the last value a variable held before it was unassigned.
    fn save_phase(&mut self, variable: Variable, last_value: crate::Sign) {
        self.phases
            .set(variable, last_value.into_bool())
            .expect("encountered unexpected invalid variable");
    }

    /// Restores the given variable and adds it back to the priority queue with
    /// its original weight.
    ///
    /// Does nothing if the variable is already in the queue.
    ///
    /// # Panics
    ///
    /// If the given variable index is out of bounds.
    pub fn restore_variable(&mut self, variable: Variable) {
        self.activities
            .push_or_update(variable, core::convert::identity)
            .expect("encountered unexpected out of bounds variable");
    }
}

