//! Tunable constants governing the search heuristics.
//!
//! These mirror the "environment/config" constants of a typical CDCL solver:
//! they are fixed at compile time rather than read from a config file, since
//! the solver has no persisted state between runs.

/// The unit `u` of the Luby restart sequence; a restart is triggered once the
/// number of conflicts since the last restart reaches `luby(r + 1) * LUBY_UNIT`.
pub const LUBY_UNIT: u64 = 32;

/// The VSIDS decay factor `d`. The bump increment grows by `1 / d` every
/// [`VSIDS_DECAY_INTERVAL`] conflicts, which is equivalent to scaling every
/// variable's activity down by `d`.
pub const VSIDS_DECAY: f64 = 0.95;

/// The number of conflicts between two successive VSIDS decays.
pub const VSIDS_DECAY_INTERVAL: u64 = 1;

/// Once the bump increment exceeds this threshold, all activities and the
/// increment itself are divided by it to avoid floating point overflow.
pub const VSIDS_RESCALE_THRESHOLD: f64 = 1e100;
