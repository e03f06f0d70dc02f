mod clause_ref;
mod db;

pub use self::{
    clause_ref::{
        ClauseRef,
        ClauseRefMut,
        PropagationResult,
    },
    db::{
        ClauseDb,
        ClauseDbIter,
        ClauseId,
    },
};
