#![forbid(unsafe_code)]

mod attr;
mod compat;
mod finalize;
mod staged;

pub use attr::{Value, ValueKind};
pub use compat::{check_element, check_operand, is_convertible, structurally_equal};
pub use finalize::{Finalize, FinalizeConfig, Finalizer, OpNameOracle, RandomizationOracle};
pub use staged::{RandomizedSequence, SequenceFamily, Staged, SubstitutedSequence};
