#![forbid(unsafe_code)]

use miette::Diagnostic;
use thiserror::Error;

/// Every way building, substituting or finalizing a type can be rejected.
///
/// All variants are recoverable: the caller may retry with corrected input.
#[derive(Clone, Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid width: {kind} requires a non-zero {param}")]
    #[diagnostic(
        code(rtg::invalid_width),
        help("widths are counted in bits and must be at least 1")
    )]
    InvalidWidth {
        kind: &'static str,
        param: &'static str,
    },

    #[error("unknown type #{index}: not interned in this context")]
    #[diagnostic(code(rtg::unknown_type))]
    UnknownType { index: u32 },

    #[error("duplicate dictionary entry name '{name}'")]
    #[diagnostic(code(rtg::duplicate_entry))]
    DuplicateEntryName { name: String },

    #[error("duplicate sequence name '{name}'")]
    #[diagnostic(code(rtg::duplicate_sequence))]
    DuplicateSequenceName { name: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    #[diagnostic(code(rtg::type_mismatch))]
    TypeMismatch { expected: String, found: String },

    #[error("sequence '{sequence}' is not fully randomized: {construct}")]
    #[diagnostic(
        code(rtg::not_fully_randomized),
        help("substitute every reachable sequence family and resolve random choices first")
    )]
    NotFullyRandomized { sequence: String, construct: String },

    #[error("cyclic sequence reference: {}", .cycle.join(" -> "))]
    #[diagnostic(code(rtg::cyclic_sequence))]
    CyclicSequenceReference { cycle: Vec<String> },
}

impl TypeError {
    pub fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        TypeError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
