#![forbid(unsafe_code)]

//! Staged sequence handles.
//!
//! A declared sequence is first a [`SequenceFamily`] (parameters pending), becomes a
//! [`SubstitutedSequence`] once every parameter is supplied, and a
//! [`RandomizedSequence`] once finalization proves nothing reachable is left to
//! randomize. Each stage is its own type and substitution returns a new handle, so a
//! stale handle can never be mistaken for a later stage.

use rtg_ir::{SequenceGraph, SequenceId};
use rtg_types::{TypeContext, TypeError, TypeId};

/// A sequence with at least one pending parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceFamily {
    sequence: SequenceId,
    ty: TypeId,
    args: Vec<TypeId>,
}

/// A sequence with zero pending parameters. Not yet proven randomized.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubstitutedSequence {
    sequence: SequenceId,
    args: Vec<TypeId>,
}

/// Terminal stage. Only finalization constructs one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RandomizedSequence {
    sequence: SequenceId,
    args: Vec<TypeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Staged {
    Family(SequenceFamily),
    Substituted(SubstitutedSequence),
}

impl Staged {
    /// Handle for a declared sequence before any argument is supplied.
    pub fn get(graph: &SequenceGraph, ctx: &mut TypeContext, sequence: SequenceId) -> Staged {
        let ty = graph.sequence_type(ctx, sequence);
        Staged::from_type(ctx, sequence, ty, Vec::new())
    }

    fn from_type(ctx: &TypeContext, sequence: SequenceId, ty: TypeId, args: Vec<TypeId>) -> Staged {
        if ctx.sequence_elements(ty).is_some_and(|p| p.is_empty()) {
            Staged::Substituted(SubstitutedSequence { sequence, args })
        } else {
            Staged::Family(SequenceFamily { sequence, ty, args })
        }
    }

    pub fn sequence(&self) -> SequenceId {
        match self {
            Staged::Family(f) => f.sequence,
            Staged::Substituted(s) => s.sequence,
        }
    }

    pub fn into_substituted(self) -> Option<SubstitutedSequence> {
        match self {
            Staged::Substituted(s) => Some(s),
            Staged::Family(_) => None,
        }
    }

    pub fn into_family(self) -> Option<SequenceFamily> {
        match self {
            Staged::Family(f) => Some(f),
            Staged::Substituted(_) => None,
        }
    }
}

impl SequenceFamily {
    pub fn sequence(&self) -> SequenceId {
        self.sequence
    }

    pub fn ty(&self) -> TypeId {
        self.ty
    }

    /// Arguments supplied so far, in parameter order.
    pub fn args(&self) -> &[TypeId] {
        &self.args
    }

    pub fn pending<'a>(&self, ctx: &'a TypeContext) -> &'a [TypeId] {
        ctx.sequence_elements(self.ty).unwrap_or_default()
    }

    /// Supply a value of type `value` for the first pending parameter. `self` is left
    /// untouched.
    pub fn substitute(&self, ctx: &mut TypeContext, value: TypeId) -> Result<Staged, TypeError> {
        let ty = ctx.substitute_one(self.ty, value)?;
        let mut args = self.args.clone();
        args.push(value);
        Ok(Staged::from_type(ctx, self.sequence, ty, args))
    }

    /// Substitute `values` left to right, stopping at the first mismatch.
    pub fn substitute_all(
        &self,
        ctx: &mut TypeContext,
        values: impl IntoIterator<Item = TypeId>,
    ) -> Result<Staged, TypeError> {
        let mut staged = Staged::Family(self.clone());
        for value in values {
            staged = match staged {
                Staged::Family(f) => f.substitute(ctx, value)?,
                Staged::Substituted(_) => {
                    let done = ctx.fully_substituted_sequence();
                    return Err(TypeError::mismatch(
                        format!("no further arguments for {}", ctx.display(done)),
                        ctx.display(value),
                    ));
                }
            };
        }
        Ok(staged)
    }
}

impl SubstitutedSequence {
    pub fn sequence(&self) -> SequenceId {
        self.sequence
    }

    pub fn args(&self) -> &[TypeId] {
        &self.args
    }

    pub fn ty(&self, ctx: &mut TypeContext) -> TypeId {
        ctx.fully_substituted_sequence()
    }

    pub(crate) fn randomized(&self) -> RandomizedSequence {
        RandomizedSequence {
            sequence: self.sequence,
            args: self.args.clone(),
        }
    }
}

impl RandomizedSequence {
    pub fn sequence(&self) -> SequenceId {
        self.sequence
    }

    pub fn args(&self) -> &[TypeId] {
        &self.args
    }

    pub fn ty(&self, ctx: &mut TypeContext) -> TypeId {
        ctx.randomized_sequence()
    }
}

impl From<RandomizedSequence> for SubstitutedSequence {
    fn from(seq: RandomizedSequence) -> Self {
        SubstitutedSequence {
            sequence: seq.sequence,
            args: seq.args,
        }
    }
}
