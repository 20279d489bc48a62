#![forbid(unsafe_code)]

use crate::context::{TypeContext, TypeId, TypeKind};
use crate::error::TypeError;

/// A sequence handle type.
///
/// Non-empty `elements` is a family that still needs exactly that many values, in
/// order. Empty `elements` is a single fully substituted sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SequenceType {
    pub elements: Vec<TypeId>,
}

impl SequenceType {
    pub fn is_fully_substituted(&self) -> bool {
        self.elements.is_empty()
    }
}

impl TypeContext {
    pub fn sequence(&mut self, elements: impl IntoIterator<Item = TypeId>) -> TypeId {
        let elements = elements.into_iter().collect();
        self.intern_valid(TypeKind::Sequence(SequenceType { elements }))
    }

    pub fn fully_substituted_sequence(&mut self) -> TypeId {
        self.sequence([])
    }

    pub fn randomized_sequence(&mut self) -> TypeId {
        self.intern_valid(TypeKind::RandomizedSequence)
    }

    /// Pending parameter types of a sequence type, `None` for anything else.
    pub fn sequence_elements(&self, ty: TypeId) -> Option<&[TypeId]> {
        match self.kind(ty) {
            TypeKind::Sequence(s) => Some(&s.elements),
            _ => None,
        }
    }

    pub fn is_randomized_sequence(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::RandomizedSequence)
    }

    /// Whether a value of type `from` may be used where `to` is expected.
    ///
    /// Only exact matches convert, plus randomized sequence to fully substituted sequence.
    pub fn is_convertible(&self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }
        self.is_randomized_sequence(from)
            && matches!(self.kind(to), TypeKind::Sequence(s) if s.is_fully_substituted())
    }

    /// The first sequence family found in `ty` or anything nested in it, searching
    /// depth-first in declaration order.
    pub fn find_family(&self, ty: TypeId) -> Option<TypeId> {
        let mut work = vec![ty];
        while let Some(t) = work.pop() {
            let kind = self.kind(t);
            if matches!(kind, TypeKind::Sequence(s) if !s.is_fully_substituted()) {
                return Some(t);
            }
            work.extend(kind.children().into_iter().rev());
        }
        None
    }

    /// Supply a value of type `value` for the first pending parameter of `sequence`.
    ///
    /// Returns the sequence type with that parameter removed from the front.
    pub fn substitute_one(&mut self, sequence: TypeId, value: TypeId) -> Result<TypeId, TypeError> {
        let Some(pending) = self.sequence_elements(sequence) else {
            return Err(TypeError::mismatch("a sequence family", self.display(sequence)));
        };
        let Some((first, rest)) = pending.split_first() else {
            return Err(TypeError::mismatch(
                format!("no further arguments for {}", self.display(sequence)),
                self.display(value),
            ));
        };
        if !self.is_convertible(value, *first) {
            return Err(TypeError::mismatch(self.display(*first), self.display(value)));
        }
        let rest = rest.to_vec();
        Ok(self.sequence(rest))
    }
}
