#![forbid(unsafe_code)]

use std::collections::HashMap;

use tracing::debug;

use crate::container::ContainerType;
use crate::error::TypeError;
use crate::resource::ResourceType;
use crate::sequence::SequenceType;

/// Handle to an interned type. Two handles from the same context are equal iff the
/// types they name are structurally equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub fn index(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Index,
    Integer { width: u32 },
    Resource(ResourceType),
    Container(ContainerType),
    Sequence(SequenceType),

    // Nominal: never structurally equal to `Sequence(SequenceType { elements: [] })`.
    RandomizedSequence,
}

impl TypeKind {
    /// Directly nested type handles, in declaration order.
    pub fn children(&self) -> Vec<TypeId> {
        match self {
            TypeKind::Index
            | TypeKind::Integer { .. }
            | TypeKind::Resource(_)
            | TypeKind::RandomizedSequence => Vec::new(),
            TypeKind::Container(ContainerType::Set(e))
            | TypeKind::Container(ContainerType::Bag(e))
            | TypeKind::Container(ContainerType::Array(e)) => vec![*e],
            TypeKind::Container(ContainerType::Tuple(fields)) => fields.clone(),
            TypeKind::Container(ContainerType::Dict(entries)) => {
                entries.iter().map(|e| e.ty).collect()
            }
            TypeKind::Sequence(s) => s.elements.clone(),
        }
    }
}

/// Per-program intern table.
///
/// Insertion needs `&mut self`, so there is exactly one writer; once built the context
/// can be shared freely across threads.
#[derive(Debug, Default)]
pub struct TypeContext {
    types: Vec<TypeKind>,
    interned: HashMap<TypeKind, TypeId>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Validate, canonicalize and intern `kind`.
    pub fn intern(&mut self, kind: TypeKind) -> Result<TypeId, TypeError> {
        let kind = match kind {
            TypeKind::Integer { width: 0 } => {
                return Err(TypeError::InvalidWidth {
                    kind: "integer",
                    param: "width",
                });
            }
            TypeKind::Resource(r) => TypeKind::Resource(r.validate()?),
            TypeKind::Container(c) => TypeKind::Container(c.canonicalize()?),
            other => other,
        };
        if let Some(child) = kind.children().into_iter().find(|c| !self.contains(*c)) {
            return Err(TypeError::UnknownType { index: child.0 });
        }
        Ok(self.intern_valid(kind))
    }

    pub(crate) fn intern_valid(&mut self, kind: TypeKind) -> TypeId {
        debug_assert!(kind.children().iter().all(|c| self.contains(*c)));
        if let Some(id) = self.interned.get(&kind) {
            return *id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(kind.clone());
        self.interned.insert(kind, id);
        debug!(id = id.0, ty = %self.display(id), "interned type");
        id
    }

    /// Whether `ty` names a type interned in this context.
    pub fn contains(&self, ty: TypeId) -> bool {
        (ty.0 as usize) < self.types.len()
    }

    pub fn kind(&self, ty: TypeId) -> &TypeKind {
        &self.types[ty.0 as usize]
    }

    pub fn index(&mut self) -> TypeId {
        self.intern_valid(TypeKind::Index)
    }

    pub fn integer(&mut self, width: u32) -> Result<TypeId, TypeError> {
        self.intern(TypeKind::Integer { width })
    }

    pub fn resource_type(&mut self, resource: ResourceType) -> Result<TypeId, TypeError> {
        self.intern(TypeKind::Resource(resource))
    }

    pub fn label(&mut self) -> TypeId {
        self.intern_valid(TypeKind::Resource(ResourceType::Label))
    }

    pub fn immediate(&mut self, width: u32) -> Result<TypeId, TypeError> {
        self.resource_type(ResourceType::immediate(width)?)
    }

    pub fn memory(&mut self, address_width: u32) -> Result<TypeId, TypeError> {
        self.resource_type(ResourceType::memory(address_width)?)
    }

    pub fn memory_block(&mut self, address_width: u32) -> Result<TypeId, TypeError> {
        self.resource_type(ResourceType::memory_block(address_width)?)
    }

    pub fn resource(&self, ty: TypeId) -> Option<&ResourceType> {
        match self.kind(ty) {
            TypeKind::Resource(r) => Some(r),
            _ => None,
        }
    }

    pub fn display(&self, ty: TypeId) -> String {
        match self.kind(ty) {
            TypeKind::Index => "index".to_string(),
            TypeKind::Integer { width } => format!("i{width}"),
            TypeKind::Resource(r) => r.display(),
            TypeKind::Container(c) => c.display(self),
            TypeKind::Sequence(s) => {
                if s.elements.is_empty() {
                    "!rtg.sequence".to_string()
                } else {
                    format!("!rtg.sequence<{}>", self.display_list(&s.elements))
                }
            }
            TypeKind::RandomizedSequence => "!rtg.randomized_sequence".to_string(),
        }
    }

    pub(crate) fn display_list(&self, tys: &[TypeId]) -> String {
        tys.iter()
            .map(|t| self.display(*t))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut ctx = TypeContext::new();
        let a = ctx.immediate(12).unwrap();
        let b = ctx.immediate(12).unwrap();
        let c = ctx.immediate(16).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn zero_width_integer_is_rejected() {
        let mut ctx = TypeContext::new();
        assert_eq!(
            ctx.integer(0),
            Err(TypeError::InvalidWidth { kind: "integer", param: "width" })
        );
        assert!(ctx.is_empty());
    }

    #[test]
    fn intern_revalidates_public_variants() {
        let mut ctx = TypeContext::new();
        let err = ctx
            .intern(TypeKind::Resource(ResourceType::Memory { address_width: 0 }))
            .unwrap_err();
        assert!(matches!(err, TypeError::InvalidWidth { kind: "memory", .. }));
    }

    #[test]
    fn intern_rejects_child_ids_from_elsewhere() {
        let mut other = TypeContext::new();
        let _ = other.index();
        let _ = other.label();
        let foreign = other.immediate(8).unwrap();

        let mut ctx = TypeContext::new();
        let err = ctx
            .intern(TypeKind::Container(ContainerType::Tuple(vec![foreign])))
            .unwrap_err();
        assert_eq!(err, TypeError::UnknownType { index: 2 });
        assert!(ctx.is_empty());
        assert!(!ctx.contains(foreign));
    }

    #[test]
    fn children_follow_declaration_order() {
        let mut ctx = TypeContext::new();
        let idx = ctx.index();
        let label = ctx.label();
        let tuple = ctx.tuple([label, idx]);
        assert_eq!(ctx.kind(tuple).children(), vec![label, idx]);
        assert!(ctx.kind(idx).children().is_empty());
    }

    #[test]
    fn resources_with_different_widths_are_distinct() {
        let mut ctx = TypeContext::new();
        let mem = ctx.memory(32).unwrap();
        let block = ctx.memory_block(32).unwrap();
        assert_ne!(mem, block);
        assert_eq!(ctx.resource(block), Some(&ResourceType::MemoryBlock { address_width: 32 }));
        let idx = ctx.index();
        assert_eq!(ctx.resource(idx), None);
    }

    #[test]
    fn display_scalars_and_resources() {
        let mut ctx = TypeContext::new();
        let i8_ty = ctx.integer(8).unwrap();
        let idx = ctx.index();
        let label = ctx.label();
        let imm = ctx.immediate(12).unwrap();
        let mem = ctx.memory_block(64).unwrap();
        assert_eq!(ctx.display(i8_ty), "i8");
        assert_eq!(ctx.display(idx), "index");
        assert_eq!(ctx.display(label), "!rtg.isa.label");
        assert_eq!(ctx.display(imm), "!rtg.isa.immediate<12>");
        assert_eq!(ctx.display(mem), "!rtg.isa.memory_block<64>");
    }
}
