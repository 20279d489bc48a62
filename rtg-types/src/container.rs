#![forbid(unsafe_code)]

use crate::context::{TypeContext, TypeId, TypeKind};
use crate::error::TypeError;

/// A named, statically typed dictionary entry.
///
/// Ordering is by name first, so a sorted entry list is the canonical form.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DictEntry {
    pub name: String,
    pub ty: TypeId,
}

impl DictEntry {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Parametric containers. Kinds never convert into one another.
///
/// Set, bag and array make no promise about storage strategy; the type only decides
/// which values are well-typed members.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContainerType {
    Set(TypeId),
    Bag(TypeId),
    Array(TypeId),
    Tuple(Vec<TypeId>),
    Dict(Vec<DictEntry>),
}

impl ContainerType {
    /// Sorts dictionary entries by name and rejects duplicates. Other kinds are
    /// already canonical.
    pub fn canonicalize(self) -> Result<Self, TypeError> {
        match self {
            ContainerType::Dict(mut entries) => {
                entries.sort_by(|a, b| a.name.cmp(&b.name));
                if let Some(pair) = entries.windows(2).find(|w| w[0].name == w[1].name) {
                    return Err(TypeError::DuplicateEntryName {
                        name: pair[0].name.clone(),
                    });
                }
                Ok(ContainerType::Dict(entries))
            }
            other => Ok(other),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ContainerType::Set(_) => "set",
            ContainerType::Bag(_) => "bag",
            ContainerType::Array(_) => "array",
            ContainerType::Tuple(_) => "tuple",
            ContainerType::Dict(_) => "dict",
        }
    }

    pub(crate) fn display(&self, ctx: &TypeContext) -> String {
        match self {
            ContainerType::Set(e) => format!("!rtg.set<{}>", ctx.display(*e)),
            ContainerType::Bag(e) => format!("!rtg.bag<{}>", ctx.display(*e)),
            ContainerType::Array(e) => format!("!rtg.array<{}>", ctx.display(*e)),
            ContainerType::Tuple(fields) => format!("!rtg.tuple<{}>", ctx.display_list(fields)),
            ContainerType::Dict(entries) => {
                let entries_s = entries
                    .iter()
                    .map(|e| format!("{}: {}", e.name, ctx.display(e.ty)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("!rtg.dict<{entries_s}>")
            }
        }
    }
}

impl TypeContext {
    pub fn set(&mut self, elem: TypeId) -> TypeId {
        self.intern_valid(TypeKind::Container(ContainerType::Set(elem)))
    }

    pub fn bag(&mut self, elem: TypeId) -> TypeId {
        self.intern_valid(TypeKind::Container(ContainerType::Bag(elem)))
    }

    pub fn array(&mut self, elem: TypeId) -> TypeId {
        self.intern_valid(TypeKind::Container(ContainerType::Array(elem)))
    }

    /// Zero fields is allowed.
    pub fn tuple(&mut self, fields: impl IntoIterator<Item = TypeId>) -> TypeId {
        let fields = fields.into_iter().collect();
        self.intern_valid(TypeKind::Container(ContainerType::Tuple(fields)))
    }

    /// Builds a dictionary type. Declaration order does not matter: any permutation of
    /// the same `(name, type)` pairs yields the same handle.
    pub fn dict<S: Into<String>>(
        &mut self,
        entries: impl IntoIterator<Item = (S, TypeId)>,
    ) -> Result<TypeId, TypeError> {
        let entries = entries
            .into_iter()
            .map(|(name, ty)| DictEntry::new(name, ty))
            .collect();
        self.intern(TypeKind::Container(ContainerType::Dict(entries)))
    }

    pub fn container(&self, ty: TypeId) -> Option<&ContainerType> {
        match self.kind(ty) {
            TypeKind::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Element type of a set, bag or array.
    pub fn element_type(&self, ty: TypeId) -> Option<TypeId> {
        match self.container(ty)? {
            ContainerType::Set(e) | ContainerType::Bag(e) | ContainerType::Array(e) => Some(*e),
            _ => None,
        }
    }

    pub fn tuple_fields(&self, ty: TypeId) -> Option<&[TypeId]> {
        match self.container(ty)? {
            ContainerType::Tuple(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn tuple_field(&self, ty: TypeId, index: usize) -> Option<TypeId> {
        self.tuple_fields(ty)?.get(index).copied()
    }

    /// Entries in canonical (ascending name) order.
    pub fn dict_entries(&self, ty: TypeId) -> Option<&[DictEntry]> {
        match self.container(ty)? {
            ContainerType::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// True iff `candidates`, given in the dictionary's canonical order, match the entry
    /// types position by position. Returns false for non-dictionary types.
    pub fn entry_types_match(&self, dict: TypeId, candidates: &[TypeId]) -> bool {
        let Some(entries) = self.dict_entries(dict) else {
            return false;
        };
        entries.len() == candidates.len()
            && entries.iter().zip(candidates).all(|(e, c)| e.ty == *c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_bag_of_same_element_differ() {
        let mut ctx = TypeContext::new();
        let label = ctx.label();
        assert_eq!(ctx.set(label), ctx.set(label));
        assert_ne!(ctx.set(label), ctx.bag(label));
        assert_ne!(ctx.bag(label), ctx.array(label));
    }

    #[test]
    fn tuple_fields_round_trip_in_order() {
        let mut ctx = TypeContext::new();
        let imm = ctx.immediate(32).unwrap();
        let label = ctx.label();
        let labels = ctx.set(label);
        let tuple = ctx.tuple([imm, labels]);

        assert_eq!(ctx.tuple_field(tuple, 0), Some(imm));
        assert_eq!(ctx.tuple_field(tuple, 1), Some(labels));
        assert_eq!(ctx.tuple_field(tuple, 2), None);
        assert_ne!(tuple, ctx.tuple([labels, imm]));
    }

    #[test]
    fn empty_tuple_is_a_type() {
        let mut ctx = TypeContext::new();
        let unit = ctx.tuple([]);
        assert_eq!(ctx.tuple_fields(unit), Some(&[][..]));
        assert_eq!(ctx.display(unit), "!rtg.tuple<>");
    }

    #[test]
    fn dict_is_canonicalized_by_name() {
        let mut ctx = TypeContext::new();
        let idx = ctx.index();
        let label = ctx.label();
        let a = ctx.dict([("b", idx), ("a", label)]).unwrap();
        let b = ctx.dict([("a", label), ("b", idx)]).unwrap();
        assert_eq!(a, b);

        let names: Vec<_> = ctx.dict_entries(a).unwrap().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(ctx.entry_types_match(a, &[label, idx]));
        assert!(!ctx.entry_types_match(a, &[idx, label]));
        assert!(!ctx.entry_types_match(a, &[label]));
        assert_eq!(ctx.display(a), "!rtg.dict<a: !rtg.isa.label, b: index>");
    }

    #[test]
    fn dict_rejects_duplicate_names() {
        let mut ctx = TypeContext::new();
        let idx = ctx.index();
        let label = ctx.label();
        let before = ctx.len();
        let err = ctx.dict([("x", idx), ("y", idx), ("x", label)]).unwrap_err();
        assert_eq!(err, TypeError::DuplicateEntryName { name: "x".to_string() });
        assert_eq!(ctx.len(), before);
    }

    #[test]
    fn entry_types_match_rejects_non_dicts() {
        let mut ctx = TypeContext::new();
        let idx = ctx.index();
        let tuple = ctx.tuple([idx]);
        assert!(!ctx.entry_types_match(tuple, &[idx]));
        assert_eq!(ctx.element_type(tuple), None);
    }

    #[test]
    fn display_containers() {
        let mut ctx = TypeContext::new();
        let i1 = ctx.integer(1).unwrap();
        let label = ctx.label();
        let bag = ctx.bag(i1);
        let arr = ctx.array(label);
        assert_eq!(ctx.display(bag), "!rtg.bag<i1>");
        assert_eq!(ctx.display(arr), "!rtg.array<!rtg.isa.label>");
    }
}
