#![forbid(unsafe_code)]

//! Typed constant values inhabiting the types of `rtg-types`.
//!
//! Containers are stored in ordered collections, so set, bag and dictionary equality
//! never depends on construction order.

use std::collections::{BTreeMap, BTreeSet};

use rtg_types::{TypeContext, TypeError, TypeId};

use crate::compat::{check_element, check_operand};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Value {
    ty: TypeId,
    kind: ValueKind,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Index(u64),
    Integer(u64),
    Label(String),
    Immediate(u64),
    Set(BTreeSet<Value>),
    /// Element to multiplicity.
    Bag(BTreeMap<Value, usize>),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
    Dict(BTreeMap<String, Value>),
}

fn fits(width: u32, bits: u64) -> bool {
    width >= 64 || bits >> width == 0
}

impl Value {
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn index(ctx: &mut TypeContext, value: u64) -> Self {
        Self {
            ty: ctx.index(),
            kind: ValueKind::Index(value),
        }
    }

    pub fn integer(ctx: &mut TypeContext, width: u32, value: u64) -> Result<Self, TypeError> {
        let ty = ctx.integer(width)?;
        if !fits(width, value) {
            return Err(TypeError::mismatch(ctx.display(ty), format!("integer {value}")));
        }
        Ok(Self {
            ty,
            kind: ValueKind::Integer(value),
        })
    }

    pub fn label(ctx: &mut TypeContext, name: impl Into<String>) -> Self {
        Self {
            ty: ctx.label(),
            kind: ValueKind::Label(name.into()),
        }
    }

    pub fn immediate(ctx: &mut TypeContext, width: u32, bits: u64) -> Result<Self, TypeError> {
        let ty = ctx.immediate(width)?;
        if !fits(width, bits) {
            return Err(TypeError::mismatch(
                ctx.display(ty),
                format!("immediate {bits:#x} needing more than {width} bits"),
            ));
        }
        Ok(Self {
            ty,
            kind: ValueKind::Immediate(bits),
        })
    }

    /// Duplicate elements collapse.
    pub fn set(
        ctx: &mut TypeContext,
        elem: TypeId,
        elems: impl IntoIterator<Item = Value>,
    ) -> Result<Self, TypeError> {
        let ty = ctx.set(elem);
        let mut out = BTreeSet::new();
        for v in elems {
            check_element(ctx, ty, v.ty)?;
            out.insert(v);
        }
        Ok(Self {
            ty,
            kind: ValueKind::Set(out),
        })
    }

    pub fn bag(
        ctx: &mut TypeContext,
        elem: TypeId,
        elems: impl IntoIterator<Item = Value>,
    ) -> Result<Self, TypeError> {
        let ty = ctx.bag(elem);
        let mut out = BTreeMap::new();
        for v in elems {
            check_element(ctx, ty, v.ty)?;
            *out.entry(v).or_insert(0) += 1;
        }
        Ok(Self {
            ty,
            kind: ValueKind::Bag(out),
        })
    }

    pub fn array(
        ctx: &mut TypeContext,
        elem: TypeId,
        elems: impl IntoIterator<Item = Value>,
    ) -> Result<Self, TypeError> {
        let ty = ctx.array(elem);
        let elems: Vec<Value> = elems.into_iter().collect();
        for v in &elems {
            check_element(ctx, ty, v.ty)?;
        }
        Ok(Self {
            ty,
            kind: ValueKind::Array(elems),
        })
    }

    pub fn tuple(ctx: &mut TypeContext, fields: Vec<Value>) -> Self {
        let ty = ctx.tuple(fields.iter().map(|f| f.ty));
        Self {
            ty,
            kind: ValueKind::Tuple(fields),
        }
    }

    /// Build a value of dictionary type `dict`. Entries may come in any order.
    pub fn dict<S: Into<String>>(
        ctx: &TypeContext,
        dict: TypeId,
        entries: impl IntoIterator<Item = (S, Value)>,
    ) -> Result<Self, TypeError> {
        let Some(expected) = ctx.dict_entries(dict) else {
            return Err(TypeError::mismatch("a dictionary type", ctx.display(dict)));
        };

        let mut map = BTreeMap::new();
        for (name, v) in entries {
            let name = name.into();
            if map.contains_key(&name) {
                return Err(TypeError::DuplicateEntryName { name });
            }
            map.insert(name, v);
        }

        let names_match = map.len() == expected.len()
            && map.keys().zip(expected).all(|(k, e)| *k == e.name);
        if !names_match {
            let found = map.keys().cloned().collect::<Vec<_>>().join(", ");
            return Err(TypeError::mismatch(
                ctx.display(dict),
                format!("entries named [{found}]"),
            ));
        }

        let tys: Vec<TypeId> = map.values().map(|v| v.ty).collect();
        if !ctx.entry_types_match(dict, &tys) {
            for (e, v) in expected.iter().zip(map.values()) {
                check_operand(ctx, e.ty, v.ty)?;
            }
        }

        Ok(Self {
            ty: dict,
            kind: ValueKind::Dict(map),
        })
    }

    pub fn tuple_field(&self, index: usize) -> Option<&Value> {
        match &self.kind {
            ValueKind::Tuple(fields) => fields.get(index),
            _ => None,
        }
    }

    pub fn dict_entry(&self, name: &str) -> Option<&Value> {
        match &self.kind {
            ValueKind::Dict(map) => map.get(name),
            _ => None,
        }
    }

    pub fn bag_count(&self, elem: &Value) -> usize {
        match &self.kind {
            ValueKind::Bag(map) => map.get(elem).copied().unwrap_or(0),
            _ => 0,
        }
    }
}
