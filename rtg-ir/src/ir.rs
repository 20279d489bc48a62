#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use rtg_types::{TypeContext, TypeError, TypeId};

/// Handle to a sequence declared in a [`SequenceGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceId(pub(crate) u32);

impl SequenceId {
    /// Position in declaration order.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Reference to another sequence, applying `args` to its leading parameters.
    ///
    /// Fewer args than the callee has parameters leaves a family behind.
    Invoke {
        callee: SequenceId,
        args: Vec<TypeId>,
    },

    /// An operation owned by some other dialect. Only its name and operand types are
    /// visible here.
    Op { name: String, operands: Vec<TypeId> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub result: Option<TypeId>,
    pub kind: NodeKind,
}

#[derive(Clone, Debug)]
pub struct SequenceDecl {
    pub id: SequenceId,
    pub name: String,
    pub params: Vec<TypeId>,
    pub body: Vec<Node>,
}

impl SequenceDecl {
    /// Sequence callees in body order.
    pub fn callees(&self) -> impl Iterator<Item = SequenceId> + '_ {
        self.body.iter().filter_map(|n| match &n.kind {
            NodeKind::Invoke { callee, .. } => Some(*callee),
            NodeKind::Op { .. } => None,
        })
    }
}

/// All declared sequences of one program, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct SequenceGraph {
    decls: Vec<SequenceDecl>,
    by_name: BTreeMap<String, SequenceId>,
}

impl SequenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(
        &mut self,
        name: impl Into<String>,
        params: impl IntoIterator<Item = TypeId>,
    ) -> Result<SequenceId, TypeError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TypeError::DuplicateSequenceName { name });
        }
        let id = SequenceId(self.decls.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.decls.push(SequenceDecl {
            id,
            name,
            params: params.into_iter().collect(),
            body: Vec::new(),
        });
        Ok(id)
    }

    pub fn decl(&self, id: SequenceId) -> &SequenceDecl {
        &self.decls[id.index()]
    }

    pub fn lookup(&self, name: &str) -> Option<SequenceId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SequenceDecl> {
        self.decls.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// The family type of a declared sequence: one pending element per parameter.
    pub fn sequence_type(&self, ctx: &mut TypeContext, id: SequenceId) -> TypeId {
        let params = self.decl(id).params.clone();
        ctx.sequence(params)
    }

    /// Append a reference to `callee` inside `caller`. `args` are checked positionally
    /// against the callee's parameters; the node's result is whatever is left pending.
    pub fn invoke(
        &mut self,
        ctx: &mut TypeContext,
        caller: SequenceId,
        callee: SequenceId,
        args: Vec<TypeId>,
    ) -> Result<TypeId, TypeError> {
        let mut ty = self.sequence_type(ctx, callee);
        for arg in &args {
            ty = ctx.substitute_one(ty, *arg)?;
        }
        self.decls[caller.index()].body.push(Node {
            result: Some(ty),
            kind: NodeKind::Invoke { callee, args },
        });
        Ok(ty)
    }

    pub fn op(
        &mut self,
        caller: SequenceId,
        name: impl Into<String>,
        operands: Vec<TypeId>,
        result: Option<TypeId>,
    ) {
        self.decls[caller.index()].body.push(Node {
            result,
            kind: NodeKind::Op {
                name: name.into(),
                operands,
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_rejects_duplicate_names() {
        let mut graph = SequenceGraph::new();
        graph.declare("main", []).unwrap();
        let err = graph.declare("main", []).unwrap_err();
        assert_eq!(err, TypeError::DuplicateSequenceName { name: "main".to_string() });
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn invoke_checks_args_positionally() {
        let mut ctx = TypeContext::new();
        let imm = ctx.immediate(12).unwrap();
        let label = ctx.label();
        let mut graph = SequenceGraph::new();
        let callee = graph.declare("load", [imm, label]).unwrap();
        let caller = graph.declare("main", []).unwrap();

        let partial = graph.invoke(&mut ctx, caller, callee, vec![imm]).unwrap();
        assert_eq!(ctx.sequence_elements(partial), Some(&[label][..]));

        let err = graph.invoke(&mut ctx, caller, callee, vec![label]).unwrap_err();
        assert!(matches!(err, TypeError::TypeMismatch { .. }));
        assert_eq!(graph.decl(caller).body.len(), 1);
    }

    #[test]
    fn invoke_rejects_too_many_args() {
        let mut ctx = TypeContext::new();
        let idx = ctx.index();
        let mut graph = SequenceGraph::new();
        let callee = graph.declare("leaf", []).unwrap();
        let caller = graph.declare("main", []).unwrap();
        let err = graph.invoke(&mut ctx, caller, callee, vec![idx]).unwrap_err();
        assert!(err.to_string().contains("no further arguments"), "{err}");
    }

    #[test]
    fn callees_follow_body_order() {
        let mut ctx = TypeContext::new();
        let mut graph = SequenceGraph::new();
        let a = graph.declare("a", []).unwrap();
        let b = graph.declare("b", []).unwrap();
        let main = graph.declare("main", []).unwrap();
        graph.invoke(&mut ctx, main, b, vec![]).unwrap();
        graph.op(main, "rtg.label", vec![], None);
        graph.invoke(&mut ctx, main, a, vec![]).unwrap();
        assert_eq!(graph.decl(main).callees().collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(graph.lookup("b"), Some(b));
        assert_eq!(graph.lookup("missing"), None);
        assert_eq!((a.index(), b.index(), main.index()), (0, 1, 2));
    }
}
