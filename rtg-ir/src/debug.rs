#![forbid(unsafe_code)]

use std::fmt::Write;

use rtg_types::TypeContext;

use crate::ir::{NodeKind, SequenceGraph};

impl SequenceGraph {
    /// Deterministic textual listing of every sequence, for debugging and test
    /// expectations.
    pub fn dump(&self, ctx: &TypeContext) -> String {
        let mut out = String::new();
        for decl in self.iter() {
            let params = decl
                .params
                .iter()
                .map(|p| ctx.display(*p))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "sequence @{}({params}) {{", decl.name);
            for node in &decl.body {
                let (head, tys) = match &node.kind {
                    NodeKind::Invoke { callee, args } => {
                        (format!("invoke @{}", self.decl(*callee).name), args)
                    }
                    NodeKind::Op { name, operands } => (name.clone(), operands),
                };
                let tys_s = tys
                    .iter()
                    .map(|t| ctx.display(*t))
                    .collect::<Vec<_>>()
                    .join(", ");
                match node.result {
                    Some(r) => {
                        let _ = writeln!(out, "  {head}({tys_s}) : {}", ctx.display(r));
                    }
                    None => {
                        let _ = writeln!(out, "  {head}({tys_s})");
                    }
                }
            }
            out.push_str("}\n");
        }
        out
    }
}
