#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use rayon::prelude::*;
use rtg_ir::{Node, NodeKind, SequenceDecl, SequenceGraph, SequenceId};
use rtg_types::{TypeContext, TypeError, TypeId};
use tracing::{debug, trace};

use crate::staged::{RandomizedSequence, SubstitutedSequence};

/// Decides which operations introduce randomization.
///
/// The operation set belongs to whichever dialect populates sequence bodies, so it is
/// supplied from outside rather than fixed here.
pub trait RandomizationOracle: Sync {
    fn is_randomizing(&self, op: &str) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct FinalizeConfig {
    pub randomizing_ops: BTreeSet<String>,
}

impl Default for FinalizeConfig {
    fn default() -> Self {
        let ops = [
            "rtg.randomize_sequence",
            "rtg.select_random",
            "rtg.set_select_random",
            "rtg.bag_select_random",
            "rtg.random_number_in_range",
        ];
        Self {
            randomizing_ops: ops.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Classifies operations by exact name.
#[derive(Clone, Debug, Default)]
pub struct OpNameOracle {
    ops: BTreeSet<String>,
}

impl From<FinalizeConfig> for OpNameOracle {
    fn from(config: FinalizeConfig) -> Self {
        Self {
            ops: config.randomizing_ops,
        }
    }
}

impl RandomizationOracle for OpNameOracle {
    fn is_randomizing(&self, op: &str) -> bool {
        self.ops.contains(op)
    }
}

pub struct Finalizer<O: RandomizationOracle = OpNameOracle> {
    oracle: O,
}

impl Finalizer<OpNameOracle> {
    pub fn new(config: FinalizeConfig) -> Self {
        Self {
            oracle: config.into(),
        }
    }
}

impl Default for Finalizer<OpNameOracle> {
    fn default() -> Self {
        Self::new(FinalizeConfig::default())
    }
}

impl<O: RandomizationOracle> Finalizer<O> {
    pub fn with_oracle(oracle: O) -> Self {
        Self { oracle }
    }

    /// Prove that nothing reachable from `seq` is left to randomize.
    ///
    /// References are walked depth-first in body order, so the reported construct is
    /// the same on every run. Bound arguments, invoke arguments, operands and results
    /// whose types still hold a sequence family count as unrandomized.
    pub fn finalize(
        &self,
        graph: &SequenceGraph,
        ctx: &TypeContext,
        seq: &SubstitutedSequence,
    ) -> Result<RandomizedSequence, TypeError> {
        let root = graph.decl(seq.sequence());
        let mut walk = Walk {
            graph,
            ctx,
            oracle: &self.oracle,
            root: &root.name,
            marks: vec![Mark::Unvisited; graph.len()],
            frames: Vec::new(),
        };
        for (i, arg) in seq.args().iter().enumerate() {
            walk.check_value(*arg, || {
                format!("bound to parameter {i} of sequence '{}'", root.name)
            })?;
        }
        walk.run(root.id)?;
        debug!(sequence = %root.name, "sequence finalized");
        Ok(seq.randomized())
    }

    /// Finalize independent sequences in parallel. Results keep the input order.
    pub fn finalize_all(
        &self,
        graph: &SequenceGraph,
        ctx: &TypeContext,
        seqs: &[SubstitutedSequence],
    ) -> Vec<Result<RandomizedSequence, TypeError>> {
        seqs.par_iter()
            .map(|seq| self.finalize(graph, ctx, seq))
            .collect()
    }
}

/// Entry point shared by both stages that can be finalized.
pub trait Finalize {
    fn finalize_with<O: RandomizationOracle>(
        &self,
        finalizer: &Finalizer<O>,
        graph: &SequenceGraph,
        ctx: &TypeContext,
    ) -> Result<RandomizedSequence, TypeError>;
}

impl Finalize for SubstitutedSequence {
    fn finalize_with<O: RandomizationOracle>(
        &self,
        finalizer: &Finalizer<O>,
        graph: &SequenceGraph,
        ctx: &TypeContext,
    ) -> Result<RandomizedSequence, TypeError> {
        finalizer.finalize(graph, ctx, self)
    }
}

impl Finalize for RandomizedSequence {
    fn finalize_with<O: RandomizationOracle>(
        &self,
        _finalizer: &Finalizer<O>,
        _graph: &SequenceGraph,
        _ctx: &TypeContext,
    ) -> Result<RandomizedSequence, TypeError> {
        Ok(self.clone())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

struct Walk<'a, O> {
    graph: &'a SequenceGraph,
    ctx: &'a TypeContext,
    oracle: &'a O,
    root: &'a str,
    marks: Vec<Mark>,
    // Sequences in progress, outermost first, with the index of the next body node.
    frames: Vec<(SequenceId, usize)>,
}

impl<O: RandomizationOracle> Walk<'_, O> {
    fn run(&mut self, start: SequenceId) -> Result<(), TypeError> {
        let graph = self.graph;
        self.enter(start);
        while let Some((id, next)) = self.frames.pop() {
            let decl = graph.decl(id);
            let Some(node) = decl.body.get(next) else {
                self.marks[id.index()] = Mark::Done;
                continue;
            };
            self.frames.push((id, next + 1));
            trace!(sequence = %decl.name, node = ?node.kind, "finalize visit");

            if let Some(callee) = self.check_node(decl, node)? {
                match self.marks[callee.index()] {
                    Mark::Done => {}
                    Mark::InProgress => return Err(self.cycle_error(callee)),
                    Mark::Unvisited => self.enter(callee),
                }
            }
        }
        Ok(())
    }

    fn enter(&mut self, id: SequenceId) {
        self.marks[id.index()] = Mark::InProgress;
        self.frames.push((id, 0));
    }

    /// Reject `node` if it is still random, and return the sequence it leads into.
    fn check_node(&self, decl: &SequenceDecl, node: &Node) -> Result<Option<SequenceId>, TypeError> {
        match &node.kind {
            NodeKind::Op { name, operands } => {
                if self.oracle.is_randomizing(name) {
                    return Err(self.not_randomized(format!(
                        "randomization operation '{name}' in sequence '{}'",
                        decl.name
                    )));
                }
                for ty in operands {
                    self.check_value(*ty, || {
                        format!("used by operation '{name}' in sequence '{}'", decl.name)
                    })?;
                }
                if let Some(ty) = node.result {
                    self.check_value(ty, || {
                        format!("produced by operation '{name}' in sequence '{}'", decl.name)
                    })?;
                }
                Ok(None)
            }
            NodeKind::Invoke { callee, args } => {
                let target = self.graph.decl(*callee);
                if args.len() < target.params.len() {
                    let ty = node
                        .result
                        .map(|t| self.ctx.display(t))
                        .unwrap_or_else(|| "a sequence family".to_string());
                    return Err(self.not_randomized(format!(
                        "reference to sequence family '{}' of type {ty} in sequence '{}'",
                        target.name, decl.name
                    )));
                }
                for ty in args {
                    self.check_value(*ty, || {
                        format!("passed to sequence '{}' in sequence '{}'", target.name, decl.name)
                    })?;
                }
                Ok(Some(*callee))
            }
        }
    }

    /// A value whose type is, or nests, a sequence family still has a sequence to pick.
    fn check_value(&self, ty: TypeId, site: impl FnOnce() -> String) -> Result<(), TypeError> {
        let Some(family) = self.ctx.find_family(ty) else {
            return Ok(());
        };
        let construct = if family == ty {
            format!("sequence family of type {} {}", self.ctx.display(ty), site())
        } else {
            format!(
                "value of type {} holding sequence family {} {}",
                self.ctx.display(ty),
                self.ctx.display(family),
                site()
            )
        };
        Err(self.not_randomized(construct))
    }

    fn not_randomized(&self, construct: String) -> TypeError {
        TypeError::NotFullyRandomized {
            sequence: self.root.to_string(),
            construct,
        }
    }

    fn cycle_error(&self, id: SequenceId) -> TypeError {
        let start = self.frames.iter().position(|(s, _)| *s == id).unwrap_or(0);
        let cycle = self.frames[start..]
            .iter()
            .map(|(s, _)| *s)
            .chain(std::iter::once(id))
            .map(|s| self.graph.decl(s).name.clone())
            .collect();
        TypeError::CyclicSequenceReference { cycle }
    }
}
