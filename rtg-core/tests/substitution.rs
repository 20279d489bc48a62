use proptest::prelude::*;
use rtg_core::Staged;
use rtg_ir::SequenceGraph;
use rtg_types::{TypeContext, TypeError, TypeId};

/// A small pool of distinct parameter types.
fn pool(ctx: &mut TypeContext) -> Vec<TypeId> {
    let label = ctx.label();
    vec![
        ctx.index(),
        label,
        ctx.immediate(12).unwrap(),
        ctx.immediate(32).unwrap(),
        ctx.memory_block(32).unwrap(),
        ctx.set(label),
    ]
}

proptest! {
    #[test]
    fn in_order_substitution_always_completes(picks in prop::collection::vec(0usize..6, 1..8)) {
        let mut ctx = TypeContext::new();
        let tys = pool(&mut ctx);
        let params: Vec<TypeId> = picks.iter().map(|i| tys[*i]).collect();

        let mut graph = SequenceGraph::new();
        let seq = graph.declare("seq", params.clone()).unwrap();
        let family = Staged::get(&graph, &mut ctx, seq).into_family().unwrap();

        let mut staged = Staged::Family(family);
        for (n, p) in params.iter().enumerate() {
            let Staged::Family(f) = staged else {
                return Err(TestCaseError::fail(format!("substituted after {n} of {}", params.len())));
            };
            prop_assert_eq!(f.pending(&ctx), &params[n..]);
            staged = f.substitute(&mut ctx, *p).unwrap();
        }
        let done = staged.into_substituted().unwrap();
        prop_assert_eq!(done.args(), &params[..]);
    }

    #[test]
    fn wrong_argument_fails_at_its_position(
        picks in prop::collection::vec(0usize..6, 1..8),
        bad_at in any::<prop::sample::Index>(),
        shift in 1usize..6,
    ) {
        let mut ctx = TypeContext::new();
        let tys = pool(&mut ctx);
        let params: Vec<TypeId> = picks.iter().map(|i| tys[*i]).collect();
        let bad = bad_at.index(params.len());
        let mut args = params.clone();
        args[bad] = tys[(picks[bad] + shift) % tys.len()];

        let mut graph = SequenceGraph::new();
        let seq = graph.declare("seq", params.clone()).unwrap();
        let family = Staged::get(&graph, &mut ctx, seq).into_family().unwrap();

        // Everything before the bad position is accepted.
        if bad > 0 {
            let partial = family.substitute_all(&mut ctx, args[..bad].iter().copied());
            prop_assert!(partial.is_ok());
        }
        let err = family.substitute_all(&mut ctx, args.iter().copied()).unwrap_err();
        let is_mismatch = matches!(err, TypeError::TypeMismatch { .. });
        prop_assert!(is_mismatch);
    }
}
