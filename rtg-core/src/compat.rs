#![forbid(unsafe_code)]

use rtg_types::{ContainerType, ResourceType, TypeContext, TypeError, TypeId, TypeKind};

/// Structural equality. Interning makes this handle equality; the recursive form is kept
/// for comparing types across contexts.
pub fn structurally_equal(a_ctx: &TypeContext, a: TypeId, b_ctx: &TypeContext, b: TypeId) -> bool {
    let eq = |x: TypeId, y: TypeId| structurally_equal(a_ctx, x, b_ctx, y);
    let all_eq = |xs: &[TypeId], ys: &[TypeId]| {
        xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| eq(*x, *y))
    };
    match (a_ctx.kind(a), b_ctx.kind(b)) {
        (TypeKind::Index, TypeKind::Index) => true,
        (TypeKind::Integer { width: x }, TypeKind::Integer { width: y }) => x == y,
        (TypeKind::Resource(x), TypeKind::Resource(y)) => x == y,
        (TypeKind::Container(x), TypeKind::Container(y)) => match (x, y) {
            (ContainerType::Set(x), ContainerType::Set(y))
            | (ContainerType::Bag(x), ContainerType::Bag(y))
            | (ContainerType::Array(x), ContainerType::Array(y)) => eq(*x, *y),
            (ContainerType::Tuple(xs), ContainerType::Tuple(ys)) => all_eq(xs, ys),
            // Both sides are stored in canonical name order.
            (ContainerType::Dict(xs), ContainerType::Dict(ys)) => {
                xs.len() == ys.len()
                    && xs.iter().zip(ys).all(|(x, y)| x.name == y.name && eq(x.ty, y.ty))
            }
            _ => false,
        },
        (TypeKind::Sequence(x), TypeKind::Sequence(y)) => all_eq(&x.elements, &y.elements),
        (TypeKind::RandomizedSequence, TypeKind::RandomizedSequence) => true,
        _ => false,
    }
}

/// Whether a value of type `from` may be used where `to` is expected.
pub fn is_convertible(ctx: &TypeContext, from: TypeId, to: TypeId) -> bool {
    ctx.is_convertible(from, to)
}

pub fn check_operand(ctx: &TypeContext, expected: TypeId, actual: TypeId) -> Result<(), TypeError> {
    if is_convertible(ctx, actual, expected) {
        return Ok(());
    }
    if let (Some(e), Some(a)) = (ctx.resource(expected), ctx.resource(actual)) {
        return Err(resource_mismatch(e, a));
    }
    Err(TypeError::mismatch(ctx.display(expected), ctx.display(actual)))
}

fn resource_mismatch(expected: &ResourceType, actual: &ResourceType) -> TypeError {
    let what = match (expected, actual) {
        (ResourceType::Immediate { .. }, ResourceType::Immediate { .. }) => " (width differs)",
        (ResourceType::Memory { .. }, ResourceType::Memory { .. })
        | (ResourceType::MemoryBlock { .. }, ResourceType::MemoryBlock { .. }) => {
            " (address width differs)"
        }
        _ => "",
    };
    TypeError::mismatch(expected.display(), format!("{}{what}", actual.display()))
}

/// Accept `elem` as a member of the set, bag or array type `container`.
pub fn check_element(ctx: &TypeContext, container: TypeId, elem: TypeId) -> Result<(), TypeError> {
    let Some(expected) = ctx.element_type(container) else {
        let found = match ctx.container(container) {
            Some(c) => format!("{} type {}", c.kind_name(), ctx.display(container)),
            None => ctx.display(container),
        };
        return Err(TypeError::mismatch("a set, bag or array type", found));
    };
    check_operand(ctx, expected, elem)
}
