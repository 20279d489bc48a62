#![forbid(unsafe_code)]

//! Interned value-level types for randomized test-program generation: ISA resource
//! handles, containers, and staged sequence types.

mod container;
mod context;
mod error;
mod resource;
mod sequence;

pub use container::{ContainerType, DictEntry};
pub use context::{TypeContext, TypeId, TypeKind};
pub use error::TypeError;
pub use resource::ResourceType;
pub use sequence::SequenceType;
