#![forbid(unsafe_code)]

use crate::error::TypeError;

/// ISA-facing resource handles.
///
/// These only carry what type checking needs. How an immediate is encoded or how a
/// memory block is carved out of an address space is decided downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceType {
    Label,
    Immediate { width: u32 },
    Memory { address_width: u32 },
    MemoryBlock { address_width: u32 },
}

impl ResourceType {
    pub fn label() -> Self {
        ResourceType::Label
    }

    pub fn immediate(width: u32) -> Result<Self, TypeError> {
        ResourceType::Immediate { width }.validate()
    }

    pub fn memory(address_width: u32) -> Result<Self, TypeError> {
        ResourceType::Memory { address_width }.validate()
    }

    pub fn memory_block(address_width: u32) -> Result<Self, TypeError> {
        ResourceType::MemoryBlock { address_width }.validate()
    }

    /// Rejects zero-valued parameters. Variants are public, so interning runs this again.
    pub fn validate(self) -> Result<Self, TypeError> {
        let ok = match self {
            ResourceType::Label => true,
            ResourceType::Immediate { width } => width > 0,
            ResourceType::Memory { address_width }
            | ResourceType::MemoryBlock { address_width } => address_width > 0,
        };
        if ok {
            Ok(self)
        } else {
            Err(TypeError::InvalidWidth {
                kind: self.kind_name(),
                param: match self {
                    ResourceType::Immediate { .. } => "width",
                    _ => "address width",
                },
            })
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ResourceType::Label => "label",
            ResourceType::Immediate { .. } => "immediate",
            ResourceType::Memory { .. } => "memory",
            ResourceType::MemoryBlock { .. } => "memory block",
        }
    }

    pub fn width(&self) -> Option<u32> {
        match self {
            ResourceType::Immediate { width } => Some(*width),
            _ => None,
        }
    }

    pub fn address_width(&self) -> Option<u32> {
        match self {
            ResourceType::Memory { address_width } | ResourceType::MemoryBlock { address_width } => {
                Some(*address_width)
            }
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            ResourceType::Label => "!rtg.isa.label".to_string(),
            ResourceType::Immediate { width } => format!("!rtg.isa.immediate<{width}>"),
            ResourceType::Memory { address_width } => format!("!rtg.isa.memory<{address_width}>"),
            ResourceType::MemoryBlock { address_width } => {
                format!("!rtg.isa.memory_block<{address_width}>")
            }
        }
    }
}
