pub mod engine; // Scheduled-automation graph implementation
pub mod graph; // Audio-graph service traits
pub mod voice; // Triggerable voice abstractions

pub const MAX_BLOCK_SIZE: usize = 2048;
