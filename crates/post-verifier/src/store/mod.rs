//! Storage adapters for the workflow repository ports.

pub mod memory;

pub use memory::MemoryStore;
