//! Service adapters that live inside the process.

pub mod in_memory;

pub use in_memory::InMemorySessionService;
