//! Adapters Layer
//!
//! Node tree implementations the loader can run against.

pub mod memory_tree;

pub use memory_tree::MemoryTree;
