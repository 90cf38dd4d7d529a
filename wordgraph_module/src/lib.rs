//! The bigram transition graph learned from a Han corpus (spec.md §3, §4.2),
//! plus the lazy corpus reader that feeds it.

mod loader;
mod graph;

pub use graph::{WordGraph, WordNode};
pub use loader::WordLoader;
