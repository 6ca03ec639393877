//! Shared helpers: tool lookup, paths and terminal output

pub mod paths;
pub mod terminal;
pub mod tools;
