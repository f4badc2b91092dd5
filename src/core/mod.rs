//! Core library components.
//!
//! Traversal, path reconstruction, authentication and the backends they
//! run against. Nothing in here writes to the terminal.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod domain;
pub mod engine;
pub mod fs;
pub mod prompt;
pub mod session;
pub mod sink;
pub mod store;
pub mod tree;
pub mod walker;
