//! Command-line console for the `Test` and `Yo` contracts.
//!
//! [`bindings`] is generated by `contract-binding-codegen` from the artifacts
//! under `artifacts/` (see `codegen.toml`); [`commands`] drives them.

pub mod bindings;
pub mod commands;
pub mod config;
pub mod console;

pub use commands::{Command, Session};
pub use config::Config;
pub use console::Console;
