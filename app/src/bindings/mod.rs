// Generated by contract-binding-codegen. Do not edit.

pub mod yo;

pub use test::Test;
pub use yo::Yo;
