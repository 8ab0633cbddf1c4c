//! # flint language core
//!
//! This module defines the runtime values and the Abstract Syntax Tree (AST)
//! for the flint language. The AST is produced by the parser and consumed by
//! the bytecode compiler.
//!
//! ## Documentation conventions
//!
//! - Stack effects are written as `( before -- after )`.
//! - `[ ... ]` denotes a flint array literal.

pub mod node;
pub mod program;
pub mod value;
