use super::node::Stmt;

/// Parsed flint program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Top-level statements, in source order.
    pub statements: Vec<Stmt>,
}
