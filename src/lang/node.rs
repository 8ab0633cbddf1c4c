/// Named unary operators.
///
/// Operators are compiled to `CallUnary` instructions carrying the operator
/// name, so the enum and its `name` mapping are the full list of unary
/// surface operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation: `-x`.
    Neg,
    /// Square root: `sqrt x`.
    Sqrt,
    /// Absolute value: `abs x`.
    Abs,
    /// Round towards negative infinity: `floor x`.
    Floor,
    /// Round towards positive infinity: `ceil x`.
    Ceil,
    /// String conversion: `str x`.
    Str,
    /// Element or character count: `count x`.
    Count,
}

impl UnaryOp {
    /// Operator name as carried by the compiled instruction.
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Abs => "abs",
            UnaryOp::Floor => "floor",
            UnaryOp::Ceil => "ceil",
            UnaryOp::Str => "str",
            UnaryOp::Count => "count",
        }
    }
}

/// Named binary operators, lowest precedence first: `min`/`max`, then
/// `+`/`-`, then `*`/`/`/`mod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
}

impl BinaryOp {
    /// Operator name as carried by the compiled instruction.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "mod",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
        }
    }
}

/// Expression node in the flint AST.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),

    /// String literal.
    Str(String),

    /// Boolean literal.
    Bool(bool),

    /// Array literal: `[e1, e2, ...]`.
    Array(Vec<Expr>),

    /// Variable read. Also how nular names like `globalnamespace` appear in
    /// the AST; the distinction only exists downstream.
    Variable(String),

    /// Unary operator application.
    Unary { op: UnaryOp, expr: Box<Expr> },

    /// Binary operator application.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// Statement node in the flint AST.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Variable assignment. `local` selects current-scope definition over
    /// outer assignment.
    Assign {
        name: String,
        local: bool,
        expr: Expr,
    },

    /// A bare expression evaluated for its value.
    Expr(Expr),
}
