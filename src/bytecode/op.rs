use crate::lang::value::Value;
use serde::{Deserialize, Serialize};

// =============================================================================
// INSTR - Compiled instructions
// =============================================================================

/// A single instruction in a compiled flint script.
///
/// Scripts compile to a flat stream of these; there is no control flow, so
/// every instruction executes exactly once, left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instr {
    /// Statement separator, emitted between top-level statements. The VM
    /// clears its value stack here; never an operand of anything.
    ///
    /// Stack effect: `( ... -- )`
    EndStatement,

    /// Push a literal value.
    ///
    /// Stack effect: `( -- x )`
    Push(Value),

    /// Apply the named unary operator to the top of the stack.
    ///
    /// Stack effect: `( x -- op x )`
    CallUnary(String),

    /// Apply the named binary operator to the top two stack values.
    ///
    /// Stack effect: `( a b -- a op b )`
    CallBinary(String),

    /// Pop a value into a variable. `local` selects current-scope definition
    /// over outer assignment.
    ///
    /// Stack effect: `( x -- )`
    Assign { name: String, local: bool },

    /// Read a variable. Ambiguous on purpose: this is either a nular-constant
    /// lookup (`globalnamespace`) or a true variable read; only registry
    /// membership downstream tells the two apart.
    ///
    /// Stack effect: `( -- x )`
    GetVariable(String),

    /// Build an array from the top `n` stack values, in push order.
    ///
    /// Stack effect: `( x1 .. xn -- [x1 .. xn] )`
    MakeArray(usize),
}
