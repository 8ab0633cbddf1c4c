use std::collections::HashMap;

use crate::bytecode::op::Instr;
use crate::bytecode::optimize::{const_value, is_const};
use crate::lang::value::{Namespace, Value};

/// A registered unary fold: a pure function over one constant operand.
///
/// `consumed` is the number of preceding instructions elided when the fold
/// fires; unary handlers always consume exactly 1 (the operand).
pub struct UnaryFold {
    pub consumed: usize,
    apply: fn(&Value) -> Option<Value>,
}

/// A registered binary fold; consumes exactly 2 (both operands).
pub struct BinaryFold {
    pub consumed: usize,
    apply: fn(&Value, &Value) -> Option<Value>,
}

/// The table of compile-time-known bindings: pre-bound nular constants plus
/// pure unary/binary fold handlers, keyed by operator name.
///
/// Built once per scripting context and never mutated during optimization,
/// so a `&FoldRegistry` can be shared across any number of optimizer runs
/// over independent streams.
///
/// Every registered handler MUST be pure: deterministic for identical input
/// and free of observable side effects. A folded call is never executed, so
/// an impure handler silently changes program behaviour. This is a caller
/// contract, not something the registry can check.
pub struct FoldRegistry {
    nulars: HashMap<String, Value>,
    unary: HashMap<String, UnaryFold>,
    binary: HashMap<String, BinaryFold>,
}

impl FoldRegistry {
    /// An empty registry: nothing folds.
    pub fn new() -> Self {
        FoldRegistry {
            nulars: HashMap::new(),
            unary: HashMap::new(),
            binary: HashMap::new(),
        }
    }

    /// Registry covering the foldable subset of the built-in operators.
    ///
    /// Handlers accept numbers only; the string and array overloads of `+`,
    /// and conversions like `str`/`count`, are left to the runtime.
    pub fn with_builtins() -> Self {
        let mut reg = FoldRegistry::new();

        for ns in Namespace::ALL {
            reg.register_nular(ns.nular_name(), Value::Namespace(ns));
        }

        reg.register_unary("sqrt", fold_sqrt);
        reg.register_unary("abs", fold_abs);
        reg.register_unary("floor", fold_floor);
        reg.register_unary("ceil", fold_ceil);
        reg.register_unary("-", fold_neg);

        reg.register_binary("mod", fold_mod);
        reg.register_binary("min", fold_min);
        reg.register_binary("max", fold_max);
        reg.register_binary("+", fold_add);
        reg.register_binary("-", fold_sub);
        reg.register_binary("*", fold_mul);
        reg.register_binary("/", fold_div);

        reg
    }

    /// Bind `name` to a compile-time constant.
    pub fn register_nular(&mut self, name: &str, value: Value) {
        self.nulars.insert(name.to_string(), value);
    }

    /// Register a pure unary fold handler for `name`.
    pub fn register_unary(&mut self, name: &str, apply: fn(&Value) -> Option<Value>) {
        self.unary
            .insert(name.to_string(), UnaryFold { consumed: 1, apply });
    }

    /// Register a pure binary fold handler for `name`.
    pub fn register_binary(&mut self, name: &str, apply: fn(&Value, &Value) -> Option<Value>) {
        self.binary
            .insert(name.to_string(), BinaryFold { consumed: 2, apply });
    }

    pub fn has_nular(&self, name: &str) -> bool {
        self.nulars.contains_key(name)
    }

    #[allow(dead_code)]
    pub fn has_unary(&self, name: &str) -> bool {
        self.unary.contains_key(name)
    }

    #[allow(dead_code)]
    pub fn has_binary(&self, name: &str) -> bool {
        self.binary.contains_key(name)
    }

    pub fn nular_value(&self, name: &str) -> Option<&Value> {
        self.nulars.get(name)
    }

    /// Attempt to fold a unary call over the instruction that produces its
    /// operand.
    ///
    /// Guarded twice: the operand instruction must itself be constant, and
    /// the handler must accept the operand value's type. Either failure
    /// returns `None` and the call stays in the stream for the runtime.
    /// On success, returns how many preceding instructions die plus the
    /// replacement value.
    pub fn try_fold_unary(&self, name: &str, operand: &Instr) -> Option<(usize, Value)> {
        let fold = self.unary.get(name)?;
        if !is_const(self, operand) {
            return None;
        }
        let value = (fold.apply)(&const_value(self, operand))?;
        Some((fold.consumed, value))
    }

    /// Attempt to fold a binary call over its two operand instructions.
    /// Same double guard as [`FoldRegistry::try_fold_unary`].
    pub fn try_fold_binary(&self, name: &str, left: &Instr, right: &Instr) -> Option<(usize, Value)> {
        let fold = self.binary.get(name)?;
        if !is_const(self, left) || !is_const(self, right) {
            return None;
        }
        let value = (fold.apply)(&const_value(self, left), &const_value(self, right))?;
        Some((fold.consumed, value))
    }
}

impl Default for FoldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Built-in handlers
// =============================================================================

fn fold_sqrt(v: &Value) -> Option<Value> {
    match v {
        // Negative input is left for the runtime (which yields NaN); the
        // folder never bakes a NaN into the stream.
        Value::Number(n) if *n >= 0.0 => Some(Value::Number(n.sqrt())),
        _ => None,
    }
}

fn fold_abs(v: &Value) -> Option<Value> {
    Some(Value::Number(v.as_number()?.abs()))
}

fn fold_floor(v: &Value) -> Option<Value> {
    Some(Value::Number(v.as_number()?.floor()))
}

fn fold_ceil(v: &Value) -> Option<Value> {
    Some(Value::Number(v.as_number()?.ceil()))
}

fn fold_neg(v: &Value) -> Option<Value> {
    Some(Value::Number(-v.as_number()?))
}

fn fold_mod(a: &Value, b: &Value) -> Option<Value> {
    // f64 remainder keeps the sign of the dividend, matching the runtime.
    Some(Value::Number(a.as_number()? % b.as_number()?))
}

fn fold_min(a: &Value, b: &Value) -> Option<Value> {
    Some(Value::Number(a.as_number()?.min(b.as_number()?)))
}

fn fold_max(a: &Value, b: &Value) -> Option<Value> {
    Some(Value::Number(a.as_number()?.max(b.as_number()?)))
}

fn fold_add(a: &Value, b: &Value) -> Option<Value> {
    // Number-only: string and array concatenation stay runtime concerns.
    Some(Value::Number(a.as_number()? + b.as_number()?))
}

fn fold_sub(a: &Value, b: &Value) -> Option<Value> {
    Some(Value::Number(a.as_number()? - b.as_number()?))
}

fn fold_mul(a: &Value, b: &Value) -> Option<Value> {
    Some(Value::Number(a.as_number()? * b.as_number()?))
}

fn fold_div(a: &Value, b: &Value) -> Option<Value> {
    Some(Value::Number(a.as_number()? / b.as_number()?))
}
