use std::collections::HashMap;

use crate::bytecode::ir::ScriptBc;
use crate::bytecode::op::Instr;
use crate::lang::value::{Namespace, Value};
use crate::runtime::runtime_error::RuntimeError;

/// Stack VM over compiled flint scripts.
///
/// Execution is a straight left-to-right walk of the instruction stream;
/// there is no control flow. Variable reads resolve nular names first (the
/// namespace singletons are effectively reserved), then the local scope,
/// then globals. `run` returns the value of the final statement, if any.
pub struct Vm {
    stack: Vec<Value>,
    globals: HashMap<String, Value>,
    locals: HashMap<String, Value>,
}

impl Vm {
    pub fn new() -> Self {
        Vm {
            stack: Vec::new(),
            globals: HashMap::new(),
            locals: HashMap::new(),
        }
    }

    /// Execute a script; returns the final statement's value.
    pub fn run(&mut self, bc: &ScriptBc) -> Result<Option<Value>, RuntimeError> {
        for instr in &bc.instrs {
            self.step(instr)?;
        }
        Ok(self.stack.last().cloned())
    }

    fn step(&mut self, instr: &Instr) -> Result<(), RuntimeError> {
        match instr {
            Instr::EndStatement => {
                self.stack.clear();
            }
            Instr::Push(value) => {
                self.stack.push(value.clone());
            }
            Instr::GetVariable(name) => {
                let value = self.read_variable(name)?;
                self.stack.push(value);
            }
            Instr::Assign { name, local } => {
                let value = self.pop(instr)?;
                if *local {
                    self.locals.insert(name.clone(), value);
                } else if let Some(slot) = self.locals.get_mut(name) {
                    *slot = value;
                } else {
                    self.globals.insert(name.clone(), value);
                }
            }
            Instr::MakeArray(size) => {
                if self.stack.len() < *size {
                    return Err(RuntimeError::new(format!(
                        "stack underflow building array of {} elements",
                        size
                    )));
                }
                let elements = self.stack.split_off(self.stack.len() - size);
                self.stack.push(Value::Array(elements));
            }
            Instr::CallUnary(name) => {
                let operand = self.pop(instr)?;
                let result = apply_unary(name, operand)?;
                self.stack.push(result);
            }
            Instr::CallBinary(name) => {
                let right = self.pop(instr)?;
                let left = self.pop(instr)?;
                let result = apply_binary(name, left, right)?;
                self.stack.push(result);
            }
        }
        Ok(())
    }

    fn pop(&mut self, instr: &Instr) -> Result<Value, RuntimeError> {
        self.stack
            .pop()
            .ok_or_else(|| RuntimeError::new(format!("stack underflow at {:?}", instr)))
    }

    fn read_variable(&self, name: &str) -> Result<Value, RuntimeError> {
        if let Some(ns) = Namespace::lookup(name) {
            return Ok(Value::Namespace(ns));
        }
        if let Some(value) = self.locals.get(name) {
            return Ok(value.clone());
        }
        if let Some(value) = self.globals.get(name) {
            return Ok(value.clone());
        }
        Err(RuntimeError::new(format!("undefined variable '{}'", name)))
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

fn number(op: &str, value: &Value) -> Result<f64, RuntimeError> {
    value.as_number().ok_or_else(|| {
        RuntimeError::new(format!("{} expects a number, got {}", op, value.type_name()))
    })
}

fn apply_unary(name: &str, operand: Value) -> Result<Value, RuntimeError> {
    match name {
        "-" => Ok(Value::Number(-number(name, &operand)?)),
        // sqrt of a negative number yields NaN, like every other f64 edge
        "sqrt" => Ok(Value::Number(number(name, &operand)?.sqrt())),
        "abs" => Ok(Value::Number(number(name, &operand)?.abs())),
        "floor" => Ok(Value::Number(number(name, &operand)?.floor())),
        "ceil" => Ok(Value::Number(number(name, &operand)?.ceil())),
        "str" => Ok(Value::Str(operand.to_string())),
        "count" => match operand {
            Value::Array(items) => Ok(Value::Number(items.len() as f64)),
            Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
            other => Err(RuntimeError::new(format!(
                "count expects an array or string, got {}",
                other.type_name()
            ))),
        },
        _ => Err(RuntimeError::new(format!(
            "unknown unary operator '{}'",
            name
        ))),
    }
}

fn apply_binary(name: &str, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match name {
        "+" => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
            (Value::Array(mut a), Value::Array(b)) => {
                a.extend(b);
                Ok(Value::Array(a))
            }
            (l, r) => Err(RuntimeError::new(format!(
                "cannot add {} and {}",
                l.type_name(),
                r.type_name()
            ))),
        },
        "-" | "*" | "/" | "mod" | "min" | "max" => {
            let a = number(name, &left)?;
            let b = number(name, &right)?;
            Ok(Value::Number(match name {
                "-" => a - b,
                "*" => a * b,
                "/" => a / b,
                "mod" => a % b,
                "min" => a.min(b),
                "max" => a.max(b),
                _ => unreachable!(),
            }))
        }
        _ => Err(RuntimeError::new(format!(
            "unknown binary operator '{}'",
            name
        ))),
    }
}
