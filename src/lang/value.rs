use serde::{Deserialize, Serialize};

/// Pre-bound namespace singletons.
///
/// Each namespace is reachable from script code through its nular name
/// (`globalnamespace` and friends). `Namespace::lookup` is the single source
/// of that binding; the VM and the fold registry both resolve through it, so
/// the two can never disagree on what a nular name means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Namespace {
    Global,
    Session,
    Parser,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Namespace::Global, Namespace::Session, Namespace::Parser];

    /// The nular name this namespace is bound to.
    pub fn nular_name(self) -> &'static str {
        match self {
            Namespace::Global => "globalnamespace",
            Namespace::Session => "sessionnamespace",
            Namespace::Parser => "parsernamespace",
        }
    }

    /// Resolve a nular name back to its namespace.
    pub fn lookup(name: &str) -> Option<Namespace> {
        Namespace::ALL.into_iter().find(|ns| ns.nular_name() == name)
    }
}

/// Runtime value in the flint language.
///
/// Values are the only data that can exist on the flint data stack, and the
/// only payload a `Push` instruction can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit floating-point number. flint has a single numeric type.
    Number(f64),

    /// Boolean value.
    Bool(bool),

    /// UTF-8 string value.
    Str(String),

    /// Array literal value: `[1, 2, 3]`.
    Array(Vec<Value>),

    /// One of the pre-bound namespace singletons.
    Namespace(Namespace),
}

impl Value {
    /// The numeric content of a scalar, if this is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Human-readable type name, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Namespace(_) => "namespace",
        }
    }
}

impl std::fmt::Display for Value {
    /// Format a value using flint surface syntax.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Namespace(ns) => write!(f, "{}", ns.nular_name()),
        }
    }
}
