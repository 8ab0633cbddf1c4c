#[derive(Debug, Clone)]
pub enum CompileError {
    /// Source file could not be read from disk.
    Io { path: String, message: String },
    /// Lexing failed.
    Lex(String),
    /// Parsing failed.
    Parse(String),
}

impl CompileError {
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        CompileError::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn lex(message: impl Into<String>) -> Self {
        CompileError::Lex(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        CompileError::Parse(message.into())
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Io { path, message } => {
                write!(f, "compile error: cannot read '{}': {}", path, message)
            }
            CompileError::Lex(message) => write!(f, "compile error: lex error: {}", message),
            CompileError::Parse(message) => write!(f, "compile error: parse error: {}", message),
        }
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_display() {
        let err = CompileError::io("missing.fl", "No such file or directory");
        let msg = err.to_string();
        assert!(msg.contains("cannot read"));
        assert!(msg.contains("missing.fl"));
    }

    #[test]
    fn test_parse_display() {
        let err = CompileError::parse("1:3: expected expression");
        let msg = err.to_string();
        assert!(msg.contains("parse error"));
        assert!(msg.contains("1:3"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = CompileError::lex("bad character");
        let _: &dyn std::error::Error = &err;
    }
}
