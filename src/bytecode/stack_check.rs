use crate::bytecode::op::Instr;

#[derive(Debug)]
pub struct StackCheckError {
    pub message: String,
}

impl std::fmt::Display for StackCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stack-check error: {}", self.message)
    }
}

impl StackCheckError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Returns (pops, pushes) for an instruction.
///
/// `EndStatement` is handled by the caller (it clears the stack rather than
/// popping a fixed amount).
fn effect(instr: &Instr) -> (usize, usize) {
    match instr {
        Instr::Push(_) | Instr::GetVariable(_) => (0, 1),
        Instr::CallUnary(_) => (1, 1),
        Instr::CallBinary(_) => (2, 1),
        Instr::Assign { .. } => (1, 0),
        Instr::MakeArray(n) => (*n, 1),
        Instr::EndStatement => (0, 0),
    }
}

/// Check stack effects over a full instruction stream.
///
/// The instruction set has no jumps, so this linear scan is exact, not an
/// approximation: a stream that passes cannot underflow the VM.
pub fn check_instrs(instrs: &[Instr]) -> Result<(), StackCheckError> {
    let mut height: usize = 0;

    for (ip, instr) in instrs.iter().enumerate() {
        if matches!(instr, Instr::EndStatement) {
            // The VM clears its stack at statement boundaries.
            height = 0;
            continue;
        }

        let (pops, pushes) = effect(instr);
        if height < pops {
            return Err(StackCheckError::new(format!(
                "stack underflow at ip={}, instr={:?}, needed {} items",
                ip, instr, pops
            )));
        }
        height = height - pops + pushes;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::value::Value;

    fn push(n: f64) -> Instr {
        Instr::Push(Value::Number(n))
    }

    #[test]
    fn test_simple_ops() {
        let instrs = vec![push(1.0), push(2.0), Instr::CallBinary("+".to_string())];
        assert!(check_instrs(&instrs).is_ok());
    }

    #[test]
    fn test_underflow() {
        let instrs = vec![Instr::CallBinary("+".to_string())];
        let result = check_instrs(&instrs);
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("underflow"));
    }

    #[test]
    fn test_unary_needs_one() {
        let instrs = vec![Instr::CallUnary("sqrt".to_string())];
        assert!(check_instrs(&instrs).is_err());
    }

    #[test]
    fn test_make_array_pops_its_size() {
        let instrs = vec![push(1.0), push(2.0), Instr::MakeArray(2)];
        assert!(check_instrs(&instrs).is_ok());

        let instrs = vec![push(1.0), Instr::MakeArray(2)];
        assert!(check_instrs(&instrs).is_err());
    }

    #[test]
    fn test_make_array_zero_pushes_one() {
        let instrs = vec![Instr::MakeArray(0), Instr::CallUnary("count".to_string())];
        assert!(check_instrs(&instrs).is_ok());
    }

    #[test]
    fn test_assignment_pops_one() {
        let instrs = vec![
            push(1.0),
            Instr::Assign {
                name: "x".to_string(),
                local: true,
            },
        ];
        assert!(check_instrs(&instrs).is_ok());

        let instrs = vec![Instr::Assign {
            name: "x".to_string(),
            local: false,
        }];
        assert!(check_instrs(&instrs).is_err());
    }

    #[test]
    fn test_end_statement_resets_height() {
        // The value left by statement one is gone after the separator.
        let instrs = vec![
            push(1.0),
            Instr::EndStatement,
            Instr::CallUnary("sqrt".to_string()),
        ];
        assert!(check_instrs(&instrs).is_err());
    }
}
