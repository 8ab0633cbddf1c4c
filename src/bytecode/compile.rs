use std::path::Path;

use crate::bytecode::{compile_error::CompileError, ir::ScriptBc, op::Instr};
use crate::lang::{
    node::{Expr, Stmt},
    program::Program,
    value::Value,
};
use crate::lexer::Lexer;
use crate::parser::Parser;

/// Read, lex, parse and compile a script file.
pub fn compile_from_file(path: &Path) -> Result<ScriptBc, CompileError> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| CompileError::io(path.display().to_string(), e.to_string()))?;
    compile_source(&source)
}

/// Lex, parse and compile a source string.
pub fn compile_source(source: &str) -> Result<ScriptBc, CompileError> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer
        .tokenize()
        .map_err(|e| CompileError::lex(e.to_string()))?;

    let mut parser = Parser::new(tokens);
    let program = parser
        .parse()
        .map_err(|e| CompileError::parse(e.to_string()))?;

    Ok(compile_program(&program))
}

/// Compile an already-parsed program into a flat instruction stream.
///
/// Emission is post-order: operands first, then the instruction that consumes
/// them, so every operator's operands are the instructions immediately before
/// it. `EndStatement` separates consecutive statements.
pub fn compile_program(program: &Program) -> ScriptBc {
    let mut instrs = Vec::new();

    for (i, stmt) in program.statements.iter().enumerate() {
        if i > 0 {
            instrs.push(Instr::EndStatement);
        }
        compile_stmt(stmt, &mut instrs);
    }

    ScriptBc { instrs }
}

fn compile_stmt(stmt: &Stmt, out: &mut Vec<Instr>) {
    match stmt {
        Stmt::Assign { name, local, expr } => {
            compile_expr(expr, out);
            out.push(Instr::Assign {
                name: name.clone(),
                local: *local,
            });
        }
        Stmt::Expr(expr) => compile_expr(expr, out),
    }
}

fn compile_expr(expr: &Expr, out: &mut Vec<Instr>) {
    match expr {
        Expr::Number(n) => out.push(Instr::Push(Value::Number(*n))),
        Expr::Str(s) => out.push(Instr::Push(Value::Str(s.clone()))),
        Expr::Bool(b) => out.push(Instr::Push(Value::Bool(*b))),
        Expr::Array(elements) => {
            for element in elements {
                compile_expr(element, out);
            }
            out.push(Instr::MakeArray(elements.len()));
        }
        Expr::Variable(name) => out.push(Instr::GetVariable(name.clone())),
        Expr::Unary { op, expr } => {
            compile_expr(expr, out);
            out.push(Instr::CallUnary(op.name().to_string()));
        }
        Expr::Binary { op, lhs, rhs } => {
            compile_expr(lhs, out);
            compile_expr(rhs, out);
            out.push(Instr::CallBinary(op.name().to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::value::Value;

    fn compiled(source: &str) -> Vec<Instr> {
        compile_source(source).unwrap().instrs
    }

    #[test]
    fn test_literal() {
        assert_eq!(compiled("42"), vec![Instr::Push(Value::Number(42.0))]);
    }

    #[test]
    fn test_unary_postorder() {
        assert_eq!(
            compiled("sqrt 16"),
            vec![
                Instr::Push(Value::Number(16.0)),
                Instr::CallUnary("sqrt".to_string()),
            ]
        );
    }

    #[test]
    fn test_binary_postorder() {
        assert_eq!(
            compiled("7 mod 3"),
            vec![
                Instr::Push(Value::Number(7.0)),
                Instr::Push(Value::Number(3.0)),
                Instr::CallBinary("mod".to_string()),
            ]
        );
    }

    #[test]
    fn test_array_elements_precede_make_array() {
        assert_eq!(
            compiled("[1, x]"),
            vec![
                Instr::Push(Value::Number(1.0)),
                Instr::GetVariable("x".to_string()),
                Instr::MakeArray(2),
            ]
        );
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(compiled("[]"), vec![Instr::MakeArray(0)]);
    }

    #[test]
    fn test_end_statement_between_statements() {
        assert_eq!(
            compiled("1; 2"),
            vec![
                Instr::Push(Value::Number(1.0)),
                Instr::EndStatement,
                Instr::Push(Value::Number(2.0)),
            ]
        );
    }

    #[test]
    fn test_no_trailing_end_statement() {
        let instrs = compiled("1; 2;");
        assert_eq!(instrs.last(), Some(&Instr::Push(Value::Number(2.0))));
    }

    #[test]
    fn test_assignment() {
        assert_eq!(
            compiled("local x = 5"),
            vec![
                Instr::Push(Value::Number(5.0)),
                Instr::Assign {
                    name: "x".to_string(),
                    local: true,
                },
            ]
        );
    }

    #[test]
    fn test_nested_expression() {
        // (1 + 2) * 3 => 1 2 + 3 *
        assert_eq!(
            compiled("(1 + 2) * 3"),
            vec![
                Instr::Push(Value::Number(1.0)),
                Instr::Push(Value::Number(2.0)),
                Instr::CallBinary("+".to_string()),
                Instr::Push(Value::Number(3.0)),
                Instr::CallBinary("*".to_string()),
            ]
        );
    }

    #[test]
    fn test_compile_from_file_missing() {
        let err = compile_from_file(Path::new("definitely/not/here.fl")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
