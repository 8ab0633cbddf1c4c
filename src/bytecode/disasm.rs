use crate::bytecode::ir::ScriptBc;
use crate::bytecode::op::Instr;
use crate::lang::value::Value;

/// Print disassembly of a compiled script.
pub fn print_bc(bc: &ScriptBc) {
    println!("════════════════════════════════════════");
    println!(" script");
    println!(" {} instructions", bc.instrs.len());
    println!("════════════════════════════════════════");
    print!("{}", disassemble_to_string(&bc.instrs));
}

/// Return disassembly as a String (for testing/logging).
pub fn disassemble_to_string(instrs: &[Instr]) -> String {
    let mut output = String::new();
    for (ip, instr) in instrs.iter().enumerate() {
        output.push_str(&format!("{:04}   {}\n", ip, format_instr(instr)));
    }
    output
}

fn format_instr(instr: &Instr) -> String {
    match instr {
        Instr::EndStatement => "END".to_string(),
        Instr::Push(v) => format!("PUSH        {}", format_value(v)),
        Instr::CallUnary(name) => format!("CALL_UNARY  \"{}\"", name),
        Instr::CallBinary(name) => format!("CALL_BINARY \"{}\"", name),
        Instr::Assign { name, local: true } => format!("ASSIGN_LOC  \"{}\"", name),
        Instr::Assign { name, local: false } => format!("ASSIGN      \"{}\"", name),
        Instr::GetVariable(name) => format!("GET_VAR     \"{}\"", name),
        Instr::MakeArray(n) => format!("MAKE_ARRAY  {}", n),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("{}", n),
        Value::Bool(b) => format!("{}", b),
        Value::Str(s) => format!("{:?}", s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Namespace(ns) => ns.nular_name().to_string(),
    }
}
