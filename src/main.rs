mod bytecode;
mod lang;
mod lexer;
mod parser;
mod parser_error;
mod runtime;
mod token;

use std::{env, fs, path::Path, process};

use crate::bytecode::compile::compile_from_file;
use crate::bytecode::disasm::print_bc;
use crate::bytecode::fold::FoldRegistry;
use crate::bytecode::ir::ScriptBc;
use crate::bytecode::optimize::optimize;
use crate::bytecode::stack_check::check_instrs;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::runtime::vm::Vm;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut tokens_only = false;
    let mut ast_only = false;
    let mut bc_dump = false;
    let mut no_opt = false;
    let mut emit: Option<String> = None;
    let mut filename: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--tokens" => tokens_only = true,
            "--ast" => ast_only = true,
            "--bc" | "--bytecode" => bc_dump = true,
            "--no-opt" => no_opt = true,
            "--emit" => match iter.next() {
                Some(path) => emit = Some(path.clone()),
                None => {
                    eprintln!("--emit requires an output path");
                    process::exit(1);
                }
            },
            "--help" | "-h" => {
                print_usage();
                return;
            }
            flag if flag.starts_with('-') => {
                eprintln!("unknown option: {}", flag);
                process::exit(1);
            }
            _ => filename = Some(arg.clone()),
        }
    }

    let Some(filename) = filename else {
        print_usage();
        return;
    };

    if tokens_only {
        dump_tokens(&read_source(&filename));
        return;
    }
    if ast_only {
        dump_ast(&read_source(&filename));
        return;
    }

    let mut bc = load_script(&filename);

    if !no_opt {
        let folds = FoldRegistry::with_builtins();
        optimize(&folds, &mut bc.instrs);
    }

    if let Err(e) = check_instrs(&bc.instrs) {
        eprintln!("internal error: {}", e);
        process::exit(1);
    }

    if let Some(out) = emit {
        emit_image(&bc, &out);
        return;
    }

    if bc_dump {
        print_bc(&bc);
        return;
    }

    let mut vm = Vm::new();
    match vm.run(&bc) {
        Ok(Some(value)) => println!("{}", value),
        Ok(None) => {}
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("FLINT - straight-line scripting language");
    println!();
    println!("Usage:");
    println!("  flint <file.fl>           Compile, fold constants and run a script");
    println!("  flint <file.flb>          Run a compiled bytecode image");
    println!("  flint --tokens <file.fl>  Show lexed tokens only");
    println!("  flint --ast <file.fl>     Show parsed program only");
    println!("  flint --bc <file.fl>      Show (optimized) bytecode, do not run");
    println!("  flint --no-opt <file.fl>  Skip the constant folder");
    println!("  flint --emit <out.flb> <file.fl>");
    println!("                            Write a compiled bytecode image");
    println!("  flint --help, -h          Show this help");
}

fn read_source(filename: &str) -> String {
    match fs::read_to_string(filename) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read '{}': {}", filename, e);
            process::exit(1);
        }
    }
}

fn dump_tokens(source: &str) {
    let mut lexer = Lexer::new(source);
    match lexer.tokenize() {
        Ok(tokens) => {
            for spanned in tokens {
                println!(
                    "{}:{}\t{:?}",
                    spanned.span.line, spanned.span.col, spanned.token
                );
            }
        }
        Err(e) => {
            eprintln!("Lexer error: {}", e);
            process::exit(1);
        }
    }
}

fn dump_ast(source: &str) {
    let mut lexer = Lexer::new(source);
    let tokens = match lexer.tokenize() {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("Lexer error: {}", e);
            process::exit(1);
        }
    };
    let mut parser = Parser::new(tokens);
    match parser.parse() {
        Ok(program) => println!("{:#?}", program),
        Err(e) => {
            eprintln!("Parse error: {}", e);
            process::exit(1);
        }
    }
}

/// Load a script by extension: compile `.fl` source, decode `.flb` images.
fn load_script(filename: &str) -> ScriptBc {
    let path = Path::new(filename);
    match path.extension().and_then(|e| e.to_str()) {
        Some("fl") => match compile_from_file(path) {
            Ok(bc) => bc,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        Some("flb") => {
            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("Failed to read '{}': {}", filename, e);
                    process::exit(1);
                }
            };
            match ScriptBc::from_bytes(&bytes) {
                Ok(bc) => bc,
                Err(e) => {
                    eprintln!("Invalid bytecode image '{}': {}", filename, e);
                    process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("Error: expected a .fl or .flb file, got {}", filename);
            process::exit(1);
        }
    }
}

fn emit_image(bc: &ScriptBc, out: &str) {
    let bytes = match bc.to_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to encode bytecode image: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = fs::write(out, &bytes) {
        eprintln!("Failed to write '{}': {}", out, e);
        process::exit(1);
    }
    println!("wrote {} ({} bytes)", out, bytes.len());
}
