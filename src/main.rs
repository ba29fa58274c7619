// cloven - A Clojure-ish bytecode interpreter written in Rust
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;

use cloven_core::Runtime;
use cloven_vm::value::ClovenVal;

struct Options {
    files: Vec<String>,
    expr: Option<String>,
    repl: bool,
    trace: bool,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        files: Vec::new(),
        expr: None,
        repl: false,
        trace: false,
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-e" => match iter.next() {
                Some(expr) => options.expr = Some(expr.clone()),
                None => return Err("-e requires an expression".to_string()),
            },
            "-r" => options.repl = true,
            "-d" => options.trace = true,
            "--version" | "-v" => {
                println!("Cloven v0.1.0");
                process::exit(0);
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown flag: {}", other));
            }
            file => options.files.push(file.to_string()),
        }
    }
    Ok(options)
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("usage: cloven [-e EXPR] [-r] [-d] [files...]");
            process::exit(2);
        }
    };

    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to initialise runtime: {}", e);
            process::exit(1);
        }
    };
    runtime.set_trace(options.trace);

    // Evaluate files in order, then -e, then drop into the REPL when
    // asked for (or when nothing else was given)
    for file in &options.files {
        if let Err(e) = run_file(&runtime, file) {
            eprintln!("{}", e);
            process::exit(1);
        }
    }

    if let Some(expr) = &options.expr {
        match runtime.run_source(expr, "<expr>") {
            Ok(value) => {
                if !matches!(value, ClovenVal::Void) {
                    println!("{}", value);
                }
            }
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    }

    if options.repl || (options.files.is_empty() && options.expr.is_none()) {
        run_repl(&runtime);
    }
}

/// Read and evaluate a single source file.
fn run_file(runtime: &Runtime, path: &str) -> Result<(), String> {
    let source =
        fs::read_to_string(path).map_err(|e| format!("error reading '{}': {}", path, e))?;
    runtime
        .run_source(&source, path)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Run the interactive REPL.
fn run_repl(runtime: &Runtime) {
    println!("Cloven v0.1.0");

    loop {
        print!("{}=> ", runtime.registry().current_name());
        io::stdout().flush().unwrap();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }
                match runtime.run_source(input, "REPL") {
                    Ok(value) => println!("{}", value),
                    Err(e) => eprintln!("{}", e),
                }
            }
            Err(e) => {
                eprintln!("read error: {}", e);
                break;
            }
        }
    }
}
