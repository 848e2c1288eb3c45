pub mod grammar;

use std::{fs, io::BufRead};

use grammar::Classification;
pub use grammar::Grammar;

fn print_help() {
    println!("Usage: grammar-classifier [outputs] [options] [grammar file]");
    println!("outputs:");
    println!("  prod: Productions");
    println!("  nff: Nullable, first and follow sets");
    println!("  ll1: LL(1) parsing table");
    println!("  lr0fsm: LR(0) automaton");
    println!("  slrtable: SLR(1) parsing table");
    println!("  classify: LL(1)/SLR(1) verdicts and applicable tables (default)");
    println!("options:");
    println!("  -h: Print this help");
    println!("  -l: Print in LaTeX format");
    println!("  -j: Print in JSON format");
    println!("  -i: After printing, read test strings from stdin");
    println!("      (\"ll1 <string>\", \"slr <string>\", or a bare string for both;");
    println!("       \"q\" quits; requires a grammar file argument)");
}

enum OutputFormat {
    Plain,
    LaTeX,
    Json,
}

fn run_tests(g: &Grammar, c: &Classification) {
    let verdict = |accepted: bool| if accepted { "accept" } else { "reject" };

    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "q" || line == "quit" {
            break;
        }

        let (which, input) = if let Some(rest) = line.strip_prefix("ll1 ") {
            ("ll1", rest.trim())
        } else if let Some(rest) = line.strip_prefix("slr ") {
            ("slr", rest.trim())
        } else {
            ("both", line)
        };

        if which == "ll1" || which == "both" {
            match &c.ll1 {
                Some(table) => println!("LL(1): {}", verdict(table.accepts(g, input))),
                None => println!("LL(1): no table (grammar is not LL(1))"),
            }
        }
        if which == "slr" || which == "both" {
            match &c.slr {
                Some(table) => println!("SLR(1): {}", verdict(table.accepts(g, input))),
                None => println!("SLR(1): no table (grammar is not SLR(1))"),
            }
        }
    }
}

fn main() {
    let mut outputs: Vec<&str> = Vec::new();
    let args = std::env::args().skip(1).collect::<Vec<String>>();
    let mut i: usize = 0;
    while i < args.len()
        && ["prod", "nff", "ll1", "lr0fsm", "slrtable", "classify"].contains(&args[i].as_str())
    {
        outputs.push(args[i].as_str());
        i += 1;
    }
    if outputs.is_empty() {
        outputs.push("classify");
    }

    let mut output_format = OutputFormat::Plain;
    let mut interactive = false;

    while i < args.len() && ["-h", "--help", "-l", "-j", "-i"].contains(&args[i].as_str()) {
        if args[i] == "-h" || args[i] == "--help" {
            print_help();
            return;
        } else if args[i] == "-l" {
            output_format = OutputFormat::LaTeX;
        } else if args[i] == "-j" {
            output_format = OutputFormat::Json;
        } else if args[i] == "-i" {
            interactive = true;
        }
        i += 1;
    }

    if i + 1 < args.len() {
        print_help();
        return;
    }

    let input: String = if i == args.len() {
        interactive = false;
        std::io::stdin()
            .lock()
            .lines()
            .map(|l| l.unwrap())
            .collect::<Vec<String>>()
            .join("\n")
    } else {
        fs::read_to_string(args[i].as_str()).expect("Failed to read file")
    };

    let mut g = match Grammar::parse(&input) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if !g.start_is_productive() {
        println!("start symbol derives no terminal string");
        println!("LL(1): no\nSLR(1): no");
        return;
    }

    let c = match g.classify() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    for output in &outputs {
        match *output {
            "prod" => {
                let t = g.to_production_output_vec();
                println!(
                    "{}",
                    match output_format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::Json => serde_json::to_string(&t).unwrap(),
                    }
                );
            }
            "nff" => {
                let t = g.to_non_terminal_output_vec();
                println!(
                    "{}",
                    match output_format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::Json => serde_json::to_string(&t).unwrap(),
                    }
                );
            }
            "ll1" => match &c.ll1 {
                Some(table) => {
                    let t = table.to_output(&g);
                    println!(
                        "{}",
                        match output_format {
                            OutputFormat::Plain => t.to_plaintext(),
                            OutputFormat::LaTeX => t.to_latex(),
                            OutputFormat::Json => serde_json::to_string(&t).unwrap(),
                        }
                    );
                }
                None => println!("grammar is not LL(1)"),
            },
            "lr0fsm" => {
                println!(
                    "{}",
                    match output_format {
                        OutputFormat::Plain => c.fsm.to_plaintext(&g),
                        OutputFormat::LaTeX => c.fsm.to_latex(&g),
                        OutputFormat::Json =>
                            serde_json::to_string(&c.fsm.to_output(&g)).unwrap(),
                    }
                );
            }
            "slrtable" => {
                // Printed even when conflicted; conflicted cells list every
                // proposed action.
                let t = c.fsm.to_slr_table(&g);
                println!(
                    "{}",
                    match output_format {
                        OutputFormat::Plain => t.to_plaintext(&g),
                        OutputFormat::LaTeX => t.to_latex(&g),
                        OutputFormat::Json => serde_json::to_string(&t.to_output(&g)).unwrap(),
                    }
                );
            }
            "classify" => {
                println!(
                    "{}",
                    match output_format {
                        OutputFormat::Plain => c.to_plaintext(&g),
                        OutputFormat::LaTeX => c.to_plaintext(&g),
                        OutputFormat::Json => serde_json::to_string(&c.to_output(&g)).unwrap(),
                    }
                );
            }
            _ => unreachable!(),
        }
    }

    if interactive {
        run_tests(&g, &c);
    }
}
