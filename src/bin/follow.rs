//! Command-line interface for follow
//! Compiles follow blocks outside the editor, mostly for inspection and debugging.
//!
//! Usage:
//!   follow compile `<path>` [--format json|summary] [--config `<file>`]  - Compile a block file
//!   follow proof-state `<path>` `<line>`                                 - Show the proof state at a line
//!   follow rename `<path>` `<from>` `<to>`                               - Print the file with a name replaced
//!
//! Set `RUST_LOG=follow=debug` to see pipeline events on stderr.

use clap::{Arg, Command};
use follow::follow::ast::CNode;
use follow::follow::suggestion::rename;
use follow::{CompileInfo, Compiler, CompilerConfig};
use std::fmt::Write as _;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("follow")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile and inspect follow proof blocks")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("compile")
                .about("Compile a block and print the result")
                .arg(
                    Arg::new("path")
                        .help("Path to a file holding the block source")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["json", "summary"])
                        .default_value("summary"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("YAML configuration file layered over the defaults"),
                ),
        )
        .subcommand(
            Command::new("proof-state")
                .about("Show the proof step and the goals after it at a line")
                .arg(Arg::new("path").required(true).index(1))
                .arg(
                    Arg::new("line")
                        .help("Zero-based line number")
                        .required(true)
                        .index(2)
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("rename")
                .about("Replace every token equal to <from> by <to>")
                .arg(Arg::new("path").required(true).index(1))
                .arg(Arg::new("from").required(true).index(2))
                .arg(Arg::new("to").required(true).index(3)),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("compile", sub)) => {
            let path = string_arg(sub, "path");
            let format = string_arg(sub, "format");
            let config = sub.get_one::<String>("config").map(String::as_str);
            handle_compile_command(path, format, config);
        }
        Some(("proof-state", sub)) => {
            let line = sub.get_one::<usize>("line").copied().unwrap_or_default();
            handle_proof_state_command(string_arg(sub, "path"), line);
        }
        Some(("rename", sub)) => {
            handle_rename_command(
                string_arg(sub, "path"),
                string_arg(sub, "from"),
                string_arg(sub, "to"),
            );
        }
        _ => unreachable!(),
    }
}

fn string_arg<'a>(matches: &'a clap::ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or_default()
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn read_source(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| fail(format!("reading {}: {}", path, e)))
}

fn handle_compile_command(path: &str, format: &str, config: Option<&str>) {
    let config = match config {
        Some(file) => CompilerConfig::from_yaml_file(file).unwrap_or_else(|e| fail(e)),
        None => CompilerConfig::default(),
    };
    let info = Compiler::new(config).compile(&read_source(path));
    match format {
        "json" => match serde_json::to_string_pretty(&info) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        },
        _ => print!("{}", summary(&info)),
    }
}

fn summary(info: &CompileInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "tokens: {}", info.tokens.len());
    let mut counts = [0usize; 4];
    let mut constants = 0;
    for node in &info.cnodes {
        let slot = match node {
            CNode::Type(_) => 0,
            CNode::Term(term) => {
                constants += usize::from(term.is_constant());
                1
            }
            CNode::Axiom(_) => 2,
            CNode::Thm(_) => 3,
        };
        counts[slot] += 1;
    }
    let _ = writeln!(
        out,
        "nodes: type {}, term {} ({} constant), axiom {}, thm {}",
        counts[0], counts[1], constants, counts[2], counts[3]
    );

    let _ = writeln!(out, "errors: {}", info.errors.len());
    for error in &info.errors {
        let _ = writeln!(out, "  {}", error);
    }

    for thm in info.cnodes.iter().filter_map(CNode::as_thm) {
        let status = if thm.is_proved() {
            format!("proved in {} steps", thm.proofs.len())
        } else {
            format!("{} goals open", thm.remaining_goals().len())
        };
        let _ = writeln!(out, "thm {}: {}", thm.name, status);
    }

    let _ = writeln!(out, "suggestions: {}", info.suggestions.len());
    for suggestion in &info.suggestions {
        let _ = writeln!(
            out,
            "  {} @ {}",
            suggestion.label, suggestion.range.start
        );
    }
    out
}

fn handle_proof_state_command(path: &str, line: usize) {
    let info = Compiler::default().compile(&read_source(path));
    match info.proof_state_at(line) {
        Some(view) => {
            println!("{}", view.operation);
            println!();
            println!("{}", view.goals);
        }
        None => fail(format!("no proof step at line {}", line)),
    }
}

fn handle_rename_command(path: &str, from: &str, to: &str) {
    match rename(&read_source(path), from, to) {
        Ok(renamed) => print!("{}", renamed),
        Err(e) => fail(e),
    }
}
