use std::{env::args, io, process};

use pretty_env_logger::formatted_builder;
use satin::{
    formula::Model,
    parser::{self, parse, parse_file},
    prelude::*,
    report::Report,
    solver::{CdclSolver, Solver},
};

fn usage_string() -> String {
    format!(
        "Usage: {} [cnf-file]

Reads a DIMACS CNF problem from the file, or from stdin when no file is
given, and prints the model line on SAT or 'UNSAT' otherwise.

Exit codes: 0 satisfiable, 1 unsatisfiable, 2 error",
        args().next().unwrap()
    )
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Unexpected argument '{}'\n\n{}", name, usage_string()))]
    UnexpectedArgument { name: String },
    #[snafu(display("Failed to parse CNF"))]
    ParserError { source: parser::Error },
}

fn solve() -> Result<Option<Model>, Error> {
    let mut args = args();

    // drop arg[0]
    args.next();

    let input = args.next();
    if let Some(name) = args.next() {
        return UnexpectedArgument { name }.fail();
    }

    let formula = match input {
        Some(path) => parse_file(&path).context(ParserError)?,
        None => {
            let stdin = io::stdin();
            let locked = stdin.lock();
            parse(locked).context(ParserError)?
        }
    };

    Ok(CdclSolver::new(formula).solve())
}

fn init_logger() {
    let mut builder = formatted_builder();

    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else {
        if cfg!(debug_assertions) {
            builder.parse_filters("satin=debug");
        } else {
            builder.parse_filters("satin=warn");
        }
    }

    builder.try_init().expect("Failed to initialize the logger");
}

fn main() {
    init_logger();

    match solve() {
        Ok(Some(model)) => println!("{}", model),
        Ok(None) => {
            println!("UNSAT");
            process::exit(1);
        }
        Err(error) => {
            eprint!("{}", Report::new(&error));
            process::exit(2);
        }
    }
}
