use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::formula::{Clause, Cnf, Literal, VariableParseError};
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("I/O error occurred while opening CNF file '{}'", path.display()))]
    OpenError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("I/O error occurred while reading CNF input"))]
    ReadError { source: std::io::Error },
    #[snafu(display("Failed to parse '{}' as literal", token))]
    MalformedLiteral {
        token: String,
        source: VariableParseError,
    },
    #[snafu(display("Unterminated clause at end of input"))]
    UnterminatedClause,
}

/// Parses DIMACS CNF from a reader.
///
/// Lines starting with `c` are comments and the `p` problem line carries
/// no information the clause stream does not; both are skipped. Anything
/// else is a stream of signed decimal literals in which `0` terminates a
/// clause, so clauses may span lines and share lines.
pub fn parse(reader: impl BufRead) -> Result<Cnf, Error> {
    let mut cnf = Cnf::new();
    let mut pending: Vec<Literal> = Vec::new();

    for line in reader.lines() {
        let line = line.context(ReadError)?;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('c') || trimmed.starts_with('p') {
            // empty line, comment, problem definition
            continue;
        }

        for token in trimmed.split_whitespace() {
            if token == "0" {
                // a terminator without literals yields no clause
                if !pending.is_empty() {
                    cnf.add_clause(Clause::new(std::mem::take(&mut pending)));
                }
                continue;
            }

            let literal = token.parse::<Literal>().with_context(|| MalformedLiteral {
                token: token.to_owned(),
            })?;
            pending.push(literal);
        }
    }

    ensure!(pending.is_empty(), UnterminatedClause);

    Ok(cnf)
}

/// Parses CNF formula from a file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Cnf, Error> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path).context(OpenError {
        path: path.to_owned(),
    })?);

    parse(file)
}
