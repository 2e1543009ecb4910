/*!
Flattens an error and its chain of causes for terminal output.
*/

use std::error::Error;
use std::fmt::Display;

/// Snapshot of an error's own message plus every transitive source,
/// taken at construction so printing needs no further walking.
pub struct Report {
    chain: Vec<String>,
}

impl Report {
    pub fn new(error: &dyn Error) -> Self {
        let mut chain = vec![error.to_string()];

        let mut cursor = error.source();
        while let Some(cause) = cursor {
            chain.push(cause.to_string());
            cursor = cause.source();
        }

        Report { chain }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.chain[0])?;
        for (depth, cause) in self.chain.iter().enumerate().skip(1) {
            writeln!(f, "  caused by ({}): {}", depth, cause)?;
        }

        Ok(())
    }
}
