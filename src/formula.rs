/*!
Input-side problem representation: variables, literals, clauses, and
the satisfying assignment handed back on success.
*/

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum VariableParseError {
    #[snafu(display("Expected a decimal literal"))]
    ParseIntError { source: std::num::ParseIntError },
    #[snafu(display(
        "Variable ID {} must lie in 1..={}",
        num,
        Variable::MAX_VARIABLE_ID
    ))]
    RangeError { num: u32 },
}

/// A 1-based variable ID. The upper bound keeps every literal
/// representable as a signed 32-bit DIMACS code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Variable(u32);

impl Variable {
    pub const MAX_VARIABLE_ID: u32 = std::i32::MAX as u32;

    pub fn id(self) -> u32 {
        self.0
    }

    /// Creates a variable from a 1-based ID.
    /// Returns `None` if the ID is invalid.
    pub fn from_id(id: u32) -> Option<Self> {
        if id == 0 || id > Variable::MAX_VARIABLE_ID {
            return None;
        }
        Some(Variable(id))
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A literal stored as its signed DIMACS code: the variable ID, with a
/// negative sign marking negation. The code is never `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Literal(i32);

impl Literal {
    pub fn new(variable: Variable, positive: bool) -> Self {
        let code = variable.id() as i32;
        Literal(if positive { code } else { -code })
    }

    /// Builds a literal from a raw DIMACS code.
    /// Returns `None` for `0` and for out-of-range variable IDs.
    pub fn from_code(code: i32) -> Option<Self> {
        Variable::from_id(code.unsigned_abs()).map(|_| Literal(code))
    }

    pub fn variable(self) -> Variable {
        Variable(self.0.unsigned_abs())
    }

    pub fn positive(self) -> bool {
        self.0 > 0
    }
}

impl FromStr for Literal {
    type Err = VariableParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.parse::<i32>().context(ParseIntError)?;
        Literal::from_code(code).context(RangeError {
            num: code.unsigned_abs(),
        })
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal(-self.0)
    }
}

/// One disjunction of literals, kept in input order.
#[derive(Debug, Clone)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(literals: Vec<Literal>) -> Self {
        Clause { literals }
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }
}

impl Display for Clause {
    /// DIMACS form, terminator included.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for literal in &self.literals {
            write!(f, "{} ", literal)?;
        }
        write!(f, "0")
    }
}

/// Formula in Conjunctive Normal Form. The variable count tracks the
/// highest ID referenced by any clause, since the DIMACS problem line
/// is not trusted for it.
#[derive(Debug, Clone, Default)]
pub struct Cnf {
    num_variables: usize,
    clauses: Vec<Clause>,
}

impl Cnf {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn add_clause(&mut self, clause: Clause) {
        for &literal in clause.literals() {
            self.num_variables = self.num_variables.max(literal.variable().id() as usize);
        }

        self.clauses.push(clause);
    }
}

impl Display for Cnf {
    /// Renders the formula back as DIMACS text.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_variables, self.clauses.len())?;
        for clause in &self.clauses {
            writeln!(f, "{}", clause)?;
        }

        Ok(())
    }
}

/// A satisfying assignment, keyed by the variables the solver actually
/// created. IDs the formula never references get no entry.
#[derive(Debug)]
pub struct Model {
    formula: Cnf,
    assignment: BTreeMap<Variable, bool>,
}

impl Model {
    /// Creates a new model from a formula and an assignment.
    ///
    /// # Panics
    ///
    /// Panics when the assignment leaves any clause unsatisfied.
    pub fn new(formula: Cnf, assignment: BTreeMap<Variable, bool>) -> Self {
        let model = Model {
            formula,
            assignment,
        };

        // verify model validity
        for clause in model.formula.clauses() {
            assert!(
                model.satisfies(clause),
                "clause '{}' is not satisfied",
                clause
            );
        }

        model
    }

    pub fn formula(&self) -> &Cnf {
        &self.formula
    }

    pub fn value(&self, variable: Variable) -> Option<bool> {
        self.assignment.get(&variable).copied()
    }

    pub fn assignment(&self) -> &BTreeMap<Variable, bool> {
        &self.assignment
    }

    /// Variables without an entry count as true, which keeps clauses
    /// dropped as tautologies satisfied.
    fn satisfies(&self, clause: &Clause) -> bool {
        clause.literals().iter().any(|&literal| {
            let value = self.value(literal.variable()).unwrap_or(true);
            value == literal.positive()
        })
    }
}

impl Display for Model {
    /// The DIMACS model line: per assigned variable, the literal it
    /// makes true, each followed by the `0` sentinel.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (&variable, &value) in &self.assignment {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            write!(f, "{} 0", Literal::new(variable, value))?;
        }

        Ok(())
    }
}
