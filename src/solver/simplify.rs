use crate::formula::{Literal, Variable};
use crate::graph::{Assigned, ClauseId, Graph};

use super::Verdict;

/// One-shot preprocessing pass: unit propagation over the initial unit
/// clauses, then pure-literal elimination over the remaining unassigned
/// variables. Satisfied clauses are removed from the graph and falsified
/// literals are removed from their clauses, so both rules cascade.
///
/// Sound only before search. Clause learning introduces new polarities,
/// after which purity no longer holds.
pub struct Simplifier<'graph> {
    graph: &'graph mut Graph,
}

impl<'graph> Simplifier<'graph> {
    pub fn new(graph: &'graph mut Graph) -> Self {
        Simplifier { graph }
    }

    /// Drives the graph to a fixpoint under both rules.
    /// Returns `None` when the problem remains undecided.
    pub fn run(mut self) -> Option<Verdict> {
        trace!("simplifying\n{}", self.graph);

        let outcome = self.fixpoint();

        trace!("simplified\n{}", self.graph);
        match outcome {
            Ok(()) if self.graph.clause_count() == 0 => Some(Verdict::Sat),
            Ok(()) => None,
            Err(verdict) => Some(verdict),
        }
    }

    fn fixpoint(&mut self) -> Result<(), Verdict> {
        for id in self.graph.unit_seeds().to_vec() {
            if self.graph.has_clause(id) {
                self.visit_clause(id)?;
            }
        }

        let pending: Vec<Variable> = self.graph.unassigned().iter().copied().collect();
        for variable in pending {
            self.visit_variable(variable)?;
        }

        Ok(())
    }

    /// Empty clauses end the solve; unit clauses force their literal.
    fn visit_clause(&mut self, id: ClauseId) -> Result<(), Verdict> {
        match *self.graph.clause(id).literals() {
            [] => {
                debug!("clause {} became empty", id);
                Err(Verdict::Unsat)
            }
            [unit] => {
                trace!("unit propagation {}", unit);
                self.assign_variable(unit.variable(), unit.positive())
            }
            _ => Ok(()),
        }
    }

    /// Pure-literal elimination. A variable with no negative occurrences
    /// is assigned true, one with no positive occurrences false.
    fn visit_variable(&mut self, variable: Variable) -> Result<(), Verdict> {
        let node = self.graph.variable(variable);
        if node.assignment().is_some() {
            return Ok(());
        }

        if node.negative().is_empty() {
            trace!("pure positive {}", variable);
            self.assign_variable(variable, true)
        } else if node.positive().is_empty() {
            trace!("pure negative {}", variable);
            self.assign_variable(variable, false)
        } else {
            Ok(())
        }
    }

    /// Assigns the variable and rewrites every clause it occurs in:
    /// satisfied clauses are removed, the falsified literal is removed
    /// elsewhere. Both clause lists are moved out of the variable record
    /// first, because the cascade mutates them while they are walked.
    fn assign_variable(&mut self, variable: Variable, value: bool) -> Result<(), Verdict> {
        match self.graph.assign(variable, value) {
            Assigned::Fresh => {}
            Assigned::Duplicate => return Ok(()),
            Assigned::Contradiction => {
                debug!("conflicting assignment for {}", variable);
                return Err(Verdict::Unsat);
            }
        }
        trace!("assign {} = {}", variable, if value { "T" } else { "F" });

        let (positive, negative) = self.graph.take_occurrences(variable);

        for id in positive {
            if !self.graph.has_clause(id) {
                continue;
            }
            self.graph.remove_literal(id, Literal::new(variable, true));
            if value {
                self.remove_clause(id)?;
            } else {
                self.visit_clause(id)?;
            }
        }

        for id in negative {
            if !self.graph.has_clause(id) {
                continue;
            }
            self.graph.remove_literal(id, Literal::new(variable, false));
            if value {
                self.visit_clause(id)?;
            } else {
                self.remove_clause(id)?;
            }
        }

        Ok(())
    }

    /// Removes a satisfied clause and revisits its variables, which may
    /// have become pure.
    fn remove_clause(&mut self, id: ClauseId) -> Result<(), Verdict> {
        trace!("remove clause {}", id);
        let literals = self.graph.remove_clause(id);

        if self.graph.clause_count() == 0 {
            return Err(Verdict::Sat);
        }

        for literal in literals {
            self.visit_variable(literal.variable())?;
        }

        Ok(())
    }
}
