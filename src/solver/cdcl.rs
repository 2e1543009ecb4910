use std::{
    collections::{BTreeMap, BTreeSet},
    time::Instant,
};

use crate::formula::{Cnf, Literal, Model, Variable};
use crate::graph::{Assigned, ClauseId, ClauseState, Graph};

use super::{Simplifier, Solver, Verdict};

/// One assignment on the trail. `reason` names the clause whose unit
/// propagation forced the assignment; `None` marks a decision.
#[derive(Debug, Clone, Copy)]
struct TrailStep {
    variable: Variable,
    reason: Option<ClauseId>,
}

pub struct CdclSolver {
    formula: Cnf,
    graph: Graph,
    trail: Vec<TrailStep>,
}

impl Solver for CdclSolver {
    fn new(formula: Cnf) -> Self {
        let graph = Graph::from_cnf(&formula);

        CdclSolver {
            formula,
            graph,
            trail: Vec::new(),
        }
    }

    fn solve(mut self) -> Option<Model> {
        let started = Instant::now();

        let verdict = match Simplifier::new(&mut self.graph).run() {
            Some(verdict) => verdict,
            None => {
                if cfg!(debug_assertions) {
                    self.graph.consistency_check();
                }
                self.search()
            }
        };

        info!("verdict {:?} after {:?}", verdict, started.elapsed());
        match verdict {
            Verdict::Sat => Some(self.into_model()),
            Verdict::Unsat => None,
        }
    }
}

impl CdclSolver {
    /// The decision loop. Variables are tried in a fixed order computed
    /// once up front; a full pass restarts the iteration, since learning
    /// leaves variables unassigned again. All variables assigned with no
    /// conflict raised means every clause holds a satisfied literal, as
    /// a fully falsified clause would have been visited by the
    /// assignment that falsified its last literal.
    fn search(&mut self) -> Verdict {
        let order = self.decision_order();
        let floor = self.graph.assigned_count();
        debug!("searching over {} variables", order.len());

        loop {
            debug_assert_eq!(self.trail.len(), self.graph.assigned_count() - floor);
            if self.graph.unassigned().is_empty() {
                return Verdict::Sat;
            }

            for &variable in &order {
                if !self.graph.unassigned().contains(&variable) {
                    continue;
                }
                if let Err(verdict) = self.decide(variable) {
                    return verdict;
                }
            }
        }
    }

    /// Unassigned variables, densest occurrence lists first.
    fn decision_order(&self) -> Vec<Variable> {
        let mut order: Vec<Variable> = self.graph.unassigned().iter().copied().collect();
        order.sort_by(|a, b| self.graph.score(*b).cmp(&self.graph.score(*a)));
        order
    }

    /// Guesses `true`. The `false` branch needs no bookkeeping here: a
    /// conflict under this guess learns a clause that immediately forces
    /// the opposite value.
    fn decide(&mut self, variable: Variable) -> Result<(), Verdict> {
        trace!("decide {}", variable);
        self.place(variable, true, None)
    }

    /// Assigns a variable, records the trail step, and propagates.
    fn place(
        &mut self,
        variable: Variable,
        value: bool,
        reason: Option<ClauseId>,
    ) -> Result<(), Verdict> {
        let outcome = self.graph.assign(variable, value);
        debug_assert_eq!(outcome, Assigned::Fresh);
        self.trail.push(TrailStep { variable, reason });

        self.propagate(variable, value)
    }

    /// Visits every clause in which the assignment falsified a literal.
    /// The list is snapshotted first: propagation assigns variables whose
    /// clause lists are being walked, and learning appends new clauses.
    fn propagate(&mut self, variable: Variable, value: bool) -> Result<(), Verdict> {
        let falsified: Vec<ClauseId> = self
            .graph
            .occurrences(variable, !value)
            .iter()
            .copied()
            .collect();

        for id in falsified {
            if !self.graph.has_clause(id) {
                continue;
            }
            if self.graph.state(id) != ClauseState::Open {
                continue;
            }
            self.visit(id, variable)?;
        }

        Ok(())
    }

    /// Classifies one open clause under the current assignment: cache it
    /// satisfied, raise a conflict, force the single remaining literal,
    /// or leave it open. Forced assignments propagate depth-first before
    /// the caller's loop resumes.
    fn visit(&mut self, id: ClauseId, by: Variable) -> Result<(), Verdict> {
        let mut remaining = 0;
        let mut unassigned = None;
        let mut satisfied = None;

        for &literal in self.graph.clause(id).literals() {
            match self.graph.value(literal) {
                Some(true) => {
                    satisfied = Some(literal.variable());
                    break;
                }
                Some(false) => {}
                None => {
                    remaining += 1;
                    unassigned = Some(literal);
                }
            }
        }

        if let Some(witness) = satisfied {
            self.graph.set_state(id, ClauseState::Satisfied(witness));
            return Ok(());
        }

        match (remaining, unassigned) {
            (0, None) => {
                self.graph.set_state(id, ClauseState::Falsified(by));
                debug!("conflict in clause {}", id);
                self.learn(id)
            }
            (1, Some(literal)) => {
                trace!("clause {} forces {}", id, literal);
                self.place(literal.variable(), literal.positive(), Some(id))
            }
            _ => Ok(()),
        }
    }

    /// Conflict analysis by iterated resolution against the reasons on
    /// top of the trail, then a backjump to the point where the learned
    /// clause becomes a unit.
    ///
    /// Reason steps are popped and resolved into the learned set until a
    /// decision is on top; resolving down to the empty clause proves the
    /// formula unsatisfiable. Popping then continues until the top of
    /// the trail occurs in the learned set. That literal is the
    /// asserting one: once the clause is installed it is the only
    /// unassigned literal, and propagating it drives the search into the
    /// opposite branch.
    fn learn(&mut self, conflict: ClauseId) -> Result<(), Verdict> {
        let mut learned: BTreeSet<Literal> =
            self.graph.clause(conflict).literals().iter().copied().collect();

        loop {
            let step = match self.trail.last() {
                Some(&step) => step,
                None => break,
            };
            let reason = match step.reason {
                Some(reason) => reason,
                // decisions stay for the backjump below
                None => break,
            };
            self.trail.pop();
            self.graph.unassign(step.variable);

            let ours = if learned.contains(&Literal::new(step.variable, true)) {
                Literal::new(step.variable, true)
            } else if learned.contains(&Literal::new(step.variable, false)) {
                Literal::new(step.variable, false)
            } else {
                // this propagation is unrelated to the conflict
                continue;
            };
            let theirs = !ours;

            let antecedent = self.graph.clause(reason).literals().to_vec();
            if !antecedent.contains(&theirs) {
                continue;
            }

            learned.remove(&ours);
            for literal in antecedent {
                if literal != theirs {
                    learned.insert(literal);
                }
            }

            if learned.is_empty() {
                debug!("resolved the empty clause");
                return Err(Verdict::Unsat);
            }
        }

        let asserting = loop {
            let step = match self.trail.pop() {
                Some(step) => step,
                None => panic!("learned clause has no literal on the trail"),
            };
            self.graph.unassign(step.variable);

            let positive = Literal::new(step.variable, true);
            if learned.contains(&positive) {
                break positive;
            }
            if learned.contains(&!positive) {
                break !positive;
            }
        };

        let literals: Vec<Literal> = learned.into_iter().collect();
        debug!("learned {}-literal clause, asserting {}", literals.len(), asserting);

        let id = match self.graph.add_clause(literals) {
            Some(id) => id,
            None => panic!("learned a tautology"),
        };

        // the new clause is a unit: every literal but the asserting one
        // is falsified by the remaining trail
        self.place(asserting.variable(), asserting.positive(), Some(id))
    }

    /// Builds the verified model from exactly the assignments the graph
    /// holds. Variable IDs the formula never references get no entry.
    fn into_model(self) -> Model {
        let assignment: BTreeMap<Variable, bool> = self.graph.assignments().collect();

        Model::new(self.formula, assignment)
    }
}
