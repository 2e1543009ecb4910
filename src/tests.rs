use paste::paste;

use crate::{
    formula::{Clause, Cnf, Literal, Model, Variable},
    graph::Graph,
    parser::{parse, parse_file},
    solver::{CdclSolver, Simplifier, Solver, Verdict},
};

macro_rules! sat_testcase_with_solver {
    ($solver:ident, $dir:ident, $name: ident) => {
        paste! {
            #[test]
            fn [< $solver:lower _ $dir _ $name >]() {
                let formula = parse_file(
                    concat!("testcases/", stringify!($dir), "/", stringify!($name), ".cnf")
                ).unwrap();
                let solver = $solver::new(formula);
                assert!(solver.solve().is_some());
            }
        }
    };
}

macro_rules! unsat_testcase_with_solver {
    ($solver:ident, $dir:ident, $name:ident) => {
        paste! {
            #[test]
            fn [< $solver:lower _ $dir _ $name >]() {
                let formula = parse_file(
                    concat!("testcases/", stringify!($dir), "/", stringify!($name), ".cnf")
                ).unwrap();
                let solver = $solver::new(formula);
                assert!(solver.solve().is_none());
            }
        }
    };
}

macro_rules! sat_testcase {
    ($dir:ident, $name:ident) => {
        sat_testcase_with_solver!(CdclSolver, $dir, $name);
    };
}

macro_rules! unsat_testcase {
    ($dir:ident, $name:ident) => {
        unsat_testcase_with_solver!(CdclSolver, $dir, $name);
    };
}

// `Model::new` re-verifies every satisfying assignment against the full
// formula, so the SAT cases below double as soundness checks.

sat_testcase!(basic, unit1);
sat_testcase!(basic, chain4);
sat_testcase!(basic, triple3);
sat_testcase!(basic, mixed5);
sat_testcase!(basic, taut2);
sat_testcase!(basic, split3);

unsat_testcase!(basic, contra1);
unsat_testcase!(basic, square2);
unsat_testcase!(basic, ph3);
unsat_testcase!(basic, nested4);
unsat_testcase!(basic, kickstart);

fn literal(raw: i32) -> Literal {
    Literal::from_code(raw).unwrap()
}

fn var(raw: u32) -> Variable {
    Variable::from_id(raw).unwrap()
}

fn formula(clauses: &[&[i32]]) -> Cnf {
    let mut cnf = Cnf::new();
    for clause in clauses {
        cnf.add_clause(Clause::new(clause.iter().map(|&raw| literal(raw)).collect()));
    }
    cnf
}

fn solve(clauses: &[&[i32]]) -> Option<Model> {
    CdclSolver::new(formula(clauses)).solve()
}

#[test]
fn single_unit_model() {
    let model = solve(&[&[1]]).unwrap();
    assert_eq!(model.value(var(1)), Some(true));
    assert_eq!(model.to_string(), "1 0");
}

#[test]
fn chain_propagates_to_all_true() {
    let model = solve(&[&[1, -2], &[2, -3], &[3, -4], &[4]]).unwrap();
    assert_eq!(model.assignment().len(), 4);
    assert!(model.assignment().values().all(|&value| value));
}

#[test]
fn model_line_is_dimacs() {
    let model = solve(&[&[-1], &[2]]).unwrap();
    assert_eq!(model.to_string(), "-1 0 2 0");
}

#[test]
fn model_skips_unreferenced_variables() {
    // only 1 and 5 exist; the gap IDs 2..4 must not be invented
    let model = solve(&[&[1], &[-5]]).unwrap();
    assert_eq!(model.to_string(), "1 0 -5 0");
    assert_eq!(model.value(var(2)), None);
}

#[test]
fn empty_formula_is_sat() {
    assert!(solve(&[]).is_some());
}

#[test]
fn tautology_absorption() {
    let base: &[&[i32]] = &[&[1, 2, 3], &[-1, -2], &[-2, -3], &[-1, -3]];
    let with_tautology: &[&[i32]] = &[&[1, 2, 3], &[-1, -2], &[-2, -3], &[-1, -3], &[2, -2]];

    assert_eq!(solve(base).is_some(), solve(with_tautology).is_some());
}

#[test]
fn unit_clause_forces_its_literal() {
    let model = solve(&[&[1, -2], &[2]]).unwrap();
    assert_eq!(model.value(var(2)), Some(true));
    assert_eq!(model.value(var(1)), Some(true));
}

#[test]
fn learning_flips_bad_first_guess() {
    // no units and no pure literals, so the simplifier leaves this to
    // the search; every model sets 1 to false, and the solver has to
    // learn its way out of the always-true first guess
    let model = solve(&[&[-1, 2], &[-1, -2], &[1, 2]]).unwrap();
    assert_eq!(model.value(var(1)), Some(false));
    assert_eq!(model.value(var(2)), Some(true));
}

#[test]
fn simplifier_unit_cascade_solves() {
    let mut graph = Graph::from_cnf(&formula(&[&[1, -2], &[2, -3], &[3, -4], &[4]]));
    assert_eq!(Simplifier::new(&mut graph).run(), Some(Verdict::Sat));

    assert_eq!(graph.clause_count(), 0);
    assert!(graph.unassigned().is_empty());
    assert!(graph.assignments().all(|(_, value)| value));
    graph.consistency_check();
}

#[test]
fn simplifier_detects_empty_clause() {
    let mut graph = Graph::from_cnf(&formula(&[&[1], &[-1]]));
    assert_eq!(Simplifier::new(&mut graph).run(), Some(Verdict::Unsat));
}

#[test]
fn simplifier_detects_conflicting_cascade() {
    let mut graph = Graph::from_cnf(&formula(&[&[1], &[-1, 2], &[-1, -2]]));
    assert_eq!(Simplifier::new(&mut graph).run(), Some(Verdict::Unsat));
}

#[test]
fn simplifier_eliminates_pure_literals() {
    // 1 occurs only positively; assigning it satisfies everything
    let mut graph = Graph::from_cnf(&formula(&[&[1, 2], &[1, -2]]));
    assert_eq!(Simplifier::new(&mut graph).run(), Some(Verdict::Sat));
}

#[test]
fn simplifier_leaves_residue_undecided() {
    let mut graph = Graph::from_cnf(&formula(&[&[1, 2], &[-1, 2], &[1, -2], &[-1, -2]]));
    assert_eq!(Simplifier::new(&mut graph).run(), None);

    assert_eq!(graph.clause_count(), 4);
    assert_eq!(graph.unassigned().len(), 2);
    graph.consistency_check();
}

#[test]
fn parser_accepts_comments_and_problem_line() {
    let input = b"c a comment\np cnf 2 2\n1 2 0\n1 -2 0\n";
    let cnf = parse(&input[..]).unwrap();
    assert_eq!(cnf.num_variables(), 2);
    assert_eq!(cnf.clauses().len(), 2);
}

#[test]
fn parser_joins_and_splits_lines() {
    let input = b"p cnf 3 2\n1 2\n3 0 -1\n-2 0\n";
    let cnf = parse(&input[..]).unwrap();
    assert_eq!(cnf.clauses().len(), 2);
    assert_eq!(cnf.clauses()[0].len(), 3);
    assert_eq!(cnf.clauses()[1].len(), 2);
}

#[test]
fn parser_infers_variable_count_without_problem_line() {
    let cnf = parse(&b"1 -7 0\n"[..]).unwrap();
    assert_eq!(cnf.num_variables(), 7);
}

#[test]
fn parser_rejects_unterminated_clause() {
    assert!(parse(&b"p cnf 2 1\n1 2\n"[..]).is_err());
}

#[test]
fn parser_rejects_garbage_literal() {
    assert!(parse(&b"1 x 0\n"[..]).is_err());
    assert!(parse(&b"1 -0 0\n"[..]).is_err());
}
