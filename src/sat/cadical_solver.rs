use super::{sat_solver::SolvingResult, Assignment, Literal, SatSolver};
use cadical::Solver;

/// A [SatSolver] backed by Cadical.
///
/// Variables may be declared before they appear in a clause (see [declare_vars](SatSolver::declare_vars));
/// such variables are reported as unassigned in the models.
#[derive(Default)]
pub struct CadicalSolver {
    solver: Solver,
    n_declared: usize,
}

impl SatSolver for CadicalSolver {
    fn add_clause(&mut self, cl: Vec<Literal>) {
        self.n_declared = cl
            .iter()
            .map(|l| usize::from(l.var()))
            .fold(self.n_declared, usize::max);
        self.solver
            .add_clause(cl.into_iter().map(|l| isize::from(l) as i32))
    }

    fn solve(&mut self) -> SolvingResult {
        match self.solver.solve() {
            Some(true) => {
                let max_var = self.solver.max_variable();
                SolvingResult::Satisfiable(Assignment::new(
                    (1..=self.n_vars() as i32)
                        .map(|i| (i <= max_var).then(|| self.solver.value(i)).flatten())
                        .collect(),
                ))
            }
            Some(false) => SolvingResult::Unsatisfiable,
            None => SolvingResult::Unknown,
        }
    }

    fn n_vars(&self) -> usize {
        usize::max(self.solver.max_variable() as usize, self.n_declared)
    }

    fn declare_vars(&mut self, n_vars: usize) {
        self.n_declared = usize::max(self.n_declared, n_vars);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause;

    fn model(s: &mut CadicalSolver) -> Option<Assignment> {
        match s.solve() {
            SolvingResult::Satisfiable(m) => Some(m),
            SolvingResult::Unsatisfiable => None,
            SolvingResult::Unknown => panic!("unexpected unknown result"),
        }
    }

    #[test]
    fn test_incremental() {
        let mut s = CadicalSolver::default();
        s.add_clause(clause![-1, 2]);
        let m = model(&mut s).unwrap();
        assert!(m.value_of(1) == Some(false) || m.value_of(2) == Some(true));
        s.add_clause(clause![1, 3]);
        s.add_clause(clause![-2, 3]);
        assert_eq!(Some(true), model(&mut s).unwrap().value_of(3));
        s.add_clause(clause![-3]);
        assert!(model(&mut s).is_none());
    }

    #[test]
    fn test_declared_vars_are_unassigned() {
        let mut s = CadicalSolver::default();
        s.declare_vars(3);
        s.add_clause(clause![1]);
        assert_eq!(3, s.n_vars());
        let m = model(&mut s).unwrap();
        assert_eq!(3, m.len());
        assert_eq!(Some(true), m.value_of(1));
        assert_eq!(None, m.value_of(3));
    }
}
