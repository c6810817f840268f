use super::{
    is_auxiliary, CheckMode, GroundTheory, PartialAssignment, PropagateControl, PropagateInit,
    Propagation, Propagator, SymbolicAtom,
};
use crate::{
    sat::{default_solver, Assignment, Literal, SatSolver, SolvingResult},
    symbols::Symbol,
};
use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::collections::BTreeSet;

/// An answer found by the [SatEngine].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    number: usize,
    true_atoms: BTreeSet<Symbol>,
}

impl Model {
    pub(crate) fn new(number: usize, true_atoms: BTreeSet<Symbol>) -> Self {
        Self { number, true_atoms }
    }

    /// Returns the rank of this model in the enumeration, starting at 1.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Returns the atoms set to true in this model.
    pub fn true_atoms(&self) -> &BTreeSet<Symbol> {
        &self.true_atoms
    }
}

struct TheoryInit<'a> {
    theory: &'a GroundTheory,
    check_mode: CheckMode,
}

impl PropagateInit for TheoryInit<'_> {
    fn signatures(&self) -> Vec<(String, usize)> {
        let mut signatures = Vec::new();
        for atom in self.theory.atoms() {
            if let Some(name) = atom.symbol().name() {
                let sig = (name.to_string(), atom.symbol().arguments().len());
                if !signatures.contains(&sig) {
                    signatures.push(sig);
                }
            }
        }
        signatures
    }

    fn symbolic_atoms_by_signature(&self, name: &str, arity: usize) -> Vec<SymbolicAtom> {
        self.theory
            .atoms()
            .iter()
            .filter(|a| a.symbol().has_signature(name, arity))
            .cloned()
            .collect()
    }

    fn symbolic_atom(&self, symbol: &Symbol) -> Option<SymbolicAtom> {
        self.theory.atom(symbol).cloned()
    }

    fn set_check_mode(&mut self, mode: CheckMode) {
        self.check_mode = mode;
    }
}

// unconstrained variables are set to false
struct TotalAssignment(Vec<bool>);

impl TotalAssignment {
    fn new(model: &Assignment, n_vars: usize) -> Self {
        Self(
            (1..=n_vars)
                .map(|v| model.value_of(v).unwrap_or(false))
                .collect(),
        )
    }
}

impl PartialAssignment for TotalAssignment {
    fn value(&self, lit: Literal) -> Option<bool> {
        let var = usize::from(lit.var());
        self.0.get(var - 1).map(|v| *v == lit.is_positive())
    }

    fn is_total(&self) -> bool {
        true
    }
}

struct EngineControl<'a> {
    assignment: &'a TotalAssignment,
    nogoods: Vec<Vec<Literal>>,
}

impl PropagateControl for EngineControl<'_> {
    fn assignment(&self) -> &dyn PartialAssignment {
        self.assignment
    }

    fn add_nogood(&mut self, nogood: &[Literal]) -> bool {
        let violated = nogood.iter().all(|l| self.assignment.is_true(*l));
        self.nogoods.push(nogood.to_vec());
        !violated
    }
}

/// A solving engine enumerating the models of a [GroundTheory] with a SAT solver.
///
/// The propagator is checked on each model found by the SAT solver.
/// The nogoods it adds are turned into clauses and the search goes on;
/// models accepted by the propagator are reported and blocked on their non-auxiliary atoms.
/// This engine only produces total assignments, even if the propagator asks for checks at each fixpoint.
pub struct SatEngine<'a> {
    theory: &'a GroundTheory,
    solver: Box<dyn SatSolver>,
    n_checks: usize,
    n_nogoods: usize,
}

impl<'a> SatEngine<'a> {
    /// Builds a new engine for the given theory, using the default SAT solver.
    pub fn new(theory: &'a GroundTheory) -> Self {
        Self::new_with_solver(theory, default_solver())
    }

    /// Builds a new engine for the given theory, using the provided SAT solver.
    pub fn new_with_solver(theory: &'a GroundTheory, mut solver: Box<dyn SatSolver>) -> Self {
        solver.declare_vars(theory.n_vars());
        for cl in theory.clauses() {
            solver.add_clause(cl.clone());
        }
        Self {
            theory,
            solver,
            n_checks: 0,
            n_nogoods: 0,
        }
    }

    /// Enumerates up to `max_models` models (all of them if `max_models` is 0).
    ///
    /// The callback is called on each model; the number of models found is returned.
    pub fn solve<F>(
        &mut self,
        propagator: &mut dyn Propagator,
        max_models: usize,
        mut on_model: F,
    ) -> Result<usize>
    where
        F: FnMut(&Model) -> Result<()>,
    {
        let mut init = TheoryInit {
            theory: self.theory,
            check_mode: CheckMode::Total,
        };
        propagator
            .init(&mut init)
            .context("while initializing the propagator")?;
        info!("propagator requested check mode {}", init.check_mode);
        if init.check_mode == CheckMode::Fixpoint {
            info!("the SAT engine only checks total assignments");
        }
        let mut n_models = 0;
        while max_models == 0 || n_models < max_models {
            let model = match self.solver.solve() {
                SolvingResult::Satisfiable(model) => model,
                SolvingResult::Unsatisfiable => break,
                SolvingResult::Unknown => return Err(anyhow!("the SAT solver gave up")),
            };
            let assignment = TotalAssignment::new(&model, self.theory.n_vars());
            let mut control = EngineControl {
                assignment: &assignment,
                nogoods: vec![],
            };
            self.n_checks += 1;
            let status = propagator.check(&mut control)?;
            if !control.nogoods.is_empty() {
                debug!(
                    "check {} returned {} with {} nogoods",
                    self.n_checks,
                    status,
                    control.nogoods.len()
                );
                self.n_nogoods += control.nogoods.len();
                for nogood in control.nogoods {
                    self.solver
                        .add_clause(nogood.into_iter().map(|l| l.negate()).collect());
                }
                continue;
            }
            n_models += 1;
            let true_atoms = self
                .theory
                .atoms()
                .iter()
                .filter(|a| assignment.is_true(a.literal()))
                .map(|a| a.symbol().clone())
                .collect();
            on_model(&Model::new(n_models, true_atoms))?;
            let blocking_clause = self
                .theory
                .atoms()
                .iter()
                .filter(|a| !is_auxiliary(a.symbol()))
                .map(|a| {
                    if assignment.is_true(a.literal()) {
                        a.literal().negate()
                    } else {
                        a.literal()
                    }
                })
                .collect::<Vec<_>>();
            if blocking_clause.is_empty() {
                break;
            }
            self.solver.add_clause(blocking_clause);
        }
        info!(
            "found {} models after {} checks and {} nogoods",
            n_models, self.n_checks, self.n_nogoods
        );
        Ok(n_models)
    }
}
