//! The contract between the propagator and a solving engine, and a SAT-based engine implementing it.

mod sat_engine;
pub use sat_engine::Model;
pub use sat_engine::SatEngine;

mod specs;
pub use specs::CheckMode;
pub use specs::PartialAssignment;
pub use specs::PropagateControl;
pub use specs::PropagateInit;
pub use specs::Propagation;
pub use specs::Propagator;
pub use specs::SymbolicAtom;

mod theory;
pub use theory::is_auxiliary;
pub use theory::GroundTheory;
pub use theory::AUX_PREFIX;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        sat::{Literal, Variable},
        symbols::{parse_term, Symbol},
    };
    use std::collections::HashMap;

    pub(crate) struct MockAssignment {
        values: HashMap<Variable, bool>,
        total: bool,
    }

    impl MockAssignment {
        pub(crate) fn new(literals: &[isize], total: bool) -> Self {
            Self {
                values: literals
                    .iter()
                    .map(|l| {
                        let lit = Literal::from(*l);
                        (lit.var(), lit.is_positive())
                    })
                    .collect(),
                total,
            }
        }
    }

    impl PartialAssignment for MockAssignment {
        fn value(&self, lit: Literal) -> Option<bool> {
            self.values
                .get(&lit.var())
                .map(|v| *v == lit.is_positive())
        }

        fn is_total(&self) -> bool {
            self.total
        }
    }

    pub(crate) struct MockEngine {
        atoms: Vec<SymbolicAtom>,
        assignment: MockAssignment,
        reject_after: Option<usize>,
        pub(crate) check_mode: Option<CheckMode>,
        pub(crate) nogoods: Vec<Vec<Literal>>,
    }

    impl MockEngine {
        pub(crate) fn new(atoms: &[(&str, isize)]) -> Self {
            Self {
                atoms: atoms
                    .iter()
                    .map(|(s, l)| SymbolicAtom::new(parse_term(s).unwrap(), Literal::from(*l)))
                    .collect(),
                assignment: MockAssignment::new(&[], false),
                reject_after: None,
                check_mode: None,
                nogoods: vec![],
            }
        }

        pub(crate) fn set_assignment(&mut self, literals: &[isize], total: bool) {
            self.assignment = MockAssignment::new(literals, total);
        }

        // nogoods are recorded even when rejected
        pub(crate) fn reject_after(&mut self, n: usize) {
            self.reject_after = Some(n);
        }
    }

    impl PropagateInit for MockEngine {
        fn signatures(&self) -> Vec<(String, usize)> {
            let mut signatures = vec![];
            for a in self.atoms.iter() {
                let sig = (
                    a.symbol().name().unwrap_or_default().to_string(),
                    a.symbol().arguments().len(),
                );
                if !signatures.contains(&sig) {
                    signatures.push(sig);
                }
            }
            signatures
        }

        fn symbolic_atoms_by_signature(&self, name: &str, arity: usize) -> Vec<SymbolicAtom> {
            self.atoms
                .iter()
                .filter(|a| a.symbol().has_signature(name, arity))
                .cloned()
                .collect()
        }

        fn symbolic_atom(&self, symbol: &Symbol) -> Option<SymbolicAtom> {
            self.atoms.iter().find(|a| a.symbol() == symbol).cloned()
        }

        fn set_check_mode(&mut self, mode: CheckMode) {
            self.check_mode = Some(mode);
        }
    }

    impl PropagateControl for MockEngine {
        fn assignment(&self) -> &dyn PartialAssignment {
            &self.assignment
        }

        fn add_nogood(&mut self, nogood: &[Literal]) -> bool {
            self.nogoods.push(nogood.to_vec());
            match self.reject_after {
                Some(n) => self.nogoods.len() <= n,
                None => true,
            }
        }
    }
}
