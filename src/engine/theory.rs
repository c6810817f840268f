use super::SymbolicAtom;
use crate::{
    propagator::{ProgramSignatures, ReplacementSignature},
    sat::Literal,
    symbols::Symbol,
};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};

/// The prefix of the predicates of auxiliary atoms.
pub const AUX_PREFIX: &str = "aux_";

/// A ground program: a symbol table binding ground atoms to variables, clauses, and replacement signatures.
#[derive(Debug, Default)]
pub struct GroundTheory {
    n_vars: usize,
    atoms: Vec<SymbolicAtom>,
    atom_ids: HashMap<Symbol, usize>,
    clauses: Vec<Vec<Literal>>,
    signatures: ProgramSignatures,
}

impl GroundTheory {
    /// Builds an empty theory over the given number of variables.
    pub fn new(n_vars: usize) -> Self {
        Self {
            n_vars,
            ..Default::default()
        }
    }

    /// Binds a ground atom to a variable.
    ///
    /// Fails if the variable is out of range, or if the atom or the variable is already bound.
    pub fn add_atom(&mut self, symbol: Symbol, var: usize) -> Result<()> {
        self.check_var(var)?;
        if self.atom_ids.contains_key(&symbol) {
            return Err(anyhow!("atom {} is defined twice", symbol));
        }
        let literal = Literal::from(var as isize);
        if let Some(other) = self.atoms.iter().find(|a| a.literal() == literal) {
            return Err(anyhow!(
                "variable {} is bound to both {} and {}",
                var,
                other.symbol(),
                symbol
            ));
        }
        self.atom_ids.insert(symbol.clone(), self.atoms.len());
        self.atoms.push(SymbolicAtom::new(symbol, literal));
        Ok(())
    }

    /// Adds a clause.
    ///
    /// Fails if a literal refers to an out-of-range variable.
    pub fn add_clause(&mut self, clause: Vec<Literal>) -> Result<()> {
        for l in clause.iter() {
            self.check_var(usize::from(l.var()))?;
        }
        self.clauses.push(clause);
        Ok(())
    }

    /// Declares the replacement predicates of an external atom.
    pub fn add_signature(&mut self, eatom: &str, signature: ReplacementSignature) {
        self.signatures.add(eatom, signature);
    }

    fn check_var(&self, var: usize) -> Result<()> {
        if var == 0 || var > self.n_vars {
            Err(anyhow!(
                "variable {} is out of range (the theory has {} variables)",
                var,
                self.n_vars
            ))
        } else {
            Ok(())
        }
    }

    /// Returns the number of variables.
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    /// Returns the ground atoms, in definition order.
    pub fn atoms(&self) -> &[SymbolicAtom] {
        &self.atoms
    }

    /// Returns the ground atom bound to the given symbol, if any.
    pub fn atom(&self, symbol: &Symbol) -> Option<&SymbolicAtom> {
        self.atom_ids.get(symbol).map(|i| &self.atoms[*i])
    }

    /// Returns the clauses.
    pub fn clauses(&self) -> &[Vec<Literal>] {
        &self.clauses
    }

    /// Returns the replacement signatures.
    pub fn signatures(&self) -> &ProgramSignatures {
        &self.signatures
    }

    /// Returns the atoms fixed to true by unit clauses.
    pub fn facts(&self) -> HashSet<Symbol> {
        let units = self
            .clauses
            .iter()
            .filter(|cl| cl.len() == 1 && cl[0].is_positive())
            .map(|cl| cl[0])
            .collect::<HashSet<_>>();
        self.atoms
            .iter()
            .filter(|a| units.contains(&a.literal()))
            .map(|a| a.symbol().clone())
            .collect()
    }
}

/// Returns `true` iff the atom is an auxiliary one, i.e. its predicate name starts with [AUX_PREFIX].
pub fn is_auxiliary(symbol: &Symbol) -> bool {
    symbol
        .name()
        .map(|n| n.starts_with(AUX_PREFIX))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause;

    #[test]
    fn test_atoms() {
        let mut theory = GroundTheory::new(3);
        theory.add_atom(Symbol::constant("a"), 1).unwrap();
        theory.add_atom(Symbol::constant("b"), 2).unwrap();
        assert!(theory.add_atom(Symbol::constant("a"), 3).is_err());
        assert!(theory.add_atom(Symbol::constant("c"), 2).is_err());
        assert!(theory.add_atom(Symbol::constant("c"), 4).is_err());
        assert!(theory.add_atom(Symbol::constant("c"), 0).is_err());
        assert_eq!(2, theory.atoms().len());
        assert_eq!(
            Some(Literal::from(2)),
            theory.atom(&Symbol::constant("b")).map(|a| a.literal())
        );
    }

    #[test]
    fn test_clauses_and_facts() {
        let mut theory = GroundTheory::new(3);
        theory.add_atom(Symbol::constant("a"), 1).unwrap();
        theory.add_atom(Symbol::constant("b"), 2).unwrap();
        theory.add_clause(clause![1]).unwrap();
        theory.add_clause(clause![-2]).unwrap();
        theory.add_clause(clause![2, 3]).unwrap();
        assert!(theory.add_clause(clause![4]).is_err());
        assert_eq!(3, theory.clauses().len());
        assert_eq!(
            vec![Symbol::constant("a")].into_iter().collect::<HashSet<_>>(),
            theory.facts()
        );
    }

    #[test]
    fn test_is_auxiliary() {
        assert!(is_auxiliary(&Symbol::function("aux_r", vec![Symbol::number(1)])));
        assert!(!is_auxiliary(&Symbol::constant("a")));
        assert!(!is_auxiliary(&Symbol::number(1)));
    }
}
