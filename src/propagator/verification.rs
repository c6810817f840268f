use crate::{hex::SymbolicLiteral, sat::Literal};
use std::collections::{BTreeMap, HashSet};

/// The auxiliary predicates standing for the ground instances of an external atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementSignature {
    relevance_predicate: String,
    replacement_predicate: String,
    arity: usize,
}

impl ReplacementSignature {
    /// Builds a new replacement signature.
    ///
    /// The arity is the one of both the relevance and the replacement atoms: the number of inputs plus the number of outputs.
    pub fn new<S: Into<String>, T: Into<String>>(relevance_predicate: S, replacement_predicate: T, arity: usize) -> Self {
        Self {
            relevance_predicate: relevance_predicate.into(),
            replacement_predicate: replacement_predicate.into(),
            arity,
        }
    }

    /// Returns the predicate of the relevance atoms.
    pub fn relevance_predicate(&self) -> &str {
        &self.relevance_predicate
    }

    /// Returns the predicate of the replacement atoms.
    pub fn replacement_predicate(&self) -> &str {
        &self.replacement_predicate
    }

    /// Returns the arity of the relevance and replacement atoms.
    pub fn arity(&self) -> usize {
        self.arity
    }
}

/// The replacement signatures of a program, grouped by external atom in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramSignatures {
    entries: Vec<(String, Vec<ReplacementSignature>)>,
}

impl ProgramSignatures {
    /// Adds a replacement signature for an external atom.
    pub fn add<S: Into<String>>(&mut self, eatom: S, signature: ReplacementSignature) {
        let eatom = eatom.into();
        match self.entries.iter_mut().find(|(e, _)| *e == eatom) {
            Some((_, signatures)) => signatures.push(signature),
            None => self.entries.push((eatom, vec![signature])),
        }
    }

    /// Iterates over the external atoms and their replacement signatures.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ReplacementSignature])> + '_ {
        self.entries.iter().map(|(e, s)| (e.as_str(), s.as_slice()))
    }

    /// Returns the number of external atoms involved in the program.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` iff the program involves no external atom.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A ground instance of an external atom that must be verified during the search.
#[derive(Debug, Clone)]
pub struct VerificationRecord {
    relevance: SymbolicLiteral,
    replacement: SymbolicLiteral,
    predicate_inputs: BTreeMap<usize, Vec<SymbolicLiteral>>,
    all_inputs: Vec<SymbolicLiteral>,
    verify_on_partial: bool,
}

impl VerificationRecord {
    /// Builds a new record; the set of all inputs is the union of the predicate inputs.
    pub fn new(
        relevance: SymbolicLiteral,
        replacement: SymbolicLiteral,
        predicate_inputs: BTreeMap<usize, Vec<SymbolicLiteral>>,
        verify_on_partial: bool,
    ) -> Self {
        let mut seen = HashSet::new();
        let all_inputs = predicate_inputs
            .values()
            .flatten()
            .filter(|i| seen.insert((*i).clone()))
            .cloned()
            .collect();
        Self {
            relevance,
            replacement,
            predicate_inputs,
            all_inputs,
            verify_on_partial,
        }
    }

    /// Returns the relevance atom.
    pub fn relevance(&self) -> &SymbolicLiteral {
        &self.relevance
    }

    /// Returns the replacement atom.
    pub fn replacement(&self) -> &SymbolicLiteral {
        &self.replacement
    }

    /// Returns the predicate inputs, indexed by argument position.
    pub fn predicate_inputs(&self) -> &BTreeMap<usize, Vec<SymbolicLiteral>> {
        &self.predicate_inputs
    }

    /// Returns all the predicate inputs, without duplicates.
    pub fn all_inputs(&self) -> &[SymbolicLiteral] {
        &self.all_inputs
    }

    /// Returns `true` iff this record must be verified on partial assignments too.
    pub fn verify_on_partial(&self) -> bool {
        self.verify_on_partial
    }
}

/// A set of literals that must not be true together.
///
/// A nogood never contains a literal and its negation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nogood {
    literals: Vec<Literal>,
}

impl Nogood {
    /// Adds a literal.
    ///
    /// Returns `false` and leaves the nogood unchanged if the negation of the literal is already present.
    pub fn add(&mut self, lit: Literal) -> bool {
        if self.literals.contains(&lit.negate()) {
            return false;
        }
        if !self.literals.contains(&lit) {
            self.literals.push(lit);
        }
        true
    }

    /// Builds a nogood from a list of literals, or returns [Option::None] if it contains complementary literals.
    pub fn from_literals(literals: &[Literal]) -> Option<Self> {
        let mut nogood = Nogood::default();
        for l in literals {
            if !nogood.add(*l) {
                return None;
            }
        }
        Some(nogood)
    }

    /// Returns the literals, in insertion order.
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub(crate) fn key(&self) -> Vec<Literal> {
        let mut key = self.literals.clone();
        key.sort_unstable();
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clause, symbols::Symbol};

    fn input(arg: &str, lit: isize) -> SymbolicLiteral {
        SymbolicLiteral::new(
            Symbol::function("p", vec![Symbol::constant(arg)]),
            Some(Literal::from(lit)),
        )
    }

    #[test]
    fn test_all_inputs_is_the_union() {
        let mut inputs = BTreeMap::new();
        inputs.insert(0, vec![input("x", 1), input("y", 2)]);
        inputs.insert(2, vec![input("y", 2), input("z", 3)]);
        let record = VerificationRecord::new(
            SymbolicLiteral::value(Symbol::constant("rel")),
            SymbolicLiteral::value(Symbol::constant("rep")),
            inputs,
            false,
        );
        assert_eq!(
            vec!["p(x)", "p(y)", "p(z)"],
            record
                .all_inputs()
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
        );
        assert_eq!(2, record.predicate_inputs().len());
    }

    #[test]
    fn test_nogood_rejects_complementary_literals() {
        let mut nogood = Nogood::default();
        assert!(nogood.add(Literal::from(1)));
        assert!(nogood.add(Literal::from(-2)));
        assert!(nogood.add(Literal::from(1)));
        assert!(!nogood.add(Literal::from(-1)));
        assert_eq!(&[Literal::from(1), Literal::from(-2)], nogood.literals());
        assert!(Nogood::from_literals(&clause![1, 2, -1]).is_none());
        assert_eq!(
            clause![-2, 3],
            Nogood::from_literals(&clause![3, -2]).unwrap().key()
        );
    }

    #[test]
    fn test_signatures_keep_declaration_order() {
        let mut signatures = ProgramSignatures::default();
        signatures.add("b", ReplacementSignature::new("r_b", "e_b", 1));
        signatures.add("a", ReplacementSignature::new("r_a", "e_a", 2));
        signatures.add("b", ReplacementSignature::new("r_b2", "e_b2", 2));
        let collected = signatures
            .iter()
            .map(|(e, s)| (e.to_string(), s.len()))
            .collect::<Vec<_>>();
        assert_eq!(vec![("b".to_string(), 2), ("a".to_string(), 1)], collected);
    }
}
