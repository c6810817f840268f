use super::{SearchScope, SymbolicLiteral};
use crate::{error::HexError, sat::Literal, symbols::Symbol};
use anyhow::Result;
use std::{
    collections::HashSet,
    fmt::Display,
    hash::{Hash, Hasher},
};

/// The handle plugins use to read terms and truth values.
///
/// An identifier is bound to the [SearchScope] it was created in.
/// Its truth value queries are answered from the scope assignment;
/// any operation that reads the engine state fails with [HexError::StaleIdentifier] once the round of the scope is over.
#[derive(Clone)]
pub struct Identifier<'s> {
    symlit: SymbolicLiteral,
    scope: &'s SearchScope<'s>,
}

impl<'s> Identifier<'s> {
    pub(crate) fn new(symlit: SymbolicLiteral, scope: &'s SearchScope<'s>) -> Self {
        Self { symlit, scope }
    }

    /// Returns the canonical textual form of the term.
    pub fn value(&self) -> String {
        self.symlit.symbol().to_string()
    }

    /// Returns the term.
    pub fn symbol(&self) -> &Symbol {
        self.symlit.symbol()
    }

    /// Returns the decision literal, if the term is an atom of the engine.
    pub fn literal(&self) -> Option<Literal> {
        self.symlit.literal()
    }

    /// Returns the underlying symbolic literal.
    pub fn symbolic_literal(&self) -> &SymbolicLiteral {
        &self.symlit
    }

    /// Returns the value of a numeric term.
    pub fn int_value(&self) -> Result<i64> {
        self.symlit.symbol().as_number().ok_or_else(|| {
            HexError::usage(format!(
                "int_value called on {} which is not a number",
                self.value()
            ))
        })
    }

    /// Returns an identifier for the same atom with the opposite literal.
    pub fn negate(&self) -> Result<Identifier<'s>> {
        self.require_literal("negate")?;
        Ok(Identifier::new(self.symlit.negate(), self.scope))
    }

    /// Returns `true` iff the literal is assigned to true.
    pub fn is_true(&self) -> Result<bool> {
        let lit = self.require_literal("is_true")?;
        Ok(self.scope.assignment(&self.value())?.is_true(lit))
    }

    /// Returns `true` iff the literal is assigned to false.
    pub fn is_false(&self) -> Result<bool> {
        let lit = self.require_literal("is_false")?;
        Ok(self.scope.assignment(&self.value())?.is_false(lit))
    }

    /// Returns `true` iff the literal is assigned.
    pub fn is_assigned(&self) -> Result<bool> {
        let lit = self.require_literal("is_assigned")?;
        Ok(self.scope.assignment(&self.value())?.value(lit).is_some())
    }

    /// Decomposes a function term into its name (as a constant) followed by its arguments.
    ///
    /// The returned identifiers are plain values, without literals.
    pub fn tuple(&self) -> Result<Vec<Identifier<'s>>> {
        self.scope.ensure_live(&self.value())?;
        let name = self.symlit.symbol().name().ok_or_else(|| {
            HexError::usage(format!(
                "tuple called on {} which is not a function term",
                self.value()
            ))
        })?;
        let mut result = Vec::with_capacity(self.symlit.symbol().arguments().len() + 1);
        result.push(self.plain(Symbol::constant(name)));
        result.extend(
            self.symlit
                .symbol()
                .arguments()
                .iter()
                .map(|a| self.plain(a.clone())),
        );
        Ok(result)
    }

    /// Returns the argument tuples of the true predicate inputs whose predicate is this constant.
    ///
    /// Only the predicate inputs of the running evaluation are considered.
    pub fn extension(&self) -> Result<HashSet<Vec<Identifier<'s>>>> {
        self.scope.ensure_live(&self.value())?;
        if !self.symlit.symbol().is_constant() {
            return Err(HexError::usage(format!(
                "extension called on {} which is not a constant",
                self.value()
            )));
        }
        let predicate = self.symlit.symbol().name().unwrap_or_default();
        let matching = self.scope.with_evaluation_inputs(|inputs| {
            inputs
                .iter()
                .filter(|i| i.symbol().name() == Some(predicate))
                .filter(|i| matches!(i.literal(), Some(l) if self.scope.value_of(l) == Some(true)))
                .map(|i| i.symbol().arguments().to_vec())
                .collect::<Vec<_>>()
        })?;
        Ok(matching
            .into_iter()
            .map(|args| args.into_iter().map(|a| self.plain(a)).collect())
            .collect())
    }

    fn plain(&self, symbol: Symbol) -> Identifier<'s> {
        Identifier::new(SymbolicLiteral::value(symbol), self.scope)
    }

    fn require_literal(&self, operation: &str) -> Result<Literal> {
        self.scope.ensure_live(&self.value())?;
        self.symlit.literal().ok_or_else(|| {
            HexError::usage(format!(
                "{} called on {} which is not an atom",
                operation,
                self.value()
            ))
        })
    }
}

impl Display for Identifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symlit.symbol())
    }
}

impl std::fmt::Debug for Identifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identifier({})", self.symlit)
    }
}

impl PartialEq for Identifier<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.symlit == other.symlit
    }
}

impl Eq for Identifier<'_> {}

impl Hash for Identifier<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symlit.hash(state)
    }
}

impl PartialEq<&str> for Identifier<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.value() == *other
    }
}

impl PartialEq<i64> for Identifier<'_> {
    fn eq(&self, other: &i64) -> bool {
        self.symlit.symbol().as_number() == Some(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::tests::MockAssignment, hex::ClaspContext};

    fn atom(name: &str, args: Vec<Symbol>, lit: isize) -> SymbolicLiteral {
        SymbolicLiteral::new(Symbol::function(name, args), Some(Literal::from(lit)))
    }

    #[test]
    fn test_values() {
        let context = ClaspContext::default();
        let round = context.enter().unwrap();
        let scope = round.scope(None, None);
        let n = scope.identifier(SymbolicLiteral::value(Symbol::number(3)));
        assert_eq!(3, n.int_value().unwrap());
        assert!(n == 3);
        assert!(n == "3");
        let a = scope.identifier(SymbolicLiteral::value(Symbol::constant("a")));
        assert!(a == "a");
        assert!(matches!(
            a.int_value().unwrap_err().downcast_ref::<HexError>(),
            Some(HexError::Usage(_))
        ));
        assert!(matches!(
            a.is_true().unwrap_err().downcast_ref::<HexError>(),
            Some(HexError::Usage(_))
        ));
        assert!(a.negate().is_err());
    }

    #[test]
    fn test_truth_values() {
        let context = ClaspContext::default();
        let assignment = MockAssignment::new(&[1, -2], false);
        let round = context.enter().unwrap();
        let scope = round.scope(Some(&assignment), None);
        let p = scope.identifier(atom("p", vec![], 1));
        assert!(p.is_true().unwrap());
        assert!(!p.is_false().unwrap());
        assert!(p.negate().unwrap().is_false().unwrap());
        let q = scope.identifier(atom("q", vec![], 2));
        assert!(q.is_false().unwrap());
        let r = scope.identifier(atom("r", vec![], 3));
        assert!(!r.is_assigned().unwrap());
        assert!(!r.is_true().unwrap());
        assert!(!r.is_false().unwrap());
    }

    #[test]
    fn test_tuple() {
        let context = ClaspContext::default();
        let round = context.enter().unwrap();
        let scope = round.scope(None, None);
        let p = scope.identifier(atom(
            "p",
            vec![Symbol::constant("a"), Symbol::number(1)],
            1,
        ));
        let t = p.tuple().unwrap();
        assert_eq!(
            vec!["p", "a", "1"],
            t.iter().map(|i| i.value()).collect::<Vec<_>>()
        );
        assert!(t.iter().all(|i| i.literal().is_none()));
        let n = scope.identifier(SymbolicLiteral::value(Symbol::number(1)));
        assert!(n.tuple().is_err());
    }

    #[test]
    fn test_extension() {
        let context = ClaspContext::default();
        let assignment = MockAssignment::new(&[1, -2, 3], false);
        let round = context.enter().unwrap();
        let scope = round.scope(Some(&assignment), None);
        let inputs = vec![
            atom("p", vec![Symbol::constant("x")], 1),
            atom("p", vec![Symbol::constant("y")], 2),
            atom("q", vec![Symbol::constant("z")], 3),
            atom("p", vec![Symbol::constant("w")], 4),
        ];
        let p = scope.identifier(SymbolicLiteral::value(Symbol::constant("p")));
        assert!(p.extension().is_err());
        {
            let _guard = scope.start_evaluation(&inputs).unwrap();
            let ext = p.extension().unwrap();
            assert_eq!(1, ext.len());
            let tuple = ext.into_iter().next().unwrap();
            assert_eq!(1, tuple.len());
            assert!(tuple[0] == "x");
            let fx = scope.identifier(atom("p", vec![Symbol::constant("x")], 1));
            assert!(fx.extension().is_err());
        }
    }
}
