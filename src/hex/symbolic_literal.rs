use crate::{sat::Literal, symbols::Symbol};
use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

/// A ground term paired with the decision literal of the atom it denotes, if any.
///
/// Plain values (e.g. constant input arguments) have no literal.
/// Equality and hashing only consider the term.
#[derive(Debug, Clone)]
pub struct SymbolicLiteral {
    symbol: Symbol,
    literal: Option<Literal>,
}

impl SymbolicLiteral {
    /// Builds a new symbolic literal.
    pub fn new(symbol: Symbol, literal: Option<Literal>) -> Self {
        Self { symbol, literal }
    }

    /// Builds a symbolic literal for a plain value.
    pub fn value(symbol: Symbol) -> Self {
        Self::new(symbol, None)
    }

    /// Returns the term.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Returns the decision literal, if any.
    pub fn literal(&self) -> Option<Literal> {
        self.literal
    }

    /// Returns the same term with the literal negated; plain values are left unchanged.
    pub fn negate(&self) -> Self {
        Self::new(self.symbol.clone(), self.literal.map(|l| l.negate()))
    }
}

impl PartialEq for SymbolicLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for SymbolicLiteral {}

impl Hash for SymbolicLiteral {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state)
    }
}

impl Display for SymbolicLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.literal {
            Some(l) if !l.is_positive() => write!(f, "-{}", self.symbol),
            _ => write!(f, "{}", self.symbol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_eq_ignores_literal() {
        let a = SymbolicLiteral::new(Symbol::constant("a"), Some(Literal::from(1)));
        let b = SymbolicLiteral::new(Symbol::constant("a"), Some(Literal::from(-1)));
        assert_eq!(a, b);
        assert_eq!(a, SymbolicLiteral::value(Symbol::constant("a")));
        let set = vec![a, b].into_iter().collect::<HashSet<_>>();
        assert_eq!(1, set.len());
    }

    #[test]
    fn test_negate_and_display() {
        let a = SymbolicLiteral::new(Symbol::constant("a"), Some(Literal::from(2)));
        assert_eq!("a", a.to_string());
        assert_eq!("-a", a.negate().to_string());
        assert_eq!(Some(Literal::from(-2)), a.negate().literal());
        assert_eq!(None, SymbolicLiteral::value(Symbol::number(1)).negate().literal());
    }
}
