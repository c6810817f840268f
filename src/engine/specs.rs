use crate::{sat::Literal, symbols::Symbol};
use anyhow::Result;
use strum_macros::{AsRefStr, Display};

/// When the engine must call [Propagator::check].
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
pub enum CheckMode {
    /// Only on total assignments.
    Total,
    /// At every propagation fixpoint, on partial assignments too.
    Fixpoint,
}

/// A ground atom of the solving engine, bound to its decision literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicAtom {
    symbol: Symbol,
    literal: Literal,
}

impl SymbolicAtom {
    /// Builds a new symbolic atom.
    pub fn new(symbol: Symbol, literal: Literal) -> Self {
        Self { symbol, literal }
    }

    /// Returns the ground atom.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Returns the solver literal of the atom.
    pub fn literal(&self) -> Literal {
        self.literal
    }
}

/// A (possibly partial) assignment of the decision literals.
pub trait PartialAssignment {
    /// Returns the truth value of a literal, or [Option::None] if it is unassigned.
    fn value(&self, lit: Literal) -> Option<bool>;

    /// Returns `true` iff every decision literal is assigned.
    fn is_total(&self) -> bool;

    /// Returns `true` iff the literal is assigned to true.
    fn is_true(&self, lit: Literal) -> bool {
        self.value(lit) == Some(true)
    }

    /// Returns `true` iff the literal is assigned to false.
    fn is_false(&self, lit: Literal) -> bool {
        self.value(lit) == Some(false)
    }
}

/// The view of the engine given to a propagator at initialization.
pub trait PropagateInit {
    /// Returns the signatures (name and arity) of the ground atoms.
    fn signatures(&self) -> Vec<(String, usize)>;

    /// Returns the ground atoms with the given signature.
    fn symbolic_atoms_by_signature(&self, name: &str, arity: usize) -> Vec<SymbolicAtom>;

    /// Returns the ground atom with the given symbol, if it exists.
    fn symbolic_atom(&self, symbol: &Symbol) -> Option<SymbolicAtom>;

    /// Sets when the engine must call [Propagator::check].
    fn set_check_mode(&mut self, mode: CheckMode);
}

/// The view of the engine given to a propagator during a check.
pub trait PropagateControl {
    /// Returns the current assignment.
    fn assignment(&self) -> &dyn PartialAssignment;

    /// Adds a nogood, i.e. a set of literals that must not be true at the same time.
    ///
    /// The literals must be free of duplicates and of complementary pairs.
    /// Returns `false` if the engine cannot accept more clauses for this round;
    /// in this case the propagator must return from [Propagator::check] as soon as possible.
    fn add_nogood(&mut self, nogood: &[Literal]) -> bool;
}

/// The status returned by a propagator check that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
pub enum Propagation {
    /// The check ran to completion.
    Continue,
    /// The engine refused a nogood; the check was interrupted and resumes on the next call.
    StopRound,
}

/// A propagator plugged into the solving engine.
///
/// Fatal failures are returned as errors; refusals from the engine are not errors.
pub trait Propagator {
    /// Called once before the search starts.
    fn init(&mut self, init: &mut dyn PropagateInit) -> Result<()>;

    /// Called on total assignments, or on every fixpoint when requested at initialization.
    fn check(&mut self, control: &mut dyn PropagateControl) -> Result<Propagation>;
}
