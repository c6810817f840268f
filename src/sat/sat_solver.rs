use super::cadical_solver::CadicalSolver;
use std::{
    fmt::Display,
    num::{NonZeroIsize, NonZeroUsize},
};

/// A propositional variable, i.e. a non-null positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(NonZeroUsize);

macro_rules! impl_var_from {
    ($t: ty) => {
        impl From<$t> for Variable {
            fn from(v: $t) -> Self {
                match usize::try_from(v).ok().and_then(NonZeroUsize::new) {
                    Some(n) => Self(n),
                    None => panic!("{} is not a valid variable index", v),
                }
            }
        }
    };
}
impl_var_from!(usize);
impl_var_from!(isize);
impl_var_from!(i32);

impl From<Variable> for usize {
    fn from(v: Variable) -> Self {
        v.0.into()
    }
}

/// A decision literal of a solving engine.
///
/// Literals are non-null integers whose sign gives the polarity.
/// Nothing is assumed about the numbering besides negation and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(NonZeroIsize);

impl Literal {
    /// Returns the literal of opposite polarity.
    pub fn negate(self) -> Self {
        Self::from(-self.0.get())
    }

    /// Returns the variable of this literal.
    pub fn var(&self) -> Variable {
        Variable(self.0.unsigned_abs())
    }

    /// Returns `true` iff this literal is the positive literal of its variable.
    pub fn is_positive(&self) -> bool {
        self.0.get() > 0
    }
}

macro_rules! impl_lit_from {
    ($t: ty) => {
        impl From<$t> for Literal {
            fn from(l: $t) -> Self {
                match NonZeroIsize::new(l as isize) {
                    Some(n) => Self(n),
                    None => panic!("0 is not a literal"),
                }
            }
        }
    };
}
impl_lit_from!(isize);
impl_lit_from!(i32);

impl From<Literal> for isize {
    fn from(l: Literal) -> Self {
        l.0.into()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds a vector of literals from integers.
#[macro_export]
macro_rules! clause {
    () => (
        vec![] as Vec<$crate::sat::Literal>
    );
    ($($x:expr),+ $(,)?) => (
        [$($x),+].into_iter().map($crate::sat::Literal::from).collect::<Vec<$crate::sat::Literal>>()
    );
}

/// A model returned by a SAT solver.
///
/// Variables the solver never saw in a clause may be left unassigned.
#[derive(Debug, PartialEq, Eq)]
pub struct Assignment(Vec<Option<bool>>);

impl Assignment {
    pub(crate) fn new(assignment: Vec<Option<bool>>) -> Self {
        Self(assignment)
    }

    /// Returns the value of a variable, or [None] if it is unassigned or unknown.
    pub fn value_of<T>(&self, v: T) -> Option<bool>
    where
        T: Into<Variable>,
    {
        self.0
            .get(usize::from(v.into()) - 1)
            .copied()
            .flatten()
    }

    /// Returns the number of variables in this model.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` iff this model involves no variable.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The outcome of a call to a SAT solver.
#[derive(Debug, PartialEq, Eq)]
pub enum SolvingResult {
    /// A model was found.
    Satisfiable(Assignment),
    /// There is no model.
    Unsatisfiable,
    /// The solver gave up.
    Unknown,
}

/// An incremental SAT solver.
pub trait SatSolver {
    /// Adds a clause.
    fn add_clause(&mut self, cl: Vec<Literal>);

    /// Searches a model of the clauses added so far.
    fn solve(&mut self) -> SolvingResult;

    /// Returns the number of variables known by the solver.
    fn n_vars(&self) -> usize;

    /// Declares that variables up to `n_vars` exist, even if no clause mentions them yet.
    fn declare_vars(&mut self, n_vars: usize);
}

/// Returns the default SAT solver.
pub fn default_solver() -> Box<dyn SatSolver> {
    Box::new(CadicalSolver::default())
}
