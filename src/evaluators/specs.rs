use crate::{
    hex::{ExternalAtom, SearchScope, SymbolicLiteral},
    sat::Literal,
    symbols::Symbol,
};
use anyhow::Result;
use std::{collections::HashSet, sync::Arc};

/// The output sets of an external atom evaluation.
///
/// The known-true and unknown output sets are disjoint.
/// Results only involve terms, so they can be shared between engines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationResult {
    known_true: HashSet<Vec<Symbol>>,
    unknown: HashSet<Vec<Symbol>>,
}

impl EvaluationResult {
    pub(crate) fn new(known_true: HashSet<Vec<Symbol>>, unknown: HashSet<Vec<Symbol>>) -> Self {
        Self { known_true, unknown }
    }

    /// Returns the output tuples known to be true.
    pub fn known_true(&self) -> &HashSet<Vec<Symbol>> {
        &self.known_true
    }

    /// Returns the output tuples the plugin could not decide.
    pub fn unknown(&self) -> &HashSet<Vec<Symbol>> {
        &self.unknown
    }

    /// Returns the truth value of an output tuple, or [Option::None] if it is unknown.
    pub fn classify(&self, output: &[Symbol]) -> Option<bool> {
        if self.unknown.contains(output) {
            None
        } else {
            Some(self.known_true.contains(output))
        }
    }
}

/// An evaluation, as returned to its caller.
///
/// The nogoods learned by the plugin are expressed with the literals of the scope the plugin ran in.
/// They belong to the caller only: a result served from a cache comes with no learned nogoods.
#[derive(Debug)]
pub struct Evaluation {
    result: Arc<EvaluationResult>,
    learned: Vec<Vec<Literal>>,
}

impl Evaluation {
    pub(crate) fn new(result: Arc<EvaluationResult>, learned: Vec<Vec<Literal>>) -> Self {
        Self { result, learned }
    }

    /// Returns the output sets.
    pub fn result(&self) -> &Arc<EvaluationResult> {
        &self.result
    }

    /// Returns the nogoods the plugin reported during this call.
    pub fn learned(&self) -> &[Vec<Literal>] {
        &self.learned
    }
}

/// A trait for objects able to evaluate external atoms.
///
/// Evaluators are shared by all the propagators of a solving process.
pub trait AtomEvaluator: Send + Sync {
    /// Evaluates an external atom on an input tuple.
    ///
    /// The predicate inputs are the atoms the plugin is allowed to observe during the call;
    /// their truth values are read from the assignment bound to the scope.
    fn evaluate<'s>(
        &self,
        scope: &'s SearchScope<'s>,
        atom: &ExternalAtom,
        input_tuple: &[Symbol],
        predicate_inputs: &[SymbolicLiteral],
    ) -> Result<Evaluation>;
}
