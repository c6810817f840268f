use super::{Identifier, SymbolicLiteral};
use crate::{engine::PartialAssignment, error::HexError, sat::Literal, symbols::Symbol};
use anyhow::Result;
use std::cell::{Cell, RefCell};

/// Gives access to the replacement atoms handled by a propagator.
///
/// This is the part of the owning propagator a plugin may reach through a [SearchScope].
pub trait ReplacementIndex {
    /// Returns the replacement atom of an external atom whose arguments are the provided ones.
    fn find_replacement(&self, eatom: &str, arguments: &[Symbol]) -> Option<SymbolicLiteral>;
}

/// The context external atoms are evaluated in.
///
/// A context is owned by a single propagator (or by the grounding adapter).
/// Each check round opens the context with [enter](Self::enter), which returns a guard;
/// the round ends when the guard is dropped, whatever the exit path is.
/// Identifiers created during a round become unusable once it ends.
#[derive(Default)]
pub struct ClaspContext {
    active: Cell<u64>,
    last: Cell<u64>,
}

impl ClaspContext {
    /// Opens a new round.
    ///
    /// Fails if a round is already open on this context.
    pub fn enter(&self) -> Result<ContextRound<'_>> {
        if self.active.get() != 0 {
            return Err(HexError::usage(
                "cannot open a round on a context which is already in use",
            ));
        }
        let generation = self.last.get() + 1;
        self.last.set(generation);
        self.active.set(generation);
        Ok(ContextRound {
            context: self,
            generation,
        })
    }

    fn is_active(&self, generation: u64) -> bool {
        self.active.get() == generation
    }
}

/// An open round on a [ClaspContext]; the round ends when this guard is dropped.
pub struct ContextRound<'a> {
    context: &'a ClaspContext,
    generation: u64,
}

impl<'a> ContextRound<'a> {
    /// Binds this round to an assignment and to the replacement atoms of the owning propagator.
    ///
    /// At grounding time, there is neither assignment nor propagator.
    pub fn scope<'s>(
        &self,
        assignment: Option<&'s dyn PartialAssignment>,
        replacements: Option<&'s dyn ReplacementIndex>,
    ) -> SearchScope<'s>
    where
        'a: 's,
    {
        SearchScope {
            context: self.context,
            generation: self.generation,
            assignment,
            replacements,
            evaluation_inputs: RefCell::new(None),
        }
    }
}

impl Drop for ContextRound<'_> {
    fn drop(&mut self) {
        if self.context.is_active(self.generation) {
            self.context.active.set(0);
        }
    }
}

/// A round of a context, bound to the engine objects plugins may observe.
pub struct SearchScope<'s> {
    context: &'s ClaspContext,
    generation: u64,
    assignment: Option<&'s dyn PartialAssignment>,
    replacements: Option<&'s dyn ReplacementIndex>,
    evaluation_inputs: RefCell<Option<Vec<SymbolicLiteral>>>,
}

impl<'s> SearchScope<'s> {
    /// Wraps a symbolic literal into an identifier bound to this scope.
    pub fn identifier(&'s self, symlit: SymbolicLiteral) -> Identifier<'s> {
        Identifier::new(symlit, self)
    }

    /// Returns the truth value of a literal, or [Option::None] if it is unassigned or if there is no assignment.
    pub fn value_of(&self, lit: Literal) -> Option<bool> {
        self.assignment.and_then(|a| a.value(lit))
    }

    /// Returns `true` iff an assignment is bound to this scope.
    pub fn has_assignment(&self) -> bool {
        self.assignment.is_some()
    }

    /// Returns `true` iff the assignment bound to this scope is total.
    pub fn assignment_is_total(&self) -> bool {
        self.assignment.map(|a| a.is_total()).unwrap_or(false)
    }

    pub(crate) fn ensure_live(&self, what: &str) -> Result<()> {
        if self.context.is_active(self.generation) {
            Ok(())
        } else {
            Err(HexError::StaleIdentifier(what.to_string()).into())
        }
    }

    pub(crate) fn assignment(&self, what: &str) -> Result<&'s dyn PartialAssignment> {
        self.ensure_live(what)?;
        self.assignment.ok_or_else(|| {
            HexError::usage(format!(
                "cannot query the truth value of {} without an assignment (grounding time)",
                what
            ))
        })
    }

    pub(crate) fn find_replacement(
        &self,
        eatom: &str,
        arguments: &[Symbol],
    ) -> Option<SymbolicLiteral> {
        self.replacements
            .and_then(|r| r.find_replacement(eatom, arguments))
    }

    /// Exposes the predicate inputs of an external atom call until the returned guard is dropped.
    pub(crate) fn start_evaluation(&self, inputs: &[SymbolicLiteral]) -> Result<EvaluationGuard<'_, 's>> {
        self.ensure_live("the evaluation scope")?;
        let mut current = self.evaluation_inputs.borrow_mut();
        if current.is_some() {
            return Err(HexError::usage(
                "cannot start an external atom evaluation inside another one",
            ));
        }
        *current = Some(inputs.to_vec());
        Ok(EvaluationGuard { scope: self })
    }

    pub(crate) fn with_evaluation_inputs<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&[SymbolicLiteral]) -> R,
    {
        match self.evaluation_inputs.borrow().as_ref() {
            Some(inputs) => Ok(f(inputs)),
            None => Err(HexError::usage(
                "predicate inputs are only available during an external atom evaluation",
            )),
        }
    }
}

/// Guard returned by [SearchScope::start_evaluation]; hides the predicate inputs again when dropped.
pub(crate) struct EvaluationGuard<'g, 's> {
    scope: &'g SearchScope<'s>,
}

impl Drop for EvaluationGuard<'_, '_> {
    fn drop(&mut self) {
        self.scope.evaluation_inputs.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::MockAssignment;

    #[test]
    fn test_enter_twice() {
        let context = ClaspContext::default();
        let round = context.enter().unwrap();
        assert!(context.enter().is_err());
        drop(round);
        assert!(context.enter().is_ok());
    }

    #[test]
    fn test_stale_after_round() {
        let context = ClaspContext::default();
        let assignment = MockAssignment::new(&[1], true);
        let round = context.enter().unwrap();
        let scope = round.scope(Some(&assignment), None);
        let id = scope.identifier(SymbolicLiteral::new(
            Symbol::constant("a"),
            Some(Literal::from(1)),
        ));
        assert!(id.is_true().unwrap());
        drop(round);
        assert!(matches!(
            id.is_true().unwrap_err().downcast_ref::<HexError>(),
            Some(HexError::StaleIdentifier(_))
        ));
        let _next_round = context.enter().unwrap();
        assert!(id.is_true().is_err());
    }

    #[test]
    fn test_evaluation_guard() {
        let context = ClaspContext::default();
        let round = context.enter().unwrap();
        let scope = round.scope(None, None);
        assert!(scope.with_evaluation_inputs(|i| i.len()).is_err());
        {
            let inputs = vec![SymbolicLiteral::new(Symbol::constant("a"), None)];
            let _guard = scope.start_evaluation(&inputs).unwrap();
            assert_eq!(1, scope.with_evaluation_inputs(|i| i.len()).unwrap());
            assert!(scope.start_evaluation(&inputs).is_err());
        }
        assert!(scope.with_evaluation_inputs(|i| i.len()).is_err());
    }

    #[test]
    fn test_no_assignment_at_grounding_time() {
        let context = ClaspContext::default();
        let round = context.enter().unwrap();
        let scope = round.scope(None, None);
        assert!(!scope.has_assignment());
        assert_eq!(None, scope.value_of(Literal::from(1)));
        assert!(matches!(
            scope
                .assignment("a")
                .err()
                .as_ref()
                .and_then(|e| e.downcast_ref::<HexError>()),
            Some(HexError::Usage(_))
        ));
    }
}
