use super::AtomEvaluator;
use crate::{
    error::HexError,
    hex::{ClaspContext, ExternalAtom, ExternalAtomRegistry},
    symbols::Symbol,
};
use anyhow::{Context, Result};
use log::warn;
use std::{collections::BTreeMap, fmt::Display, sync::Arc};

/// The value returned to the grounder by a grounding-time external atom call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroundingOutput {
    /// For atoms without outputs: `1` if the atom holds, `0` otherwise.
    Number(i64),
    /// For atoms with a single output: the output values.
    Terms(Vec<Symbol>),
    /// For atoms with several outputs: the output tuples.
    Tuples(Vec<Vec<Symbol>>),
}

impl Display for GroundingOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let join = |v: &[Symbol]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(",");
        match self {
            GroundingOutput::Number(n) => write!(f, "{}", n),
            GroundingOutput::Terms(terms) => write!(f, "[{}]", join(terms)),
            GroundingOutput::Tuples(tuples) => write!(
                f,
                "[{}]",
                tuples
                    .iter()
                    .map(|t| format!("({})", join(t)))
                    .collect::<Vec<_>>()
                    .join(",")
            ),
        }
    }
}

/// Exposes the external atoms to the grounder as functions.
///
/// Calls happen before the search starts, so plugins see no assignment and no predicate input.
pub struct GroundingContext {
    evaluator: Arc<dyn AtomEvaluator>,
    registry: Arc<ExternalAtomRegistry>,
    context: ClaspContext,
}

impl GroundingContext {
    /// Builds a new grounding context.
    pub fn new(evaluator: Arc<dyn AtomEvaluator>, registry: Arc<ExternalAtomRegistry>) -> Self {
        Self {
            evaluator,
            registry,
            context: ClaspContext::default(),
        }
    }

    /// Returns the grounding-time callables, indexed by external atom name.
    pub fn functions(&self) -> BTreeMap<&str, ExternalAtomCall<'_>> {
        self.registry
            .iter()
            .map(|atom| (atom.name(), ExternalAtomCall { grounding: self, atom }))
            .collect()
    }

    /// Calls the external atom with the given name.
    pub fn call(&self, name: &str, arguments: &[Symbol]) -> Result<GroundingOutput> {
        let atom = self.registry.get_or_fail(name)?;
        ExternalAtomCall {
            grounding: self,
            atom,
        }
        .call(arguments)
    }
}

/// A grounding-time callable bound to an external atom.
pub struct ExternalAtomCall<'a> {
    grounding: &'a GroundingContext,
    atom: &'a ExternalAtom,
}

impl ExternalAtomCall<'_> {
    /// Evaluates the external atom and reshapes its outputs for the grounder.
    pub fn call(&self, arguments: &[Symbol]) -> Result<GroundingOutput> {
        let round = self.grounding.context.enter()?;
        let scope = round.scope(None, None);
        let evaluation = self
            .grounding
            .evaluator
            .evaluate(&scope, self.atom, arguments, &[])
            .with_context(|| format!("while grounding external atom {}", self.atom.name()))?;
        let result = evaluation.result();
        if !result.unknown().is_empty() {
            return Err(HexError::contract(format!(
                "external atom {} reported unknown outputs at grounding time",
                self.atom.name()
            )));
        }
        if !evaluation.learned().is_empty() {
            warn!(
                "ignoring {} nogoods learned by {} at grounding time",
                evaluation.learned().len(),
                self.atom.name()
            );
        }
        let mut tuples = result.known_true().iter().cloned().collect::<Vec<_>>();
        tuples.sort_unstable();
        match self.atom.output_arity() {
            0 => Ok(GroundingOutput::Number(if tuples.is_empty() { 0 } else { 1 })),
            1 => Ok(GroundingOutput::Terms(
                tuples
                    .into_iter()
                    .filter_map(|mut t| {
                        if t.len() == 1 {
                            t.pop()
                        } else {
                            warn!(
                                "dropping output tuple of length {} returned by {} which has a single output",
                                t.len(),
                                self.atom.name()
                            );
                            None
                        }
                    })
                    .collect(),
            )),
            _ => Ok(GroundingOutput::Tuples(tuples)),
        }
    }

    /// Returns the external atom behind this callable.
    pub fn atom(&self) -> &ExternalAtom {
        self.atom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        evaluators::{CachedEAtomEvaluator, EAtomEvaluator},
        hex::{InputKind, OutputValue},
    };
    use std::collections::HashSet;

    fn registry() -> Arc<ExternalAtomRegistry> {
        let mut registry = ExternalAtomRegistry::default();
        registry
            .register(ExternalAtom::new("holds", vec![], 0, |call, _| {
                call.output(Vec::<OutputValue>::new());
                Ok(())
            }))
            .unwrap();
        registry
            .register(ExternalAtom::new("fails", vec![], 0, |_, _| Ok(())))
            .unwrap();
        registry
            .register(ExternalAtom::new("ab", vec![], 1, |call, _| {
                call.output(vec!["a"]);
                call.output(vec!["b"]);
                call.output(vec!["c", "d"]);
                Ok(())
            }))
            .unwrap();
        registry
            .register(ExternalAtom::new(
                "pairs",
                vec![InputKind::Constant],
                2,
                |call, args| {
                    let n = args[0].as_id()?.int_value()?;
                    for i in 0..n {
                        call.output(vec![i, i + 1]);
                    }
                    Ok(())
                },
            ))
            .unwrap();
        registry
            .register(ExternalAtom::new("undecided", vec![], 1, |call, _| {
                call.output_unknown(vec!["a"]);
                Ok(())
            }))
            .unwrap();
        Arc::new(registry)
    }

    macro_rules! grounding_tests {
        ($evaluator:ident) => {
            paste::item! {
                #[test]
                fn [<test_zero_arity_ $evaluator:snake>]() {
                    let grounding = GroundingContext::new(Arc::new($evaluator::default()), registry());
                    assert_eq!(GroundingOutput::Number(1), grounding.call("holds", &[]).unwrap());
                    assert_eq!(GroundingOutput::Number(0), grounding.call("fails", &[]).unwrap());
                }

                #[test]
                fn [<test_unary_ $evaluator:snake>]() {
                    let grounding = GroundingContext::new(Arc::new($evaluator::default()), registry());
                    match grounding.call("ab", &[]).unwrap() {
                        GroundingOutput::Terms(terms) => assert_eq!(
                            vec![Symbol::constant("a"), Symbol::constant("b")].into_iter().collect::<HashSet<_>>(),
                            terms.into_iter().collect::<HashSet<_>>()
                        ),
                        other => panic!("unexpected output {:?}", other),
                    }
                }

                #[test]
                fn [<test_nary_ $evaluator:snake>]() {
                    let grounding = GroundingContext::new(Arc::new($evaluator::default()), registry());
                    let functions = grounding.functions();
                    assert_eq!(5, functions.len());
                    let output = functions["pairs"].call(&[Symbol::number(2)]).unwrap();
                    assert_eq!("[(0,1),(1,2)]", output.to_string());
                }

                #[test]
                fn [<test_unknown_outputs_ $evaluator:snake>]() {
                    let grounding = GroundingContext::new(Arc::new($evaluator::default()), registry());
                    let err = grounding.call("undecided", &[]).unwrap_err();
                    assert!(matches!(err.downcast_ref::<HexError>(), Some(HexError::ContractViolation(_))));
                    let err = grounding.call("unknown", &[]).unwrap_err();
                    assert!(matches!(err.downcast_ref::<HexError>(), Some(HexError::Configuration(_))));
                }
            }
        };
    }

    grounding_tests!(EAtomEvaluator);
    grounding_tests!(CachedEAtomEvaluator);
}
