use super::{ProgramSignatures, VerificationPropagator};
use crate::{evaluators::AtomEvaluator, hex::ExternalAtomRegistry};
use log::info;
use std::{collections::HashSet, sync::Arc};

/// Creates the verification propagators of a solving process.
///
/// All the propagators share the same evaluator, and thus the same evaluation cache if there is one.
/// Each propagator has its own context and its own set of learned nogoods.
pub struct PropagatorFactory {
    evaluator: Arc<dyn AtomEvaluator>,
    registry: Arc<ExternalAtomRegistry>,
    signatures: Arc<ProgramSignatures>,
    partial_eatoms: Arc<HashSet<String>>,
}

impl PropagatorFactory {
    /// Builds a new factory.
    ///
    /// If `partial_evaluation` is `true`, the external atoms whose plugins support partial evaluation
    /// are verified on partial assignments; otherwise, all verifications wait for total assignments.
    pub fn new(
        evaluator: Arc<dyn AtomEvaluator>,
        registry: Arc<ExternalAtomRegistry>,
        signatures: ProgramSignatures,
        partial_evaluation: bool,
    ) -> Self {
        let partial_eatoms = if partial_evaluation {
            registry
                .iter()
                .filter(|a| a.provides_partial())
                .map(|a| a.name().to_string())
                .collect()
        } else {
            HashSet::new()
        };
        Self {
            evaluator,
            registry,
            signatures: Arc::new(signatures),
            partial_eatoms: Arc::new(partial_eatoms),
        }
    }

    /// Returns the names of the external atoms verified on partial assignments.
    pub fn partial_eatoms(&self) -> &HashSet<String> {
        &self.partial_eatoms
    }

    /// Creates a new propagator; the name is only used for logging.
    pub fn create(&self, name: &str) -> VerificationPropagator {
        info!("creating verification propagator {}", name);
        VerificationPropagator::new(
            name,
            Arc::clone(&self.evaluator),
            Arc::clone(&self.registry),
            Arc::clone(&self.signatures),
            Arc::clone(&self.partial_eatoms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        evaluators::EAtomEvaluator,
        hex::{ExternalAtom, InputKind},
    };

    fn registry() -> Arc<ExternalAtomRegistry> {
        let mut registry = ExternalAtomRegistry::default();
        registry
            .register(ExternalAtom::new("total", vec![InputKind::Predicate], 0, |_, _| Ok(())))
            .unwrap();
        registry
            .register(
                ExternalAtom::new("partial", vec![InputKind::Predicate], 0, |_, _| Ok(()))
                    .with_partial(true),
            )
            .unwrap();
        Arc::new(registry)
    }

    #[test]
    fn test_partial_eatoms() {
        let factory = PropagatorFactory::new(
            Arc::new(EAtomEvaluator),
            registry(),
            ProgramSignatures::default(),
            true,
        );
        assert_eq!(
            vec!["partial".to_string()].into_iter().collect::<HashSet<_>>(),
            *factory.partial_eatoms()
        );
        assert_eq!("VerificationPropagator(CSF)", factory.create("CSF").name());
    }

    #[test]
    fn test_partial_evaluation_disabled() {
        let factory = PropagatorFactory::new(
            Arc::new(EAtomEvaluator),
            registry(),
            ProgramSignatures::default(),
            false,
        );
        assert!(factory.partial_eatoms().is_empty());
    }
}
