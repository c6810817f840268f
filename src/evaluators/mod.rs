//! Evaluation of external atoms, at grounding time and during the search.

mod cached_evaluator;
pub use cached_evaluator::CachedEAtomEvaluator;

mod eatom_evaluator;
pub use eatom_evaluator::output_symbol;
pub use eatom_evaluator::EAtomEvaluator;

mod grounding_context;
pub use grounding_context::ExternalAtomCall;
pub use grounding_context::GroundingContext;
pub use grounding_context::GroundingOutput;

mod specs;
pub use specs::AtomEvaluator;
pub use specs::Evaluation;
pub use specs::EvaluationResult;
